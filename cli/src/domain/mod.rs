//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod sizing;
pub mod stage;
pub mod validate;

pub use config::{NetworkConfig, Settings};
pub use error::{PlanLoadError, Signal, SignalKind, StageParseError, StorageError};
pub use sizing::{InstanceDemand, finished_steps, instance_demand, missing_instances, total_duration};
pub use stage::{Directive, Outcome, Stage};
pub use validate::{ErrorReport, check_plan_structure};
