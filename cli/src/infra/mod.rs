//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! cluster helper protocol, blob storage, and settings and plan loading.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod blob_store;
pub mod clock;
pub mod cluster;
pub mod command_runner;
pub mod config;
pub mod plan_loader;
