pub mod keys;
pub mod plan;

pub use keys::{
    KeyError, heartbeat_key, metrics_database_name, run_prefix, start_signal_key,
    validate_run_id,
};
pub use plan::*;
