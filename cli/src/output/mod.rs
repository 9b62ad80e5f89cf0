//! Output formatting module.
//!
//! Stage and validation results go to stdout as JSON; logs go to stderr.

pub mod json;
