//! Stages command — lists the pipeline stages in invocation order.

use anyhow::{Context, Result};

use crate::domain::Stage;

/// Run the stages command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(&Stage::ALL).context("JSON serialization failed")?;
        println!("{out}");
        return Ok(());
    }
    for (index, stage) in Stage::ALL.iter().enumerate() {
        println!("{:>2}. {stage}", index + 1);
    }
    Ok(())
}
