//! Command execution coordinating the release run.
//!
//! Validates inputs, runs the release and reports failures together with
//! recovery suggestions.

mod helpers;
mod release;

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

use release::execute_release;

/// Execute the release based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Validation errors are never quiet
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        let suggestions = crate::ReleaseError::from(validation_error).recovery_suggestions();
        for suggestion in suggestions {
            output.error(&format!("  • {}", suggestion));
        }
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    match execute_release(&args, &config).await {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!("Release failed: {}", e));
            log::debug!("Release failed: {:?}", e);

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
