//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::BuildError;

/// Map a failed command to the line printed before exiting non-zero.
pub fn map_error(e: &BuildError) -> String {
    format!("Process aborted: {}", e)
}
