//! Bootstrap error taxonomy.
//!
//! Only the fatal classes live here; optional steps that the operator
//! declines are normal outcomes and are modeled as enum results on the
//! operations themselves, never as errors.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal error classes for the bootstrap run.
///
/// Anything of this type aborts the run with exit code 1. Non-fatal
/// trouble (keyserver misses, upgrade failures, pull failures) is reported
/// to the operator and the run continues.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A required tool or package manager is absent from the host.
    #[error("required tool not found: {tool}")]
    Environment { tool: String },

    /// A download that later steps depend on failed.
    #[error("failed to download {url}")]
    Network { url: String },

    /// A privileged command that later steps depend on exited non-zero.
    #[error("`{command}` failed with exit code {code:?}")]
    Subprocess { command: String, code: Option<i32> },

    /// Cloning the project checkout failed.
    #[error("failed to clone {remote} into {dest}")]
    CloneFailed { remote: String, dest: PathBuf },
}

impl BootstrapError {
    /// Fatal missing-tool error.
    pub fn missing_tool(tool: impl Into<String>) -> Self {
        BootstrapError::Environment { tool: tool.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BootstrapError::missing_tool("pacman");
        assert_eq!(err.to_string(), "required tool not found: pacman");

        let err = BootstrapError::Subprocess {
            command: "sudo pacman -Syu".to_string(),
            code: Some(1),
        };
        assert!(err.to_string().contains("sudo pacman -Syu"));
        assert!(err.to_string().contains("Some(1)"));
    }
}
