//! Centralized shell output.
//!
//! All operator-facing messages go through `Shell`, which handles status
//! prefixes, colors, and progress bars. Commands never format prefixes or
//! pick colors themselves.

use std::fmt::Display;
use std::io::{self, IsTerminal};

use indicatif::{ProgressBar, ProgressStyle};

/// Status types for output messages.
///
/// Shell handles all formatting - callers just specify the semantic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Installed,
    Configured,
    Cloned,
    Deployed,
    Written,

    // In-progress statuses (cyan)
    Installing,
    Fetching,
    Configuring,
    Syncing,

    // Info statuses (blue)
    Info,

    // Warning statuses (yellow)
    Skipped,
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    /// Get the display text for this status.
    fn as_str(&self) -> &'static str {
        match self {
            Status::Installed => "Installed",
            Status::Configured => "Configured",
            Status::Cloned => "Cloned",
            Status::Deployed => "Deployed",
            Status::Written => "Written",
            Status::Installing => "Installing",
            Status::Fetching => "Fetching",
            Status::Configuring => "Configuring",
            Status::Syncing => "Syncing",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    /// Get the ANSI color code for this status.
    fn color_code(&self) -> &'static str {
        match self {
            Status::Installed
            | Status::Configured
            | Status::Cloned
            | Status::Deployed
            | Status::Written => "\x1b[1;32m",
            Status::Installing | Status::Fetching | Status::Configuring | Status::Syncing => {
                "\x1b[1;36m"
            }
            Status::Info => "\x1b[1;34m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Width for status prefix alignment.
const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    use_color: bool,
    verbose: bool,
}

impl Shell {
    /// Create a shell from CLI flags.
    pub fn from_flags(verbose: bool, no_color: bool) -> Self {
        let use_color = !no_color && io::stderr().is_terminal();
        Shell { use_color, verbose }
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    pub fn status(&self, status: Status, msg: impl Display) {
        let prefix = self.format_status(status);
        eprintln!("{} {}", prefix, msg);
    }

    /// Print an info message.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    /// Create a byte-based progress bar for downloads.
    ///
    /// Returns a hidden bar when stderr is not a terminal so unattended
    /// runs stay quiet.
    pub fn bytes_progress(&self, total_bytes: u64, msg: impl Display) -> ProgressBar {
        if !io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total_bytes);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Format a status prefix with optional color.
    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();

        if self.use_color {
            let color = status.color_code();
            format!("{}{:>width$}\x1b[0m", color, text, width = STATUS_WIDTH)
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::from_flags(false, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_formatting_without_color() {
        let shell = Shell {
            use_color: false,
            verbose: false,
        };

        let formatted = shell.format_status(Status::Installed);
        assert_eq!(formatted.trim(), "Installed");
        assert_eq!(formatted.len(), STATUS_WIDTH);
    }

    #[test]
    fn test_status_formatting_with_color() {
        let shell = Shell {
            use_color: true,
            verbose: false,
        };

        let formatted = shell.format_status(Status::Error);
        assert!(formatted.starts_with("\x1b[1;31m"));
        assert!(formatted.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_verbose_flag() {
        let shell = Shell::from_flags(true, true);
        assert!(shell.is_verbose());
    }
}
