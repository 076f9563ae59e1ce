//! Prompts and terminal output for the flows dashboard CLI.
pub mod menu;
pub mod formatting;

use colored::Colorize;
use thiserror::Error;

pub use menu::Menu;
pub use formatting::{format_table, format_json, format_record};

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Esc or q on a prompt
    #[error("selection cancelled")]
    UserCancelled,

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Severity of a one-line message on stderr.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice {
    Success,
    Info,
    Warning,
    Error,
}

impl Notice {
    fn render(self, message: &str) -> String {
        match self {
            Notice::Success => format!("✓ {}", message).green().to_string(),
            Notice::Info => format!("ℹ {}", message).bright_cyan().to_string(),
            Notice::Warning => format!("⚠ {}", message).yellow().to_string(),
            Notice::Error => format!("✗ {}", message).red().to_string(),
        }
    }
}

pub fn notify(notice: Notice, message: &str) {
    eprintln!("{}", notice.render(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_keeps_message() {
        colored::control::set_override(false);
        assert_eq!(Notice::Warning.render("bridge feed url not configured"), "⚠ bridge feed url not configured");
        assert_eq!(Notice::Success.render("swap refreshed"), "✓ swap refreshed");
    }
}
