//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - The interactive one-time-password prompt

use console::{style, Term};
use tracing::debug;

use crate::error::{ReleaseError, Result};
use crate::registry::CredentialSource;

pub mod formatter;

pub use formatter::{
    display_error, display_guard_warning, display_skip, display_status, display_success,
    display_version_change, format_guard_warning,
};

/// Terminal prompt for registry one-time passwords.
///
/// Opened once per run and released when dropped, so every exit path,
/// including errors, restores the terminal.
pub struct OtpPrompt {
    term: Term,
}

impl OtpPrompt {
    pub fn open() -> Self {
        debug!("opening terminal prompt");
        OtpPrompt {
            term: Term::stderr(),
        }
    }

    /// Ask for a token, trimming surrounding whitespace
    pub fn ask(&self) -> Result<String> {
        self.term.write_line("")?;
        self.term
            .write_str(&format!("{} ", style("Please provide OTP token").green()))?;
        let token = self.term.read_line()?;
        Ok(token.trim().to_string())
    }

    /// Release the terminal explicitly
    pub fn close(self) {}
}

impl Drop for OtpPrompt {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
        let _ = self.term.flush();
        debug!("closed terminal prompt");
    }
}

impl CredentialSource for OtpPrompt {
    fn initial(&mut self) -> Result<Option<String>> {
        self.ask().map(Some)
    }

    fn refresh(&mut self, rejection: &ReleaseError) -> Result<Option<String>> {
        debug!("token rejected: {}", rejection);
        self.term.write_line(&format!(
            "{}",
            style("The token was rejected or has expired").yellow()
        ))?;
        self.ask().map(Some)
    }
}
