//! Pure formatting functions for UI output.
//!
//! Everything the user reads goes through here; tracing output is for
//! diagnostics only.

use crate::guard::GuardFinding;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), style(message).cyan());
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Format and print a skipped stage.
pub fn display_skip(stage: &str) {
    println!("{} {}", style("⚠").yellow(), style(format!("Skipping {}", stage)).dim());
}

/// Render a guard finding overridden by `--force`.
pub fn format_guard_warning(finding: &GuardFinding) -> String {
    format!(
        "{}\n\tPassed option: --force :: {}",
        finding,
        finding.override_note()
    )
}

/// Display a guard finding overridden by `--force`.
pub fn display_guard_warning(finding: &GuardFinding) {
    eprintln!(
        "{} {}",
        style("⚠ WARNING:").yellow().bold(),
        format_guard_warning(finding)
    );
}

/// Display the version a run resolved to.
pub fn display_version_change(current: &str, next: &str) {
    println!("\n{}", style("Next version:").bold());
    println!("  From: {}", style(current).red());
    println!("  To:   {}", style(next).green());
}
