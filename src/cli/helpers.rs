//! Shared helper functions for CLI commands
//!
//! Text formatting for list and detail output, and the dialoguer prompts
//! used by `--interactive` create/update dialogs.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Password, Select};
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::api::FileUpload;

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a labelled detail line, skipping absent values
pub fn field(label: &str, value: Option<impl std::fmt::Display>) {
    if let Some(value) = value {
        println!("{}: {}", style(label).bold(), value);
    }
}

pub fn rule() {
    println!("{}", style("─".repeat(60)).dim());
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Read a file argument into an upload part
pub fn load_file(field: &str, path: &Path) -> Result<FileUpload> {
    FileUpload::from_path(field, path)
        .map_err(|e| miette::miette!("cannot read {}: {}", path.display(), e))
}

/// Report a completed write
pub fn print_done(action: &str, what: &str, label: &str) {
    println!(
        "{} {} {} {}",
        style("✓").green(),
        action,
        what,
        style(label).cyan()
    );
}

// =========================================================================
// Prompts
// =========================================================================

pub fn prompt_text(prompt: &str, initial: Option<&str>) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    input.interact_text().into_diagnostic()
}

/// Prompt that may be left empty
pub fn prompt_optional(prompt: &str, initial: Option<&str>) -> Result<Option<String>> {
    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(prompt)
        .allow_empty(true);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    let value = input.interact_text().into_diagnostic()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

pub fn prompt_password(prompt: &str, confirm: bool) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut input = Password::with_theme(&theme).with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Confirm password", "Passwords do not match");
    }
    input.interact().into_diagnostic()
}

pub fn prompt_select(prompt: &str, items: &[String], default: usize) -> Result<usize> {
    Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()
        .into_diagnostic()
}

/// Pick any number of items; `checked` marks the preselected ones
pub fn prompt_multi_select(prompt: &str, items: &[String], checked: &[bool]) -> Result<Vec<usize>> {
    MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .defaults(checked)
        .interact()
        .into_diagnostic()
}

/// Ask before a destructive action; `--yes` skips the dialog
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("Müller-Lüdenscheidt", 9), "Müller...");
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }
}
