//! Output formatting - plain ASCII, colour only on a terminal

use owo_colors::OwoColorize;
use serde_json::Value;
use std::io::IsTerminal;

fn color() -> bool {
    std::io::stdout().is_terminal()
}

/// Section header, e.g. `[DEPLOYMENT]`
pub fn header(title: &str) {
    let tag = format!("[{}]", title.to_uppercase());
    if color() {
        println!("{}", tag.bold());
    } else {
        println!("{}", tag);
    }
}

pub fn ok(message: &str) {
    if color() {
        println!("{} {}", "[OK]".bright_green(), message);
    } else {
        println!("[OK] {}", message);
    }
}

pub fn skipped(message: &str) {
    if color() {
        println!("{} {}", "[SKIP]".yellow(), message);
    } else {
        println!("[SKIP] {}", message);
    }
}

/// Key/value line, key padded to a fixed width
pub fn kv(key: &str, value: &str) {
    if color() {
        println!("  {:<24} {}", key.cyan(), value);
    } else {
        println!("  {:<24} {}", key, value);
    }
}

/// Pretty-printed JSON on stdout
pub fn json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

/// Error line for stderr
pub fn error_line(message: &str) -> String {
    render_error(message, std::io::stderr().is_terminal())
}

fn render_error(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "error:".bright_red().bold(), message)
    } else {
        format!("error: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_error_line() {
        assert_eq!(
            render_error("missing environment variable ES_NP_USERNAME", false),
            "error: missing environment variable ES_NP_USERNAME"
        );
    }

    #[test]
    fn test_colored_error_line_keeps_message() {
        let line = render_error("deployment 'obs' not found", true);
        assert!(line.contains("\u{1b}["));
        assert!(line.contains("error:"));
        assert!(line.ends_with(" deployment 'obs' not found"));
    }

    #[test]
    fn test_error_line_without_terminal() {
        if !std::io::stderr().is_terminal() {
            assert_eq!(error_line("boom"), "error: boom");
        } else {
            assert!(error_line("boom").ends_with("boom"));
        }
    }
}
