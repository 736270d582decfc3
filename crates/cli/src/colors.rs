// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities for help and command output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use qa_core::Severity;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers: pastel cyan/steel blue
    pub const HEADER: u8 = 74;
    /// Commands/literals: light grey
    pub const LITERAL: u8 = 250;
    /// Placeholders and quoted values: medium grey
    pub const CONTEXT: u8 = 245;
    pub const WARN: u8 = 214;
    pub const ALERT: u8 = 203;
}

const RESET: &str = "\x1b[0m";

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn paint(code: u8, text: &str) -> String {
    format!("\x1b[38;5;{code}m{text}{RESET}")
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// Severity label, colored when output is a terminal.
pub fn severity(severity: Severity) -> String {
    let label = severity.as_str();
    if !should_colorize() {
        return label.to_string();
    }
    match severity {
        Severity::Low => context(label),
        Severity::Medium => literal(label),
        Severity::High => paint(codes::WARN, label),
        Severity::Critical => paint(codes::ALERT, label),
    }
}

/// Colorize an examples help block.
///
/// Lines ending in `:` become headers. On example lines, the command (text
/// before the first run of two spaces) is colored as a literal with quoted
/// strings and `<placeholders>` dimmed.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }

    let mut lines = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        if trimmed.ends_with(':') && !trimmed.contains("  ") {
            lines.push(format!("{indent}{}", header(trimmed)));
            continue;
        }

        let (cmd, desc) = match trimmed.find("  ") {
            Some(end) => trimmed.split_at(end),
            None => (trimmed, ""),
        };
        lines.push(format!("{indent}{}{desc}", colorize_command(cmd)));
    }
    lines.join("\n")
}

/// Color a command line, dimming quoted strings and `<placeholders>`.
pub fn colorize_command(cmd: &str) -> String {
    let mut result = String::with_capacity(cmd.len() + 64);
    let mut plain = String::new();
    let mut chars = cmd.chars();

    while let Some(c) = chars.next() {
        let close = match c {
            '"' => '"',
            '<' => '>',
            _ => {
                plain.push(c);
                continue;
            }
        };
        if !plain.is_empty() {
            result.push_str(&literal(&plain));
            plain.clear();
        }
        let mut quoted = String::from(c);
        for ch in chars.by_ref() {
            quoted.push(ch);
            if ch == close {
                break;
            }
        }
        result.push_str(&context(&quoted));
    }
    if !plain.is_empty() {
        result.push_str(&literal(&plain));
    }
    result
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
