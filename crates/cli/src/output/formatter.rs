//! Human and JSON rendering of command results
//!
//! Results go to stdout and diagnostics to stderr. In JSON mode stdout only
//! ever carries JSON: one pretty document per result, or one compact
//! document per line for streamed listings.

use std::fmt::Display;

use serde::Serialize;

use super::OutputConfig;
use crate::exit_code::ExitCode;

#[derive(Debug, Clone, Copy)]
enum Mark {
    Success,
    Failure,
    Warning,
}

impl Mark {
    fn symbol(self) -> &'static str {
        match self {
            Mark::Success => "✓",
            Mark::Failure => "✗",
            Mark::Warning => "⚠",
        }
    }

    /// ANSI foreground color
    fn color(self) -> u8 {
        match self {
            Mark::Success => 32,
            Mark::Failure => 31,
            Mark::Warning => 33,
        }
    }
}

/// Serialize `value` either pretty or on a single line
fn encode_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Writes command output according to the global output flags
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    fn marked(&self, mark: Mark, message: &str) -> String {
        if self.colors_enabled() {
            format!("\x1b[{}m{}\x1b[0m {message}", mark.color(), mark.symbol())
        } else {
            format!("{} {message}", mark.symbol())
        }
    }

    fn print_json<T: Serialize>(&self, value: &T, pretty: bool) {
        match encode_json(value, pretty) {
            Ok(json) => println!("{json}"),
            Err(e) => self.error(&format!("Error serializing output: {e}")),
        }
    }

    /// A result: pretty JSON in JSON mode, its `Display` form otherwise
    pub fn output<T: Serialize + Display>(&self, value: &T) {
        if self.config.quiet {
            return;
        }
        if self.config.json {
            self.print_json(value, true);
        } else {
            println!("{value}");
        }
    }

    /// Pretty JSON regardless of quiet mode
    pub fn json<T: Serialize>(&self, value: &T) {
        self.print_json(value, true);
    }

    /// One compact JSON document per line, for records that arrive one by one
    pub fn json_line<T: Serialize>(&self, value: &T) {
        self.print_json(value, false);
    }

    /// Confirmation line; the exit code alone reports success in JSON mode
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        println!("{}", self.marked(Mark::Success, message));
    }

    /// Errors are printed even in quiet mode
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({ "error": message });
            eprintln!(
                "{}",
                encode_json(&error, true).unwrap_or_else(|_| message.to_string())
            );
        } else {
            eprintln!("{}", self.marked(Mark::Failure, message));
        }
    }

    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        eprintln!("{}", self.marked(Mark::Warning, message));
    }

    /// Plain line, suppressed in quiet mode
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Report a library error and map it onto its exit code
    pub fn fail(&self, context: &str, error: &kc_core::Error) -> ExitCode {
        self.error(&format!("{context}: {error}"));
        ExitCode::from(error)
    }
}
