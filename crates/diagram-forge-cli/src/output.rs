use std::fmt::Display;
use std::path::Path;

use console::{Color, Style, Term};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// How results are written: human-readable, one JSON document, or
/// tab-separated lines for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

/// Where command results go, derived from the global flags.
///
/// Per-file lines and the closing summary go to stderr; formatted sources,
/// exports and JSON reports go to stdout.
pub struct OutputContext {
    pub mode: OutputMode,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputContext {
    pub fn from_global(global: &GlobalOpts) -> Self {
        let mode = match global.format.as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        };

        let use_color = !global.no_color
            && std::env::var("TERM").map_or(true, |t| t != "dumb")
            && Term::stderr().is_term();

        Self {
            mode,
            quiet: global.quiet,
            use_color,
        }
    }

    /// Reports a problem with one diagram file that did not stop the run.
    pub fn file_warning(&self, file: &Path, message: impl Display) {
        if let Some(line) = self.file_warning_line(file, &message) {
            eprintln!("{line}");
        }
    }

    /// Prints `  <file> .... <state>` while walking a set of files.
    pub fn file_progress(&self, file: &Path, state: impl Display) {
        if let Some(line) = self.file_progress_line(file, &state) {
            eprintln!("{line}");
        }
    }

    /// Prints the closing line of a command. `clean` selects between the
    /// `ok` and `warning:` tags.
    pub fn summary(&self, text: &str, clean: bool) {
        if let Some(line) = self.summary_line(text, clean) {
            eprintln!("{line}");
        }
    }

    pub fn print_error(&self, err: &CliError) {
        match self.mode {
            OutputMode::Human => eprintln!("{} {err}", self.tag("error:", Color::Red)),
            OutputMode::Json => eprintln!("{}", err.to_json()),
            OutputMode::Plain => eprintln!("error\t{err}"),
        }
    }

    pub fn print_json(&self, value: &serde_json::Value) {
        if let Ok(s) = serde_json::to_string_pretty(value) {
            println!("{s}");
        }
    }

    fn file_warning_line(&self, file: &Path, message: &dyn Display) -> Option<String> {
        if self.quiet {
            return None;
        }
        let file = file.display();
        Some(match self.mode {
            OutputMode::Human => format!("{} {file}: {message}", self.tag("warning:", Color::Yellow)),
            OutputMode::Json => serde_json::json!({
                "file": file.to_string(),
                "warning": message.to_string(),
            })
            .to_string(),
            OutputMode::Plain => format!("{file}\twarning\t{message}"),
        })
    }

    fn file_progress_line(&self, file: &Path, state: &dyn Display) -> Option<String> {
        if self.quiet || self.mode != OutputMode::Human {
            return None;
        }
        Some(format!("  {} .... {state}", file.display()))
    }

    fn summary_line(&self, text: &str, clean: bool) -> Option<String> {
        if self.quiet || self.mode != OutputMode::Human {
            return None;
        }
        let tag = if clean {
            self.tag("ok", Color::Green)
        } else {
            self.tag("warning:", Color::Yellow)
        };
        Some(format!("{tag} {text}"))
    }

    fn tag(&self, text: &str, color: Color) -> String {
        if self.use_color {
            Style::new().fg(color).bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}
