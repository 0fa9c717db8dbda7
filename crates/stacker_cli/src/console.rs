//! User-facing progress reporting.
//!
//! A [`Console`] is owned by the running command and handed down by
//! reference. Opening a [`Section`] indents every message reported until the
//! section guard is dropped, so nesting follows the call structure.

use std::sync::atomic::{AtomicUsize, Ordering};

use owo_colors::OwoColorize;

/// Marker symbols printed in front of messages.
pub mod symbols {
    /// A section is opening.
    pub const BEGIN: &str = "▸";
    /// Something succeeded.
    pub const SUCCESS: &str = "✓";
    /// Plain information.
    pub const INFO: &str = "•";
    /// A recoverable problem.
    pub const WARNING: &str = "⚠";
    /// A fatal problem.
    pub const ERROR: &str = "✗";
}

const INDENT: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    Begin,
    Success,
    Info,
    Warning,
    Error,
}

impl Tone {
    fn symbol(self) -> &'static str {
        match self {
            Tone::Begin => symbols::BEGIN,
            Tone::Success => symbols::SUCCESS,
            Tone::Info => symbols::INFO,
            Tone::Warning => symbols::WARNING,
            Tone::Error => symbols::ERROR,
        }
    }
}

/// Progress reporter for one command run.
#[derive(Debug)]
pub struct Console {
    color: bool,
    quiet: bool,
    depth: AtomicUsize,
}

impl Console {
    /// Creates a reporter. A quiet console only prints errors.
    pub fn new(color: bool, quiet: bool) -> Self {
        Self {
            color,
            quiet,
            depth: AtomicUsize::new(0),
        }
    }

    /// Prints `title` and indents everything reported until the returned
    /// guard is dropped.
    pub fn section(&self, title: &str) -> Section<'_> {
        self.emit(Tone::Begin, title);
        self.depth.fetch_add(1, Ordering::SeqCst);
        Section { console: self }
    }

    /// Reports plain progress.
    pub fn info(&self, message: &str) {
        self.emit(Tone::Info, message);
    }

    /// Reports a success.
    pub fn success(&self, message: &str) {
        self.emit(Tone::Success, message);
    }

    /// Reports a recoverable problem.
    pub fn warn(&self, message: &str) {
        self.emit(Tone::Warning, message);
    }

    /// Reports a fatal problem. Printed even when quiet.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.render(Tone::Error, message));
    }

    /// Prints raw tool output, such as compiler diagnostics, as is.
    pub fn diagnostics(&self, text: &str) {
        let text = text.trim_end();
        if !text.is_empty() {
            eprintln!("{text}");
        }
    }

    /// Current indentation level.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    fn emit(&self, tone: Tone, message: &str) {
        if self.quiet {
            return;
        }
        let line = self.render(tone, message);
        match tone {
            Tone::Warning => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    fn render(&self, tone: Tone, message: &str) -> String {
        let indent = INDENT.repeat(self.depth());
        let symbol = tone.symbol();
        if !self.color {
            return format!("{indent}{symbol} {message}");
        }
        match tone {
            Tone::Begin => format!("{indent}{} {}", symbol.cyan(), message.bold()),
            Tone::Success => format!("{indent}{} {message}", symbol.green()),
            Tone::Info => format!("{indent}{} {message}", symbol.blue()),
            Tone::Warning => format!("{indent}{} {}", symbol.yellow(), message.yellow()),
            Tone::Error => format!("{indent}{} {}", symbol.red(), message.red()),
        }
    }
}

/// Indentation guard returned by [`Console::section`].
#[must_use = "the section closes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct Section<'a> {
    console: &'a Console,
}

impl Section<'_> {
    /// Closes the section and reports `message` at the outer level.
    pub fn finish(self, message: &str) {
        let console = self.console;
        drop(self);
        console.success(message);
    }
}

impl Drop for Section<'_> {
    fn drop(&mut self) {
        self.console.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
