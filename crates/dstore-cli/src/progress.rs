//! Live status line for long-running transfers
//!
//! A single spinner line on stderr that the import and export loops rewrite
//! after every iteration. When stderr is not a terminal the line is hidden,
//! but its message is still tracked.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Glyph shown in front of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Tada,
}

impl Symbol {
    pub fn glyph(self) -> &'static str {
        match self {
            Symbol::Tada => "🎉",
        }
    }
}

/// Mutable one-line status display
pub struct StatusLine {
    bar: ProgressBar,
    ticking: bool,
}

impl StatusLine {
    /// Status line on stderr, hidden when stderr is not a terminal
    pub fn new() -> Self {
        if !std::io::stderr().is_terminal() {
            return Self::hidden();
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {prefix}{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self {
            bar,
            ticking: false,
        }
    }

    /// Status line that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            ticking: false,
        }
    }

    /// Begin showing `message`
    pub fn start(&mut self, message: impl Into<String>) {
        self.update(message, None);
        if !self.ticking {
            self.bar.enable_steady_tick(Duration::from_millis(100));
            self.ticking = true;
        }
    }

    /// Replace the current message in place
    pub fn update(&self, message: impl Into<String>, symbol: Option<Symbol>) {
        let prefix = symbol
            .map(|s| format!("{} ", s.glyph()))
            .unwrap_or_default();
        self.bar.set_prefix(prefix);
        self.bar.set_message(message.into());
    }

    /// Finalize the line, leaving `message` visible
    pub fn stop(&mut self, message: impl Into<String>, symbol: Option<Symbol>) {
        self.update(message, symbol);
        self.bar.finish();
        self.ticking = false;
    }

    /// The message currently displayed
    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn is_stopped(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        // Leave whatever was last shown if a pipeline bailed out early.
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
