//! Diagnostic output.
//!
//! The engine never fails a dispatch for soft problems (unknown events,
//! denied guards, effect misuse). It describes them as a [`Diagnostic`]
//! and writes them to an injectable [`Console`], filtered by
//! [`Verbosity`]. Each diagnostic is a label followed by `Label: value`
//! lines, grouped when the console supports it.

mod console;
mod diagnostic;

pub use console::{Console, ConsoleLine, MemoryConsole, TracingConsole};
pub use diagnostic::Diagnostic;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Severity of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Debug,
    Error,
}

/// How much gets logged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    /// Nothing.
    Silent,
    /// Error diagnostics only.
    #[default]
    Errors,
    /// Everything.
    All,
}

impl Verbosity {
    pub fn allows(self, level: Level) -> bool {
        match self {
            Verbosity::Silent => false,
            Verbosity::Errors => level == Level::Error,
            Verbosity::All => true,
        }
    }
}

impl From<bool> for Verbosity {
    fn from(verbose: bool) -> Self {
        if verbose {
            Verbosity::All
        } else {
            Verbosity::Silent
        }
    }
}

impl From<u8> for Verbosity {
    fn from(level: u8) -> Self {
        match level {
            0 => Verbosity::Silent,
            1 => Verbosity::Errors,
            _ => Verbosity::All,
        }
    }
}

/// Writes diagnostics to a console at a given verbosity.
#[derive(Clone)]
pub struct Reporter {
    console: Rc<dyn Console>,
    verbosity: Verbosity,
}

impl Reporter {
    pub fn new(console: Rc<dyn Console>, verbosity: Verbosity) -> Self {
        Self { console, verbosity }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.verbosity.allows(level)
    }

    /// Report `diagnostic` with the `(label, value)` pairs produced by
    /// `messages`. The pairs are only built when the diagnostic passes the
    /// verbosity filter; a diagnostic without pairs is dropped.
    pub fn report<F>(&self, diagnostic: &Diagnostic, messages: F)
    where
        F: FnOnce() -> Vec<(&'static str, String)>,
    {
        let level = diagnostic.level();
        if !self.enabled(level) {
            return;
        }

        let messages = messages();
        if messages.is_empty() {
            return;
        }

        let console = self.console.as_ref();
        let write = |line: &str| match level {
            Level::Debug => console.log(line),
            Level::Error => console.error(line),
        };

        let label = diagnostic.to_string();
        let grouped = console.supports_groups();
        if grouped {
            console.group(&label);
        } else {
            write(&label);
        }

        for (name, value) in &messages {
            write(&render_pair(name, value));
        }

        if grouped {
            console.group_end();
        }
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

/// Multi-line values start on their own line so their columns stay aligned.
fn render_pair(label: &str, value: &str) -> String {
    if value.contains('\n') {
        format!("{label}:\n{value}")
    } else {
        format!("{label}: {value}")
    }
}
