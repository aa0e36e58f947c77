//! Output sinks for diagnostics.

use std::cell::RefCell;

/// Console-like sink diagnostics are written to.
///
/// Only `log` is required. Sinks that can group related lines return
/// `true` from `supports_groups` and receive `group`/`group_end` around
/// each diagnostic.
pub trait Console {
    fn log(&self, line: &str);

    fn error(&self, line: &str) {
        self.log(line);
    }

    fn supports_groups(&self) -> bool {
        false
    }

    fn group(&self, _label: &str) {}

    fn group_end(&self) {}
}

/// Default sink: forwards every line to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingConsole;

impl Console for TracingConsole {
    fn log(&self, line: &str) {
        tracing::debug!(target: "switchyard", "{}", line);
    }

    fn error(&self, line: &str) {
        tracing::error!(target: "switchyard", "{}", line);
    }
}

/// A line recorded by [`MemoryConsole`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsoleLine {
    Log(String),
    Error(String),
    Group(String),
    GroupEnd,
}

/// Sink that keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: RefCell<Vec<ConsoleLine>>,
    grouped: bool,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// A console that also records group boundaries.
    pub fn grouped() -> Self {
        Self {
            lines: RefCell::default(),
            grouped: true,
        }
    }

    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.borrow().clone()
    }

    /// Text of every `error` line.
    pub fn errors(&self) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter_map(|line| match line {
                ConsoleLine::Error(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether any recorded text contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| match line {
            ConsoleLine::Log(text) | ConsoleLine::Error(text) | ConsoleLine::Group(text) => {
                text.contains(needle)
            }
            ConsoleLine::GroupEnd => false,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Console for MemoryConsole {
    fn log(&self, line: &str) {
        self.lines.borrow_mut().push(ConsoleLine::Log(line.to_string()));
    }

    fn error(&self, line: &str) {
        self.lines
            .borrow_mut()
            .push(ConsoleLine::Error(line.to_string()));
    }

    fn supports_groups(&self) -> bool {
        self.grouped
    }

    fn group(&self, label: &str) {
        self.lines
            .borrow_mut()
            .push(ConsoleLine::Group(label.to_string()));
    }

    fn group_end(&self) {
        self.lines.borrow_mut().push(ConsoleLine::GroupEnd);
    }
}
