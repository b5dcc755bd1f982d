//! Diagnostic sinks threaded through the scene graph.
//!
//! Every component that reports diagnostics receives a [`SharedLogger`] at
//! construction instead of reaching for a global. Wrappers compose: a
//! [`ContextualLogger`] prefixes messages with the owning component's name
//! and forwards them to any other sink.
//!
//! In the browser the [`ConsoleLogger`] forwards to the `log` facade, which
//! [`init_console`] binds to the devtools console.

#[cfg(test)]
#[path = "logger_test.rs"]
mod logger_test;

use std::cell::RefCell;
use std::rc::Rc;

pub use log::Level;

/// Shared handle to a diagnostic sink.
pub type SharedLogger = Rc<dyn Logger>;

/// A diagnostic sink with four severities.
pub trait Logger {
    /// Emit `message` at `level`.
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Forwards to the `log` facade under the `tabletop` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: "tabletop", level, "{message}");
    }
}

/// Prefixes every message with `"<context>: "`.
pub struct ContextualLogger {
    context: String,
    inner: SharedLogger,
}

impl ContextualLogger {
    #[must_use]
    pub fn new(context: impl Into<String>, inner: SharedLogger) -> Self {
        Self { context: context.into(), inner }
    }

    /// The prefix applied to forwarded messages.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

impl Logger for ContextualLogger {
    fn log(&self, level: Level, message: &str) {
        self.inner.log(level, &format!("{}: {message}", self.context));
    }
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str) {}
}

/// A single message captured by [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
}

/// Keeps an owned snapshot of every message in memory.
///
/// Messages are copied at call time, so the record reflects the values as
/// they were when logged. Hosts use it to back a diagnostics panel; tests use
/// it to assert on reported events.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: RefCell<Vec<Record>>,
}

impl RecordingLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    /// Whether any record at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .borrow()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    /// Number of records at `level`.
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.records.borrow().iter().filter(|r| r.level == level).count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str) {
        self.records.borrow_mut().push(Record { level, message: message.to_owned() });
    }
}

/// Wrap `logger` so its messages carry `context`.
#[must_use]
pub fn with_context(logger: &SharedLogger, context: &str) -> SharedLogger {
    Rc::new(ContextualLogger::new(context, Rc::clone(logger)))
}

/// Console logger prefixed with `context`. Intended for application roots.
#[must_use]
pub fn default_logger(context: &str) -> SharedLogger {
    Rc::new(ContextualLogger::new(context, Rc::new(ConsoleLogger)))
}

/// Bind the `log` facade to the browser console.
///
/// # Errors
///
/// Returns an error if a logger has already been installed.
#[cfg(feature = "browser")]
pub fn init_console(level: Level) -> Result<(), log::SetLoggerError> {
    console_log::init_with_level(level)
}
