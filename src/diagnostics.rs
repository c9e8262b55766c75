//! Per-table diagnostics sink.
//!
//! A [`Table`](crate::Table) reports what it does (materialization, sniffed
//! dialect, tolerated rows, failures) to the sink it was built with instead
//! of a process-wide logger. The default sink forwards to `tracing`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// File the event concerns, if the table was bound.
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, path: Option<&Path>, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.map(Path::to_path_buf),
            message: message.into(),
        }
    }
}

pub trait Diagnostics: Send + Sync {
    fn report(&self, event: Diagnostic);
}

/// Forwards every event to the matching `tracing` macro.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, event: Diagnostic) {
        let path = event
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match event.severity {
            Severity::Debug => debug!(path = %path, "{}", event.message),
            Severity::Warning => warn!(path = %path, "{}", event.message),
            Severity::Error => error!(path = %path, "{}", event.message),
        }
    }
}

/// Keeps every event in memory; handy for asserting on what a table reported.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events at or above `severity`.
    pub fn at_least(&self, severity: Severity) -> Vec<Diagnostic> {
        self.events()
            .into_iter()
            .filter(|e| e.severity >= severity)
            .collect()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn report(&self, event: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_filters_by_severity() {
        let sink = CollectingDiagnostics::new();
        sink.report(Diagnostic::new(Severity::Debug, None, "loaded"));
        sink.report(Diagnostic::new(
            Severity::Warning,
            Some(Path::new("tasks.csv")),
            "short row",
        ));
        sink.report(Diagnostic::new(Severity::Error, None, "bad header"));

        assert_eq!(sink.events().len(), 3);
        let loud = sink.at_least(Severity::Warning);
        assert_eq!(loud.len(), 2);
        assert_eq!(loud[0].path.as_deref(), Some(Path::new("tasks.csv")));
        assert_eq!(loud[1].message, "bad header");
    }
}
