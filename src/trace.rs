//! Injectable diagnostics for the rebuild pipeline.
//!
//! Geometry code never logs on its own. Anything worth reporting is handed to
//! a [`DiagnosticSink`]; callers pick whether that ends up in the `log` facade,
//! in a buffer a test can inspect, or nowhere.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// A parameter write was clamped or snapped.
    ValueClamped {
        key: String,
        requested: f64,
        applied: f64,
    },
    GaugeSelected {
        critical_edge_mm: f64,
        thickness_mm: f64,
    },
    /// Gauge selection is enabled but no catalog entry is.
    GaugeUnset,
    /// Normalization changed `adjusted` catalog bounds.
    GaugeNormalized { adjusted: usize },
    BuildStarted { part: String },
    BuildFinished { part: String, triangles: usize },
    BuildFailed { part: String, message: String },
}

impl DiagnosticEvent {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::BuildFailed { .. })
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueClamped { key, requested, applied } => {
                write!(f, "{key}: {requested} clamped to {applied}")
            }
            Self::GaugeSelected { critical_edge_mm, thickness_mm } => {
                write!(f, "gauge {thickness_mm} mm for critical edge {critical_edge_mm} mm")
            }
            Self::GaugeUnset => write!(f, "no gauge enabled, keeping manual thickness"),
            Self::GaugeNormalized { adjusted } => write!(f, "gauge catalog normalized ({adjusted} bounds adjusted)"),
            Self::BuildStarted { part } => write!(f, "building {part}"),
            Self::BuildFinished { part, triangles } => write!(f, "built {part}: {triangles} triangles"),
            Self::BuildFailed { part, message } => write!(f, "build failed for {part}: {message}"),
        }
    }
}

pub trait DiagnosticSink {
    fn record(&mut self, event: DiagnosticEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _event: DiagnosticEvent) {}
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::BuildFailed { .. } | DiagnosticEvent::GaugeUnset => log::warn!("{event}"),
            _ => log::debug!("{event}"),
        }
    }
}

/// Keeps every event in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<DiagnosticEvent>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&DiagnosticEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&mut self, event: DiagnosticEvent) {
        self.events.push(event);
    }
}
