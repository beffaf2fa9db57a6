//! Sheet gauge selection.
//!
//! A catalog maps sheet thicknesses to the longest critical edge they may be
//! used for. Normalization must run before selection; afterwards the bounds of
//! enabled entries increase strictly in ascending-thickness order, which makes
//! selection monotonic in the critical edge.

use serde::{Deserialize, Serialize};

use crate::params::{ParamRole, ParamSpec, ResolvedParams};
use crate::trace::{DiagnosticEvent, DiagnosticSink};

pub const MIN_EDGE_BOUND_MM: f64 = 1.0;
pub const MAX_EDGE_BOUND_MM: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeEntry {
    pub thickness_mm: f64,
    pub enabled: bool,
    /// Longest critical edge (mm) this gauge is used for.
    pub max_edge_mm: f64,
}

impl GaugeEntry {
    #[must_use]
    pub const fn new(thickness_mm: f64, max_edge_mm: f64) -> Self {
        Self { thickness_mm, enabled: true, max_edge_mm }
    }

    #[must_use]
    pub const fn disabled(self) -> Self {
        Self { enabled: false, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeCatalog {
    pub entries: Vec<GaugeEntry>,
}

impl Default for GaugeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl GaugeCatalog {
    #[must_use]
    pub fn new(entries: Vec<GaugeEntry>) -> Self {
        Self { entries }
    }

    /// Galvanised sheet gauges commonly stocked for rectangular ductwork.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            GaugeEntry::new(0.6, 600.0),
            GaugeEntry::new(0.8, 1249.0),
            GaugeEntry::new(1.0, 2490.0),
            GaugeEntry::new(1.2, 5000.0),
        ])
    }

    #[must_use]
    pub fn enabled(&self) -> impl Iterator<Item = &GaugeEntry> {
        self.entries.iter().filter(|e| e.enabled)
    }

    /// Sorts by thickness and repairs the bounds of enabled entries.
    ///
    /// Each enabled bound is clamped into `[1, 10000]` and then raised to at
    /// least the previous enabled bound plus one. Disabled entries are left
    /// untouched. Returns the number of bounds that changed.
    pub fn normalize(&mut self) -> usize {
        self.entries.sort_by(|a, b| a.thickness_mm.total_cmp(&b.thickness_mm));

        let mut previous: Option<f64> = None;
        let mut adjusted = 0;
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            let mut bound = if entry.max_edge_mm.is_nan() {
                MIN_EDGE_BOUND_MM
            } else {
                entry.max_edge_mm.clamp(MIN_EDGE_BOUND_MM, MAX_EDGE_BOUND_MM)
            };
            if let Some(prev) = previous {
                bound = bound.max(prev + 1.0);
            }
            if bound.to_bits() != entry.max_edge_mm.to_bits() {
                entry.max_edge_mm = bound;
                adjusted += 1;
            }
            previous = Some(bound);
        }
        adjusted
    }

    #[must_use]
    pub fn is_normalized(&self) -> bool {
        let mut copy = self.clone();
        copy.normalize() == 0 && copy.entries == self.entries
    }

    /// Smallest enabled gauge whose bound covers `critical_edge_mm`, else the
    /// largest enabled gauge. `None` when nothing is enabled.
    #[must_use]
    pub fn select(&self, critical_edge_mm: f64) -> Option<&GaugeEntry> {
        self.enabled()
            .find(|e| e.max_edge_mm >= critical_edge_mm)
            .or_else(|| self.enabled().last())
    }
}

/// Gauge state persisted with the part parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeSettings {
    pub enabled: bool,
    pub catalog: GaugeCatalog,
}

impl Default for GaugeSettings {
    fn default() -> Self {
        Self { enabled: true, catalog: GaugeCatalog::standard() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeOutcome {
    /// Selection switched off; the manual thickness stands.
    Disabled,
    /// Selection on but no entry enabled; the manual thickness stands.
    Unset,
    Selected { critical_edge_mm: f64, thickness_mm: f64 },
}

impl GaugeOutcome {
    /// Selected wall thickness in centimetres.
    #[must_use]
    pub fn thickness_cm(&self) -> Option<f64> {
        match self {
            Self::Selected { thickness_mm, .. } => Some(thickness_mm / 10.0),
            Self::Disabled | Self::Unset => None,
        }
    }
}

/// Largest section dimension in millimetres.
///
/// Thickness and length-like parameters are skipped, as is anything without a
/// length unit.
#[must_use]
pub fn critical_edge_mm(specs: &[ParamSpec], params: &ResolvedParams) -> f64 {
    specs
        .iter()
        .filter(|spec| spec.classify() == ParamRole::Section)
        .filter_map(|spec| spec.unit.to_mm().map(|factor| params.number(&spec.key) * factor))
        .fold(0.0, f64::max)
}

/// Normalizes the catalog and selects a gauge for the current parameters.
pub fn run_gauge(
    settings: &mut GaugeSettings,
    specs: &[ParamSpec],
    params: &ResolvedParams,
    sink: &mut dyn DiagnosticSink,
) -> GaugeOutcome {
    if !settings.enabled {
        return GaugeOutcome::Disabled;
    }

    let adjusted = settings.catalog.normalize();
    if adjusted > 0 {
        sink.record(DiagnosticEvent::GaugeNormalized { adjusted });
    }

    let critical_edge_mm = critical_edge_mm(specs, params);
    match settings.catalog.select(critical_edge_mm) {
        Some(entry) => {
            sink.record(DiagnosticEvent::GaugeSelected {
                critical_edge_mm,
                thickness_mm: entry.thickness_mm,
            });
            GaugeOutcome::Selected { critical_edge_mm, thickness_mm: entry.thickness_mm }
        }
        None => {
            sink.record(DiagnosticEvent::GaugeUnset);
            GaugeOutcome::Unset
        }
    }
}
