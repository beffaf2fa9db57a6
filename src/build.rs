//! Rebuild pipeline and the native session the wasm `Engine` wraps.
//!
//! A rebuild runs the stages in a fixed order: resolve parameters, select a
//! gauge (which may overwrite `thickness`), build the part geometry, estimate
//! area, then lay out dimension annotations. A failed rebuild never replaces
//! the previous output.

use thiserror::Error;

use crate::dimension::{
    Camera, DeclutterConfig, DimensionAnnotation, EditableControl, Label, LabelDeclutter,
    build_dimension, editable_control,
};
use crate::gauge::{GaugeOutcome, GaugeSettings, run_gauge};
use crate::geom::{
    AreaEstimate, AreaOptions, GeomMeshDiagnostics, GeomMetrics, GeomTimingReport, TimingBucket,
    estimate_area,
};
use crate::params::{Applied, ParamError, ParamSpec, ParamValue, PartParameters, ResolvedParams, THICKNESS_KEY};
use crate::parts::common::INCLUDE_FLANGE_AREA;
use crate::parts::{PartGeometry, PartKind, PartRegistry};
use crate::trace::{DiagnosticEvent, DiagnosticSink};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("unknown part `{name}`{}", did_you_mean(.suggestion))]
    UnknownPart {
        name: String,
        suggestion: Option<String>,
    },
    #[error("no part loaded")]
    NoPart,
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("malformed configuration: {0}")]
    Malformed(String),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean `{s}`?)"))
        .unwrap_or_default()
}

/// Error surfaced to callers of [`Session::rebuild`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("build failed: {0}")]
pub struct RebuildFailed(#[from] pub BuildError);

/// Everything one successful rebuild produced.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub kind: PartKind,
    /// Effective values after clamping and gauge selection.
    pub params: ResolvedParams,
    pub geometry: PartGeometry,
    pub annotations: Vec<DimensionAnnotation>,
    pub area: AreaEstimate,
    pub gauge: GaugeOutcome,
    pub diagnostics: GeomMeshDiagnostics,
    pub timing: Option<GeomTimingReport>,
}

impl BuildOutput {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.geometry.triangle_count()
    }

    #[must_use]
    pub fn labels(&self) -> Vec<Label> {
        self.annotations.iter().map(|a| a.label.clone()).collect()
    }
}

/// Runs the full pipeline for `kind`. The gauge stage writes the selected
/// thickness back into `params` unclamped.
pub fn build_part(
    kind: PartKind,
    params: &mut PartParameters,
    sink: &mut dyn DiagnosticSink,
) -> Result<BuildOutput, BuildError> {
    let specs = kind.parameters();
    let mut resolved = params.resolve(&specs)?;

    let mut metrics = GeomMetrics::default();
    metrics.begin();

    let active = kind.active_parameters(&resolved);
    let gauge = metrics.time(TimingBucket::Gauge, || run_gauge(&mut params.gauge, &active, &resolved, sink));
    if let Some(thickness) = gauge.thickness_cm() {
        // Catalog thicknesses are taken as-is, outside the manual slider range.
        params.store_gauge_thickness(thickness);
        resolved.override_number(THICKNESS_KEY, thickness);
    }

    let mut geometry = PartGeometry::new();
    metrics.time(TimingBucket::Geometry, || kind.build(&resolved, &mut geometry));

    let mut diagnostics = GeomMeshDiagnostics::new();
    for shell in &geometry.shells {
        shell.mesh.validate().map_err(BuildError::Malformed)?;
        diagnostics.merge(&shell.diagnostics);
    }
    for flange in &geometry.flanges {
        flange.mesh.validate().map_err(BuildError::Malformed)?;
        diagnostics.merge(&flange.diagnostics);
    }

    let options = AreaOptions {
        include_inner: true,
        include_flange: resolved.flag(INCLUDE_FLANGE_AREA),
    };
    let area = metrics.time(TimingBucket::Area, || estimate_area(&geometry.shells, &geometry.flanges, options));
    let annotations = metrics.time(TimingBucket::Dimensions, || {
        geometry.dimensions.iter().map(build_dimension).collect::<Vec<_>>()
    });

    Ok(BuildOutput {
        kind,
        params: resolved,
        geometry,
        annotations,
        area,
        gauge,
        diagnostics,
        timing: metrics.end(),
    })
}

fn record_clamp(key: &str, applied: Applied, sink: &mut dyn DiagnosticSink) {
    if applied.was_clamped() {
        sink.record(DiagnosticEvent::ValueClamped {
            key: key.to_owned(),
            requested: applied.requested,
            applied: applied.applied,
        });
    }
}

/// Stateful editing session: one loaded part, its parameters and the last
/// successful build.
#[derive(Debug, Clone, Default)]
pub struct Session {
    registry: PartRegistry,
    kind: Option<PartKind>,
    params: PartParameters,
    output: Option<BuildOutput>,
    labels: Vec<Label>,
    declutter: LabelDeclutter,
    dirty: bool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::with_declutter(DeclutterConfig::default())
    }

    #[must_use]
    pub fn with_declutter(config: DeclutterConfig) -> Self {
        Self {
            registry: PartRegistry::default(),
            declutter: LabelDeclutter::new(config),
            ..Self::default()
        }
    }

    /// Selects a part by name or alias and resets parameters to its defaults.
    pub fn load_part(&mut self, name: &str) -> Result<PartKind, BuildError> {
        let kind = self.registry.resolve(name).ok_or_else(|| BuildError::UnknownPart {
            name: name.trim().to_owned(),
            suggestion: self.registry.suggest(name),
        })?;
        self.kind = Some(kind);
        self.params = PartParameters::from_specs(&kind.parameters());
        self.output = None;
        self.labels.clear();
        self.declutter.reset();
        self.dirty = true;
        Ok(kind)
    }

    #[must_use]
    pub fn part(&self) -> Option<PartKind> {
        self.kind
    }

    #[must_use]
    pub fn specs(&self) -> Vec<ParamSpec> {
        self.kind.map(|k| k.parameters()).unwrap_or_default()
    }

    #[must_use]
    pub fn parameters(&self) -> &PartParameters {
        &self.params
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces the whole parameter set, e.g. from a stored snapshot.
    /// Validation happens on the next rebuild.
    pub fn replace_parameters(&mut self, params: PartParameters) {
        self.params = params;
        self.dirty = true;
    }

    /// Replaces the gauge settings; the catalog is normalized on the next rebuild.
    pub fn set_gauge(&mut self, gauge: GaugeSettings) {
        self.params.gauge = gauge;
        self.dirty = true;
    }

    /// Writes one parameter; numbers are clamped and snapped.
    pub fn set_parameter(
        &mut self,
        key: &str,
        value: ParamValue,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ParamValue, BuildError> {
        let specs = self.specs();
        if self.kind.is_none() {
            return Err(BuildError::NoPart);
        }
        let stored = match value {
            ParamValue::Number(number) => {
                let applied = self.params.set_number(&specs, key, number)?;
                record_clamp(key.trim(), applied, sink);
                ParamValue::Number(applied.applied)
            }
            other => {
                self.params.set(&specs, key, other.clone())?;
                other
            }
        };
        self.dirty = true;
        Ok(stored)
    }

    /// Rebuilds when something changed. On failure the previous output stays
    /// in place and `BuildFailed` is recorded.
    pub fn rebuild(&mut self, sink: &mut dyn DiagnosticSink) -> Result<&BuildOutput, RebuildFailed> {
        let kind = self.kind.ok_or(RebuildFailed(BuildError::NoPart))?;
        if self.dirty || self.output.is_none() {
            let part = kind.name().to_owned();
            sink.record(DiagnosticEvent::BuildStarted { part: part.clone() });

            let mut params = self.params.clone();
            match build_part(kind, &mut params, sink) {
                Ok(output) => {
                    sink.record(DiagnosticEvent::BuildFinished {
                        part,
                        triangles: output.triangle_count(),
                    });
                    self.params = params;
                    self.labels = output.labels();
                    self.declutter.reset();
                    self.output = Some(output);
                    self.dirty = false;
                }
                Err(err) => {
                    sink.record(DiagnosticEvent::BuildFailed { part, message: err.to_string() });
                    return Err(RebuildFailed(err));
                }
            }
        }
        self.output.as_ref().ok_or(RebuildFailed(BuildError::NoPart))
    }

    /// Builds `kind` with `params` and swaps both in only when the build
    /// succeeds. A failed restore leaves the loaded part, its parameters and
    /// the previous output untouched.
    pub fn restore(
        &mut self,
        kind: PartKind,
        params: PartParameters,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<&BuildOutput, RebuildFailed> {
        let part = kind.name().to_owned();
        sink.record(DiagnosticEvent::BuildStarted { part: part.clone() });

        let mut params = params;
        match build_part(kind, &mut params, sink) {
            Ok(output) => {
                sink.record(DiagnosticEvent::BuildFinished {
                    part,
                    triangles: output.triangle_count(),
                });
                self.kind = Some(kind);
                self.params = params;
                self.labels = output.labels();
                self.declutter.reset();
                self.dirty = false;
                Ok(&*self.output.insert(output))
            }
            Err(err) => {
                sink.record(DiagnosticEvent::BuildFailed { part, message: err.to_string() });
                Err(RebuildFailed(err))
            }
        }
    }

    #[must_use]
    pub fn output(&self) -> Option<&BuildOutput> {
        self.output.as_ref()
    }

    /// Current label positions, as left by the last declutter tick.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// One declutter tick against `camera`. With `build_metrics` the tick time
    /// accumulates into the current output's `declutter_ns`.
    pub fn tick_declutter(&mut self, camera: &Camera) -> &[Label] {
        let mut metrics = GeomMetrics::default();
        metrics.begin();
        metrics.time(TimingBucket::Declutter, || self.declutter.tick(camera, &mut self.labels));
        if let (Some(report), Some(timing)) = (
            metrics.end(),
            self.output.as_mut().and_then(|output| output.timing.as_mut()),
        ) {
            timing.declutter_ns = timing.declutter_ns.saturating_add(report.declutter_ns);
        }
        &self.labels
    }

    #[must_use]
    pub fn is_declutter_active(&self) -> bool {
        self.declutter.is_active()
    }

    /// Inline editor for the label bound to `key`.
    #[must_use]
    pub fn editable_control(&self, key: &str) -> Option<EditableControl> {
        let label = self.labels.iter().find(|l| l.param.as_deref() == Some(key))?;
        editable_control(label, &self.specs(), &self.params)
    }

    /// Commits an inline dimension edit and rebuilds.
    pub fn commit_dimension_edit(
        &mut self,
        key: &str,
        value: f64,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<&BuildOutput, RebuildFailed> {
        self.set_parameter(key, ParamValue::Number(value), sink)?;
        self.rebuild(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::{GaugeCatalog, GaugeEntry};
    use crate::trace::{NullSink, RecordingSink};

    #[test]
    fn pipeline_selects_gauge_before_geometry() {
        let kind = PartRegistry::default().resolve("straight").expect("registered");
        let specs = kind.parameters();
        let mut params = PartParameters::from_specs(&specs);
        params.set_number(&specs, "width", 130.0).expect("width");

        let mut sink = RecordingSink::new();
        let output = build_part(kind, &mut params, &mut sink).expect("build");

        assert_eq!(output.gauge, GaugeOutcome::Selected { critical_edge_mm: 1300.0, thickness_mm: 1.0 });
        let stored = params.number(THICKNESS_KEY).expect("thickness");
        assert!((stored - 0.1).abs() < 1e-12);
        assert!((output.geometry.shells[0].wall_thickness - 0.1).abs() < 1e-12);
        assert_eq!(output.annotations.len(), output.geometry.dimensions.len());
    }

    #[test]
    fn catalog_thickness_is_used_exactly() {
        let kind = PartRegistry::default().resolve("straight").expect("registered");
        let specs = kind.parameters();

        for thickness_mm in [0.55, 3.5] {
            let mut params = PartParameters::from_specs(&specs);
            params.gauge.catalog = GaugeCatalog::new(vec![GaugeEntry::new(thickness_mm, 10_000.0)]);

            let mut sink = RecordingSink::new();
            let output = build_part(kind, &mut params, &mut sink).expect("build");

            assert_eq!(output.gauge, GaugeOutcome::Selected { critical_edge_mm: 300.0, thickness_mm });
            let wall = output.geometry.shells[0].wall_thickness;
            assert!((wall - thickness_mm / 10.0).abs() < 1e-12, "{thickness_mm} mm gave wall {wall}");
            let stored = params.number(THICKNESS_KEY).expect("thickness");
            assert!((stored - thickness_mm / 10.0).abs() < 1e-12);
            assert!(
                !sink.events.iter().any(|e| matches!(e, DiagnosticEvent::ValueClamped { .. })),
                "{:?}",
                sink.events
            );
        }
    }

    #[test]
    fn disabled_gauge_keeps_manual_thickness() {
        let kind = PartRegistry::default().resolve("straight").expect("registered");
        let specs = kind.parameters();
        let mut params = PartParameters::from_specs(&specs);
        params.gauge.enabled = false;
        params.set_number(&specs, THICKNESS_KEY, 0.25).expect("thickness");

        let output = build_part(kind, &mut params, &mut NullSink).expect("build");
        assert_eq!(output.gauge, GaugeOutcome::Disabled);
        assert!((output.geometry.shells[0].wall_thickness - 0.25).abs() < 1e-12);
    }

    #[test]
    fn session_reports_clamped_writes() {
        let mut session = Session::new();
        session.load_part("straight").expect("part");
        let mut sink = RecordingSink::new();

        let stored = session.set_parameter("length", ParamValue::Number(10_000.0), &mut sink).expect("set");
        assert_eq!(stored, ParamValue::Number(600.0));
        assert_eq!(
            sink.events,
            vec![DiagnosticEvent::ValueClamped { key: "length".into(), requested: 10_000.0, applied: 600.0 }]
        );
    }

    #[test]
    fn unknown_part_suggests_a_name() {
        let mut session = Session::new();
        let err = session.load_part("tapr").expect_err("unknown");
        assert_eq!(err.to_string(), "unknown part `tapr` (did you mean `taper`?)");
    }

    #[test]
    fn rebuild_without_part_fails() {
        let mut session = Session::new();
        let err = session.rebuild(&mut NullSink).expect_err("no part");
        assert_eq!(err.to_string(), "build failed: no part loaded");
    }

    #[test]
    fn clean_session_skips_rebuild() {
        let mut session = Session::new();
        session.load_part("coupling").expect("part");
        let mut sink = RecordingSink::new();
        session.rebuild(&mut sink).expect("first");
        assert!(!session.is_dirty());

        sink.clear();
        session.rebuild(&mut sink).expect("second");
        assert!(sink.events.is_empty());
    }

    fn side_camera() -> Camera {
        use crate::geom::{Point3, Vec3};

        Camera {
            position: Point3::new(150.0, -200.0, 60.0),
            target: Point3::new(0.0, 0.0, 60.0),
            up: Vec3::Z,
            fov_y: 50f64.to_radians(),
            viewport_width: 1024.0,
            viewport_height: 768.0,
        }
    }

    #[cfg(all(feature = "build_metrics", not(target_arch = "wasm32")))]
    #[test]
    fn declutter_ticks_accumulate_into_build_timing() {
        let mut session = Session::new();
        session.load_part("straight").expect("part");
        session.rebuild(&mut NullSink).expect("build");
        let camera = side_camera();

        let timing = |s: &Session| s.output().and_then(|o| o.timing.clone()).expect("timing");
        assert_eq!(timing(&session).declutter_ns, 0);
        for _ in 0..8 {
            session.tick_declutter(&camera);
        }
        let after = timing(&session);
        assert!(after.declutter_ns > 0);
        assert!(after.total_ns() >= after.declutter_ns);
    }

    #[cfg(not(all(feature = "build_metrics", not(target_arch = "wasm32"))))]
    #[test]
    fn declutter_ticks_leave_timing_off_without_metrics() {
        let mut session = Session::new();
        session.load_part("coupling").expect("part");
        session.rebuild(&mut NullSink).expect("build");
        session.tick_declutter(&side_camera());
        assert!(session.output().is_some_and(|o| o.timing.is_none()));
    }

    #[test]
    fn editable_control_follows_bound_label() {
        let mut session = Session::new();
        session.load_part("straight").expect("part");
        session.rebuild(&mut NullSink).expect("build");

        let control = session.editable_control("length").expect("length label");
        assert_eq!((control.min, control.max, control.value), (1.0, 600.0, 120.0));

        let output = session.commit_dimension_edit("length", 80.4, &mut NullSink).expect("edit");
        assert!((output.area.outer_m2() - 2.0 * 55.0 * 80.0 / 10_000.0).abs() < 1e-9);
        assert!(session.labels().iter().any(|l| l.text == "80 cm"));
    }
}
