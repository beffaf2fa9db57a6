use duct_engine::Engine;
use duct_engine::build::Session;
use duct_engine::dimension::Camera;
use duct_engine::export::{PartSnapshot, restore_parameters};
use duct_engine::gauge::GaugeOutcome;
use duct_engine::geom::{Point3, Vec3};
use duct_engine::params::{ParamValue, PartParameters, THICKNESS_KEY};
use duct_engine::parts::PartKind;
use duct_engine::trace::{DiagnosticEvent, NullSink, RecordingSink};

fn built(name: &str, sets: &[(&str, ParamValue)]) -> Session {
    let mut session = Session::new();
    session.load_part(name).expect("load part");
    for (key, value) in sets {
        session.set_parameter(key, value.clone(), &mut NullSink).expect("set parameter");
    }
    session.rebuild(&mut NullSink).expect("rebuild");
    session
}

fn camera() -> Camera {
    Camera {
        position: Point3::new(150.0, -200.0, 60.0),
        target: Point3::new(0.0, 0.0, 60.0),
        up: Vec3::Z,
        fov_y: 50f64.to_radians(),
        viewport_width: 1024.0,
        viewport_height: 768.0,
    }
}

#[test]
fn engine_initializes() {
    let engine = Engine::new();
    assert!(engine.is_initialized());
}

#[test]
fn engine_rejects_unknown_part() {
    let mut engine = Engine::new();
    assert!(engine.load_part("onbekend").is_err());
    assert!(engine.rebuild().is_err());
    assert!(engine.load_part("  Recht ").is_ok());
}

#[test]
fn engine_clamps_parameter_writes() {
    let mut engine = Engine::new();
    engine.load_part("straight").expect("load part");
    let applied = engine.set_parameter("length", 10_000.0).expect("known key");
    assert_eq!(applied, 600.0);
    assert!(engine.set_parameter("lenght", 10.0).is_err());
    assert!(engine.set_parameter("length", f64::NAN).is_err());
}

#[test]
fn engine_snapshot_round_trip_reproduces_area() {
    let mut engine = Engine::new();
    engine.load_part("elbow").expect("load part");
    engine.set_parameter("angle", 60.0).expect("angle");
    engine.rebuild().expect("rebuild");
    let json = engine.export_snapshot().expect("snapshot");
    let original = PartSnapshot::from_json(&json).expect("parse snapshot");

    let mut restored = Engine::new();
    restored.restore_snapshot(&json).expect("restore");
    let again = PartSnapshot::from_json(&restored.export_snapshot().expect("snapshot")).expect("parse");

    assert_eq!(again.part, "elbow");
    assert!((again.outer_area_m2 - original.outer_area_m2).abs() < 1e-9);
}

#[test]
fn default_straight_duct_has_expected_area() {
    let session = built("straight", &[]);
    let output = session.output().expect("output");
    // Perimeter 2 * (25 + 30) = 110 cm over 120 cm.
    assert!((output.area.outer_m2() - 1.32).abs() < 1e-9);
    let inner = output.area.inner_m2().expect("inner area");
    assert!(inner < output.area.outer_m2());
}

#[test]
fn every_part_round_trips_through_its_declared_dimensions() {
    for kind in PartKind::ALL {
        let session = built(kind.name(), &[]);
        let output = session.output().expect("output");
        let snapshot = PartSnapshot::capture(output, session.parameters());

        let (restored, mut params) = restore_parameters(&snapshot).expect("restore");
        assert_eq!(restored, kind);
        let rebuilt = duct_engine::build::build_part(restored, &mut params, &mut NullSink).expect("rebuild");
        assert!(
            (rebuilt.area.outer_m2() - snapshot.outer_area_m2).abs() < 1e-9,
            "{kind}: {} vs {}",
            rebuilt.area.outer_m2(),
            snapshot.outer_area_m2
        );
    }
}

#[test]
fn failed_rebuild_keeps_previous_output() {
    let mut session = built("straight", &[]);
    let before = session.output().expect("output").area;

    let mut params: PartParameters = session.parameters().clone();
    params.values.insert("lenght".into(), ParamValue::Number(80.0));
    session.replace_parameters(params);

    let mut sink = RecordingSink::new();
    let err = session.rebuild(&mut sink).expect_err("bogus key");
    assert_eq!(
        err.to_string(),
        "build failed: unknown parameter `lenght` (did you mean `length`?)"
    );
    assert!(sink.events.iter().any(DiagnosticEvent::is_failure));
    assert_eq!(session.output().expect("previous output").area, before);
}

#[test]
fn failed_restore_keeps_loaded_part_and_output() {
    let mut session = built("straight", &[]);
    let before = session.output().expect("output").area;
    let params_before = session.parameters().clone();

    let kind = PartKind::ALL.into_iter().find(|k| k.name() == "elbow").expect("elbow");
    let mut params = PartParameters::from_specs(&kind.parameters());
    params.values.insert("angel".into(), ParamValue::Number(60.0));

    let mut sink = RecordingSink::new();
    let err = session.restore(kind, params, &mut sink).expect_err("bogus key");
    assert!(err.to_string().starts_with("build failed: unknown parameter `angel`"), "{err}");
    assert!(sink.events.iter().any(DiagnosticEvent::is_failure));

    assert_eq!(session.part().map(|k| k.name()), Some("straight"));
    assert_eq!(session.parameters(), &params_before);
    assert_eq!(session.output().expect("previous output").area, before);
    assert!(!session.is_dirty());
}

#[test]
fn engine_keeps_geometry_when_snapshot_restore_fails() {
    let mut engine = Engine::new();
    engine.load_part("straight").expect("load part");
    engine.rebuild().expect("rebuild");
    let before = engine.export_snapshot().expect("snapshot");

    let mut snapshot = PartSnapshot::from_json(&before).expect("parse");
    snapshot.part = "elbow".into();
    let broken = snapshot.to_json().expect("serialize");
    assert!(engine.restore_snapshot(&broken).is_err());

    let after = engine.export_snapshot().expect("previous geometry survives");
    assert_eq!(after, before);
}

#[test]
fn wide_duct_selects_heavier_gauge() {
    let session = built("straight", &[("width", ParamValue::Number(130.0))]);
    let output = session.output().expect("output");
    assert_eq!(
        output.gauge,
        GaugeOutcome::Selected { critical_edge_mm: 1300.0, thickness_mm: 1.0 }
    );
    let thickness = session.parameters().number(THICKNESS_KEY).expect("thickness");
    assert!((thickness - 0.1).abs() < 1e-12);
}

#[test]
fn round_duct_ignores_rectangular_sizes_for_gauge() {
    let session = built(
        "straight",
        &[
            ("round", ParamValue::Bool(true)),
            ("width", ParamValue::Number(200.0)),
            ("diameter", ParamValue::Number(40.0)),
        ],
    );
    let output = session.output().expect("output");
    assert_eq!(
        output.gauge,
        GaugeOutcome::Selected { critical_edge_mm: 400.0, thickness_mm: 0.6 }
    );
}

#[test]
fn branch_outlets_share_the_inlet_plane() {
    let session = built(
        "branch",
        &[
            ("branch_count", ParamValue::Number(3.0)),
            ("mirrored", ParamValue::Bool(false)),
        ],
    );
    let output = session.output().expect("output");
    let shells = &output.geometry.shells;

    // One combined inlet flange plus one flange per outlet.
    assert_eq!(output.geometry.flanges.len(), 4);
    let inlet_starts: Vec<_> = shells
        .iter()
        .filter_map(|s| s.start_frame())
        .filter(|f| f.position.z.abs() < 1e-9)
        .collect();
    assert_eq!(inlet_starts.len(), 3);
    for frame in &inlet_starts {
        assert!((frame.tangent.z - 1.0).abs() < 1e-9);
    }
    assert!(output.area.outer_m2() > 0.0);
}

#[test]
fn declutter_moves_labels_but_not_anchors() {
    let mut session = built("straight", &[]);
    let anchors: Vec<Point3> = session.labels().iter().map(|l| l.anchor).collect();
    assert!(!anchors.is_empty());

    let camera = camera();
    session.tick_declutter(&camera);
    assert!(session.is_declutter_active());
    for _ in 0..10 {
        session.tick_declutter(&camera);
    }
    assert!(!session.is_declutter_active());

    let labels = session.labels();
    for (label, anchor) in labels.iter().zip(&anchors) {
        assert_eq!(label.anchor, *anchor);
    }
}

#[test]
fn dimension_edit_rebuilds_with_clamped_value() {
    let mut session = built("taper", &[]);
    let control = session.editable_control("length").expect("length label");
    let over = control.max + 100.0;

    let output = session
        .commit_dimension_edit("length", over, &mut NullSink)
        .expect("edit");
    let end = output.geometry.shells[0].end_frame().expect("frames");
    assert!((end.position.z - control.max).abs() < 1e-9);
    assert_eq!(session.parameters().number("length"), Some(control.max));
}
