use crate::geom::{
    MAX_STEPS, Point3, SectionSize, SweepPath, Tolerance, Vec2, Vec3, compute_frames,
};

fn arc(inner_radius: f64, angle_deg: f64, start: SectionSize, end: SectionSize) -> SweepPath {
    SweepPath::Arc { inner_radius, angle: angle_deg.to_radians(), start, end }
}

fn assert_point(actual: Point3, expected: Point3) {
    assert!(
        Tolerance::new(1e-9).approx_eq_point3(actual, expected),
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn straight_yields_steps_plus_one_frames() {
    let path = SweepPath::Straight { length: 120.0, size: SectionSize::rect(25.0, 30.0) };
    let frames = compute_frames(&path, 6);

    assert_eq!(frames.len(), 7);
    assert_point(frames[3].position, Point3::new(0.0, 0.0, 60.0));
    assert_point(frames[6].position, Point3::new(0.0, 0.0, 120.0));
    for frame in &frames {
        assert!(frame.is_orthonormal(1e-12));
        assert_eq!(frame.size, SectionSize::rect(25.0, 30.0));
    }
}

#[test]
fn taper_interpolates_size_and_offset() {
    let path = SweepPath::Taper {
        length: 50.0,
        start: SectionSize::rect(40.0, 20.0),
        end: SectionSize::rect(20.0, 10.0),
        offset: Vec2::new(10.0, -4.0),
    };
    let frames = compute_frames(&path, 2);

    assert_eq!(frames.len(), 3);
    assert!((frames[1].size.width - 30.0).abs() < 1e-12);
    assert!((frames[1].size.height - 15.0).abs() < 1e-12);
    assert_point(frames[2].position, Point3::new(10.0, -4.0, 50.0));
    // The tangent stays on the sweep axis for tapers.
    assert!((frames[2].tangent.dot(Vec3::Z) - 1.0).abs() < 1e-12);
}

#[test]
fn quarter_arc_ends_on_circle() {
    let size = SectionSize::rect(20.0, 10.0);
    let frames = compute_frames(&arc(10.0, 90.0, size, size), 8);

    let end = frames.last().expect("frames");
    assert_point(end.position, Point3::new(-20.0, 0.0, 20.0));
    assert!((end.tangent.dot(-Vec3::X) - 1.0).abs() < 1e-9);
    // Width axis points away from the bend centre.
    assert!((end.normal.dot(Vec3::Z) - 1.0).abs() < 1e-9);
    assert!((end.binormal.dot(Vec3::Y) - 1.0).abs() < 1e-9);
}

#[test]
fn arc_radius_follows_width() {
    let frames = compute_frames(
        &arc(10.0, 90.0, SectionSize::rect(20.0, 10.0), SectionSize::rect(40.0, 10.0)),
        16,
    );
    let center = Point3::new(-20.0, 0.0, 0.0);

    for frame in &frames {
        let expected = 10.0 + frame.size.width * 0.5;
        assert!((frame.position.distance_to(center) - expected).abs() < 1e-9);
        assert!(frame.is_orthonormal(1e-9));
    }
    assert_point(frames[16].position, Point3::new(-20.0, 0.0, 30.0));
}

#[test]
fn arc_angle_out_of_range_is_clamped() {
    let size = SectionSize::round(10.0);

    let zero = compute_frames(&arc(5.0, 0.0, size, size), 4);
    assert_eq!(zero.len(), 5);
    for pair in zero.windows(2) {
        assert!(pair[0].position.distance_to(pair[1].position) > 0.0);
        assert!(pair[1].position.is_finite());
    }

    let over = compute_frames(&arc(5.0, 270.0, size, size), 4);
    let end = over.last().expect("frames");
    assert_point(end.position, Point3::new(-20.0, 0.0, 0.0));
    assert!((end.tangent.dot(-Vec3::Z) - 1.0).abs() < 1e-9);
}

#[test]
fn steps_are_clamped_per_path_kind() {
    let size = SectionSize::rect(10.0, 10.0);
    let straight = SweepPath::Straight { length: 10.0, size };
    assert_eq!(compute_frames(&straight, 0).len(), 2);
    assert_eq!(compute_frames(&arc(1.0, 45.0, size, size), 0).len(), 3);
    assert_eq!(compute_frames(&straight, 100_000).len(), MAX_STEPS + 1);
}

#[test]
fn degenerate_sizes_are_clamped() {
    let path = SweepPath::Straight { length: -5.0, size: SectionSize::rect(0.0, f64::NAN) };
    let frames = compute_frames(&path, 1);
    let min = Tolerance::MIN_EXTENT.eps;
    assert!((frames[1].position.z - min).abs() < 1e-15);
    assert!(frames[1].size.width >= min);
    assert!(frames[1].size.height >= min);
}
