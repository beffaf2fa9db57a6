use crate::geom::{
    FlangeOptions, Frame, Point3, SectionProfile, SectionSize, ShellEnd, ShellOptions, SweepPath,
    Vec3, combined_flange, compute_frames, end_flange, flange_at, loft_shell,
};

fn canonical(size: SectionSize) -> Frame {
    Frame::from_tangent_up(0.0, Point3::ORIGIN, Vec3::Z, Vec3::Y, size)
}

fn signed_volume(positions: &[[f64; 3]], indices: &[u32]) -> f64 {
    indices
        .chunks_exact(3)
        .map(|tri| {
            let a = Point3::from_array(positions[tri[0] as usize]).to_vec3();
            let b = Point3::from_array(positions[tri[1] as usize]).to_vec3();
            let c = Point3::from_array(positions[tri[2] as usize]).to_vec3();
            a.dot(b.cross(c)) / 6.0
        })
        .sum()
}

fn z_range(positions: &[[f64; 3]]) -> (f64, f64) {
    positions
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p[2]), hi.max(p[2])))
}

#[test]
fn rect_flange_is_closed_solid() {
    let options = FlangeOptions { lip: 3.0, thickness: 0.5 };
    let flange = flange_at(&canonical(SectionSize::rect(20.0, 10.0)), SectionProfile::Rect, options);

    assert_eq!(flange.mesh.triangle_count(), 8 * 4);
    assert!(flange.diagnostics.is_valid_solid());
    assert_eq!(flange.diagnostics.degenerate_triangle_count, 0);

    // Outward winding: (26 × 16 − 20 × 10) × 0.5
    let volume = signed_volume(&flange.mesh.positions, &flange.mesh.indices);
    assert!((volume - 108.0).abs() < 1e-9, "volume {volume}");
}

#[test]
fn rect_lip_is_exact_on_both_axes() {
    let lip = 2.5;
    let flange = flange_at(
        &canonical(SectionSize::rect(40.0, 15.0)),
        SectionProfile::Rect,
        FlangeOptions { lip, thickness: 1.0 },
    );
    let outer = flange.outer.half_extents();
    let inner = flange.inner.half_extents();

    assert!((outer.x - inner.x - lip).abs() < 1e-12);
    assert!((outer.y - inner.y - lip).abs() < 1e-12);
    assert!((inner.x - 20.0).abs() < 1e-12);
    assert!((inner.y - 7.5).abs() < 1e-12);
}

#[test]
fn round_lip_grows_radius() {
    let flange = flange_at(
        &canonical(SectionSize::round(20.0)),
        SectionProfile::round(32),
        FlangeOptions { lip: 3.0, thickness: 0.4 },
    );

    assert_eq!(flange.mesh.triangle_count(), 8 * 32);
    assert!(flange.diagnostics.is_valid_solid());
    for (outer, inner) in flange.outer.offsets.iter().zip(&flange.inner.offsets) {
        assert!((outer.length() - 13.0).abs() < 1e-12);
        assert!((inner.length() - 10.0).abs() < 1e-12);
    }
}

#[test]
fn end_flanges_sit_flush_outside_the_shell() {
    let frames = compute_frames(
        &SweepPath::Straight { length: 100.0, size: SectionSize::rect(30.0, 20.0) },
        4,
    );
    let shell = loft_shell(&frames, SectionProfile::Rect, ShellOptions::default());
    let options = FlangeOptions { lip: 3.0, thickness: 0.5 };

    let end = end_flange(&shell, ShellEnd::End, options).expect("end flange");
    let (lo, hi) = z_range(&end.mesh.positions);
    assert!((lo - 100.0).abs() < 1e-9);
    assert!((hi - 100.5).abs() < 1e-9);
    assert!((end.frame.tangent.dot(Vec3::Z) - 1.0).abs() < 1e-12);

    let start = end_flange(&shell, ShellEnd::Start, options).expect("start flange");
    let (lo, hi) = z_range(&start.mesh.positions);
    assert!((lo + 0.5).abs() < 1e-9);
    assert!(hi.abs() < 1e-9);
    assert!((start.frame.tangent.dot(-Vec3::Z) - 1.0).abs() < 1e-12);
    assert!(start.diagnostics.is_valid_solid());
}

#[test]
fn combined_flange_spans_all_openings() {
    let plane = canonical(SectionSize::rect(1.0, 1.0));
    let sizes = [SectionSize::rect(20.0, 10.0), SectionSize::rect(30.0, 15.0)];
    let flange = combined_flange(&plane, &sizes, FlangeOptions { lip: 2.0, thickness: 0.5 });

    assert_eq!(flange.size(), SectionSize::rect(50.0, 15.0));
    assert_eq!(flange.profile, SectionProfile::Rect);
    let inner = flange.inner.half_extents();
    assert!((inner.x - 25.0).abs() < 1e-12);
    assert!((inner.y - 7.5).abs() < 1e-12);
    let (lo, _) = z_range(&flange.mesh.positions);
    assert!(lo.abs() < 1e-9);
}
