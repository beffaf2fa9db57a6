use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::geom::{
    Point3, SectionProfile, SectionSize, ShellOptions, SweepPath, Transform, Vec3,
    compute_frames, loft_shell,
};

fn straight(width: f64, height: f64, length: f64, steps: usize) -> Vec<crate::geom::Frame> {
    compute_frames(&SweepPath::Straight { length, size: SectionSize::rect(width, height) }, steps)
}

fn triangle_normal(positions: &[[f64; 3]], tri: &[u32]) -> Vec3 {
    let a = Point3::from_array(positions[tri[0] as usize]);
    let b = Point3::from_array(positions[tri[1] as usize]);
    let c = Point3::from_array(positions[tri[2] as usize]);
    b.sub_point(a).cross(c.sub_point(a))
}

fn centroid(positions: &[[f64; 3]], tri: &[u32]) -> Point3 {
    let sum = tri.iter().fold(Vec3::ZERO, |acc, &i| acc + Point3::from_array(positions[i as usize]).to_vec3());
    Point3::ORIGIN + sum / 3.0
}

#[test]
fn rect_shell_counts() {
    let frames = straight(25.0, 30.0, 120.0, 4);
    let shell = loft_shell(&frames, SectionProfile::Rect, ShellOptions { wall_thickness: 0.12, cap_end: false });

    let (n, s) = (4, 4);
    assert_eq!(shell.rings.len(), s + 1);
    assert_eq!(shell.quad_count(), 2 * n * s);
    assert_eq!(shell.outer_triangle_count, 2 * n * s);
    assert_eq!(shell.inner_triangle_count, 2 * n * s);
    assert_eq!(shell.mesh.triangle_count(), 4 * n * s);
    assert_eq!(shell.mesh.vertex_count(), 2 * n * (s + 1));
    assert!(shell.mesh.validate().is_ok());
}

#[test]
fn round_shell_counts() {
    let size = SectionSize::round(30.0);
    let frames = compute_frames(
        &SweepPath::Arc { inner_radius: 15.0, angle: 90f64.to_radians(), start: size, end: size },
        6,
    );
    let shell = loft_shell(&frames, SectionProfile::round(24), ShellOptions::default());

    assert_eq!(shell.vertices_per_ring(), 24);
    assert_eq!(shell.steps(), 6);
    assert_eq!(shell.quad_count(), 2 * 24 * 6);
    assert_eq!(shell.diagnostics.non_manifold_edge_count, 0);
}

#[test]
fn surfaces_are_independent_and_open() {
    let frames = straight(10.0, 10.0, 10.0, 1);
    let shell = loft_shell(&frames, SectionProfile::Rect, ShellOptions::default());

    // Each tube has two open boundary loops of N edges.
    assert_eq!(shell.diagnostics.open_edge_count, 4 * 4);
    assert!(!shell.diagnostics.is_watertight());
}

#[test]
fn outer_faces_outward_inner_faces_inward() {
    let frames = straight(20.0, 10.0, 30.0, 3);
    let shell = loft_shell(&frames, SectionProfile::Rect, ShellOptions { wall_thickness: 1.0, cap_end: false });
    let positions = &shell.mesh.positions;

    for (i, tri) in shell.mesh.indices.chunks_exact(3).enumerate() {
        let c = centroid(positions, tri);
        let radial = Vec3::new(c.x, c.y, 0.0);
        let facing = triangle_normal(positions, tri).dot(radial);
        if i < shell.outer_triangle_count {
            assert!(facing > 0.0, "outer triangle {i} faces inward");
        } else {
            assert!(facing < 0.0, "inner triangle {i} faces outward");
        }
    }
}

#[test]
fn inner_ring_strictly_inside_outer() {
    let mut rng = StdRng::seed_from_u64(0x0d0c7);

    for _ in 0..200 {
        let width: f64 = rng.random_range(5.0..100.0);
        let height = rng.random_range(width / 4.0..(width * 4.0).min(100.0));
        let wall = rng.random_range(0.01..0.95) * width.min(height) * 0.5;
        let profile = if rng.random_bool(0.5) {
            SectionProfile::Rect
        } else {
            SectionProfile::round(rng.random_range(8..64))
        };

        let frames = straight(width, height, 10.0, 2);
        let shell = loft_shell(&frames, profile, ShellOptions { wall_thickness: wall, cap_end: false });

        for ring in &shell.rings {
            assert_eq!(ring.outer.len(), ring.inner.len());
            for p in &ring.inner.offsets {
                assert!(
                    ring.outer.contains_strict(*p),
                    "w={width} h={height} t={wall} {profile:?}: {p:?} escapes outer ring"
                );
            }
        }
    }
}

#[test]
fn oversized_wall_is_clamped_not_rejected() {
    let frames = straight(4.0, 4.0, 10.0, 2);
    let shell = loft_shell(&frames, SectionProfile::Rect, ShellOptions { wall_thickness: 50.0, cap_end: false });

    assert!(!shell.mesh.has_invalid_vertices());
    assert_eq!(shell.diagnostics.clamped_input_count, 3);
    assert!(shell.diagnostics.has_warnings());
    for ring in &shell.rings {
        assert!(ring.inner.signed_area() > 0.0);
    }
}

#[test]
fn cap_closes_last_ring() {
    let frames = straight(20.0, 10.0, 5.0, 1);
    let shell = loft_shell(&frames, SectionProfile::Rect, ShellOptions { wall_thickness: 0.1, cap_end: true });

    assert!(shell.is_capped());
    assert_eq!(shell.cap_triangle_count, 2);
    assert_eq!(shell.mesh.triangle_count(), 4 * 4 + 2);

    let cap = &shell.mesh.indices[(shell.mesh.triangle_count() - 1) * 3..];
    let normal = triangle_normal(&shell.mesh.positions, cap);
    assert!(normal.dot(Vec3::Z) > 0.0);
}

#[test]
fn transformed_shell_keeps_orthonormal_frames() {
    let frames = straight(10.0, 10.0, 10.0, 2);
    let shell = loft_shell(&frames, SectionProfile::Rect, ShellOptions::default());
    let moved = shell.transformed(
        Transform::translate(Vec3::new(5.0, 0.0, 0.0)).compose(Transform::rotate_z(1.1)),
    );

    assert_eq!(moved.quad_count(), shell.quad_count());
    assert!(moved.rings.iter().all(|r| r.frame.is_orthonormal(1e-9)));
    let expected = moved.rings[1].outer_world();
    for (k, p) in expected.iter().enumerate() {
        let q = moved.mesh.positions[4 + k];
        assert!(p.distance_to(Point3::from_array(q)) < 1e-9);
    }
}
