//! Sheet area estimation from shell rings and flange meshes.
//!
//! Quads between consecutive rings are split along a fixed diagonal
//! (`a-c`), and each triangle contributes half the magnitude of the cross
//! product of two edge vectors. The straight-duct result is therefore exact
//! and independent of the step count.

use serde::{Deserialize, Serialize};

use super::flange::Flange;
use super::loft::ShellMesh;
use super::mesh::triangle_area;
use super::Point3;

/// World units are centimetres.
pub const CM2_PER_M2: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AreaOptions {
    pub include_inner: bool,
    pub include_flange: bool,
}

/// Surface areas in cm².
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaEstimate {
    /// Outer sheet area, including caps and, when requested, flanges.
    pub outer_cm2: f64,
    pub inner_cm2: Option<f64>,
    /// Flange contribution already folded into `outer_cm2`.
    pub flange_cm2: f64,
}

impl AreaEstimate {
    #[must_use]
    pub fn outer_m2(&self) -> f64 {
        self.outer_cm2 / CM2_PER_M2
    }

    #[must_use]
    pub fn inner_m2(&self) -> Option<f64> {
        self.inner_cm2.map(|a| a / CM2_PER_M2)
    }
}

/// Area of the band stitched between consecutive closed polygons.
///
/// Rings of mismatched length are stitched over their common prefix.
#[must_use]
pub fn ring_band_area(rings: &[Vec<Point3>]) -> f64 {
    rings
        .windows(2)
        .map(|pair| {
            let (r0, r1) = (&pair[0], &pair[1]);
            let n = r0.len().min(r1.len());
            (0..n)
                .map(|k| {
                    let k1 = (k + 1) % n;
                    let (a, b, c, d) = (r0[k], r0[k1], r1[k1], r1[k]);
                    triangle_area(a, b, c) + triangle_area(a, c, d)
                })
                .sum::<f64>()
        })
        .sum()
}

/// Outer and (optionally) inner band area of a single shell, plus its cap.
#[must_use]
pub fn shell_area(shell: &ShellMesh, include_inner: bool) -> (f64, Option<f64>) {
    let outer_rings: Vec<Vec<Point3>> = shell.rings.iter().map(|r| r.outer_world()).collect();
    let outer = ring_band_area(&outer_rings) + cap_area(shell);
    let inner = include_inner.then(|| {
        let inner_rings: Vec<Vec<Point3>> = shell.rings.iter().map(|r| r.inner_world()).collect();
        ring_band_area(&inner_rings)
    });
    (outer, inner)
}

fn cap_area(shell: &ShellMesh) -> f64 {
    let Some(last) = shell.rings.last() else {
        return 0.0;
    };
    if !shell.is_capped() {
        return 0.0;
    }
    let points = last.outer_world();
    (1..points.len().saturating_sub(1))
        .map(|k| triangle_area(points[0], points[k], points[k + 1]))
        .sum()
}

/// Estimates sheet area for a set of shells and flanges.
#[must_use]
pub fn estimate_area(shells: &[ShellMesh], flanges: &[Flange], options: AreaOptions) -> AreaEstimate {
    let mut estimate = AreaEstimate {
        inner_cm2: options.include_inner.then_some(0.0),
        ..AreaEstimate::default()
    };

    for shell in shells {
        let (outer, inner) = shell_area(shell, options.include_inner);
        estimate.outer_cm2 += outer;
        if let (Some(total), Some(inner)) = (estimate.inner_cm2.as_mut(), inner) {
            *total += inner;
        }
    }

    if options.include_flange {
        estimate.flange_cm2 = flanges.iter().map(|f| f.mesh.surface_area()).sum();
        estimate.outer_cm2 += estimate.flange_cm2;
    }

    estimate
}
