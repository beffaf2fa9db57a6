//! Double-walled shell sweeps.
//!
//! A shell is built from a frame sequence and a [`SectionProfile`]: each frame
//! is realized into a [`Ring`] (outer boundary plus an inner boundary shrunk by
//! the wall thickness), and consecutive rings are stitched into two independent
//! surfaces. The outer surface faces away from the duct axis, the inner surface
//! uses reversed winding and faces into the duct. The two surfaces share no
//! triangles, so both cut ends stay open and show the wall thickness.
//!
//! # Vertex layout
//! Ring `i`, boundary vertex `k`:
//! - outer: `i * N + k`
//! - inner: `R * N + i * N + k` (with `R` rings)
//!
//! Optional end caps append a triangle fan over the last ring's outer vertices.

use super::diagnostics::GeomMeshDiagnostics;
use super::frame::Frame;
use super::mesh::{GeomMesh, finalize_mesh};
use super::section::{CrossSectionShape, SectionProfile};
use super::{Point3, Tolerance, Transform};

/// Options controlling shell generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellOptions {
    /// Wall thickness `t` in world units.
    pub wall_thickness: f64,
    /// Close the last ring with a single capping face.
    pub cap_end: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            wall_thickness: 0.1,
            cap_end: false,
        }
    }
}

/// Realized outer and inner cross-sections at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub frame: Frame,
    pub outer: CrossSectionShape,
    pub inner: CrossSectionShape,
}

impl Ring {
    #[must_use]
    pub fn new(frame: Frame, profile: SectionProfile, wall: f64) -> Self {
        Self {
            outer: profile.outer(frame.size, frame.u),
            inner: profile.inner(frame.size, frame.u, wall),
            frame,
        }
    }

    #[must_use]
    pub fn outer_world(&self) -> Vec<Point3> {
        self.outer.offsets.iter().map(|o| self.frame.local_to_world(*o)).collect()
    }

    #[must_use]
    pub fn inner_world(&self) -> Vec<Point3> {
        self.inner.offsets.iter().map(|o| self.frame.local_to_world(*o)).collect()
    }
}

/// Shell sweep result: rings plus the stitched mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellMesh {
    pub rings: Vec<Ring>,
    pub profile: SectionProfile,
    pub wall_thickness: f64,
    /// Triangles ordered outer surface, inner surface, cap.
    pub mesh: GeomMesh,
    pub outer_triangle_count: usize,
    pub inner_triangle_count: usize,
    pub cap_triangle_count: usize,
    pub diagnostics: GeomMeshDiagnostics,
}

impl ShellMesh {
    /// Boundary vertices per ring (`N`).
    #[must_use]
    pub fn vertices_per_ring(&self) -> usize {
        self.profile.vertex_count()
    }

    /// Number of ring-to-ring spans (`S`).
    #[must_use]
    pub fn steps(&self) -> usize {
        self.rings.len().saturating_sub(1)
    }

    /// Quads over both surfaces: `2 * N * S`.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        (self.outer_triangle_count + self.inner_triangle_count) / 2
    }

    #[must_use]
    pub fn start_frame(&self) -> Option<&Frame> {
        self.rings.first().map(|r| &r.frame)
    }

    #[must_use]
    pub fn end_frame(&self) -> Option<&Frame> {
        self.rings.last().map(|r| &r.frame)
    }

    #[must_use]
    pub fn is_capped(&self) -> bool {
        self.cap_triangle_count > 0
    }

    /// Rigidly transformed copy; ring offsets are local and carry over as-is.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        Self {
            rings: self
                .rings
                .iter()
                .map(|ring| Ring {
                    frame: ring.frame.transformed(transform),
                    outer: ring.outer.clone(),
                    inner: ring.inner.clone(),
                })
                .collect(),
            mesh: self.mesh.transformed(transform),
            diagnostics: self.diagnostics.clone(),
            ..*self
        }
    }
}

/// Sweeps `profile` along `frames` into a double-walled shell.
///
/// Never fails: fewer than two frames yields a mesh without triangles, and an
/// oversized wall is clamped by the profile's minimum extent.
#[must_use]
pub fn loft_shell(frames: &[Frame], profile: SectionProfile, options: ShellOptions) -> ShellMesh {
    let wall = Tolerance::new(0.0).at_least(options.wall_thickness);
    let n = profile.vertex_count();
    let rings: Vec<Ring> = frames.iter().map(|f| Ring::new(*f, profile, wall)).collect();
    let ring_count = rings.len();

    let mut clamped_rings = 0usize;
    let mut points: Vec<Point3> = Vec::with_capacity(ring_count * n * 2);
    for ring in &rings {
        points.extend(ring.outer_world());
    }
    for ring in &rings {
        let half = ring.frame.size.half_extents();
        if wall >= half.x.min(half.y) - Tolerance::MIN_EXTENT.eps {
            clamped_rings += 1;
        }
        points.extend(ring.inner_world());
    }

    let spans = ring_count.saturating_sub(1);
    let inner_base = ring_count * n;
    let mut indices: Vec<u32> = Vec::with_capacity(spans * n * 12 + n * 3);

    for i in 0..spans {
        for k in 0..n {
            let k_next = (k + 1) % n;
            let a = (i * n + k) as u32;
            let b = (i * n + k_next) as u32;
            let c = ((i + 1) * n + k_next) as u32;
            let d = ((i + 1) * n + k) as u32;
            indices.extend_from_slice(&[a, b, c]);
            indices.extend_from_slice(&[a, c, d]);
        }
    }
    let outer_triangle_count = indices.len() / 3;

    for i in 0..spans {
        for k in 0..n {
            let k_next = (k + 1) % n;
            let a = (inner_base + i * n + k) as u32;
            let b = (inner_base + i * n + k_next) as u32;
            let c = (inner_base + (i + 1) * n + k_next) as u32;
            let d = (inner_base + (i + 1) * n + k) as u32;
            indices.extend_from_slice(&[a, c, b]);
            indices.extend_from_slice(&[a, d, c]);
        }
    }
    let inner_triangle_count = indices.len() / 3 - outer_triangle_count;

    let mut cap_triangle_count = 0;
    if options.cap_end && ring_count > 0 && n >= 3 {
        let base = ((ring_count - 1) * n) as u32;
        for k in 1..n - 1 {
            indices.extend_from_slice(&[base, base + k as u32, base + k as u32 + 1]);
        }
        cap_triangle_count = n - 2;
    }

    let (mesh, mut diagnostics) = finalize_mesh(points, indices);
    if clamped_rings > 0 {
        diagnostics.clamped_input_count += clamped_rings;
        diagnostics.add_warning(format!(
            "wall thickness {wall:.4} clamped on {clamped_rings} rings"
        ));
    }

    ShellMesh {
        rings,
        profile,
        wall_thickness: wall,
        mesh,
        outer_triangle_count,
        inner_triangle_count,
        cap_triangle_count,
        diagnostics,
    }
}
