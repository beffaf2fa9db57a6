//! Flat annular flange solids at duct openings.
//!
//! A flange is keyed to a single [`Frame`]: the hole is the unmodified cross
//! section, the rim is the section grown by `lip` on every side, and the
//! annulus is extruded by `thickness` symmetrically about the frame plane.
//! The resulting mesh is a closed, manifold solid (`8 * N` triangles).

use super::diagnostics::GeomMeshDiagnostics;
use super::frame::{Frame, SectionSize};
use super::loft::ShellMesh;
use super::mesh::{GeomMesh, finalize_mesh};
use super::section::{CrossSectionShape, SectionProfile};
use super::{Point3, Tolerance, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlangeOptions {
    /// Outward margin beyond the duct cross-section.
    pub lip: f64,
    /// Extrusion depth along the frame tangent.
    pub thickness: f64,
}

impl Default for FlangeOptions {
    fn default() -> Self {
        Self {
            lip: 3.0,
            thickness: 0.5,
        }
    }
}

impl FlangeOptions {
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            lip: Tolerance::new(0.0).at_least(self.lip),
            thickness: Tolerance::MIN_EXTENT.at_least(self.thickness),
        }
    }
}

/// Which open end of a shell a flange is mated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEnd {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flange {
    /// Mid-plane frame; its tangent is the extrusion axis.
    pub frame: Frame,
    pub profile: SectionProfile,
    pub options: FlangeOptions,
    pub outer: CrossSectionShape,
    pub inner: CrossSectionShape,
    pub mesh: GeomMesh,
    pub diagnostics: GeomMeshDiagnostics,
}

impl Flange {
    #[must_use]
    pub fn size(&self) -> SectionSize {
        self.frame.size
    }

    /// Rigidly transformed copy.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        Self {
            frame: self.frame.transformed(transform),
            outer: self.outer.clone(),
            inner: self.inner.clone(),
            mesh: self.mesh.transformed(transform),
            diagnostics: self.diagnostics.clone(),
            ..*self
        }
    }
}

/// Builds a flange centred on `frame`, extruded `±thickness / 2` along its tangent.
#[must_use]
pub fn flange_at(frame: &Frame, profile: SectionProfile, options: FlangeOptions) -> Flange {
    let options = options.clamped();
    let n = profile.vertex_count();
    let outer = profile.expanded(frame.size, frame.u, options.lip);
    let inner = profile.outer(frame.size, frame.u);

    let half = options.thickness * 0.5;
    let back = frame.advanced(-half);
    let front = frame.advanced(half);

    // Layout: outer front, outer back, inner front, inner back.
    let mut points: Vec<Point3> = Vec::with_capacity(n * 4);
    points.extend(outer.offsets.iter().map(|o| front.local_to_world(*o)));
    points.extend(outer.offsets.iter().map(|o| back.local_to_world(*o)));
    points.extend(inner.offsets.iter().map(|o| front.local_to_world(*o)));
    points.extend(inner.offsets.iter().map(|o| back.local_to_world(*o)));

    let of = 0u32;
    let ob = n as u32;
    let inf = 2 * n as u32;
    let inb = 3 * n as u32;

    let mut indices: Vec<u32> = Vec::with_capacity(n * 24);
    for k in 0..n as u32 {
        let k1 = (k + 1) % n as u32;

        // Front annulus, facing +tangent.
        indices.extend_from_slice(&[of + k, of + k1, inf + k1]);
        indices.extend_from_slice(&[of + k, inf + k1, inf + k]);
        // Back annulus, facing -tangent.
        indices.extend_from_slice(&[ob + k, inb + k1, ob + k1]);
        indices.extend_from_slice(&[ob + k, inb + k, inb + k1]);
        // Rim, facing away from the axis.
        indices.extend_from_slice(&[ob + k, ob + k1, of + k1]);
        indices.extend_from_slice(&[ob + k, of + k1, of + k]);
        // Hole wall, facing the axis.
        indices.extend_from_slice(&[inb + k, inf + k1, inb + k1]);
        indices.extend_from_slice(&[inb + k, inf + k, inf + k1]);
    }

    let (mesh, diagnostics) = finalize_mesh(points, indices);

    Flange {
        frame: *frame,
        profile,
        options,
        outer,
        inner,
        mesh,
        diagnostics,
    }
}

/// Places a flange at one open end of `shell`, shifted by `thickness / 2`
/// along the outward tangent so the hole is flush with the shell edge.
#[must_use]
pub fn end_flange(shell: &ShellMesh, end: ShellEnd, options: FlangeOptions) -> Option<Flange> {
    let options = options.clamped();
    let outward = match end {
        ShellEnd::Start => shell.start_frame()?.reversed(),
        ShellEnd::End => *shell.end_frame()?,
    };
    Some(flange_at(&outward.advanced(options.thickness * 0.5), shell.profile, options))
}

/// Opening size of a flange spanning several side-by-side openings:
/// widths add up, height is the tallest.
#[must_use]
pub fn combined_size(sizes: &[SectionSize]) -> SectionSize {
    sizes.iter().fold(SectionSize::rect(0.0, 0.0), |acc, s| {
        SectionSize::rect(acc.width + s.width, acc.height.max(s.height))
    })
}

/// Rectangular flange spanning adjacent branch openings on a shared end plane.
///
/// `plane` is the shared outward-facing end frame; its size is replaced by the
/// combined opening.
#[must_use]
pub fn combined_flange(plane: &Frame, sizes: &[SectionSize], options: FlangeOptions) -> Flange {
    let options = options.clamped();
    let frame = Frame {
        size: combined_size(sizes).clamped(Tolerance::MIN_EXTENT),
        ..*plane
    };
    flange_at(&frame.advanced(options.thickness * 0.5), SectionProfile::Rect, options)
}
