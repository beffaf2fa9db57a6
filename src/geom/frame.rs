//! Frame computation along duct sweep paths.
//!
//! Every sweep is expressed in a local coordinate system: the first frame sits at
//! the origin, the sweep starts along `+Z`, "up" is `+Y` and the width axis
//! (frame normal) is `+X`. Part builders place the result with a rigid
//! [`Transform`](super::Transform).
//!
//! Basis vectors are never interpolated. Each sample re-derives its basis from
//! the path tangent and the fixed up vector by cross products, so the frames
//! stay orthonormal regardless of step count.

use serde::{Deserialize, Serialize};

use super::{Point3, Tolerance, Transform, Vec2, Vec3};

/// Smallest sweep angle an arc path is clamped to (0.1°).
pub const MIN_ARC_ANGLE: f64 = 0.1 * std::f64::consts::PI / 180.0;
/// Largest sweep angle an arc path is clamped to (180°).
pub const MAX_ARC_ANGLE: f64 = std::f64::consts::PI;
/// Upper bound on samples along a single path.
pub const MAX_STEPS: usize = 512;

/// Interpolated cross-section size at a frame. Round sections use `width == height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionSize {
    pub width: f64,
    pub height: f64,
}

impl SectionSize {
    #[must_use]
    pub const fn rect(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn round(diameter: f64) -> Self {
        Self { width: diameter, height: diameter }
    }

    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        Self {
            width: self.width + (rhs.width - self.width) * t,
            height: self.height + (rhs.height - self.height) * t,
        }
    }

    /// Returns the size with both extents clamped to at least `tol.eps`.
    #[must_use]
    pub fn clamped(self, tol: Tolerance) -> Self {
        Self {
            width: tol.at_least(self.width),
            height: tol.at_least(self.height),
        }
    }

    #[must_use]
    pub fn half_extents(self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// A positioned, oriented cross-section station along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Normalized path parameter in `[0, 1]`.
    pub u: f64,
    pub position: Point3,
    pub tangent: Vec3,
    /// Width axis of the cross-section.
    pub normal: Vec3,
    /// Height axis of the cross-section.
    pub binormal: Vec3,
    pub size: SectionSize,
}

impl Frame {
    /// Builds a frame from a tangent and an up hint: `normal = up × tangent`,
    /// `binormal = tangent × normal`.
    #[must_use]
    pub fn from_tangent_up(u: f64, position: Point3, tangent: Vec3, up: Vec3, size: SectionSize) -> Self {
        let tangent = tangent.normalized().unwrap_or(Vec3::Z);
        let normal = up
            .cross(tangent)
            .normalized()
            .or_else(|| Vec3::Y.cross(tangent).normalized())
            .or_else(|| Vec3::Z.cross(tangent).normalized())
            .unwrap_or(Vec3::X);
        let binormal = tangent.cross(normal);
        Self { u, position, tangent, normal, binormal, size }
    }

    /// Maps a 2D offset in the (normal, binormal) plane to world space.
    #[must_use]
    pub fn local_to_world(&self, offset: Vec2) -> Point3 {
        self.position + self.normal * offset.x + self.binormal * offset.y
    }

    /// Applies a rigid transform. The basis is re-derived from the transformed
    /// tangent and binormal rather than copied.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        let tangent = transform.apply_vec(self.tangent);
        let up = transform.apply_vec(self.binormal);
        Self::from_tangent_up(self.u, transform.apply_point(self.position), tangent, up, self.size)
    }

    /// Same station, facing the opposite direction. Width axis is kept.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            tangent: -self.tangent,
            binormal: -self.binormal,
            ..*self
        }
    }

    /// Returns the frame moved along its own tangent.
    #[must_use]
    pub fn advanced(&self, distance: f64) -> Self {
        Self {
            position: self.position + self.tangent * distance,
            ..*self
        }
    }

    #[must_use]
    pub fn is_orthonormal(&self, eps: f64) -> bool {
        let unit = |v: Vec3| (v.length() - 1.0).abs() <= eps;
        unit(self.tangent)
            && unit(self.normal)
            && unit(self.binormal)
            && self.tangent.dot(self.normal).abs() <= eps
            && self.tangent.dot(self.binormal).abs() <= eps
            && self.normal.dot(self.binormal).abs() <= eps
    }

    /// Rigid transform taking the canonical start frame (origin, `+Z` tangent,
    /// `+X` normal, `+Y` binormal) onto this frame.
    #[must_use]
    pub fn to_transform(&self) -> Transform {
        Transform::from_axes(self.position, self.normal, self.binormal, self.tangent)
    }
}

/// Path kinds a sweep can follow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepPath {
    /// Constant section along `+Z`.
    Straight { length: f64, size: SectionSize },
    /// Linear size change along `+Z`; `offset` shifts the end centre in the
    /// (normal, binormal) plane while the tangent stays on the sweep axis.
    Taper {
        length: f64,
        start: SectionSize,
        end: SectionSize,
        offset: Vec2,
    },
    /// Circular bend in the XZ plane turning toward `-X`. The centreline radius
    /// at `u` is `inner_radius + width(u) / 2`.
    Arc {
        inner_radius: f64,
        angle: f64,
        start: SectionSize,
        end: SectionSize,
    },
}

impl SweepPath {
    /// Fewest steps the path is sampled with.
    #[must_use]
    pub fn min_steps(&self) -> usize {
        match self {
            Self::Straight { .. } => 1,
            Self::Taper { .. } | Self::Arc { .. } => 2,
        }
    }

    #[must_use]
    pub fn clamp_steps(&self, steps: usize) -> usize {
        steps.clamp(self.min_steps(), MAX_STEPS)
    }

    /// Returns the path with all inputs forced into valid ranges.
    #[must_use]
    pub fn clamped(self) -> Self {
        let tol = Tolerance::MIN_EXTENT;
        match self {
            Self::Straight { length, size } => Self::Straight {
                length: tol.at_least(length),
                size: size.clamped(tol),
            },
            Self::Taper { length, start, end, offset } => Self::Taper {
                length: tol.at_least(length),
                start: start.clamped(tol),
                end: end.clamped(tol),
                offset: Vec2::new(finite_or_zero(offset.x), finite_or_zero(offset.y)),
            },
            Self::Arc { inner_radius, angle, start, end } => Self::Arc {
                inner_radius: finite_or_zero(inner_radius).max(0.0),
                angle: if angle.is_finite() {
                    angle.clamp(MIN_ARC_ANGLE, MAX_ARC_ANGLE)
                } else {
                    MIN_ARC_ANGLE
                },
                start: start.clamped(tol),
                end: end.clamped(tol),
            },
        }
    }

    #[must_use]
    pub fn size_at(&self, u: f64) -> SectionSize {
        match *self {
            Self::Straight { size, .. } => size,
            Self::Taper { start, end, .. } | Self::Arc { start, end, .. } => start.lerp(end, u),
        }
    }

    /// Length of the path centreline.
    #[must_use]
    pub fn centerline_length(&self) -> f64 {
        match *self {
            Self::Straight { length, .. } => length,
            Self::Taper { length, offset, .. } => (length * length + offset.x * offset.x + offset.y * offset.y).sqrt(),
            Self::Arc { inner_radius, angle, start, end } => {
                // Mean centreline radius is exact for the linear width change.
                let mean_width = (start.width + end.width) * 0.5;
                (inner_radius + mean_width * 0.5) * angle
            }
        }
    }
}

/// Samples `steps + 1` frames along `path` for `u` in `[0, 1]`.
///
/// `steps` is clamped to [`SweepPath::min_steps`] and [`MAX_STEPS`]; path
/// inputs are clamped first so the result is always well-formed.
#[must_use]
pub fn compute_frames(path: &SweepPath, steps: usize) -> Vec<Frame> {
    let path = path.clamped();
    let steps = path.clamp_steps(steps);

    (0..=steps)
        .map(|i| {
            let u = i as f64 / steps as f64;
            frame_at(&path, u)
        })
        .collect()
}

fn frame_at(path: &SweepPath, u: f64) -> Frame {
    let size = path.size_at(u);
    match *path {
        SweepPath::Straight { length, .. } => {
            Frame::from_tangent_up(u, Point3::new(0.0, 0.0, length * u), Vec3::Z, Vec3::Y, size)
        }
        SweepPath::Taper { length, offset, .. } => Frame::from_tangent_up(
            u,
            Point3::new(offset.x * u, offset.y * u, length * u),
            Vec3::Z,
            Vec3::Y,
            size,
        ),
        SweepPath::Arc { inner_radius, angle, start, end } => {
            let r0 = inner_radius + start.width * 0.5;
            let r = inner_radius + size.width * 0.5;
            let dr = (end.width - start.width) * 0.5;
            let phi = angle * u;
            let radial = Vec3::new(phi.cos(), 0.0, phi.sin());
            let along = Vec3::new(-phi.sin(), 0.0, phi.cos());

            let position = Point3::new(-r0, 0.0, 0.0) + radial * r;
            // d/du of (r(u) * radial(phi(u)))
            let derivative = radial * dr + along * (r * angle);
            Frame::from_tangent_up(u, position, derivative, Vec3::Y, size)
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
