//! Cross-section shapes realized in a frame's (normal, binormal) plane.
//!
//! Every profile yields a fixed vertex count `N` for a given part instance, with
//! outer and inner shapes in one-to-one vertex correspondence. Vertices run
//! counter-clockwise when viewed from the tip of the frame tangent.

use serde::{Deserialize, Serialize};

use super::frame::SectionSize;
use super::{Tolerance, Vec2};

use std::f64::consts::{FRAC_PI_4, TAU};

/// Fewest segments a round profile is discretized with.
pub const MIN_ROUND_SEGMENTS: usize = 8;
/// Most segments a round profile is discretized with.
pub const MAX_ROUND_SEGMENTS: usize = 256;

/// Shape function applied at every frame of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionProfile {
    /// Four corners of a `width × height` rectangle.
    Rect,
    /// Discretized circle (ellipse when width and height differ).
    Round { segments: usize },
    /// Per-vertex blend between a rectangle and an ellipse; the blend factor is
    /// the frame parameter `u`, so the sweep starts square and ends round.
    SquareToRound { segments: usize },
}

impl SectionProfile {
    #[must_use]
    pub fn round(segments: usize) -> Self {
        Self::Round { segments }
    }

    #[must_use]
    pub fn square_to_round(segments: usize) -> Self {
        Self::SquareToRound { segments }
    }

    /// Number of boundary vertices `N` this profile produces.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match *self {
            Self::Rect => 4,
            Self::Round { segments } => segments.clamp(MIN_ROUND_SEGMENTS, MAX_ROUND_SEGMENTS),
            // Multiple of four so every rectangle corner is hit exactly.
            Self::SquareToRound { segments } => {
                segments.clamp(MIN_ROUND_SEGMENTS, MAX_ROUND_SEGMENTS).div_ceil(4) * 4
            }
        }
    }

    #[must_use]
    pub fn is_round(&self) -> bool {
        matches!(self, Self::Round { .. })
    }

    /// Realizes the outer boundary at `size`.
    #[must_use]
    pub fn outer(&self, size: SectionSize, u: f64) -> CrossSectionShape {
        self.realize(size, u, 0.0)
    }

    /// Realizes the inner boundary: the outer half-extents shrunk by `wall`,
    /// each clamped to [`Tolerance::MIN_EXTENT`].
    #[must_use]
    pub fn inner(&self, size: SectionSize, u: f64, wall: f64) -> CrossSectionShape {
        self.realize(size, u, wall.max(0.0))
    }

    /// Realizes the boundary grown outward by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, size: SectionSize, u: f64, margin: f64) -> CrossSectionShape {
        self.realize(size, u, -margin.max(0.0))
    }

    fn realize(&self, size: SectionSize, u: f64, inset: f64) -> CrossSectionShape {
        let min = Tolerance::MIN_EXTENT;
        let half = size.half_extents();
        let hw = min.at_least(half.x - inset);
        let hh = min.at_least(half.y - inset);
        let n = self.vertex_count();

        let offsets = match *self {
            Self::Rect => vec![
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
                Vec2::new(-hw, -hh),
            ],
            Self::Round { .. } => (0..n)
                .map(|k| {
                    let phi = TAU * k as f64 / n as f64;
                    Vec2::new(hw * phi.cos(), hh * phi.sin())
                })
                .collect(),
            Self::SquareToRound { .. } => {
                let blend = u.clamp(0.0, 1.0);
                (0..n)
                    .map(|k| {
                        let phi = FRAC_PI_4 + TAU * k as f64 / n as f64;
                        let (s, c) = phi.sin_cos();
                        let scale = 1.0 / c.abs().max(s.abs());
                        let on_rect = Vec2::new(hw * c * scale, hh * s * scale);
                        let on_ellipse = Vec2::new(hw * c, hh * s);
                        on_rect.lerp(on_ellipse, blend)
                    })
                    .collect()
            }
        };

        CrossSectionShape { offsets }
    }
}

/// Ordered 2D boundary offsets from a frame origin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrossSectionShape {
    pub offsets: Vec<Vec2>,
}

impl CrossSectionShape {
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Signed polygon area; positive for counter-clockwise boundaries.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let n = self.offsets.len();
        (0..n)
            .map(|i| self.offsets[i].perp_dot(self.offsets[(i + 1) % n]))
            .sum::<f64>()
            * 0.5
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        let n = self.offsets.len();
        (0..n)
            .map(|i| (self.offsets[(i + 1) % n] - self.offsets[i]).length())
            .sum()
    }

    /// Axis-aligned half extents of the boundary.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        self.offsets.iter().fold(Vec2::ZERO, |acc, p| {
            Vec2::new(acc.x.max(p.x.abs()), acc.y.max(p.y.abs()))
        })
    }

    /// Strict point-in-polygon test: points on the boundary are outside.
    #[must_use]
    pub fn contains_strict(&self, p: Vec2) -> bool {
        let n = self.offsets.len();
        if n < 3 {
            return false;
        }
        let orientation = self.signed_area().signum();
        (0..n).all(|i| {
            let a = self.offsets[i];
            let b = self.offsets[(i + 1) % n];
            (b - a).perp_dot(p - a) * orientation > 0.0
        })
    }
}
