//! Screen-space label declutter.
//!
//! Labels are projected to the screen, tested pairwise for overlap of their
//! padded boxes, and pushed apart along the axis with the smaller overlap. The
//! work is time-sliced: every render tick spends a bounded iteration budget,
//! a larger one for a few ticks after the camera moved. Displacements are
//! applied in world space; the anchors themselves never move.

use serde::{Deserialize, Serialize};

use crate::geom::{Point3, Vec2, Vec3};

use super::annotation::Label;

/// Pinhole camera looking from `position` at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Point3,
    pub target: Point3,
    pub up: Vec3,
    pub fov_y: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

/// Pixel coordinates (y grows downward) and view depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

const NEAR_DEPTH: f64 = 1e-6;

impl Camera {
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.target.sub_point(self.position).normalized().unwrap_or(-Vec3::Z)
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        let forward = self.forward();
        forward
            .cross(self.up)
            .normalized()
            .or_else(|| forward.cross(Vec3::Z).normalized())
            .unwrap_or(Vec3::X)
    }

    /// Screen-up direction in world space.
    #[must_use]
    pub fn up_vector(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    fn half_height_slope(&self) -> f64 {
        (self.fov_y.clamp(1e-3, std::f64::consts::PI - 1e-3) * 0.5).tan()
    }

    fn viewport(&self) -> (f64, f64) {
        (self.viewport_width.max(1.0), self.viewport_height.max(1.0))
    }

    /// Projects `p` to pixels; `None` behind the camera.
    #[must_use]
    pub fn project(&self, p: Point3) -> Option<ScreenPoint> {
        let d = p.sub_point(self.position);
        let depth = d.dot(self.forward());
        if depth <= NEAR_DEPTH || !depth.is_finite() {
            return None;
        }
        let (w, h) = self.viewport();
        let slope = self.half_height_slope();
        let x_ndc = d.dot(self.right()) / (depth * slope * (w / h));
        let y_ndc = d.dot(self.up_vector()) / (depth * slope);
        Some(ScreenPoint {
            x: (x_ndc + 1.0) * 0.5 * w,
            y: (1.0 - y_ndc) * 0.5 * h,
            depth,
        })
    }

    /// World size of one pixel at `depth`.
    #[must_use]
    pub fn world_per_pixel(&self, depth: f64) -> f64 {
        let (_, h) = self.viewport();
        2.0 * depth.max(NEAR_DEPTH) * self.half_height_slope() / h
    }

    /// World displacement for a screen offset at `depth`.
    #[must_use]
    pub fn screen_to_world_offset(&self, offset: Vec2, depth: f64) -> Vec3 {
        let wpp = self.world_per_pixel(depth);
        self.right() * (offset.x * wpp) + self.up_vector() * (-offset.y * wpp)
    }
}

/// A label box in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLabel {
    /// Projected anchor, in pixels.
    pub anchor: Vec2,
    /// Box width and height, in pixels.
    pub size: Vec2,
    /// Accumulated declutter offset, in pixels.
    pub offset: Vec2,
}

impl ScreenLabel {
    #[must_use]
    pub fn new(anchor: Vec2, size: Vec2) -> Self {
        Self { anchor, size, offset: Vec2::ZERO }
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.anchor + self.offset
    }

    /// Overlap along x and y of the boxes grown by `padding / 2` per side.
    /// Positive on both axes means the boxes intersect.
    #[must_use]
    pub fn overlap(&self, other: &Self, padding: f64) -> Vec2 {
        let delta = self.center() - other.center();
        Vec2::new(
            (self.size.x + other.size.x) * 0.5 + padding - delta.x.abs(),
            (self.size.y + other.size.y) * 0.5 + padding - delta.y.abs(),
        )
    }
}

/// Runs `iterations` relaxation passes; returns the overlapping pair count of
/// the last pass.
pub fn resolve_overlaps(labels: &mut [ScreenLabel], padding: f64, iterations: usize, damping: f64, max_offset: f64) -> usize {
    let damping = damping.clamp(0.0, 1.0);
    let mut overlapping = 0;

    for _ in 0..iterations {
        overlapping = 0;
        for i in 0..labels.len() {
            for j in (i + 1)..labels.len() {
                let overlap = labels[i].overlap(&labels[j], padding);
                if overlap.x <= 0.0 || overlap.y <= 0.0 {
                    continue;
                }
                overlapping += 1;

                let delta = labels[i].center() - labels[j].center();
                let push = if overlap.x <= overlap.y {
                    Vec2::new(overlap.x * side(delta.x), 0.0)
                } else {
                    Vec2::new(0.0, overlap.y * side(delta.y))
                };
                let step = push * (0.5 * damping);

                labels[i].offset = (labels[i].offset + step).clamp_length(max_offset);
                labels[j].offset = (labels[j].offset - step).clamp_length(max_offset);
            }
        }
        if overlapping == 0 {
            break;
        }
    }

    overlapping
}

// Coincident centres split deterministically: the earlier label moves negative.
fn side(delta: f64) -> f64 {
    if delta > 0.0 { 1.0 } else { -1.0 }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclutterConfig {
    pub padding_rest: f64,
    pub padding_active: f64,
    pub iterations_rest: usize,
    pub iterations_active: usize,
    /// Ticks the active budget lasts after the camera moved.
    pub active_frames: usize,
    pub damping: f64,
    pub max_offset: f64,
    /// Approximate glyph box used to size labels, in pixels.
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for DeclutterConfig {
    fn default() -> Self {
        Self {
            padding_rest: 4.0,
            padding_active: 8.0,
            iterations_rest: 2,
            iterations_active: 8,
            active_frames: 6,
            damping: 0.8,
            max_offset: 120.0,
            char_width: 7.0,
            line_height: 16.0,
        }
    }
}

/// Declutter state carried between render ticks.
#[derive(Debug, Clone, Default)]
pub struct LabelDeclutter {
    pub config: DeclutterConfig,
    last_camera: Option<Camera>,
    active_left: usize,
    offsets: Vec<Vec2>,
}

impl LabelDeclutter {
    #[must_use]
    pub fn new(config: DeclutterConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Drops accumulated offsets, e.g. after a rebuild replaced the labels.
    pub fn reset(&mut self) {
        self.offsets.clear();
        self.last_camera = None;
        self.active_left = 0;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active_left > 0
    }

    /// One render tick: relaxes offsets within this tick's budget and writes
    /// displaced positions into `labels`. Anchors are left untouched.
    pub fn tick(&mut self, camera: &Camera, labels: &mut [Label]) {
        if self.last_camera.as_ref() != Some(camera) {
            self.last_camera = Some(*camera);
            self.active_left = self.config.active_frames;
        }
        if self.offsets.len() != labels.len() {
            self.offsets = vec![Vec2::ZERO; labels.len()];
        }

        let (padding, iterations) = if self.active_left > 0 {
            self.active_left -= 1;
            (self.config.padding_active, self.config.iterations_active)
        } else {
            (self.config.padding_rest, self.config.iterations_rest)
        };

        let projected: Vec<Option<ScreenPoint>> = labels.iter().map(|l| camera.project(l.anchor)).collect();
        let visible: Vec<usize> = (0..labels.len()).filter(|&i| projected[i].is_some()).collect();

        let mut boxes: Vec<ScreenLabel> = visible
            .iter()
            .filter_map(|&i| {
                let screen = projected[i]?;
                let chars = labels[i].text.chars().count().max(1) as f64;
                Some(ScreenLabel {
                    anchor: screen.xy(),
                    size: Vec2::new(chars * self.config.char_width, self.config.line_height),
                    offset: self.offsets[i],
                })
            })
            .collect();

        resolve_overlaps(&mut boxes, padding, iterations, self.config.damping, self.config.max_offset);

        for (slot, &i) in visible.iter().enumerate() {
            self.offsets[i] = boxes[slot].offset;
        }

        for (i, label) in labels.iter_mut().enumerate() {
            label.position = match projected[i] {
                Some(screen) => label.anchor + camera.screen_to_world_offset(self.offsets[i], screen.depth),
                None => label.anchor,
            };
        }
    }
}
