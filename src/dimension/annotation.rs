//! Dimension annotation geometry: extension lines, inset dimension line,
//! arrow heads and a label anchor.

use serde::Serialize;

use crate::geom::{GeomMesh, Point3, Transform, Vec3, finalize_mesh};
use crate::params::{ParamSpec, PartParameters, Unit};

/// How far extension lines reach along the offset direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtensionExtent {
    /// Fixed length past the gap.
    Length(f64),
    /// Up to a plane `offset` beyond the outermost anchor, so both lines end
    /// on a common plane even when the anchors differ along the direction.
    PlaneOffset(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionConfig {
    /// Distance between an anchor and the start of its extension line.
    pub gap: f64,
    pub extent: ExtensionExtent,
    /// Arrow head length.
    pub arrow_head: f64,
    pub arrow_radius: f64,
    /// Inset of the dimension line at each end.
    pub dim_offset: f64,
    pub label_offset: f64,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self {
            gap: 1.0,
            extent: ExtensionExtent::Length(8.0),
            arrow_head: 2.0,
            arrow_radius: 0.6,
            dim_offset: 0.5,
            label_offset: 2.0,
        }
    }
}

/// A declared dimension between two anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionSpec {
    pub p1: Point3,
    pub p2: Point3,
    /// Offset direction; normalized, replaced when parallel to the edge.
    pub direction: Vec3,
    pub label: String,
    pub color: String,
    pub config: DimensionConfig,
    /// Parameter the label edits, if any.
    pub param: Option<String>,
}

impl DimensionSpec {
    #[must_use]
    pub fn new(p1: Point3, p2: Point3, direction: Vec3, label: impl Into<String>) -> Self {
        Self {
            p1,
            p2,
            direction,
            label: label.into(),
            color: "#1f2937".to_owned(),
            config: DimensionConfig::default(),
            param: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DimensionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn bound_to(mut self, key: impl Into<String>) -> Self {
        self.param = Some(key.into());
        self
    }

    /// Returns the spec with its anchors and direction mapped by `transform`.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        Self {
            p1: transform.apply_point(self.p1),
            p2: transform.apply_point(self.p2),
            direction: transform.apply_vec(self.direction),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn measured_length(&self) -> f64 {
        self.p1.distance_to(self.p2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub start: Point3,
    pub end: Point3,
}

impl Segment {
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrow {
    pub tip: Point3,
    /// Unit vector the tip points along.
    pub direction: Vec3,
    pub length: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    /// Undisplaced world position; re-projected every frame.
    pub anchor: Point3,
    /// Displayed world position after declutter.
    pub position: Point3,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionAnnotation {
    pub extension_lines: [Segment; 2],
    pub dimension_line: Segment,
    pub arrows: [Arrow; 2],
    pub label: Label,
}

impl DimensionAnnotation {
    /// Every line segment, for renderers that draw plain line lists.
    #[must_use]
    pub fn segments(&self) -> [Segment; 3] {
        [self.extension_lines[0], self.extension_lines[1], self.dimension_line]
    }
}

/// Builds the annotation geometry for `spec`.
#[must_use]
pub fn build_dimension(spec: &DimensionSpec) -> DimensionAnnotation {
    let cfg = spec.config;
    let edge = spec.p2.sub_point(spec.p1);
    let along = edge.normalized().unwrap_or(Vec3::X);
    let n = offset_direction(spec.direction, along);

    let gap = cfg.gap.max(0.0);
    let reach = |p: Point3| -> f64 {
        match cfg.extent {
            ExtensionExtent::Length(len) => gap + len.max(0.0),
            ExtensionExtent::PlaneOffset(offset) => {
                let plane = spec.p1.to_vec3().dot(n).max(spec.p2.to_vec3().dot(n)) + offset;
                (plane - p.to_vec3().dot(n)).max(gap)
            }
        }
    };

    let ext1 = Segment { start: spec.p1 + n * gap, end: spec.p1 + n * reach(spec.p1) };
    let ext2 = Segment { start: spec.p2 + n * gap, end: spec.p2 + n * reach(spec.p2) };

    let span = ext2.end.sub_point(ext1.end);
    let span_len = span.length();
    let dir = span.normalized().unwrap_or(along);
    let inset = cfg.dim_offset.clamp(0.0, span_len * 0.45);
    let dimension_line = Segment {
        start: ext1.end + dir * inset,
        end: ext2.end - dir * inset,
    };

    let arrow = |tip: Point3, direction: Vec3| Arrow {
        tip,
        direction,
        length: cfg.arrow_head.max(0.0),
        radius: cfg.arrow_radius.max(0.0),
    };
    let arrows = [
        arrow(dimension_line.start, -dir),
        arrow(dimension_line.end, dir),
    ];

    let anchor = dimension_line.start.midpoint(dimension_line.end) + n * cfg.label_offset;
    let label = Label {
        text: spec.label.clone(),
        anchor,
        position: anchor,
        color: spec.color.clone(),
        param: spec.param.clone(),
    };

    DimensionAnnotation {
        extension_lines: [ext1, ext2],
        dimension_line,
        arrows,
        label,
    }
}

/// Unit offset direction, or a stable perpendicular to the edge when
/// `direction` is zero or runs along it.
fn offset_direction(direction: Vec3, along: Vec3) -> Vec3 {
    direction
        .normalized()
        .filter(|n| n.dot(along).abs() < 1.0 - 1e-9)
        .or_else(|| Vec3::Y.cross(along).normalized())
        .or_else(|| Vec3::Z.cross(along).normalized())
        .unwrap_or(Vec3::Y)
}

/// Cone mesh for an arrow head: apex at the tip, closed base.
#[must_use]
pub fn arrow_mesh(arrow: &Arrow, segments: usize) -> GeomMesh {
    let segments = segments.max(3);
    let axis = arrow.direction.normalized().unwrap_or(Vec3::X);
    let u = Vec3::Y
        .cross(axis)
        .normalized()
        .or_else(|| Vec3::Z.cross(axis).normalized())
        .unwrap_or(Vec3::X);
    let v = axis.cross(u);
    let base = arrow.tip - axis * arrow.length;

    let mut points = vec![arrow.tip, base];
    points.extend((0..segments).map(|k| {
        let theta = std::f64::consts::TAU * k as f64 / segments as f64;
        base + (u * theta.cos() + v * theta.sin()) * arrow.radius
    }));

    let mut indices = Vec::with_capacity(segments * 6);
    for k in 0..segments as u32 {
        let a = 2 + k;
        let b = 2 + (k + 1) % segments as u32;
        indices.extend_from_slice(&[a, b, 0]);
        indices.extend_from_slice(&[1, b, a]);
    }

    finalize_mesh(points, indices).0
}

/// Edit control surfaced when a bound label is activated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditableControl {
    pub key: String,
    pub label: String,
    pub unit: Unit,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

impl EditableControl {
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Control for `label`'s bound parameter; `None` when unbound or not numeric.
#[must_use]
pub fn editable_control(label: &Label, specs: &[ParamSpec], params: &PartParameters) -> Option<EditableControl> {
    let key = label.param.as_deref()?;
    let spec = specs.iter().find(|s| s.key == key && s.is_number())?;
    let value = params
        .number(key)
        .or_else(|| spec.default.as_number())?;
    Some(EditableControl {
        key: spec.key.clone(),
        label: spec.label.clone(),
        unit: spec.unit,
        min: spec.min,
        max: spec.max,
        step: spec.step,
        value,
    })
}

/// Formats a measured value for a label, e.g. `"25 cm"` or `"12.5 cm"`.
#[must_use]
pub fn format_measure(value: f64, unit: Unit) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    let text = if rounded.fract().abs() < 1e-9 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    };
    match unit.symbol() {
        "" => text,
        "°" => format!("{text}°"),
        symbol => format!("{text} {symbol}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point3, b: Point3) -> bool {
        a.distance_to(b) < 1e-9
    }

    #[test]
    fn extension_lines_start_at_gap() {
        let spec = DimensionSpec::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Vec3::Y,
            "10 cm",
        )
        .with_config(DimensionConfig {
            gap: 1.0,
            extent: ExtensionExtent::Length(4.0),
            dim_offset: 0.5,
            label_offset: 2.0,
            ..DimensionConfig::default()
        });
        let dim = build_dimension(&spec);

        assert!(approx(dim.extension_lines[0].start, Point3::new(0.0, 1.0, 0.0)));
        assert!(approx(dim.extension_lines[0].end, Point3::new(0.0, 5.0, 0.0)));
        assert!(approx(dim.extension_lines[1].end, Point3::new(10.0, 5.0, 0.0)));
        assert!(approx(dim.dimension_line.start, Point3::new(0.5, 5.0, 0.0)));
        assert!(approx(dim.dimension_line.end, Point3::new(9.5, 5.0, 0.0)));
        assert!(approx(dim.label.anchor, Point3::new(5.0, 7.0, 0.0)));
        assert_eq!(dim.label.anchor, dim.label.position);
    }

    #[test]
    fn arrows_point_outward() {
        let spec = DimensionSpec::new(Point3::ORIGIN, Point3::new(0.0, 0.0, 20.0), Vec3::X, "20");
        let dim = build_dimension(&spec);

        assert!((dim.arrows[0].direction.dot(-Vec3::Z) - 1.0).abs() < 1e-12);
        assert!((dim.arrows[1].direction.dot(Vec3::Z) - 1.0).abs() < 1e-12);
        assert_eq!(dim.arrows[0].tip, dim.dimension_line.start);
    }

    #[test]
    fn plane_offset_aligns_line_ends() {
        let spec = DimensionSpec::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 3.0, 0.0),
            Vec3::Y,
            "stepped",
        )
        .with_config(DimensionConfig {
            gap: 0.5,
            extent: ExtensionExtent::PlaneOffset(4.0),
            ..DimensionConfig::default()
        });
        let dim = build_dimension(&spec);

        let n = dim.extension_lines[0].end.sub_point(dim.extension_lines[0].start).normalized().expect("dir");
        let e1 = dim.extension_lines[0].end.to_vec3().dot(n);
        let e2 = dim.extension_lines[1].end.to_vec3().dot(n);
        assert!((e1 - e2).abs() < 1e-9);
        let top = spec.p1.to_vec3().dot(n).max(spec.p2.to_vec3().dot(n));
        assert!((e1 - top - 4.0).abs() < 1e-9);
    }

    #[test]
    fn direction_parallel_to_edge_falls_back() {
        let spec = DimensionSpec::new(Point3::ORIGIN, Point3::new(5.0, 0.0, 0.0), Vec3::X, "x");
        let dim = build_dimension(&spec);
        let n = dim.extension_lines[0].end.sub_point(dim.extension_lines[0].start);
        assert!(n.dot(Vec3::X).abs() < 1e-12);
        assert!(n.length() > 0.0);
    }

    #[test]
    fn arrow_mesh_is_closed_cone() {
        let arrow = Arrow { tip: Point3::new(1.0, 2.0, 3.0), direction: Vec3::Z, length: 2.0, radius: 0.5 };
        let mesh = arrow_mesh(&arrow, 12);
        assert_eq!(mesh.triangle_count(), 24);
        assert!(mesh.validate().is_ok());
        let (_, diag) = finalize_mesh(
            mesh.positions.iter().map(|p| Point3::from_array(*p)).collect(),
            mesh.indices.clone(),
        );
        assert!(diag.is_valid_solid());
    }

    #[test]
    fn format_measure_trims_whole_numbers() {
        assert_eq!(format_measure(25.0, Unit::Cm), "25 cm");
        assert_eq!(format_measure(12.54, Unit::Cm), "12.5 cm");
        assert_eq!(format_measure(90.0, Unit::Degree), "90°");
    }
}
