//! Gedeelde parameters en bouwstenen voor alle kanaalvormen.

use crate::dimension::{DimensionSpec, format_measure};
use crate::geom::{
    FlangeOptions, Frame, MAX_ROUND_SEGMENTS, MIN_ROUND_SEGMENTS, Point3, SectionProfile, SectionSize,
    ShellEnd, ShellMesh, ShellOptions, SweepPath, Vec2, Vec3, compute_frames, end_flange, loft_shell,
};
use crate::params::{ParamRole, ParamSpec, ResolvedParams, THICKNESS_KEY, Unit};

use super::GeometrySink;

pub const FLANGE_LIP: &str = "flange_lip";
pub const FLANGE_THICKNESS: &str = "flange_thickness";
pub const SHOW_FLANGES: &str = "show_flanges";
pub const INCLUDE_FLANGE_AREA: &str = "include_flange_area";
pub const K_FACTOR: &str = "k_factor";
pub const WASTE_PERCENT: &str = "waste_percent";
pub const COLOR: &str = "color";
pub const STEPS: &str = "steps";
pub const SEGMENTS: &str = "segments";
pub const ROUND: &str = "round";

pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const DIAMETER: &str = "diameter";
pub const LENGTH: &str = "length";

pub const DEFAULT_COLOR: &str = "#9ca3af";

/// Parameters die elk onderdeel deelt.
#[must_use]
pub fn shared_parameters() -> Vec<ParamSpec> {
    vec![
        ParamSpec::number(THICKNESS_KEY, "Wanddikte", 0.04, 0.3, 0.01, Unit::Cm, 0.08),
        ParamSpec::number(FLANGE_LIP, "Flensrand", 0.5, 10.0, 0.5, Unit::Cm, 3.0).with_role(ParamRole::Other),
        ParamSpec::number(FLANGE_THICKNESS, "Flensdikte", 0.1, 3.0, 0.1, Unit::Cm, 0.5)
            .with_role(ParamRole::Other),
        ParamSpec::flag(SHOW_FLANGES, "Flenzen tonen", true),
        ParamSpec::flag(INCLUDE_FLANGE_AREA, "Flensoppervlak meetellen", false),
        ParamSpec::number(K_FACTOR, "K-factor", 1.0, 2.0, 0.01, Unit::Factor, 1.1),
        ParamSpec::number(WASTE_PERCENT, "Snijverlies", 0.0, 50.0, 1.0, Unit::Percent, 10.0),
        ParamSpec::color(COLOR, "Kleur", DEFAULT_COLOR),
    ]
}

/// Vormspecifieke parameters gevolgd door de gedeelde.
#[must_use]
pub fn with_shared(mut specs: Vec<ParamSpec>) -> Vec<ParamSpec> {
    specs.extend(shared_parameters());
    specs
}

#[must_use]
pub fn steps_param(default: f64) -> ParamSpec {
    ParamSpec::number(STEPS, "Segmenten langs pad", 1.0, 64.0, 1.0, Unit::Count, default)
}

#[must_use]
pub fn segments_param() -> ParamSpec {
    ParamSpec::number(
        SEGMENTS,
        "Segmenten rond",
        MIN_ROUND_SEGMENTS as f64,
        64.0,
        1.0,
        Unit::Count,
        32.0,
    )
}

/// Rechthoek- of rondsectieparameters met `round`-schakelaar.
#[must_use]
pub fn section_parameters(width: f64, height: f64, diameter: f64) -> Vec<ParamSpec> {
    vec![
        ParamSpec::flag(ROUND, "Rond", false),
        ParamSpec::number(WIDTH, "Breedte", 5.0, 300.0, 0.5, Unit::Cm, width),
        ParamSpec::number(HEIGHT, "Hoogte", 5.0, 300.0, 0.5, Unit::Cm, height),
        ParamSpec::number(DIAMETER, "Diameter", 5.0, 300.0, 0.5, Unit::Cm, diameter),
        segments_param(),
    ]
}

/// Laat de sectiematen van de niet-gekozen vorm weg.
#[must_use]
pub fn active_section(specs: Vec<ParamSpec>, params: &ResolvedParams) -> Vec<ParamSpec> {
    if !specs.iter().any(|s| s.key == ROUND) {
        return specs;
    }
    let inactive: &[&str] = if params.flag(ROUND) { &[WIDTH, HEIGHT] } else { &[DIAMETER] };
    specs.into_iter().filter(|s| !inactive.contains(&s.key.as_str())).collect()
}

#[must_use]
pub fn shell_options(params: &ResolvedParams) -> ShellOptions {
    ShellOptions { wall_thickness: params.number(THICKNESS_KEY), cap_end: false }
}

#[must_use]
pub fn flange_options(params: &ResolvedParams) -> FlangeOptions {
    FlangeOptions {
        lip: params.number(FLANGE_LIP),
        thickness: params.number(FLANGE_THICKNESS),
    }
    .clamped()
}

#[must_use]
pub fn steps(params: &ResolvedParams) -> usize {
    count(params.number(STEPS), 1)
}

#[must_use]
pub fn round_segments(params: &ResolvedParams) -> usize {
    count(params.number(SEGMENTS), MIN_ROUND_SEGMENTS).min(MAX_ROUND_SEGMENTS)
}

fn count(value: f64, min: usize) -> usize {
    if value.is_finite() && value >= min as f64 {
        value.round() as usize
    } else {
        min
    }
}

/// Sectie en profiel volgens de `round`-schakelaar.
#[must_use]
pub fn section(params: &ResolvedParams) -> (SectionSize, SectionProfile) {
    if params.flag(ROUND) {
        (
            SectionSize::round(params.number(DIAMETER)),
            SectionProfile::round(round_segments(params)),
        )
    } else {
        (
            SectionSize::rect(params.number(WIDTH), params.number(HEIGHT)),
            SectionProfile::Rect,
        )
    }
}

/// Frames berekenen en de mantel loften.
#[must_use]
pub fn sweep(path: &SweepPath, profile: SectionProfile, params: &ResolvedParams, cap_end: bool) -> ShellMesh {
    let frames = compute_frames(path, steps(params));
    loft_shell(&frames, profile, ShellOptions { cap_end, ..shell_options(params) })
}

/// Flenzen op de gevraagde open einden, mits `show_flanges`.
pub fn add_end_flanges(shell: &ShellMesh, ends: &[ShellEnd], params: &ResolvedParams, sink: &mut dyn GeometrySink) {
    if !params.flag(SHOW_FLANGES) {
        return;
    }
    let options = flange_options(params);
    for end in ends {
        if let Some(flange) = end_flange(shell, *end, options) {
            sink.add_flange(flange);
        }
    }
}

/// Maatlijn tussen twee punten, gelabeld met de gemeten lengte en gekoppeld
/// aan parameter `key`.
#[must_use]
pub fn dimension(p1: Point3, p2: Point3, direction: Vec3, key: &str) -> DimensionSpec {
    DimensionSpec::new(p1, p2, direction, format_measure(p1.distance_to(p2), Unit::Cm)).bound_to(key)
}

/// Breedte- en hoogtematen (of diameter) over het vlak van een frame.
pub fn add_section_dimensions(
    frame: &Frame,
    params: &ResolvedParams,
    keys: (&str, &str),
    sink: &mut dyn GeometrySink,
) {
    let half = frame.size.half_extents();
    let corner = |x: f64, y: f64| frame.local_to_world(Vec2::new(x, y));
    if params.flag(ROUND) {
        sink.add_dimension(dimension(corner(-half.x, 0.0), corner(half.x, 0.0), -frame.binormal, DIAMETER));
        return;
    }
    sink.add_dimension(dimension(
        corner(-half.x, -half.y),
        corner(half.x, -half.y),
        -frame.binormal,
        keys.0,
    ));
    sink.add_dimension(dimension(
        corner(half.x, -half.y),
        corner(half.x, half.y),
        frame.normal,
        keys.1,
    ));
}
