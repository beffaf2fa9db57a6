//! Broekstuk met 1 tot 4 aftakkingen.
//!
//! Alle aftakkingen beginnen naast elkaar op het gedeelde inlaatvlak `z = 0`,
//! samen gecentreerd rond de oorsprong. Takken links van het midden buigen
//! naar `-X`, rechts naar `+X`, een tak precies in het midden loopt recht
//! door. Elke tak wordt lokaal gebouwd (bocht plus optioneel recht stuk) en
//! daarna star op zijn plek gezet. Over de inlaat ligt één gecombineerde flens.
//!
//! Bij gespiegelde opbouw deelt tak `i` zijn maten met tak `n - 1 - i`; de
//! maten van de linkerhelft gelden.

use std::f64::consts::PI;

use crate::dimension::{DimensionSpec, format_measure};
use crate::geom::{
    Frame, Point3, SectionProfile, SectionSize, ShellEnd, SweepPath, Transform, Vec2, Vec3,
    combined_flange, combined_size, compute_frames, loft_shell,
};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common;
use super::{DuctPart, GeometrySink, PartGeometry};

pub const MAX_BRANCHES: usize = 4;
pub const BRANCH_COUNT: &str = "branch_count";
pub const MIRRORED: &str = "mirrored";

const CENTRE_EPS: f64 = 1e-6;

#[must_use]
pub fn branch_key(index: usize, field: &str) -> String {
    format!("branch{}_{field}", index + 1)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Turn {
    Left,
    Right,
    Ahead,
}

/// Uitgerekende plaatsing van één tak.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Leg {
    /// Tak waarvan de maten komen.
    source: usize,
    size: SectionSize,
    angle: f64,
    inner_radius: f64,
    length: f64,
    centre_x: f64,
    turn: Turn,
}

impl PartImpl {
    fn count(params: &ResolvedParams) -> usize {
        let raw = params.number(BRANCH_COUNT);
        if raw.is_finite() {
            (raw.round() as usize).clamp(1, MAX_BRANCHES)
        } else {
            1
        }
    }

    fn source(index: usize, count: usize, mirrored: bool) -> usize {
        if mirrored { index.min(count - 1 - index) } else { index }
    }

    fn legs(params: &ResolvedParams) -> Vec<Leg> {
        let count = Self::count(params);
        let mirrored = params.flag(MIRRORED);

        let mut legs: Vec<Leg> = (0..count)
            .map(|i| {
                let source = Self::source(i, count, mirrored);
                let number = |field: &str| params.number(&branch_key(source, field));
                Leg {
                    source,
                    size: SectionSize::rect(number("width"), number("height")),
                    angle: number("angle").to_radians(),
                    inner_radius: number("radius").max(0.0),
                    length: number("length").max(0.0),
                    centre_x: 0.0,
                    turn: Turn::Ahead,
                }
            })
            .collect();

        let total: f64 = legs.iter().map(|l| l.size.width).sum();
        let mut left_edge = -total * 0.5;
        for leg in &mut legs {
            leg.centre_x = left_edge + leg.size.width * 0.5;
            left_edge += leg.size.width;
            leg.turn = if leg.centre_x < -CENTRE_EPS {
                Turn::Left
            } else if leg.centre_x > CENTRE_EPS {
                Turn::Right
            } else {
                Turn::Ahead
            };
        }

        // Nested bends on one side share a centre at minimum, so an inboard
        // bend never cuts into its outboard neighbour.
        let mut outboard: Option<(f64, f64)> = None;
        for leg in legs.iter_mut().filter(|l| l.turn == Turn::Left) {
            if let Some((radius, width)) = outboard {
                leg.inner_radius = leg.inner_radius.max(radius + width);
            }
            outboard = Some((leg.inner_radius, leg.size.width));
        }
        let mut outboard: Option<(f64, f64)> = None;
        for leg in legs.iter_mut().rev().filter(|l| l.turn == Turn::Right) {
            if let Some((radius, width)) = outboard {
                leg.inner_radius = leg.inner_radius.max(radius + width);
            }
            outboard = Some((leg.inner_radius, leg.size.width));
        }
        legs
    }

    /// Bouwt één tak in zijn eigen assenstelsel: inlaat in de oorsprong,
    /// raaklijn `+Z`.
    fn build_leg(leg: &Leg, params: &ResolvedParams) -> PartGeometry {
        let mut local = PartGeometry::new();
        let options = common::shell_options(params);
        let steps = common::steps(params);

        let bend = match leg.turn {
            Turn::Ahead => SweepPath::Straight {
                length: leg.inner_radius + leg.length,
                size: leg.size,
            },
            Turn::Left | Turn::Right => SweepPath::Arc {
                inner_radius: leg.inner_radius,
                angle: leg.angle,
                start: leg.size,
                end: leg.size,
            },
        };
        let mut last = loft_shell(&compute_frames(&bend, steps), SectionProfile::Rect, options);

        if leg.turn != Turn::Ahead && leg.length > 0.0 {
            if let Some(end) = last.end_frame().copied() {
                let run = SweepPath::Straight { length: leg.length, size: leg.size };
                let straight = loft_shell(&compute_frames(&run, 1), SectionProfile::Rect, options)
                    .transformed(end.to_transform());
                local.add_shell(last);
                last = straight;
            }
        }

        common::add_end_flanges(&last, &[ShellEnd::End], params, &mut local);
        if let Some(end) = last.end_frame() {
            // Right legs get a half turn about Z on placement; dimension them on
            // the local +binormal face so every width ends up on world -Y.
            let side = if leg.turn == Turn::Right { 1.0 } else { -1.0 };
            let half = end.size.half_extents();
            local.add_dimension(common::dimension(
                end.local_to_world(Vec2::new(-half.x, side * half.y)),
                end.local_to_world(Vec2::new(half.x, side * half.y)),
                end.binormal * side,
                &branch_key(leg.source, "width"),
            ));
        }
        local.add_shell(last);
        local
    }

    fn placement(leg: &Leg) -> Transform {
        let shift = Transform::translate(Vec3::new(leg.centre_x, 0.0, 0.0));
        match leg.turn {
            Turn::Right => shift * Transform::rotate_z(PI),
            Turn::Left | Turn::Ahead => shift,
        }
    }
}

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        let mut specs = vec![
            ParamSpec::number(BRANCH_COUNT, "Aantal takken", 1.0, MAX_BRANCHES as f64, 1.0, Unit::Count, 2.0),
            ParamSpec::flag(MIRRORED, "Gespiegeld", true),
        ];
        for i in 0..MAX_BRANCHES {
            let n = i + 1;
            specs.extend([
                ParamSpec::number(&branch_key(i, "width"), &format!("Breedte tak {n}"), 5.0, 200.0, 0.5, Unit::Cm, 25.0),
                ParamSpec::number(&branch_key(i, "height"), &format!("Hoogte tak {n}"), 5.0, 200.0, 0.5, Unit::Cm, 20.0),
                ParamSpec::number(&branch_key(i, "angle"), &format!("Hoek tak {n}"), 1.0, 90.0, 1.0, Unit::Degree, 45.0),
                ParamSpec::number(&branch_key(i, "radius"), &format!("Binnenradius tak {n}"), 0.0, 200.0, 0.5, Unit::Cm, 10.0),
                ParamSpec::number(&branch_key(i, "length"), &format!("Lengte tak {n}"), 0.0, 300.0, 1.0, Unit::Cm, 20.0),
            ]);
        }
        specs.push(common::steps_param(8.0));
        common::with_shared(specs)
    }

    /// Alleen de maten van takken die werkelijk gebouwd worden.
    fn active_parameters(&self, params: &ResolvedParams) -> Vec<ParamSpec> {
        let sources: Vec<String> = Self::legs(params)
            .iter()
            .map(|leg| format!("branch{}_", leg.source + 1))
            .collect();
        self.parameters()
            .into_iter()
            .filter(|spec| {
                !spec.key.starts_with("branch")
                    || spec.key == BRANCH_COUNT
                    || sources.iter().any(|prefix| spec.key.starts_with(prefix))
            })
            .collect()
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let legs = Self::legs(params);
        for leg in &legs {
            Self::build_leg(leg, params)
                .transformed(Self::placement(leg))
                .merge_into(sink);
        }

        let sizes: Vec<SectionSize> = legs.iter().map(|l| l.size).collect();
        let inlet = combined_size(&sizes);
        if params.flag(common::SHOW_FLANGES) {
            let plane = Frame::from_tangent_up(0.0, Point3::ORIGIN, -Vec3::Z, Vec3::Y, inlet);
            sink.add_flange(combined_flange(&plane, &sizes, common::flange_options(params)));
        }

        let (hw, hh) = (inlet.width * 0.5, inlet.height * 0.5);
        let (p1, p2) = (Point3::new(-hw, -hh, 0.0), Point3::new(hw, -hh, 0.0));
        sink.add_dimension(DimensionSpec::new(p1, p2, -Vec3::Y, format_measure(inlet.width, Unit::Cm)));
    }
}
