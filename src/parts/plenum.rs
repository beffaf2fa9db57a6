//! Plenumbox: rechthoekige kast, gesloten aan de achterzijde, met een ronde
//! aansluitstomp op het deksel.

use crate::geom::{Point3, SectionProfile, SectionSize, ShellEnd, SweepPath, Transform, Vec3};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common::{self, HEIGHT, WIDTH};
use super::{DuctPart, GeometrySink, PartGeometry};

pub const DEPTH: &str = "depth";
pub const SPIGOT_DIAMETER: &str = "spigot_diameter";
pub const COLLAR_LENGTH: &str = "collar_length";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

impl PartImpl {
    /// Stomp past altijd binnen het deksel.
    fn spigot_diameter(params: &ResolvedParams) -> f64 {
        params
            .number(SPIGOT_DIAMETER)
            .min(params.number(WIDTH))
            .min(params.number(HEIGHT))
    }
}

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        common::with_shared(vec![
            ParamSpec::number(WIDTH, "Breedte", 10.0, 300.0, 0.5, Unit::Cm, 60.0),
            ParamSpec::number(HEIGHT, "Hoogte", 10.0, 300.0, 0.5, Unit::Cm, 40.0),
            ParamSpec::number(DEPTH, "Diepte", 5.0, 300.0, 0.5, Unit::Cm, 50.0),
            ParamSpec::number(SPIGOT_DIAMETER, "Diameter stomp", 5.0, 300.0, 0.5, Unit::Cm, 25.0),
            ParamSpec::number(COLLAR_LENGTH, "Lengte stomp", 2.0, 50.0, 0.5, Unit::Cm, 10.0),
            common::segments_param(),
            common::steps_param(1.0),
        ])
    }

    /// De stomp is nooit groter dan het deksel en telt dus niet mee.
    fn active_parameters(&self, _params: &ResolvedParams) -> Vec<ParamSpec> {
        self.parameters().into_iter().filter(|s| s.key != SPIGOT_DIAMETER).collect()
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let size = SectionSize::rect(params.number(WIDTH), params.number(HEIGHT));
        let depth = params.number(DEPTH);
        let body = common::sweep(&SweepPath::Straight { length: depth, size }, SectionProfile::Rect, params, true);
        common::add_end_flanges(&body, &[ShellEnd::Start], params, sink);
        if let Some(first) = body.start_frame() {
            common::add_section_dimensions(first, params, (WIDTH, HEIGHT), sink);
        }

        // The spigot is built at the origin and moved onto the closed face.
        let diameter = Self::spigot_diameter(params);
        let collar = params.number(COLLAR_LENGTH);
        let mut spigot = PartGeometry::new();
        let shell = common::sweep(
            &SweepPath::Straight { length: collar, size: SectionSize::round(diameter) },
            SectionProfile::round(common::round_segments(params)),
            params,
            false,
        );
        common::add_end_flanges(&shell, &[ShellEnd::End], params, &mut spigot);
        spigot.add_dimension(common::dimension(
            Point3::new(-diameter * 0.5, 0.0, collar),
            Point3::new(diameter * 0.5, 0.0, collar),
            Vec3::Z,
            SPIGOT_DIAMETER,
        ));
        spigot.add_dimension(common::dimension(
            Point3::new(diameter * 0.5, 0.0, 0.0),
            Point3::new(diameter * 0.5, 0.0, collar),
            Vec3::X,
            COLLAR_LENGTH,
        ));
        spigot.add_shell(shell);

        let half = size.half_extents();
        sink.add_dimension(common::dimension(
            Point3::new(half.x, -half.y, 0.0),
            Point3::new(half.x, -half.y, depth),
            Vec3::X,
            DEPTH,
        ));
        sink.add_shell(body);
        spigot
            .transformed(Transform::translate(Vec3::new(0.0, 0.0, depth)))
            .merge_into(sink);
    }
}
