//! Overgang van rechthoek W×H naar rond D.

use crate::geom::{Point3, SectionProfile, SectionSize, ShellEnd, SweepPath, Vec2, Vec3};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common::{self, DIAMETER, HEIGHT, LENGTH, WIDTH};
use super::{DuctPart, GeometrySink};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        common::with_shared(vec![
            ParamSpec::number(WIDTH, "Breedte", 5.0, 300.0, 0.5, Unit::Cm, 40.0),
            ParamSpec::number(HEIGHT, "Hoogte", 5.0, 300.0, 0.5, Unit::Cm, 30.0),
            ParamSpec::number(DIAMETER, "Diameter", 5.0, 300.0, 0.5, Unit::Cm, 25.0),
            ParamSpec::number(LENGTH, "Lengte", 5.0, 300.0, 1.0, Unit::Cm, 40.0),
            common::segments_param(),
            common::steps_param(8.0),
        ])
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let start = SectionSize::rect(params.number(WIDTH), params.number(HEIGHT));
        let end = SectionSize::round(params.number(DIAMETER));
        let length = params.number(LENGTH);
        let path = SweepPath::Taper { length, start, end, offset: Vec2::ZERO };
        let profile = SectionProfile::square_to_round(common::round_segments(params));
        let shell = common::sweep(&path, profile, params, false);

        common::add_end_flanges(&shell, &[ShellEnd::Start, ShellEnd::End], params, sink);
        if let Some(first) = shell.start_frame() {
            common::add_section_dimensions(first, params, (WIDTH, HEIGHT), sink);
        }
        let radius = end.width * 0.5;
        sink.add_dimension(common::dimension(
            Point3::new(-radius, 0.0, length),
            Point3::new(radius, 0.0, length),
            Vec3::Z,
            DIAMETER,
        ));

        let half = start.half_extents();
        sink.add_dimension(common::dimension(
            Point3::new(half.x, -half.y, 0.0),
            Point3::new(half.x, -half.y, length),
            Vec3::X,
            LENGTH,
        ));
        sink.add_shell(shell);
    }
}
