//! Verspringing: gelijke sectie aan beide einden, hartlijn zijdelings verzet.

use crate::geom::{Point3, ShellEnd, SweepPath, Vec2, Vec3};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common::{self, HEIGHT, LENGTH, WIDTH};
use super::{DuctPart, GeometrySink};

pub const OFFSET: &str = "offset";
pub const OFFSET_VERTICAL: &str = "offset_vertical";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        let mut specs = common::section_parameters(30.0, 20.0, 25.0);
        specs.extend([
            ParamSpec::number(LENGTH, "Lengte", 5.0, 300.0, 1.0, Unit::Cm, 60.0),
            ParamSpec::number(OFFSET, "Verzet", -150.0, 150.0, 0.5, Unit::Cm, 20.0),
            ParamSpec::number(OFFSET_VERTICAL, "Verzet verticaal", -150.0, 150.0, 0.5, Unit::Cm, 0.0),
            common::steps_param(2.0),
        ]);
        common::with_shared(specs)
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let (size, profile) = common::section(params);
        let length = params.number(LENGTH);
        let shift = Vec2::new(params.number(OFFSET), params.number(OFFSET_VERTICAL));
        let path = SweepPath::Taper { length, start: size, end: size, offset: shift };
        let shell = common::sweep(&path, profile, params, false);

        common::add_end_flanges(&shell, &[ShellEnd::Start, ShellEnd::End], params, sink);
        if let Some(first) = shell.start_frame() {
            common::add_section_dimensions(first, params, (WIDTH, HEIGHT), sink);
        }

        let half = size.half_extents();
        sink.add_dimension(common::dimension(
            Point3::new(-half.x, -half.y, 0.0),
            Point3::new(-half.x, -half.y, length),
            -Vec3::X,
            LENGTH,
        ));
        if shift.x != 0.0 {
            // Centre-to-centre shift, drawn across the outlet plane.
            sink.add_dimension(common::dimension(
                Point3::new(0.0, -half.y, length),
                Point3::new(shift.x, -half.y, length),
                Vec3::Z,
                OFFSET,
            ));
        }
        sink.add_shell(shell);
    }
}
