//! Verloopstuk: rechthoek W1×H1 naar W2×H2, eventueel excentrisch.

use crate::geom::{Point3, SectionProfile, SectionSize, ShellEnd, SweepPath, Vec2, Vec3};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common::{self, LENGTH};
use super::{DuctPart, GeometrySink};

pub const WIDTH_IN: &str = "width1";
pub const HEIGHT_IN: &str = "height1";
pub const WIDTH_OUT: &str = "width2";
pub const HEIGHT_OUT: &str = "height2";
pub const OFFSET_X: &str = "offset_x";
pub const OFFSET_Y: &str = "offset_y";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        common::with_shared(vec![
            ParamSpec::number(WIDTH_IN, "Breedte begin", 5.0, 300.0, 0.5, Unit::Cm, 40.0),
            ParamSpec::number(HEIGHT_IN, "Hoogte begin", 5.0, 300.0, 0.5, Unit::Cm, 30.0),
            ParamSpec::number(WIDTH_OUT, "Breedte eind", 5.0, 300.0, 0.5, Unit::Cm, 25.0),
            ParamSpec::number(HEIGHT_OUT, "Hoogte eind", 5.0, 300.0, 0.5, Unit::Cm, 20.0),
            ParamSpec::number(LENGTH, "Lengte", 5.0, 300.0, 1.0, Unit::Cm, 40.0),
            ParamSpec::number(OFFSET_X, "Excentriciteit X", -100.0, 100.0, 0.5, Unit::Cm, 0.0),
            ParamSpec::number(OFFSET_Y, "Excentriciteit Y", -100.0, 100.0, 0.5, Unit::Cm, 0.0),
            common::steps_param(4.0),
        ])
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let start = SectionSize::rect(params.number(WIDTH_IN), params.number(HEIGHT_IN));
        let end = SectionSize::rect(params.number(WIDTH_OUT), params.number(HEIGHT_OUT));
        let length = params.number(LENGTH);
        let offset = Vec2::new(params.number(OFFSET_X), params.number(OFFSET_Y));
        let path = SweepPath::Taper { length, start, end, offset };
        let shell = common::sweep(&path, SectionProfile::Rect, params, false);

        common::add_end_flanges(&shell, &[ShellEnd::Start, ShellEnd::End], params, sink);
        if let Some(first) = shell.start_frame() {
            common::add_section_dimensions(first, params, (WIDTH_IN, HEIGHT_IN), sink);
        }
        if let Some(last) = shell.end_frame() {
            common::add_section_dimensions(last, params, (WIDTH_OUT, HEIGHT_OUT), sink);
        }

        // Axial length, measured along the side regardless of eccentricity.
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
