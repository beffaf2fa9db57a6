//! Bocht met binnenradius en hoek. Een afwijkende uitlaatbreedte geeft een
//! bocht met variabele radius.

use crate::geom::{Point3, SectionSize, ShellEnd, SweepPath, Vec2, Vec3};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common::{self, DIAMETER, HEIGHT, ROUND, WIDTH};
use super::{DuctPart, GeometrySink};

pub const INNER_RADIUS: &str = "inner_radius";
pub const ANGLE: &str = "angle";
/// `0` betekent gelijk aan de inlaatbreedte.
pub const OUTLET_WIDTH: &str = "outlet_width";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

impl PartImpl {
    fn sections(params: &ResolvedParams) -> (SectionSize, SectionSize) {
        let (start, _) = common::section(params);
        let outlet = params.number(OUTLET_WIDTH);
        if params.flag(ROUND) || outlet <= 0.0 {
            return (start, start);
        }
        (start, SectionSize::rect(outlet, start.height))
    }
}

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        let mut specs = common::section_parameters(30.0, 20.0, 25.0);
        specs.extend([
            ParamSpec::number(OUTLET_WIDTH, "Breedte uitlaat", 0.0, 300.0, 0.5, Unit::Cm, 0.0),
            ParamSpec::number(INNER_RADIUS, "Binnenradius", 0.0, 300.0, 0.5, Unit::Cm, 15.0),
            ParamSpec::number(ANGLE, "Hoek", 1.0, 180.0, 1.0, Unit::Degree, 90.0),
            common::steps_param(12.0),
        ]);
        common::with_shared(specs)
    }

    fn active_parameters(&self, params: &ResolvedParams) -> Vec<ParamSpec> {
        let specs = common::active_section(self.parameters(), params);
        if params.flag(ROUND) || params.number(OUTLET_WIDTH) <= 0.0 {
            return specs.into_iter().filter(|s| s.key != OUTLET_WIDTH).collect();
        }
        specs
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let (_, profile) = common::section(params);
        let (start, end) = Self::sections(params);
        let inner_radius = params.number(INNER_RADIUS);
        let path = SweepPath::Arc {
            inner_radius,
            angle: params.number(ANGLE).to_radians(),
            start,
            end,
        };
        let shell = common::sweep(&path, profile, params, false);

        common::add_end_flanges(&shell, &[ShellEnd::Start, ShellEnd::End], params, sink);
        if let Some(first) = shell.start_frame() {
            common::add_section_dimensions(first, params, (WIDTH, HEIGHT), sink);
        }
        if !params.flag(ROUND) && end != start {
            if let Some(last) = shell.end_frame() {
                let half = last.size.half_extents();
                sink.add_dimension(common::dimension(
                    last.local_to_world(Vec2::new(-half.x, -half.y)),
                    last.local_to_world(Vec2::new(half.x, -half.y)),
                    -last.binormal,
                    OUTLET_WIDTH,
                ));
            }
        }

        // Radius from the bend centre to the inner wall at the inlet.
        let half = start.half_extents();
        let centre_x = -(inner_radius.max(0.0) + half.x);
        if inner_radius > 0.0 {
            sink.add_dimension(common::dimension(
                Point3::new(centre_x, -half.y, 0.0),
                Point3::new(-half.x, -half.y, 0.0),
                -Vec3::Z,
                INNER_RADIUS,
            ));
        }
        sink.add_shell(shell);
    }
}
