//! Koppelstuk: korte mof met flenzen aan beide zijden.

use crate::geom::{Point3, ShellEnd, SweepPath, Vec3};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common::{self, LENGTH};
use super::{DuctPart, GeometrySink};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        let mut specs = common::section_parameters(25.0, 25.0, 20.0);
        specs.push(ParamSpec::number(LENGTH, "Lengte", 2.0, 50.0, 0.5, Unit::Cm, 15.0));
        specs.push(common::steps_param(1.0));
        common::with_shared(specs)
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let (size, profile) = common::section(params);
        let length = params.number(LENGTH);
        let shell = common::sweep(&SweepPath::Straight { length, size }, profile, params, false);

        common::add_end_flanges(&shell, &[ShellEnd::Start, ShellEnd::End], params, sink);
        if let Some(first) = shell.start_frame() {
            common::add_section_dimensions(first, params, (common::WIDTH, common::HEIGHT), sink);
        }
        let half = size.half_extents();
        sink.add_dimension(common::dimension(
            Point3::new(half.x, half.y, 0.0),
            Point3::new(half.x, half.y, length),
            Vec3::Y,
            LENGTH,
        ));
        sink.add_shell(shell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{AreaOptions, estimate_area};
    use crate::params::PartParameters;
    use crate::parts::PartGeometry;

    #[test]
    fn sleeve_with_two_flanges() {
        let specs = PartImpl.parameters();
        let params = PartParameters::from_specs(&specs).resolve(&specs).expect("resolve");
        let mut geometry = PartGeometry::new();
        PartImpl.build(&params, &mut geometry);

        assert_eq!(geometry.flanges.len(), 2);
        let area = estimate_area(&geometry.shells, &geometry.flanges, AreaOptions::default());
        assert!((area.outer_cm2 - 4.0 * 25.0 * 15.0).abs() < 1e-9);

        let with_flanges = estimate_area(
            &geometry.shells,
            &geometry.flanges,
            AreaOptions { include_flange: true, ..AreaOptions::default() },
        );
        assert!(with_flanges.outer_cm2 > area.outer_cm2);
    }
}
