//! Eindkap: korte mantel, gesloten aan het verre einde.

use crate::geom::{Point3, ShellEnd, SweepPath, Vec3};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common::{self, LENGTH};
use super::{DuctPart, GeometrySink};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        let mut specs = common::section_parameters(30.0, 20.0, 25.0);
        specs.push(ParamSpec::number(LENGTH, "Lengte", 2.0, 50.0, 0.5, Unit::Cm, 10.0));
        specs.push(common::steps_param(1.0));
        common::with_shared(specs)
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let (size, profile) = common::section(params);
        let length = params.number(LENGTH);
        let shell = common::sweep(&SweepPath::Straight { length, size }, profile, params, true);

        common::add_end_flanges(&shell, &[ShellEnd::Start], params, sink);
        if let Some(first) = shell.start_frame() {
            common::add_section_dimensions(first, params, (common::WIDTH, common::HEIGHT), sink);
        }
        let half = size.half_extents();
        sink.add_dimension(common::dimension(
            Point3::new(half.x, -half.y, 0.0),
            Point3::new(half.x, -half.y, length),
            Vec3::X,
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
    fn closed_end_adds_cap_face() {
        let specs = PartImpl.parameters();
        let params = PartParameters::from_specs(&specs).resolve(&specs).expect("resolve");
        let mut geometry = PartGeometry::new();
        PartImpl.build(&params, &mut geometry);

        let shell = &geometry.shells[0];
        assert!(shell.is_capped());
        assert_eq!(geometry.flanges.len(), 1);

        let area = estimate_area(&geometry.shells, &geometry.flanges, AreaOptions::default());
        let sides = 2.0 * (30.0 + 20.0) * 10.0;
        assert!((area.outer_cm2 - (sides + 30.0 * 20.0)).abs() < 1e-9);
    }
}
