//! Recht kanaal, rechthoekig of rond.

use crate::geom::{Point3, ShellEnd, SweepPath, Vec3};
use crate::params::{ParamSpec, ResolvedParams, Unit};

use super::common::{self, LENGTH};
use super::{DuctPart, GeometrySink};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartImpl;

impl DuctPart for PartImpl {
    fn parameters(&self) -> Vec<ParamSpec> {
        let mut specs = common::section_parameters(25.0, 30.0, 25.0);
        specs.push(ParamSpec::number(LENGTH, "Lengte", 1.0, 600.0, 1.0, Unit::Cm, 120.0));
        specs.push(common::steps_param(1.0));
        common::with_shared(specs)
    }

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        let (size, profile) = common::section(params);
        let length = params.number(LENGTH);
        let path = SweepPath::Straight { length, size };
        let shell = common::sweep(&path, profile, params, false);

        common::add_end_flanges(&shell, &[ShellEnd::Start, ShellEnd::End], params, sink);
        if let Some(end) = shell.end_frame() {
            common::add_section_dimensions(end, params, (common::WIDTH, common::HEIGHT), sink);
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

    fn build(overrides: &[(&str, f64)]) -> PartGeometry {
        let specs = PartImpl.parameters();
        let mut params = PartParameters::from_specs(&specs);
        for (key, value) in overrides {
            params.set_number(&specs, key, *value).expect("known key");
        }
        let mut geometry = PartGeometry::new();
        PartImpl.build(&params.resolve(&specs).expect("resolve"), &mut geometry);
        geometry
    }

    #[test]
    fn default_duct_area() {
        let geometry = build(&[]);
        let area = estimate_area(&geometry.shells, &geometry.flanges, AreaOptions::default());
        // 2 * (25 + 30) * 120
        assert!((area.outer_cm2 - 13_200.0).abs() < 1e-6);
        assert!((area.outer_m2() - 1.32).abs() < 1e-9);
        assert_eq!(geometry.flanges.len(), 2);
    }

    #[test]
    fn declares_width_height_and_length() {
        let geometry = build(&[("length", 80.0)]);
        let labels: Vec<&str> = geometry.dimensions.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["25 cm", "30 cm", "80 cm"]);
        let keys: Vec<_> = geometry.dimensions.iter().filter_map(|d| d.param.as_deref()).collect();
        assert_eq!(keys, vec!["width", "height", "length"]);
    }

    #[test]
    fn round_duct_uses_diameter() {
        let specs = PartImpl.parameters();
        let mut params = PartParameters::from_specs(&specs);
        params.set(&specs, common::ROUND, true.into()).expect("flag");
        let mut geometry = PartGeometry::new();
        PartImpl.build(&params.resolve(&specs).expect("resolve"), &mut geometry);

        let shell = &geometry.shells[0];
        assert_eq!(shell.vertices_per_ring(), 32);
        assert_eq!(geometry.dimensions[0].param.as_deref(), Some(common::DIAMETER));
    }
}
