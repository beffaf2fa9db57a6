//! Onderdeelcatalogus: één module per kanaalvorm.
//!
//! Elke vorm implementeert [`DuctPart`] op een markerstruct `PartImpl`;
//! [`PartKind`] dispatcht expliciet per variant. Builders schrijven naar een
//! [`GeometrySink`]; samengestelde onderdelen bouwen subonderdelen in een eigen
//! [`PartGeometry`] en voegen een getransformeerde kopie samen.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dimension::DimensionSpec;
use crate::geom::{BBox, Flange, Point3, ShellMesh, Transform};
use crate::params::{ParamSpec, ParamValue, ResolvedParams, Unit, suggest};

pub mod branch;
pub mod common;
pub mod coupling;
pub mod elbow;
pub mod end_cap;
pub mod offset;
pub mod plenum;
pub mod square_to_round;
pub mod straight;
pub mod taper;

/// Ontvanger van de geometrie van één build.
pub trait GeometrySink {
    fn add_shell(&mut self, shell: ShellMesh);
    fn add_flange(&mut self, flange: Flange);
    fn add_dimension(&mut self, dimension: DimensionSpec);
}

/// Verzamelende [`GeometrySink`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartGeometry {
    pub shells: Vec<ShellMesh>,
    pub flanges: Vec<Flange>,
    pub dimensions: Vec<DimensionSpec>,
}

impl GeometrySink for PartGeometry {
    fn add_shell(&mut self, shell: ShellMesh) {
        self.shells.push(shell);
    }

    fn add_flange(&mut self, flange: Flange) {
        self.flanges.push(flange);
    }

    fn add_dimension(&mut self, dimension: DimensionSpec) {
        self.dimensions.push(dimension);
    }
}

impl PartGeometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Star getransformeerde kopie.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        Self {
            shells: self.shells.iter().map(|s| s.transformed(transform)).collect(),
            flanges: self.flanges.iter().map(|f| f.transformed(transform)).collect(),
            dimensions: self.dimensions.iter().map(|d| d.transformed(transform)).collect(),
        }
    }

    /// Stuurt alle geometrie door naar `sink`.
    pub fn merge_into(self, sink: &mut dyn GeometrySink) {
        for shell in self.shells {
            sink.add_shell(shell);
        }
        for flange in self.flanges {
            sink.add_flange(flange);
        }
        for dimension in self.dimensions {
            sink.add_dimension(dimension);
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.shells.iter().map(|s| s.mesh.triangle_count()).sum::<usize>()
            + self.flanges.iter().map(|f| f.mesh.triangle_count()).sum::<usize>()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        let points = self
            .shells
            .iter()
            .flat_map(|s| s.mesh.positions.iter())
            .chain(self.flanges.iter().flat_map(|f| f.mesh.positions.iter()))
            .map(|p| Point3::from_array(*p));
        BBox::from_points(points)
    }
}

/// Gedeclareerde maat voor export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredDimension {
    pub key: String,
    pub label: String,
    pub value: f64,
    pub unit: Unit,
}

/// Capaciteit die elke kanaalvorm levert.
pub trait DuctPart {
    fn parameters(&self) -> Vec<ParamSpec>;

    fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink);

    /// Parameters die de huidige vorm werkelijk gebruikt. De gauge-selectie
    /// kijkt alleen hiernaar, zodat bijvoorbeeld de diameter van een
    /// rechthoekig kanaal niet meetelt.
    fn active_parameters(&self, params: &ResolvedParams) -> Vec<ParamSpec> {
        common::active_section(self.parameters(), params)
    }

    /// Alle maatgevende waarden: getallen met een maat- of teleenheid en
    /// vlaggen (als 0/1).
    fn declared_dimensions(&self, params: &ResolvedParams) -> Vec<DeclaredDimension> {
        self.parameters()
            .into_iter()
            .filter(|spec| {
                matches!(spec.unit, Unit::Cm | Unit::Mm | Unit::Degree | Unit::Count | Unit::Flag)
            })
            .map(|spec| {
                let value = match spec.default {
                    ParamValue::Bool(_) => f64::from(u8::from(params.flag(&spec.key))),
                    _ => params.number(&spec.key),
                };
                DeclaredDimension { value, key: spec.key, label: spec.label, unit: spec.unit }
            })
            .collect()
    }
}

/// Beschikbare kanaalvormen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Straight(straight::PartImpl),
    Taper(taper::PartImpl),
    Elbow(elbow::PartImpl),
    Offset(offset::PartImpl),
    SquareToRound(square_to_round::PartImpl),
    Branch(branch::PartImpl),
    Plenum(plenum::PartImpl),
    EndCap(end_cap::PartImpl),
    Coupling(coupling::PartImpl),
}

impl PartKind {
    pub const ALL: [PartKind; 9] = [
        Self::Straight(straight::PartImpl),
        Self::Taper(taper::PartImpl),
        Self::Elbow(elbow::PartImpl),
        Self::Offset(offset::PartImpl),
        Self::SquareToRound(square_to_round::PartImpl),
        Self::Branch(branch::PartImpl),
        Self::Plenum(plenum::PartImpl),
        Self::EndCap(end_cap::PartImpl),
        Self::Coupling(coupling::PartImpl),
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Straight(_) => "straight",
            Self::Taper(_) => "taper",
            Self::Elbow(_) => "elbow",
            Self::Offset(_) => "offset",
            Self::SquareToRound(_) => "square_to_round",
            Self::Branch(_) => "branch",
            Self::Plenum(_) => "plenum",
            Self::EndCap(_) => "end_cap",
            Self::Coupling(_) => "coupling",
        }
    }

    fn part(&self) -> &dyn DuctPart {
        match self {
            Self::Straight(part) => part,
            Self::Taper(part) => part,
            Self::Elbow(part) => part,
            Self::Offset(part) => part,
            Self::SquareToRound(part) => part,
            Self::Branch(part) => part,
            Self::Plenum(part) => part,
            Self::EndCap(part) => part,
            Self::Coupling(part) => part,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> Vec<ParamSpec> {
        self.part().parameters()
    }

    pub fn build(&self, params: &ResolvedParams, sink: &mut dyn GeometrySink) {
        self.part().build(params, sink);
    }

    #[must_use]
    pub fn active_parameters(&self, params: &ResolvedParams) -> Vec<ParamSpec> {
        self.part().active_parameters(params)
    }

    #[must_use]
    pub fn declared_dimensions(&self, params: &ResolvedParams) -> Vec<DeclaredDimension> {
        self.part().declared_dimensions(params)
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry die kanaalvormen opzoekt op naam of alias.
#[derive(Debug, Clone)]
pub struct PartRegistry {
    by_name: HashMap<String, PartKind>,
}

impl Default for PartRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        for kind in PartKind::ALL {
            registry.register_names(&[kind.name()], kind);
        }
        registry.register_names(&["duct", "recht", "straight_duct"], PartKind::Straight(straight::PartImpl));
        registry.register_names(&["reducer", "verloop", "transition"], PartKind::Taper(taper::PartImpl));
        registry.register_names(&["bend", "bocht", "arc"], PartKind::Elbow(elbow::PartImpl));
        registry.register_names(&["s_offset", "verspringing"], PartKind::Offset(offset::PartImpl));
        registry.register_names(&["square_round", "vierkant_rond"], PartKind::SquareToRound(square_to_round::PartImpl));
        registry.register_names(&["y_branch", "side_branch", "broekstuk"], PartKind::Branch(branch::PartImpl));
        registry.register_names(&["box", "plenum_box"], PartKind::Plenum(plenum::PartImpl));
        registry.register_names(&["cap", "eindkap"], PartKind::EndCap(end_cap::PartImpl));
        registry.register_names(&["sleeve", "mof"], PartKind::Coupling(coupling::PartImpl));
        registry
    }
}

impl PartRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { by_name: HashMap::new() }
    }

    pub fn register_names(&mut self, names: &[&str], kind: PartKind) {
        for name in names {
            self.by_name.insert(normalize_name(name), kind);
        }
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PartKind> {
        self.by_name.get(&normalize_name(name)).copied()
    }

    /// Dichtstbijzijnde geregistreerde naam, voor foutmeldingen.
    #[must_use]
    pub fn suggest(&self, name: &str) -> Option<String> {
        suggest(&normalize_name(name), self.by_name.keys().map(String::as_str))
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(['-', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PartParameters;

    #[test]
    fn registry_resolves_names_and_aliases() {
        let registry = PartRegistry::default();
        assert_eq!(registry.resolve("Straight"), Some(PartKind::Straight(straight::PartImpl)));
        assert_eq!(registry.resolve("square-to-round"), Some(PartKind::SquareToRound(square_to_round::PartImpl)));
        assert_eq!(registry.resolve("bocht"), Some(PartKind::Elbow(elbow::PartImpl)));
        assert!(registry.resolve("elbo").is_none());
        assert_eq!(registry.suggest("elbo").as_deref(), Some("elbow"));
    }

    #[test]
    fn every_part_builds_with_defaults() {
        for kind in PartKind::ALL {
            let specs = kind.parameters();
            let resolved = PartParameters::from_specs(&specs).resolve(&specs).expect("defaults resolve");
            let mut geometry = PartGeometry::new();
            kind.build(&resolved, &mut geometry);

            assert!(!geometry.shells.is_empty(), "{kind} has no shell");
            assert!(!geometry.dimensions.is_empty(), "{kind} has no dimensions");
            for shell in &geometry.shells {
                assert!(shell.mesh.validate().is_ok(), "{kind}");
                assert!(shell.rings.iter().all(|r| r.frame.is_orthonormal(1e-9)), "{kind}");
            }
            for flange in &geometry.flanges {
                assert!(flange.diagnostics.is_valid_solid(), "{kind}");
            }
        }
    }

    #[test]
    fn parameter_keys_are_unique() {
        for kind in PartKind::ALL {
            let specs = kind.parameters();
            let mut keys: Vec<&str> = specs.iter().map(|s| s.key.as_str()).collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), specs.len(), "{kind}");
        }
    }

    #[test]
    fn transformed_geometry_moves_everything() {
        let kind = PartKind::Straight(straight::PartImpl);
        let specs = kind.parameters();
        let resolved = PartParameters::from_specs(&specs).resolve(&specs).expect("resolve");
        let mut geometry = PartGeometry::new();
        kind.build(&resolved, &mut geometry);

        let shift = crate::geom::Vec3::new(0.0, 0.0, 50.0);
        let moved = geometry.transformed(Transform::translate(shift));
        let (a, b) = (geometry.bounds().expect("bounds"), moved.bounds().expect("bounds"));
        assert!((b.min.z - a.min.z - 50.0).abs() < 1e-9);
        assert_eq!(moved.dimensions.len(), geometry.dimensions.len());
        assert!((moved.dimensions[0].p1.z - geometry.dimensions[0].p1.z - 50.0).abs() < 1e-9);

        let mut merged = PartGeometry::new();
        moved.clone().merge_into(&mut merged);
        assert_eq!(merged, moved);
    }
}
