//! Export snapshot of a built part and material estimate for ordering.
//!
//! A snapshot flattens the declared dimensions, the computed areas and the
//! full parameter set of one part instance. Re-instantiating the same part
//! from its declared dimensions reproduces the same outer area.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::build::{BuildError, BuildOutput};
use crate::params::{ParamError, ParamValue, PartParameters, Unit};
use crate::parts::common::{K_FACTOR, WASTE_PERCENT};
use crate::parts::{DeclaredDimension, PartKind, PartRegistry};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Sheet material needed for one part, in m².
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialEstimate {
    /// Outer area times the k-factor.
    pub sheet_area_m2: f64,
    /// Sheet area plus the waste margin.
    pub purchase_area_m2: f64,
}

impl MaterialEstimate {
    #[must_use]
    pub fn new(outer_area_m2: f64, k_factor: f64, waste_percent: f64) -> Self {
        let sheet_area_m2 = outer_area_m2 * k_factor;
        Self {
            sheet_area_m2,
            purchase_area_m2: sheet_area_m2 * (1.0 + waste_percent / 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSnapshot {
    pub part: String,
    pub dimensions: Vec<DeclaredDimension>,
    pub outer_area_m2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_area_m2: Option<f64>,
    pub material: MaterialEstimate,
    pub parameters: PartParameters,
}

impl PartSnapshot {
    /// Captures `output` together with the parameters that produced it.
    #[must_use]
    pub fn capture(output: &BuildOutput, parameters: &PartParameters) -> Self {
        let outer_area_m2 = output.area.outer_m2();
        Self {
            part: output.kind.name().to_owned(),
            dimensions: output.kind.declared_dimensions(&output.params),
            outer_area_m2,
            inner_area_m2: output.area.inner_m2(),
            material: MaterialEstimate::new(
                outer_area_m2,
                output.params.number(K_FACTOR),
                output.params.number(WASTE_PERCENT),
            ),
            parameters: parameters.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn dimension(&self, key: &str) -> Option<&DeclaredDimension> {
        self.dimensions.iter().find(|d| d.key == key)
    }
}

/// Re-instantiates the snapshot's part type from its declared dimensions.
///
/// Values start from the part defaults; every declared dimension is written
/// through the normal clamped setters. Flags come back from their 0/1 form.
/// The gauge settings travel with the snapshot.
pub fn restore_parameters(snapshot: &PartSnapshot) -> Result<(PartKind, PartParameters), ExportError> {
    let registry = PartRegistry::default();
    let kind = registry.resolve(&snapshot.part).ok_or_else(|| BuildError::UnknownPart {
        name: snapshot.part.clone(),
        suggestion: registry.suggest(&snapshot.part),
    })?;

    let specs = kind.parameters();
    let mut params = PartParameters::from_specs(&specs);
    params.gauge = snapshot.parameters.gauge.clone();
    for dimension in &snapshot.dimensions {
        match dimension.unit {
            Unit::Flag => params.set(&specs, &dimension.key, ParamValue::Bool(dimension.value >= 0.5))?,
            _ => {
                params.set_number(&specs, &dimension.key, dimension.value)?;
            }
        }
    }
    Ok((kind, params))
}
