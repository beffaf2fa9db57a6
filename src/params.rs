//! Onderdeelparameters en hun gedeclareerde metadata.
//!
//! `PartParameters` is de enige persistente, extern muteerbare toestand van een
//! onderdeel. Elke numerieke schrijfactie wordt geklemd op `[min, max]` en op de
//! `step` van de bijbehorende [`ParamSpec`] gesnapt, net als een slider.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gauge::GaugeSettings;

/// Sleutel van de wanddikte-parameter.
pub const THICKNESS_KEY: &str = "thickness";

/// Eenheid van een parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Cm,
    Mm,
    Degree,
    Percent,
    Factor,
    Count,
    Flag,
    Color,
}

impl Unit {
    /// Factor naar millimeter voor lengte-eenheden.
    #[must_use]
    pub fn to_mm(self) -> Option<f64> {
        match self {
            Self::Cm => Some(10.0),
            Self::Mm => Some(1.0),
            _ => None,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::Degree => "°",
            Self::Percent => "%",
            Self::Factor => "×",
            Self::Count | Self::Flag | Self::Color => "",
        }
    }
}

/// Classificatie van een maat, gebruikt door de gauge-selectie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamRole {
    /// Doorsnedemaat: kandidaat voor de kritieke rand.
    Section,
    /// Maat langs het kanaal (lengte, straal, verspringing, diepte).
    Length,
    Thickness,
    Other,
}

/// Waarde van een parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Number(f64),
    Bool(bool),
    Color(String),
}

impl ParamValue {
    #[must_use]
    pub fn color(hex: impl Into<String>) -> Self {
        Self::Color(hex.into())
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<&str> {
        match self {
            Self::Color(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Color(_) => "color",
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Color(v) => f.write_str(v),
        }
    }
}

/// Gedeclareerde metadata van een parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub key: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: Unit,
    pub default: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ParamRole>,
}

impl ParamSpec {
    #[must_use]
    pub fn number(key: &str, label: &str, min: f64, max: f64, step: f64, unit: Unit, default: f64) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            min,
            max,
            step,
            unit,
            default: ParamValue::Number(default),
            role: None,
        }
    }

    #[must_use]
    pub fn flag(key: &str, label: &str, default: bool) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            min: 0.0,
            max: 1.0,
            step: 1.0,
            unit: Unit::Flag,
            default: ParamValue::Bool(default),
            role: None,
        }
    }

    #[must_use]
    pub fn color(key: &str, label: &str, default: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: label.to_owned(),
            min: 0.0,
            max: 0.0,
            step: 0.0,
            unit: Unit::Color,
            default: ParamValue::color(default),
            role: None,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: ParamRole) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.default, ParamValue::Number(_))
    }

    /// Klemt `value` op `[min, max]` en snapt op `step` vanaf `min`.
    #[must_use]
    pub fn clamp_value(&self, value: f64) -> f64 {
        let mut clamped = clamp(value, self.min, self.max);
        if self.step > 0.0 {
            clamped = self.min + ((clamped - self.min) / self.step).round() * self.step;
            clamped = clamp(clamped, self.min, self.max);
        }
        clamped
    }

    /// Rol uit de metadata, anders afgeleid uit sleutel en eenheid.
    #[must_use]
    pub fn classify(&self) -> ParamRole {
        if let Some(role) = self.role {
            return role;
        }
        if self.key == THICKNESS_KEY {
            return ParamRole::Thickness;
        }
        if self.unit.to_mm().is_none() {
            return ParamRole::Other;
        }
        if length_name_pattern().is_some_and(|re| re.is_match(&self.key)) {
            ParamRole::Length
        } else {
            ParamRole::Section
        }
    }
}

fn length_name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)(^|_)(length|len|radius|offset|depth|l\d*)(_|\d|$)").ok())
        .as_ref()
}

fn is_color(value: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("unknown parameter `{key}`{}", did_you_mean(.suggestion))]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
    },
    #[error("parameter `{key}` expects a {expected}, got a {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("parameter `{key}` must be a finite number")]
    NonFinite { key: String },
    #[error("parameter `{key}` is not a #rrggbb color: {value}")]
    InvalidColor { key: String, value: String },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean `{s}`?)"))
        .unwrap_or_default()
}

/// Dichtstbijzijnde kandidaat volgens de Levenshtein-afstand.
#[must_use]
pub fn suggest<'a>(key: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let needle = key.trim().to_lowercase();
    let limit = (needle.len() / 3).max(2);
    candidates
        .into_iter()
        .map(|candidate| (levenshtein::levenshtein(&needle, &candidate.to_lowercase()), candidate))
        .filter(|(distance, _)| *distance <= limit)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.to_owned())
}

fn find_spec<'a>(specs: &'a [ParamSpec], key: &str) -> Result<&'a ParamSpec, ParamError> {
    let trimmed = key.trim();
    specs
        .iter()
        .find(|spec| spec.key == trimmed)
        .ok_or_else(|| ParamError::UnknownKey {
            key: trimmed.to_owned(),
            suggestion: suggest(trimmed, specs.iter().map(|s| s.key.as_str())),
        })
}

/// Uitkomst van een geklemde schrijfactie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Applied {
    pub requested: f64,
    pub applied: f64,
    /// Waarde lag buiten bereik of niet op een stap; afrondruis telt niet mee.
    pub clamped: bool,
}

impl Applied {
    fn new(spec: &ParamSpec, requested: f64, applied: f64) -> Self {
        let tolerance = if spec.step > 0.0 {
            spec.step * 1e-6
        } else {
            1e-9 * requested.abs().max(1.0)
        };
        Self { requested, applied, clamped: (requested - applied).abs() > tolerance }
    }

    #[must_use]
    pub fn was_clamped(&self) -> bool {
        self.clamped
    }
}

/// Vlakke map van parameterwaarden plus de gauge-instellingen van het onderdeel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartParameters {
    pub values: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub gauge: GaugeSettings,
}

impl PartParameters {
    /// Vult de standaardwaarden van alle gedeclareerde parameters in.
    #[must_use]
    pub fn from_specs(specs: &[ParamSpec]) -> Self {
        Self {
            values: specs.iter().map(|s| (s.key.clone(), s.default.clone())).collect(),
            gauge: GaugeSettings::default(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(ParamValue::as_number)
    }

    /// Zet een getal, geklemd en gesnapt volgens de spec van `key`.
    pub fn set_number(&mut self, specs: &[ParamSpec], key: &str, value: f64) -> Result<Applied, ParamError> {
        let spec = find_spec(specs, key)?;
        if !spec.is_number() {
            return Err(ParamError::TypeMismatch {
                key: spec.key.clone(),
                expected: spec.default.type_name(),
                found: "number",
            });
        }
        if !value.is_finite() {
            return Err(ParamError::NonFinite { key: spec.key.clone() });
        }
        let applied = spec.clamp_value(value);
        self.values.insert(spec.key.clone(), ParamValue::Number(applied));
        Ok(Applied::new(spec, value, applied))
    }

    /// Legt de door de gauge gekozen dikte (cm) vast zoals die is, zonder
    /// klemming of snapping.
    pub fn store_gauge_thickness(&mut self, thickness_cm: f64) {
        self.values.insert(THICKNESS_KEY.to_owned(), ParamValue::Number(thickness_cm));
    }

    /// Zet een willekeurige waarde; getallen lopen via [`Self::set_number`].
    pub fn set(&mut self, specs: &[ParamSpec], key: &str, value: ParamValue) -> Result<(), ParamError> {
        let spec = find_spec(specs, key)?;
        match (&spec.default, value) {
            (ParamValue::Number(_), ParamValue::Number(v)) => {
                self.set_number(specs, key, v)?;
            }
            (ParamValue::Bool(_), ParamValue::Bool(v)) => {
                self.values.insert(spec.key.clone(), ParamValue::Bool(v));
            }
            (ParamValue::Color(_), ParamValue::Color(v)) => {
                if !is_color(&v) {
                    return Err(ParamError::InvalidColor { key: spec.key.clone(), value: v });
                }
                self.values.insert(spec.key.clone(), ParamValue::Color(v));
            }
            (expected, found) => {
                return Err(ParamError::TypeMismatch {
                    key: spec.key.clone(),
                    expected: expected.type_name(),
                    found: found.type_name(),
                });
            }
        }
        Ok(())
    }

    /// Controleert alle waarden tegen `specs` en vult ontbrekende aan.
    ///
    /// Getallen buiten bereik worden stil geklemd; onbekende sleutels en
    /// typefouten zijn configuratiefouten.
    pub fn resolve(&self, specs: &[ParamSpec]) -> Result<ResolvedParams, ParamError> {
        if let Some(key) = self.values.keys().find(|k| !specs.iter().any(|s| &s.key == *k)) {
            return Err(ParamError::UnknownKey {
                key: key.clone(),
                suggestion: suggest(key, specs.iter().map(|s| s.key.as_str())),
            });
        }

        let mut values = BTreeMap::new();
        for spec in specs {
            let value = match (self.values.get(&spec.key), &spec.default) {
                (None, default) => default.clone(),
                (Some(ParamValue::Number(v)), ParamValue::Number(_)) => {
                    if !v.is_finite() {
                        return Err(ParamError::NonFinite { key: spec.key.clone() });
                    }
                    ParamValue::Number(spec.clamp_value(*v))
                }
                (Some(ParamValue::Bool(v)), ParamValue::Bool(_)) => ParamValue::Bool(*v),
                (Some(ParamValue::Color(v)), ParamValue::Color(_)) => {
                    if !is_color(v) {
                        return Err(ParamError::InvalidColor { key: spec.key.clone(), value: v.clone() });
                    }
                    ParamValue::Color(v.clone())
                }
                (Some(found), expected) => {
                    return Err(ParamError::TypeMismatch {
                        key: spec.key.clone(),
                        expected: expected.type_name(),
                        found: found.type_name(),
                    });
                }
            };
            values.insert(spec.key.clone(), value);
        }

        Ok(ResolvedParams { values })
    }
}

/// Gevalideerde, volledige set parameterwaarden voor één rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParams {
    values: BTreeMap<String, ParamValue>,
}

impl ResolvedParams {
    #[must_use]
    pub fn number(&self, key: &str) -> f64 {
        self.values.get(key).and_then(ParamValue::as_number).unwrap_or(0.0)
    }

    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.values.get(key).and_then(ParamValue::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn color(&self, key: &str) -> &str {
        self.values.get(key).and_then(ParamValue::as_color).unwrap_or("#808080")
    }

    /// Overschrijft een getal zonder klemming (gauge-resultaat).
    pub fn override_number(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_owned(), ParamValue::Number(value));
    }

    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, ParamValue> {
        &self.values
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("width", "Width", 5.0, 300.0, 0.5, Unit::Cm, 25.0),
            ParamSpec::number("length", "Length", 1.0, 600.0, 1.0, Unit::Cm, 120.0),
            ParamSpec::number("thickness", "Thickness", 0.04, 0.3, 0.01, Unit::Cm, 0.12),
            ParamSpec::number("angle", "Angle", 1.0, 180.0, 1.0, Unit::Degree, 90.0),
            ParamSpec::number("collar", "Collar", 0.0, 50.0, 1.0, Unit::Cm, 5.0).with_role(ParamRole::Length),
            ParamSpec::flag("show_flanges", "Show flanges", true),
            ParamSpec::color("color", "Color", "#a0a4a8"),
        ]
    }

    #[test]
    fn set_number_clamps_and_snaps() {
        let specs = specs();
        let mut params = PartParameters::from_specs(&specs);

        let applied = params.set_number(&specs, "width", 9000.0).expect("width");
        assert_eq!(applied.applied, 300.0);
        assert!(applied.was_clamped());

        let applied = params.set_number(&specs, "width", 42.26).expect("width");
        assert!((applied.applied - 42.5).abs() < 1e-12);
        assert_eq!(params.number("width"), Some(applied.applied));
    }

    #[test]
    fn on_step_values_are_not_reported_as_clamped() {
        let specs = vec![
            ParamSpec::number("thickness", "Thickness", 0.04, 0.3, 0.01, Unit::Cm, 0.12),
            ParamSpec::number("span", "Span", 0.0, 1.0e6, 0.1, Unit::Cm, 10.0),
        ];
        let mut params = PartParameters::from_specs(&specs);

        for i in 4..=30 {
            let applied = params.set_number(&specs, "thickness", f64::from(i) * 0.01).expect("thickness");
            assert!(!applied.was_clamped(), "{applied:?}");
        }
        for value in [123_456.7, 987_654.3, 999_999.9] {
            let applied = params.set_number(&specs, "span", value).expect("span");
            assert!(!applied.was_clamped(), "{applied:?}");
        }

        let snapped = params.set_number(&specs, "span", 123_456.74).expect("span");
        assert!(snapped.was_clamped());
        let capped = params.set_number(&specs, "span", 2.0e6).expect("span");
        assert!(capped.was_clamped());
    }

    #[test]
    fn unknown_key_suggests_closest() {
        let specs = specs();
        let mut params = PartParameters::from_specs(&specs);
        let err = params.set_number(&specs, "widht", 10.0).expect_err("unknown");
        assert_eq!(
            err,
            ParamError::UnknownKey { key: "widht".into(), suggestion: Some("width".into()) }
        );
        assert!(err.to_string().contains("did you mean `width`"));
    }

    #[test]
    fn type_mismatch_is_reported() {
        let specs = specs();
        let mut params = PartParameters::from_specs(&specs);
        let err = params.set(&specs, "show_flanges", ParamValue::Number(1.0)).expect_err("mismatch");
        assert!(matches!(err, ParamError::TypeMismatch { expected: "bool", found: "number", .. }));

        let err = params.set(&specs, "color", ParamValue::color("red")).expect_err("color");
        assert!(matches!(err, ParamError::InvalidColor { .. }));
    }

    #[test]
    fn resolve_fills_defaults_and_clamps() {
        let specs = specs();
        let mut params = PartParameters::default();
        params.values.insert("angle".into(), ParamValue::Number(720.0));

        let resolved = params.resolve(&specs).expect("resolve");
        assert_eq!(resolved.number("angle"), 180.0);
        assert_eq!(resolved.number("width"), 25.0);
        assert!(resolved.flag("show_flanges"));
        assert_eq!(resolved.color("color"), "#a0a4a8");
    }

    #[test]
    fn classify_uses_role_then_naming() {
        let specs = specs();
        let role = |key: &str| specs.iter().find(|s| s.key == key).map(ParamSpec::classify);
        assert_eq!(role("width"), Some(ParamRole::Section));
        assert_eq!(role("length"), Some(ParamRole::Length));
        assert_eq!(role("thickness"), Some(ParamRole::Thickness));
        assert_eq!(role("angle"), Some(ParamRole::Other));
        assert_eq!(role("collar"), Some(ParamRole::Length));

        let radius = ParamSpec::number("inner_radius", "R", 0.0, 100.0, 1.0, Unit::Cm, 10.0);
        assert_eq!(radius.classify(), ParamRole::Length);
        let b2 = ParamSpec::number("branch2_length", "L", 0.0, 100.0, 1.0, Unit::Cm, 10.0);
        assert_eq!(b2.classify(), ParamRole::Length);
        let w2 = ParamSpec::number("w2", "W2", 0.0, 100.0, 1.0, Unit::Cm, 10.0);
        assert_eq!(w2.classify(), ParamRole::Section);
    }
}
