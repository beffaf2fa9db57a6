#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod build;
pub mod dimension;
pub mod export;
pub mod gauge;
pub mod geom;
pub mod params;
pub mod parts;
pub mod trace;

use std::collections::BTreeMap;
use std::fmt;

use build::{BuildOutput, Session};
use dimension::{Camera, EditableControl, Label, arrow_mesh};
use export::{MaterialEstimate, PartSnapshot, restore_parameters};
use gauge::{GaugeCatalog, GaugeOutcome, GaugeSettings};
use geom::{BBox, GeomMesh};
use params::{ParamSpec, ParamValue};
use parts::PartKind;
use parts::common::{COLOR, K_FACTOR, WASTE_PERCENT};
use serde::Serialize;
use trace::LogSink;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Segmenten van een pijlpunt-kegel.
const ARROW_SEGMENTS: usize = 12;

#[derive(Debug, Serialize)]
struct PartInfo {
    name: &'static str,
    parameter_count: usize,
}

#[derive(Debug, Serialize)]
struct ParametersExport<'a> {
    part: &'static str,
    specs: Vec<ParamSpec>,
    values: &'a BTreeMap<String, ParamValue>,
    gauge: &'a GaugeSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum MeshLayer {
    Shell,
    Flange,
    Arrow,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
enum GeometryItem<'a> {
    Line {
        start: [f64; 3],
        end: [f64; 3],
        color: &'a str,
    },
    Mesh {
        layer: MeshLayer,
        vertices: &'a [[f64; 3]],
        indices: &'a [u32],
        #[serde(skip_serializing_if = "Option::is_none")]
        normals: Option<&'a [[f64; 3]]>,
        color: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct GeometryExport<'a> {
    part: &'static str,
    items: Vec<GeometryItem<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BBox>,
    triangle_count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
struct AreaExport {
    outer_cm2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    inner_cm2: Option<f64>,
    flange_cm2: f64,
    outer_m2: f64,
    material: MaterialEstimate,
    #[serde(skip_serializing_if = "Option::is_none")]
    thickness_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    critical_edge_mm: Option<f64>,
}

impl From<&BuildOutput> for AreaExport {
    fn from(output: &BuildOutput) -> Self {
        let outer_m2 = output.area.outer_m2();
        let (thickness_mm, critical_edge_mm) = match output.gauge {
            GaugeOutcome::Selected { critical_edge_mm, thickness_mm } => {
                (Some(thickness_mm), Some(critical_edge_mm))
            }
            GaugeOutcome::Disabled | GaugeOutcome::Unset => (None, None),
        };
        Self {
            outer_cm2: output.area.outer_cm2,
            inner_cm2: output.area.inner_cm2,
            flange_cm2: output.area.flange_cm2,
            outer_m2,
            material: MaterialEstimate::new(
                outer_m2,
                output.params.number(K_FACTOR),
                output.params.number(WASTE_PERCENT),
            ),
            thickness_mm,
            critical_edge_mm,
        }
    }
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    session: Session,
    sink: LogSink,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            session: Session::new(),
            sink: LogSink,
        }
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Lijst van beschikbare kanaalvormen.
    #[wasm_bindgen]
    pub fn list_parts(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&part_infos()).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Laad een kanaalvorm op naam of alias; parameters gaan terug naar de standaardwaarden.
    #[wasm_bindgen]
    pub fn load_part(&mut self, name: &str) -> Result<(), JsValue> {
        let kind = self.session.load_part(name).map_err(to_js_error)?;
        log::debug!("onderdeel geladen: {kind}");
        Ok(())
    }

    /// Parameterspecificaties en huidige waarden voor UI-generatie.
    #[wasm_bindgen]
    pub fn get_parameters(&self) -> Result<JsValue, JsValue> {
        let Some(kind) = self.session.part() else {
            return Err(js_error("er is geen onderdeel geladen"));
        };
        let export = ParametersExport {
            part: kind.name(),
            specs: kind.parameters(),
            values: &self.session.parameters().values,
            gauge: &self.session.parameters().gauge,
        };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Stel een numerieke parameter in; geeft de geklemde waarde terug.
    #[wasm_bindgen]
    pub fn set_parameter(&mut self, key: &str, value: f64) -> Result<f64, JsValue> {
        if !value.is_finite() {
            return Err(js_error("parameterwaarde moet een eindig getal zijn"));
        }
        let stored = self
            .session
            .set_parameter(key, ParamValue::Number(value), &mut self.sink)
            .map_err(to_js_error)?;
        Ok(stored.as_number().unwrap_or(value))
    }

    #[wasm_bindgen]
    pub fn set_flag(&mut self, key: &str, value: bool) -> Result<(), JsValue> {
        self.session
            .set_parameter(key, ParamValue::Bool(value), &mut self.sink)
            .map(|_| ())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_color(&mut self, key: &str, hex: &str) -> Result<(), JsValue> {
        self.session
            .set_parameter(key, ParamValue::color(hex.trim()), &mut self.sink)
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// Zet de automatische plaatdiktekeuze aan of uit.
    #[wasm_bindgen]
    pub fn set_gauge_enabled(&mut self, enabled: bool) -> Result<(), JsValue> {
        if self.session.part().is_none() {
            return Err(js_error("er is geen onderdeel geladen"));
        }
        let mut gauge = self.session.parameters().gauge.clone();
        gauge.enabled = enabled;
        self.session.set_gauge(gauge);
        Ok(())
    }

    /// Vervang de plaatdiktecatalogus, bijvoorbeeld `{ entries: [{ thickness_mm, enabled, max_edge_mm }] }`.
    #[wasm_bindgen]
    pub fn set_gauge_catalog(&mut self, catalog: JsValue) -> Result<(), JsValue> {
        if self.session.part().is_none() {
            return Err(js_error("er is geen onderdeel geladen"));
        }
        let catalog: GaugeCatalog = serde_wasm_bindgen::from_value(catalog).map_err(to_js_error)?;
        let mut gauge = self.session.parameters().gauge.clone();
        gauge.catalog = catalog;
        self.session.set_gauge(gauge);
        Ok(())
    }

    /// Bouw het geladen onderdeel opnieuw op. Bij een fout blijft de vorige geometrie staan.
    #[wasm_bindgen]
    pub fn rebuild(&mut self) -> Result<(), JsValue> {
        self.session.rebuild(&mut self.sink).map_err(to_js_error)?;
        debug_log!(
            "rebuild klaar: {} driehoeken",
            self.session.output().map_or(0, BuildOutput::triangle_count)
        );
        Ok(())
    }

    /// Geometrie van de laatste geslaagde build: schalen, flenzen en maatvoering.
    #[wasm_bindgen]
    pub fn get_geometry(&self) -> Result<JsValue, JsValue> {
        let output = self.require_output()?;
        let arrows = arrow_meshes(output);
        let export = GeometryExport {
            part: output.kind.name(),
            items: geometry_items(output, &arrows),
            bounds: output.geometry.bounds(),
            triangle_count: output.triangle_count(),
        };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Oppervlakte, materiaalschatting en gekozen plaatdikte.
    #[wasm_bindgen]
    pub fn get_area(&self) -> Result<JsValue, JsValue> {
        let output = self.require_output()?;
        serde_wasm_bindgen::to_value(&AreaExport::from(output)).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Eén declutter-stap voor de gegeven camera; geeft de labelposities terug.
    #[wasm_bindgen]
    pub fn tick_declutter(&mut self, camera: JsValue) -> Result<JsValue, JsValue> {
        let camera: Camera = serde_wasm_bindgen::from_value(camera).map_err(to_js_error)?;
        let labels = self.session.tick_declutter(&camera);
        serde_wasm_bindgen::to_value(labels).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn is_declutter_active(&self) -> bool {
        self.session.is_declutter_active()
    }

    #[wasm_bindgen]
    pub fn get_labels(&self) -> Result<JsValue, JsValue> {
        let labels: &[Label] = self.session.labels();
        serde_wasm_bindgen::to_value(labels).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Invoerveld voor het label dat aan `key` gekoppeld is, of `null`.
    #[wasm_bindgen]
    pub fn get_editable_control(&self, key: &str) -> Result<JsValue, JsValue> {
        let control: Option<EditableControl> = self.session.editable_control(key.trim());
        serde_wasm_bindgen::to_value(&control).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Verwerk een bewerkte maat: klemmen, opslaan en opnieuw bouwen.
    #[wasm_bindgen]
    pub fn commit_dimension_edit(&mut self, key: &str, value: f64) -> Result<(), JsValue> {
        if !value.is_finite() {
            return Err(js_error("maat moet een eindig getal zijn"));
        }
        self.session
            .commit_dimension_edit(key.trim(), value, &mut self.sink)
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// JSON-momentopname van het gebouwde onderdeel.
    #[wasm_bindgen]
    pub fn export_snapshot(&self) -> Result<String, JsValue> {
        let output = self.require_output()?;
        PartSnapshot::capture(output, self.session.parameters())
            .to_json()
            .map_err(to_js_error)
    }

    /// Herstel een onderdeel uit een JSON-momentopname en bouw het op.
    #[wasm_bindgen]
    pub fn restore_snapshot(&mut self, json: &str) -> Result<(), JsValue> {
        let snapshot = PartSnapshot::from_json(json).map_err(to_js_error)?;
        let (kind, params) = restore_parameters(&snapshot).map_err(to_js_error)?;
        self.session.restore(kind, params, &mut self.sink).map_err(to_js_error)?;
        Ok(())
    }
}

impl Engine {
    fn require_output(&self) -> Result<&BuildOutput, JsValue> {
        if self.session.part().is_none() {
            return Err(js_error("er is geen onderdeel geladen"));
        }
        self.session
            .output()
            .ok_or_else(|| js_error("onderdeel is nog niet gebouwd"))
    }
}

fn part_infos() -> Vec<PartInfo> {
    PartKind::ALL
        .iter()
        .map(|kind| PartInfo {
            name: kind.name(),
            parameter_count: kind.parameters().len(),
        })
        .collect()
}

fn arrow_meshes(output: &BuildOutput) -> Vec<(GeomMesh, &str)> {
    output
        .annotations
        .iter()
        .flat_map(|annotation| {
            annotation
                .arrows
                .iter()
                .map(move |arrow| (arrow_mesh(arrow, ARROW_SEGMENTS), annotation.label.color.as_str()))
        })
        .collect()
}

fn mesh_item<'a>(layer: MeshLayer, mesh: &'a GeomMesh, color: &'a str) -> GeometryItem<'a> {
    GeometryItem::Mesh {
        layer,
        vertices: &mesh.positions,
        indices: &mesh.indices,
        normals: mesh.normals.as_deref(),
        color,
    }
}

fn geometry_items<'a>(output: &'a BuildOutput, arrows: &'a [(GeomMesh, &'a str)]) -> Vec<GeometryItem<'a>> {
    let color = output.params.color(COLOR);
    let geometry = &output.geometry;
    let mut items = Vec::with_capacity(
        geometry.shells.len() + geometry.flanges.len() + arrows.len() + output.annotations.len() * 3,
    );

    items.extend(geometry.shells.iter().map(|shell| mesh_item(MeshLayer::Shell, &shell.mesh, color)));
    items.extend(geometry.flanges.iter().map(|flange| mesh_item(MeshLayer::Flange, &flange.mesh, color)));
    for annotation in &output.annotations {
        let label_color = annotation.label.color.as_str();
        items.extend(annotation.segments().iter().map(|segment| GeometryItem::Line {
            start: segment.start.to_array(),
            end: segment.end.to_array(),
            color: label_color,
        }));
    }
    items.extend(arrows.iter().map(|(mesh, color)| mesh_item(MeshLayer::Arrow, mesh, *color)));
    items
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
