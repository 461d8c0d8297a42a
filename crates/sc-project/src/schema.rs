//! Scenario schema definitions.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Unit string marking a parameter whose value is a calendar date-time.
pub const DATETIME_UNIT: &str = "datetime";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    /// Wall-clock start of the race day. Falls back to a datetime parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterDef>,
    #[serde(default = "default_pipeline")]
    pub pipeline: Vec<ModelKind>,
    #[serde(default)]
    pub battery: BatteryKind,
    #[serde(default)]
    pub array: ArrayDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_resistance: Option<RollingResistanceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lv_draw: Option<LvDrawDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherDef>,
    #[serde(default = "default_log")]
    pub log: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sweep: Vec<String>,
}

fn default_pipeline() -> Vec<ModelKind> {
    vec![ModelKind::RollingResistance, ModelKind::Drag, ModelKind::Array]
}

fn default_log() -> Vec<String> {
    ["velocity", "total_energy", "array_power"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// One initial parameter: a number with a unit, or a date-time string when
/// `unit` is `datetime`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDef {
    pub value: ParamValue,
    #[serde(default)]
    pub unit: String,
}

impl ParameterDef {
    pub fn number(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value: ParamValue::Number(value),
            unit: unit.into(),
        }
    }

    pub fn datetime(value: impl Into<String>) -> Self {
        Self {
            value: ParamValue::Text(value.into()),
            unit: DATETIME_UNIT.to_string(),
        }
    }

    pub fn is_datetime(&self) -> bool {
        self.unit.trim() == DATETIME_UNIT
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RollingResistance,
    Drag,
    Array,
    Motor,
    LvDraw,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::RollingResistance => "rolling_resistance",
            ModelKind::Drag => "drag",
            ModelKind::Array => "array",
            ModelKind::Motor => "motor",
            ModelKind::LvDraw => "lv_draw",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatteryKind {
    Esr,
    #[default]
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArrayDef {
    #[serde(default = "default_fidelity")]
    pub fidelity: String,
}

impl Default for ArrayDef {
    fn default() -> Self {
        Self {
            fidelity: default_fidelity(),
        }
    }
}

fn default_fidelity() -> String {
    "nameplate".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollingResistanceDef {
    pub wheels: Vec<WheelDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WheelDef {
    pub name: String,
    /// Parameter holding the load on this wheel (mass or force).
    pub weight: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LvDrawDef {
    #[serde(default = "default_draw_mode")]
    pub mode: String,
    #[serde(default)]
    pub components: Vec<LvComponentDef>,
}

fn default_draw_mode() -> String {
    "constant".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LvComponentDef {
    pub name: String,
    pub current_a: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_current_a: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WeatherDef {
    #[serde(default)]
    pub records: Vec<WeatherRecordDef>,
}

/// Hourly weather observation as stored in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherRecordDef {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    #[serde(default)]
    pub cloud_cover_pct: f64,
    #[serde(default)]
    pub wind_speed_mps: f64,
    /// Direction the wind blows from, degrees clockwise from north.
    #[serde(default)]
    pub wind_direction_deg: f64,
    #[serde(default)]
    pub precipitation_mm: f64,
}
