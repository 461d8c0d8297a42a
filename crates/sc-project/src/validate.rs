//! Scenario validation logic.

use std::collections::HashSet;

use crate::schema::{ModelKind, Scenario};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate entry: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing section: {section} (required by {required_by})")]
    MissingSection {
        section: String,
        required_by: String,
    },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if scenario.parameters.keys().any(|name| name.trim().is_empty()) {
        return Err(invalid("parameters", "''", "parameter names must not be empty"));
    }
    // Unconvertible entries are skipped at conversion; all of them failing is fatal.
    let (store, rejected) = scenario.convert_parameters();
    if store.is_empty() {
        if let Some((name, def)) = scenario.parameters.iter().next() {
            let reason = rejected.first().map(ToString::to_string).unwrap_or_default();
            return Err(invalid(format!("parameters.{name}"), format!("{:?}", def.value), reason));
        }
    }

    if scenario.start_time().is_none() {
        return Err(invalid(
            "start",
            "none",
            "set `start` or give a parameter with unit `datetime`",
        ));
    }

    let mut seen = HashSet::new();
    for kind in &scenario.pipeline {
        if !seen.insert(*kind) {
            return Err(ValidationError::DuplicateId {
                id: kind.as_str().to_string(),
                context: "pipeline".to_string(),
            });
        }
    }

    if let Some(rr) = &scenario.rolling_resistance {
        if rr.wheels.is_empty() {
            return Err(invalid("rolling_resistance.wheels", "[]", "at least one wheel is required"));
        }
        let mut names = HashSet::new();
        for wheel in &rr.wheels {
            if !names.insert(wheel.name.as_str()) {
                return Err(ValidationError::DuplicateId {
                    id: wheel.name.clone(),
                    context: "rolling_resistance.wheels".to_string(),
                });
            }
        }
    }

    match &scenario.lv_draw {
        Some(lv) => {
            let mut names = HashSet::new();
            for c in &lv.components {
                if !names.insert(c.name.as_str()) {
                    return Err(ValidationError::DuplicateId {
                        id: c.name.clone(),
                        context: "lv_draw.components".to_string(),
                    });
                }
                let peak_ok = c.peak_current_a.is_none_or(|p| p.is_finite() && p >= 0.0);
                if !(c.current_a.is_finite() && c.current_a >= 0.0 && peak_ok) {
                    return Err(invalid(
                        format!("lv_draw.components.{}", c.name),
                        c.current_a,
                        "currents must be finite and non-negative",
                    ));
                }
            }
        }
        None if seen.contains(&ModelKind::LvDraw) => {
            return Err(ValidationError::MissingSection {
                section: "lv_draw".to_string(),
                required_by: "pipeline".to_string(),
            });
        }
        None => {}
    }

    if let Some(weather) = &scenario.weather {
        for (i, r) in weather.records.iter().enumerate() {
            let values = [
                r.temperature_c,
                r.cloud_cover_pct,
                r.wind_speed_mps,
                r.wind_direction_deg,
                r.precipitation_mm,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(invalid(format!("weather.records[{i}]"), r.time, "non-finite value"));
            }
            if !(0.0..=100.0).contains(&r.cloud_cover_pct) {
                return Err(invalid(
                    format!("weather.records[{i}].cloud_cover_pct"),
                    r.cloud_cover_pct,
                    "must be within 0..=100",
                ));
            }
            if r.wind_speed_mps < 0.0 || r.precipitation_mm < 0.0 {
                return Err(invalid(
                    format!("weather.records[{i}]"),
                    r.time,
                    "wind speed and precipitation must be non-negative",
                ));
            }
        }
    }

    if let Some(empty) = scenario.log.iter().find(|n| n.trim().is_empty()) {
        return Err(invalid("log", format!("'{empty}'"), "log entries must name a parameter"));
    }

    Ok(())
}
