//! Conversion of scenario parameters into a runtime parameter store.

use chrono::{NaiveDateTime, Timelike};
use sc_core::{ParamStore, Quantity, Unit};
use tracing::warn;

use crate::schema::{ParamValue, ParameterDef, Scenario};
use crate::{ProjectError, ProjectResult};

/// Seconds since local midnight; seeded from the start time when absent.
pub const TIMESTAMP: &str = "timestamp";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse the date-time forms accepted in scenario files.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Seconds elapsed since local midnight of `at`.
pub fn seconds_since_midnight(at: NaiveDateTime) -> f64 {
    let t = at.time();
    f64::from(t.num_seconds_from_midnight()) + f64::from(t.nanosecond()) * 1e-9
}

/// Convert one parameter definition into a quantity.
///
/// Date-time parameters become seconds since midnight of that date.
pub fn to_quantity(name: &str, def: &ParameterDef) -> ProjectResult<Quantity> {
    match (&def.value, def.is_datetime()) {
        (ParamValue::Text(text), true) => {
            let at = parse_datetime(text).ok_or_else(|| ProjectError::Conversion {
                name: name.to_string(),
                what: format!("'{text}' is not a date-time"),
            })?;
            Ok(Quantity::new(seconds_since_midnight(at), Unit::second()))
        }
        (ParamValue::Number(_), true) => Err(ProjectError::Conversion {
            name: name.to_string(),
            what: "datetime parameters take a date-time string".to_string(),
        }),
        (ParamValue::Number(value), false) => {
            if !value.is_finite() {
                return Err(ProjectError::Conversion {
                    name: name.to_string(),
                    what: format!("value {value} is not finite"),
                });
            }
            Quantity::parse(*value, &def.unit).map_err(|e| ProjectError::Conversion {
                name: name.to_string(),
                what: e.to_string(),
            })
        }
        (ParamValue::Text(text), false) => {
            let value: f64 = text.trim().parse().map_err(|_| ProjectError::Conversion {
                name: name.to_string(),
                what: format!("'{text}' is not convertible to a number"),
            })?;
            to_quantity(name, &ParameterDef::number(value, def.unit.clone()))
        }
    }
}

impl Scenario {
    /// Convert every parameter, keeping the ones that convert and the
    /// errors of the ones that do not.
    pub fn convert_parameters(&self) -> (ParamStore, Vec<ProjectError>) {
        let mut store = ParamStore::new();
        let mut rejected = Vec::new();
        for (name, def) in &self.parameters {
            match to_quantity(name, def) {
                Ok(q) => store.set(name.clone(), q),
                Err(e) => rejected.push(e),
            }
        }
        (store, rejected)
    }

    /// Build the initial parameter store from the scenario parameters.
    ///
    /// Entries that cannot be converted are logged and left out. Conversion
    /// fails only when no entry converts. A missing `timestamp` is seeded
    /// from [`Scenario::start_time`].
    pub fn to_param_store(&self) -> ProjectResult<ParamStore> {
        let (mut store, rejected) = self.convert_parameters();
        if store.is_empty() {
            if let Some(first) = rejected.into_iter().next() {
                return Err(first);
            }
        } else {
            for e in &rejected {
                warn!(error = %e, "skipping parameter");
            }
        }
        if !store.contains(TIMESTAMP) {
            if let Some(start) = self.start_time() {
                store.set(TIMESTAMP, Quantity::new(seconds_since_midnight(start), Unit::second()));
            }
        }
        Ok(store)
    }

    /// The race-day start: the explicit `start` field, else the `timestamp`
    /// parameter when it is a date-time, else the first date-time parameter.
    pub fn start_time(&self) -> Option<NaiveDateTime> {
        if self.start.is_some() {
            return self.start;
        }
        let from_def = |def: &ParameterDef| match &def.value {
            ParamValue::Text(text) if def.is_datetime() => parse_datetime(text),
            _ => None,
        };
        self.parameters
            .get(TIMESTAMP)
            .and_then(from_def)
            .or_else(|| self.parameters.values().find_map(from_def))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::units::Velocity;
    use uom::si::velocity::meter_per_second;

    #[test]
    fn datetime_becomes_seconds_since_midnight() {
        let q = to_quantity("timestamp", &ParameterDef::datetime("2025-07-04T09:30:15")).unwrap();
        assert_eq!(q.unit().symbol(), "s");
        assert_eq!(q.magnitude(), 9.0 * 3600.0 + 30.0 * 60.0 + 15.0);
    }

    #[test]
    fn space_separated_datetime() {
        let at = parse_datetime("2025-07-04 12:00:00").unwrap();
        assert_eq!(seconds_since_midnight(at), 43_200.0);
        assert!(parse_datetime("noon").is_none());
    }

    #[test]
    fn numbers_keep_their_unit() {
        let q = to_quantity("velocity", &ParameterDef::number(20.0, "mph")).unwrap();
        assert_eq!(q.magnitude(), 20.0);
        let v: Velocity = q.get().unwrap();
        assert!((v.get::<meter_per_second>() - 8.9408).abs() < 1e-9);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let def = ParameterDef {
            value: ParamValue::Text(" 1.5 ".into()),
            unit: "m".into(),
        };
        assert_eq!(to_quantity("x", &def).unwrap().magnitude(), 1.5);
    }

    #[test]
    fn bad_values_name_the_parameter() {
        let def = ParameterDef {
            value: ParamValue::Text("fast".into()),
            unit: "mph".into(),
        };
        let err = to_quantity("velocity", &def).unwrap_err();
        assert!(err.to_string().contains("velocity"));

        let err = to_quantity("drag_coeff", &ParameterDef::number(1.0, "furlongs")).unwrap_err();
        assert!(matches!(err, ProjectError::Conversion { .. }));

        let err = to_quantity("timestamp", &ParameterDef::number(9.0, "datetime")).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    fn scenario(parameters: &[(&str, ParameterDef)]) -> Scenario {
        let mut s: Scenario = serde_yaml::from_str("version: 1\nname: t\n").unwrap();
        s.parameters = parameters
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        s
    }

    #[test]
    fn bad_entries_are_left_out() {
        let s = scenario(&[
            ("velocity", ParameterDef::number(20.0, "mph")),
            ("odometer", ParameterDef::number(3.0, "furlongs")),
        ]);
        let (store, rejected) = s.convert_parameters();
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].to_string().contains("odometer"));

        let store_all = s.to_param_store().unwrap();
        assert!(store_all.contains("velocity"));
        assert!(!store_all.contains("odometer"));
        assert!(store.contains("velocity"));
    }

    #[test]
    fn all_entries_bad_is_an_error() {
        let s = scenario(&[("odometer", ParameterDef::number(3.0, "furlongs"))]);
        assert!(matches!(s.to_param_store(), Err(ProjectError::Conversion { .. })));
    }

    #[test]
    fn timestamp_is_seeded_from_start() {
        let mut s = scenario(&[("velocity", ParameterDef::number(20.0, "mph"))]);
        s.start = parse_datetime("2025-07-04T09:30:00");
        let store = s.to_param_store().unwrap();
        assert_eq!(store.get(TIMESTAMP).unwrap().magnitude(), 9.5 * 3600.0);

        s.parameters
            .insert(TIMESTAMP.into(), ParameterDef::datetime("2025-07-04T12:00:00"));
        let store = s.to_param_store().unwrap();
        assert_eq!(store.get(TIMESTAMP).unwrap().magnitude(), 12.0 * 3600.0);
    }
}
