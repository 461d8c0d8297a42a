//! Named, unit-tagged parameter store shared by every energy model.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::quantity::{Quantity, SiQuantity, Unit};

/// Immutable copy of a store's contents.
///
/// Cheap to clone; used as the reset baseline of a vehicle model and for
/// per-step change reports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamSnapshot(Arc<BTreeMap<String, Quantity>>);

impl ParamSnapshot {
    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One difference between two snapshots.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamChange {
    Added {
        name: String,
        value: Quantity,
    },
    Removed {
        name: String,
    },
    Changed {
        name: String,
        before: Quantity,
        after: Quantity,
    },
}

impl ParamChange {
    pub fn name(&self) -> &str {
        match self {
            ParamChange::Added { name, .. }
            | ParamChange::Removed { name }
            | ParamChange::Changed { name, .. } => name,
        }
    }
}

/// Mapping from parameter name to [`Quantity`].
///
/// Reads of absent names fail with [`CoreError::MissingParameter`]. Writes
/// always succeed and replace any previous value and unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamStore {
    values: BTreeMap<String, Quantity>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> CoreResult<&Quantity> {
        self.values.get(name).ok_or_else(|| CoreError::missing(name))
    }

    pub fn get_opt(&self, name: &str) -> Option<&Quantity> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Typed read with a dimension check.
    pub fn get_as<Q: SiQuantity>(&self, name: &str) -> CoreResult<Q> {
        self.get(name)?.get::<Q>().map_err(|e| match e {
            CoreError::UnitMismatch {
                expected, found, ..
            } => CoreError::UnitMismatch {
                context: name.to_string(),
                expected,
                found,
            },
            other => other,
        })
    }

    /// Typed read of an optional parameter. Present-but-wrong-unit is an error.
    pub fn get_as_opt<Q: SiQuantity>(&self, name: &str) -> CoreResult<Option<Q>> {
        if self.contains(name) {
            self.get_as(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Magnitude of `name` expressed in `unit`.
    pub fn magnitude_in(&self, name: &str, unit: &Unit) -> CoreResult<f64> {
        self.get(name)?
            .magnitude_in(unit)
            .map_err(|_| CoreError::UnitMismatch {
                context: name.to_string(),
                expected: unit.symbol().to_string(),
                found: self
                    .values
                    .get(name)
                    .map(|q| q.unit().symbol().to_string())
                    .unwrap_or_default(),
            })
    }

    /// Dimensionless value of `name` (percent and angle units are reduced).
    pub fn ratio(&self, name: &str) -> CoreResult<f64> {
        self.magnitude_in(name, &Unit::dimensionless())
    }

    pub fn set(&mut self, name: impl Into<String>, value: Quantity) {
        self.values.insert(name.into(), value);
    }

    /// Store a typed value in that type's display unit.
    pub fn set_typed<Q: SiQuantity>(&mut self, name: impl Into<String>, value: Q) {
        self.set(name, Quantity::from_typed(value));
    }

    pub fn remove(&mut self, name: &str) -> Option<Quantity> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot(Arc::new(self.values.clone()))
    }

    /// Replace the whole contents with `snapshot`.
    pub fn restore(&mut self, snapshot: &ParamSnapshot) {
        self.values = (*snapshot.0).clone();
    }

    /// Changes needed to go from `before` to the current contents.
    pub fn diff(&self, before: &ParamSnapshot) -> Vec<ParamChange> {
        let mut changes = Vec::new();
        for (name, value) in &self.values {
            match before.0.get(name) {
                None => changes.push(ParamChange::Added {
                    name: name.clone(),
                    value: value.clone(),
                }),
                Some(old) if old != value => changes.push(ParamChange::Changed {
                    name: name.clone(),
                    before: old.clone(),
                    after: value.clone(),
                }),
                Some(_) => {}
            }
        }
        for name in before.0.keys() {
            if !self.values.contains_key(name) {
                changes.push(ParamChange::Removed { name: name.clone() });
            }
        }
        changes
    }
}

impl FromIterator<(String, Quantity)> for ParamStore {
    fn from_iter<I: IntoIterator<Item = (String, Quantity)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, Quantity)> for ParamStore {
    fn extend<I: IntoIterator<Item = (String, Quantity)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{w, Energy, Power};
    use uom::si::energy::watt_hour;

    fn store() -> ParamStore {
        let mut p = ParamStore::new();
        p.set("total_energy", Quantity::parse(5240.0, "Wh").unwrap());
        p.set("drag_power", Quantity::parse(120.0, "W").unwrap());
        p.set("weather_cloud_modifier", Quantity::dimensionless(0.6));
        p
    }

    #[test]
    fn missing_read_names_the_key() {
        let p = store();
        let err = p.get("vehicle_speed").unwrap_err();
        assert_eq!(err, CoreError::missing("vehicle_speed"));
        assert!(err.is_missing_parameter());
    }

    #[test]
    fn typed_reads() {
        let p = store();
        let e: Energy = p.get_as("total_energy").unwrap();
        assert!((e.get::<watt_hour>() - 5240.0).abs() < 1e-9);
        let err = p.get_as::<Power>("total_energy").unwrap_err();
        match err {
            CoreError::UnitMismatch { context, .. } => assert_eq!(context, "total_energy"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(p.get_as_opt::<Power>("nope").unwrap().is_none());
        assert!((p.ratio("weather_cloud_modifier").unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn set_overwrites_value_and_unit() {
        let mut p = store();
        p.set("drag_power", Quantity::parse(1.0, "kW").unwrap());
        assert_eq!(p.get("drag_power").unwrap().unit().symbol(), "kW");
        p.set_typed("array_power", w(260.0));
        assert!(p.contains("array_power"));
    }

    #[test]
    fn snapshot_restore_and_diff() {
        let mut p = store();
        let base = p.snapshot();
        p.set("drag_power", Quantity::parse(99.0, "W").unwrap());
        p.set("rr_power", Quantity::parse(40.0, "W").unwrap());
        p.remove("weather_cloud_modifier");

        let changes = p.diff(&base);
        let names: Vec<&str> = changes.iter().map(ParamChange::name).collect();
        assert_eq!(names, vec!["drag_power", "rr_power", "weather_cloud_modifier"]);
        assert!(matches!(changes[2], ParamChange::Removed { .. }));

        // the snapshot is not affected by later writes
        assert!((base.get("drag_power").unwrap().magnitude() - 120.0).abs() < 1e-12);

        p.restore(&base);
        assert_eq!(p, store());
        assert!(p.diff(&base).is_empty());
    }
}
