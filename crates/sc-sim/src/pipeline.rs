//! Pipeline validation, run once when a vehicle model is built.

use std::collections::BTreeSet;

use sc_core::numeric::ensure_finite;
use sc_core::units::{Energy, Time};
use sc_core::ParamStore;
use sc_models::EnergyModel;

use crate::error::{SimError, SimResult};

pub const TOTAL_ENERGY: &str = "total_energy";
pub const BATTERY_MAX_ENERGY: &str = "battery_max_energy";
pub const TIMESTEP: &str = "timestep";

/// Check the energy bounds and the timestep, returning the timestep.
pub(crate) fn validate_initial(params: &ParamStore) -> SimResult<Time> {
    for key in [TOTAL_ENERGY, BATTERY_MAX_ENERGY, TIMESTEP] {
        if !params.contains(key) {
            return Err(SimError::config(format!("initial parameters must define '{key}'")));
        }
    }
    let max: Energy = params.get_as(BATTERY_MAX_ENERGY)?;
    let total: Energy = params.get_as(TOTAL_ENERGY)?;
    ensure_finite(total.value, "total_energy")?;
    if !(max.value.is_finite() && max.value >= 0.0) {
        return Err(SimError::config("battery_max_energy must be finite and non-negative"));
    }

    let dt: Time = params.get_as(TIMESTEP)?;
    if !dt.value.is_finite() || dt.value <= 0.0 {
        return Err(SimError::config("timestep must be a positive, finite duration"));
    }
    Ok(dt)
}

/// Walk the pipeline in execution order and check that every required read
/// is satisfied by the initial store or by an earlier writer.
pub(crate) fn validate_reads(
    params: &ParamStore,
    models: &[Box<dyn EnergyModel>],
    battery: &dyn EnergyModel,
) -> SimResult<()> {
    let mut available: BTreeSet<String> = params.keys().map(str::to_string).collect();
    let mut seen_names = BTreeSet::new();

    for model in models.iter().map(|m| m.as_ref()).chain(std::iter::once(battery)) {
        if !seen_names.insert(model.name().to_string()) {
            return Err(SimError::config(format!(
                "model '{}' is registered more than once",
                model.name()
            )));
        }
        if let Some(key) = model.requires().into_iter().find(|k| !available.contains(k)) {
            return Err(SimError::UnsatisfiedRead {
                model: model.name().to_string(),
                key,
            });
        }
        available.extend(model.writes());
    }
    Ok(())
}
