//! Common utilities for model calculations.

use crate::error::{ModelError, ModelResult};
use sc_core::numeric::{ensure_finite, non_negative};
use sc_core::units::{Energy, Power, Time};
use sc_core::{ParamStore, Quantity};

/// Weather modifier keys injected by the driver.
pub const WEATHER_TEMP_MODIFIER: &str = "weather_temp_modifier";
pub const WEATHER_CLOUD_MODIFIER: &str = "weather_cloud_modifier";
pub const WEATHER_WIND_MODIFIER: &str = "weather_wind_modifier";
pub const WEATHER_ROAD_MODIFIER: &str = "weather_road_modifier";

/// Ensure a value is finite, returning a model error naming the quantity.
pub fn check_finite(value: f64, model: &'static str, what: &'static str) -> ModelResult<f64> {
    ensure_finite(value, what).map_err(|_| ModelError::NonPhysical { model, what })
}

/// Dimensionless optional factor, absent means 1. Negative factors read as 0.
pub fn optional_factor(params: &ParamStore, name: &str) -> ModelResult<f64> {
    if params.contains(name) {
        Ok(non_negative(params.ratio(name)?))
    } else {
        Ok(1.0)
    }
}

/// Energy over one step for a constant power.
pub fn energy_over(power: Power, dt: Time) -> Energy {
    power * dt
}

/// Write a power value in watts.
pub fn set_power(params: &mut ParamStore, name: &str, power: Power) {
    params.set_typed(name, power);
}

/// Add `delta` to an accumulator key, creating it at zero when absent.
pub fn accumulate(params: &mut ParamStore, name: &str, delta: Energy) -> ModelResult<()> {
    let next = match params.get_opt(name) {
        Some(prev) => prev.try_add(&Quantity::from_typed(delta))?,
        None => Quantity::from_typed(delta),
    };
    params.set(name, next);
    Ok(())
}
