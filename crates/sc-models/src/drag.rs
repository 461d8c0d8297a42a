//! Aerodynamic drag model.

use crate::common::{check_finite, energy_over, optional_factor, set_power, WEATHER_WIND_MODIFIER};
use crate::error::ModelResult;
use crate::traits::{keys, EnergyModel};
use sc_core::units::{Area, Density, Energy, Force, Power, Time, Velocity};
use sc_core::ParamStore;

/// Quadratic-drag power sink.
///
/// ```text
/// F_drag = 0.5 * rho * v^2 * Cd * A * wind_modifier
/// P_drag = -F_drag * |v|
/// ```
///
/// `weather_wind_modifier` is optional and clamped at zero.
#[derive(Clone, Debug, Default)]
pub struct Drag;

impl Drag {
    pub fn new() -> Self {
        Self
    }

    /// Drag force for the given conditions (no wind modifier).
    pub fn force(rho: Density, v: Velocity, cd: f64, area: Area) -> Force {
        rho * v * v * area * (0.5 * cd)
    }
}

impl EnergyModel for Drag {
    fn name(&self) -> &str {
        "drag"
    }

    fn requires(&self) -> Vec<String> {
        keys(&["air_density", "velocity", "drag_coeff", "frontal_area"])
    }

    fn optional(&self) -> Vec<String> {
        keys(&[WEATHER_WIND_MODIFIER])
    }

    fn writes(&self) -> Vec<String> {
        keys(&["drag_power", "drag_force"])
    }

    fn update(&self, params: &mut ParamStore, dt: Time) -> ModelResult<Energy> {
        let rho: Density = params.get_as("air_density")?;
        let v: Velocity = params.get_as("velocity")?;
        let cd = params.ratio("drag_coeff")?;
        let area: Area = params.get_as("frontal_area")?;
        let wind = optional_factor(params, WEATHER_WIND_MODIFIER)?;

        let force = Self::force(rho, v, cd, area) * wind;
        let power: Power = -(force * v.abs());
        check_finite(power.value, "drag", "drag power")?;

        params.set_typed("drag_force", force);
        set_power(params, "drag_power", power);
        Ok(energy_over(power, dt))
    }
}
