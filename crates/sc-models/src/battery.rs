//! Battery internal-resistance loss.
//!
//! The battery model occupies a dedicated slot in the vehicle pipeline and
//! always runs after every other model, so the tractive powers it reads are
//! the ones computed in the same step.

use crate::common::{check_finite, energy_over, optional_factor, set_power, WEATHER_TEMP_MODIFIER};
use crate::error::{ModelError, ModelResult};
use crate::traits::{keys, EnergyModel};
use sc_core::units::{j, Current, Energy, Power, Resistance, Time, Voltage};
use sc_core::ParamStore;

/// Equivalent series resistance loss of the pack.
///
/// ```text
/// R_pack = R_cell / parallel * series * temp_modifier
/// I      = (drag_power + rr_power) / V_nominal
/// P_loss = I^2 * R_pack
/// ```
#[derive(Clone, Debug, Default)]
pub struct EsrBatteryLoss;

impl EsrBatteryLoss {
    pub fn new() -> Self {
        Self
    }
}

impl EnergyModel for EsrBatteryLoss {
    fn name(&self) -> &str {
        "battery_esr"
    }

    fn requires(&self) -> Vec<String> {
        keys(&[
            "cells_in_series",
            "cells_in_parallel",
            "cell_internal_impedance",
            "drag_power",
            "rr_power",
            "battery_voltage_nominal",
        ])
    }

    fn optional(&self) -> Vec<String> {
        keys(&[WEATHER_TEMP_MODIFIER])
    }

    fn writes(&self) -> Vec<String> {
        keys(&["pack_resistance", "current_draw", "battery_power_loss"])
    }

    fn update(&self, params: &mut ParamStore, dt: Time) -> ModelResult<Energy> {
        let series = params.ratio("cells_in_series")?;
        let parallel = params.ratio("cells_in_parallel")?;
        if parallel <= 0.0 {
            return Err(ModelError::NonPhysical {
                model: "battery_esr",
                what: "cells_in_parallel must be positive",
            });
        }
        let r_cell: Resistance = params.get_as("cell_internal_impedance")?;
        let temp = optional_factor(params, WEATHER_TEMP_MODIFIER)?;
        let pack = r_cell / parallel * series * temp;

        let drag: Power = params.get_as("drag_power")?;
        let rr: Power = params.get_as("rr_power")?;
        let volts: Voltage = params.get_as("battery_voltage_nominal")?;
        if volts.value == 0.0 {
            return Err(ModelError::NonPhysical {
                model: "battery_esr",
                what: "zero battery voltage",
            });
        }
        let current: Current = (drag + rr) / volts;
        let loss: Power = current * current * pack;
        check_finite(loss.value, "battery_esr", "battery power loss")?;

        params.set_typed("pack_resistance", pack);
        params.set_typed("current_draw", current);
        set_power(params, "battery_power_loss", loss);
        Ok(energy_over(-loss.abs(), dt))
    }
}

/// Battery slot placeholder that contributes nothing.
#[derive(Clone, Debug, Default)]
pub struct NoBatteryLoss;

impl EnergyModel for NoBatteryLoss {
    fn name(&self) -> &str {
        "battery_none"
    }

    fn requires(&self) -> Vec<String> {
        Vec::new()
    }

    fn writes(&self) -> Vec<String> {
        Vec::new()
    }

    fn update(&self, _params: &mut ParamStore, _dt: Time) -> ModelResult<Energy> {
        Ok(j(0.0))
    }
}
