//! Solar array generation model.

use crate::common::{
    accumulate, check_finite, energy_over, optional_factor, set_power, WEATHER_CLOUD_MODIFIER,
};
use crate::error::ModelResult;
use crate::optics::{incidence_factor, LaminationOptics};
use crate::traits::{keys, EnergyModel};
use sc_core::numeric::clamp_unit;
use sc_core::units::{degc, w, Energy, Power, Temperature, Time};
use sc_core::{Dimension, ParamStore, Quantity, Unit};
use uom::si::thermodynamic_temperature::kelvin;

/// Ambient temperature used when `ambient_temperature` is absent (°C).
pub const DEFAULT_AMBIENT_C: f64 = 25.0;
/// Clear-sky irradiance used when `irradiance` is absent (W/m²).
pub const CLEAR_SKY_IRRADIANCE_WPM2: f64 = 1000.0;
/// Nominal operating cell temperature used when `noct` is absent (°C).
pub const DEFAULT_NOCT_C: f64 = 45.0;
/// Power temperature coefficient used when `cell_temp_coeff` is absent (1/K).
pub const DEFAULT_TEMP_COEFF_PER_K: f64 = -0.0035;

/// NOCT test conditions: 20 °C ambient at 800 W/m².
const NOCT_AMBIENT_C: f64 = 20.0;
const NOCT_IRRADIANCE_WPM2: f64 = 800.0;
/// Cell rating temperature (°C).
const STC_CELL_C: f64 = 25.0;

/// How much of the array physics to model. Each level includes the previous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArrayFidelity {
    /// `num_cells * p_mpp * cell_efficiency`.
    Nameplate,
    /// Nameplate scaled by the sun-angle incidence factor.
    Incidence,
    /// Incidence plus lamination transmittance.
    #[default]
    Laminated,
    /// Laminated plus NOCT cell-temperature derate.
    ThermalDerated,
}

impl ArrayFidelity {
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayFidelity::Nameplate => "nameplate",
            ArrayFidelity::Incidence => "incidence",
            ArrayFidelity::Laminated => "laminated",
            ArrayFidelity::ThermalDerated => "thermal_derated",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "nameplate" => Some(ArrayFidelity::Nameplate),
            "incidence" => Some(ArrayFidelity::Incidence),
            "laminated" => Some(ArrayFidelity::Laminated),
            "thermal_derated" | "thermal" => Some(ArrayFidelity::ThermalDerated),
            _ => None,
        }
    }

    fn uses_sun_angle(self) -> bool {
        self != ArrayFidelity::Nameplate
    }

    fn uses_lamination(self) -> bool {
        matches!(
            self,
            ArrayFidelity::Laminated | ArrayFidelity::ThermalDerated
        )
    }
}

/// Cell temperature and derate from the NOCT model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalDerate {
    pub cell_temperature: Temperature,
    pub factor: f64,
}

/// `T_cell = T_amb + (NOCT - 20 °C) / 800 W/m² * G`,
/// derate `1 + gamma * (T_cell - 25 °C)` clamped to `[0, 1]`.
pub fn thermal_derate(
    ambient: Temperature,
    noct: Temperature,
    irradiance_wpm2: f64,
    gamma_per_k: f64,
) -> ThermalDerate {
    let rise_k = (noct.get::<kelvin>() - degc(NOCT_AMBIENT_C).get::<kelvin>())
        / NOCT_IRRADIANCE_WPM2
        * irradiance_wpm2;
    let cell_k = ambient.get::<kelvin>() + rise_k;
    let over_stc = cell_k - degc(STC_CELL_C).get::<kelvin>();
    ThermalDerate {
        cell_temperature: Temperature::new::<kelvin>(cell_k),
        factor: clamp_unit(1.0 + gamma_per_k * over_stc),
    }
}

/// Photovoltaic array on a horizontal surface.
///
/// Writes `array_power` (W, never negative), `array_energy` and the running
/// `total_array_energy`, plus the diagnostics for the chosen fidelity.
/// At night the model writes zero power and returns exactly zero.
#[derive(Clone, Debug, Default)]
pub struct SolarArray {
    fidelity: ArrayFidelity,
}

impl SolarArray {
    pub fn new(fidelity: ArrayFidelity) -> Self {
        Self { fidelity }
    }

    pub fn fidelity(&self) -> ArrayFidelity {
        self.fidelity
    }

    fn nameplate_power(params: &ParamStore) -> ModelResult<Power> {
        let cells = params.ratio("num_cells")?;
        let p_mpp: Power = params.get_as("p_mpp")?;
        let efficiency = params.ratio("cell_efficiency")?;
        Ok(p_mpp * (cells * efficiency))
    }

    fn sun_incidence(params: &ParamStore) -> ModelResult<f64> {
        let latitude = params.magnitude_in("latitude_deg", &Unit::radian())?;
        let tod: Time = params.get_as("timestamp")?;
        Ok(incidence_factor(latitude, tod.value))
    }

    fn derate(params: &ParamStore, incidence: f64) -> ModelResult<ThermalDerate> {
        let ambient = params
            .get_as_opt::<Temperature>("ambient_temperature")?
            .unwrap_or_else(|| degc(DEFAULT_AMBIENT_C));
        let noct = params
            .get_as_opt::<Temperature>("noct")?
            .unwrap_or_else(|| degc(DEFAULT_NOCT_C));
        let irradiance_unit = Unit::new("W/m^2", 1.0, Dimension::POWER / Dimension::AREA);
        let irradiance = match params.get_opt("irradiance") {
            Some(_) => params.magnitude_in("irradiance", &irradiance_unit)?,
            None => CLEAR_SKY_IRRADIANCE_WPM2,
        };
        let per_kelvin = Unit::new("1/K", 1.0, Dimension::TEMPERATURE.powi(-1));
        let gamma = match params.get_opt("cell_temp_coeff") {
            Some(_) => params.magnitude_in("cell_temp_coeff", &per_kelvin)?,
            None => DEFAULT_TEMP_COEFF_PER_K,
        };
        Ok(thermal_derate(ambient, noct, irradiance * incidence, gamma))
    }

    fn write_output(params: &mut ParamStore, power: Power, dt: Time) -> ModelResult<Energy> {
        let energy = energy_over(power, dt);
        set_power(params, "array_power", power);
        params.set_typed("array_energy", energy);
        accumulate(params, "total_array_energy", energy)?;
        Ok(energy)
    }
}

impl EnergyModel for SolarArray {
    fn name(&self) -> &str {
        "array"
    }

    fn requires(&self) -> Vec<String> {
        let mut req = keys(&["num_cells", "p_mpp", "cell_efficiency"]);
        if self.fidelity.uses_sun_angle() {
            req.extend(keys(&["latitude_deg", "timestamp"]));
        }
        if self.fidelity.uses_lamination() {
            req.extend(keys(&LaminationOptics::REQUIRED));
        }
        req
    }

    fn optional(&self) -> Vec<String> {
        let mut opt = keys(&[WEATHER_CLOUD_MODIFIER, "total_array_energy"]);
        if self.fidelity.uses_lamination() {
            opt.extend(keys(&LaminationOptics::OPTIONAL));
        }
        if self.fidelity == ArrayFidelity::ThermalDerated {
            opt.extend(keys(&[
                "ambient_temperature",
                "noct",
                "irradiance",
                "cell_temp_coeff",
            ]));
        }
        opt
    }

    fn writes(&self) -> Vec<String> {
        let mut out = keys(&["array_power", "array_energy", "total_array_energy"]);
        if self.fidelity.uses_sun_angle() {
            out.push("incidence_factor".into());
        }
        if self.fidelity.uses_lamination() {
            out.extend(keys(&["tau", "theta_rad"]));
        }
        if self.fidelity == ArrayFidelity::ThermalDerated {
            out.extend(keys(&["cell_temperature", "thermal_derate"]));
        }
        out
    }

    fn update(&self, params: &mut ParamStore, dt: Time) -> ModelResult<Energy> {
        let mut power = Self::nameplate_power(params)?;

        if self.fidelity.uses_sun_angle() {
            let inc = Self::sun_incidence(params)?;
            params.set("incidence_factor", Quantity::dimensionless(inc));
            if inc <= 0.0 {
                return Self::write_output(params, w(0.0), dt);
            }
            power *= inc;

            if self.fidelity.uses_lamination() {
                let theta = clamp_unit(inc).acos();
                let tau = LaminationOptics::from_params(params)?.transmittance(theta);
                params.set("tau", Quantity::dimensionless(tau));
                params.set("theta_rad", Quantity::new(theta, Unit::radian()));
                power *= tau;
            }

            if self.fidelity == ArrayFidelity::ThermalDerated {
                let derate = Self::derate(params, inc)?;
                params.set(
                    "cell_temperature",
                    Quantity::from_si_in(
                        derate.cell_temperature.get::<kelvin>(),
                        Unit::degree_celsius(),
                    ),
                );
                params.set("thermal_derate", Quantity::dimensionless(derate.factor));
                power *= derate.factor;
            }
        }

        power *= optional_factor(params, WEATHER_CLOUD_MODIFIER)?;
        check_finite(power.value, "array", "array power")?;
        Self::write_output(params, power.max(w(0.0)), dt)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use sc_core::units::s;

    proptest! {
        #[test]
        fn night_is_zero_at_any_latitude(lat in -60.0_f64..60.0, hour in 0.0_f64..5.9) {
            let mut p = ParamStore::new();
            p.set("num_cells", Quantity::dimensionless(10.0));
            p.set_typed("p_mpp", w(4.0));
            p.set("cell_efficiency", Quantity::dimensionless(0.25));
            p.set("latitude_deg", Quantity::new(lat, Unit::degree()));
            p.set_typed("timestamp", s(hour * 3600.0));
            let e = SolarArray::new(ArrayFidelity::Incidence).update(&mut p, s(60.0)).unwrap();
            prop_assert_eq!(e.value, 0.0);
        }
    }
}
