//! Rolling resistance model, one contribution per configured wheel.

use crate::common::{check_finite, energy_over, optional_factor, set_power, WEATHER_ROAD_MODIFIER};
use crate::error::{ModelError, ModelResult};
use crate::traits::{keys, EnergyModel};
use sc_core::units::{newton, Accel, Energy, Force, Mass, Power, Time, Velocity};
use sc_core::{Dimension, ParamStore};

/// A wheel and the store key holding the load it carries.
///
/// The load may be given as a mass (`kg`, `lb`), which is multiplied by
/// `grav_accel`, or directly as a force (`N`, `lbf`).
#[derive(Clone, Debug, PartialEq)]
pub struct WheelLoad {
    pub name: String,
    pub weight_key: String,
}

impl WheelLoad {
    pub fn new(name: impl Into<String>, weight_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight_key: weight_key.into(),
        }
    }

    fn power_key(&self) -> String {
        format!("rr_power_{}", self.name)
    }
}

/// Rolling resistance with a speed-dependent coefficient.
///
/// ```text
/// mu    = mu_rr + mu2_rr * v
/// F_i   = N_i * mu * road_modifier
/// P_i   = -F_i * v
/// ```
#[derive(Clone, Debug)]
pub struct RollingResistance {
    wheels: Vec<WheelLoad>,
}

impl RollingResistance {
    pub fn new(wheels: Vec<WheelLoad>) -> ModelResult<Self> {
        if wheels.is_empty() {
            return Err(ModelError::InvalidArg {
                what: "rolling resistance needs at least one wheel",
            });
        }
        Ok(Self { wheels })
    }

    /// Whole-vehicle load under a single key.
    pub fn single(weight_key: impl Into<String>) -> Self {
        Self {
            wheels: vec![WheelLoad::new("vehicle", weight_key)],
        }
    }

    pub fn wheels(&self) -> &[WheelLoad] {
        &self.wheels
    }

    fn normal_force(params: &ParamStore, wheel: &WheelLoad) -> ModelResult<Force> {
        let load = params.get(&wheel.weight_key)?;
        if load.dimension() == Dimension::FORCE {
            return Ok(params.get_as(&wheel.weight_key)?);
        }
        let mass: Mass = params.get_as(&wheel.weight_key)?;
        let g: Accel = params.get_as("grav_accel")?;
        Ok(mass * g)
    }

    fn total_mu(params: &ParamStore) -> ModelResult<f64> {
        let mu_rr = params.get("mu_rr")?;
        let speed_term = params.get("mu2_rr")?.product(params.get("velocity")?);
        let total = mu_rr.try_add(&speed_term)?;
        Ok(total.magnitude_in(&sc_core::Unit::dimensionless())?)
    }
}

impl EnergyModel for RollingResistance {
    fn name(&self) -> &str {
        "rolling_resistance"
    }

    fn requires(&self) -> Vec<String> {
        let mut req = keys(&["mu_rr", "mu2_rr", "velocity", "grav_accel"]);
        req.extend(self.wheels.iter().map(|w| w.weight_key.clone()));
        req
    }

    fn optional(&self) -> Vec<String> {
        keys(&[WEATHER_ROAD_MODIFIER])
    }

    fn writes(&self) -> Vec<String> {
        let mut out = keys(&[
            "total_mu",
            "normal_force",
            "rr_force",
            "rolling_resistance_power",
            "rr_power",
        ]);
        out.extend(self.wheels.iter().map(WheelLoad::power_key));
        out
    }

    fn update(&self, params: &mut ParamStore, dt: Time) -> ModelResult<Energy> {
        let v: Velocity = params.get_as("velocity")?;
        let mu = Self::total_mu(params)? * optional_factor(params, WEATHER_ROAD_MODIFIER)?;
        check_finite(mu, "rolling_resistance", "rolling resistance coefficient")?;

        let mut normal_total = newton(0.0);
        let mut force_total = newton(0.0);
        let mut per_wheel = Vec::with_capacity(self.wheels.len());
        for wheel in &self.wheels {
            let normal = Self::normal_force(params, wheel)?;
            let force = normal * mu;
            let power: Power = -(force * v);
            normal_total += normal;
            force_total += force;
            per_wheel.push((wheel.power_key(), power));
        }
        let power: Power = -(force_total * v);
        check_finite(power.value, "rolling_resistance", "rolling resistance power")?;

        params.set("total_mu", sc_core::Quantity::dimensionless(mu));
        params.set_typed("normal_force", normal_total);
        params.set_typed("rr_force", force_total);
        for (key, p) in per_wheel {
            set_power(params, &key, p);
        }
        set_power(params, "rolling_resistance_power", power);
        set_power(params, "rr_power", power);
        Ok(energy_over(power, dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::units::{constants::g0, kg, mps, s};
    use sc_core::Quantity;
    use uom::si::power::watt;

    fn params() -> ParamStore {
        let mut p = ParamStore::new();
        p.set("mu_rr", Quantity::dimensionless(0.0015));
        p.set("mu2_rr", Quantity::parse(0.0001, "s/m").unwrap());
        p.set_typed("velocity", mps(10.0));
        p.set_typed("grav_accel", g0());
        p.set_typed("front_weight", kg(100.0));
        p.set_typed("rear_weight", newton(1000.0));
        p
    }

    fn model() -> RollingResistance {
        RollingResistance::new(vec![
            WheelLoad::new("front", "front_weight"),
            WheelLoad::new("rear", "rear_weight"),
        ])
        .unwrap()
    }

    #[test]
    fn per_wheel_and_total_power() {
        let mut p = params();
        model().update(&mut p, s(1.0)).unwrap();

        let mu = 0.0015 + 0.0001 * 10.0;
        let front = -(100.0 * 9.806_65 * mu * 10.0);
        let rear = -(1000.0 * mu * 10.0);
        let got_front: Power = p.get_as("rr_power_front").unwrap();
        let got_rear: Power = p.get_as("rr_power_rear").unwrap();
        let total: Power = p.get_as("rr_power").unwrap();
        let alias: Power = p.get_as("rolling_resistance_power").unwrap();
        assert!((got_front.get::<watt>() - front).abs() < 1e-9);
        assert!((got_rear.get::<watt>() - rear).abs() < 1e-9);
        assert!((total.get::<watt>() - (front + rear)).abs() < 1e-9);
        assert_eq!(total, alias);
        assert!((p.ratio("total_mu").unwrap() - mu).abs() < 1e-15);
    }

    #[test]
    fn road_modifier_raises_loss() {
        let mut dry = params();
        let e_dry = model().update(&mut dry, s(1.0)).unwrap();
        let mut wet = params();
        wet.set(WEATHER_ROAD_MODIFIER, Quantity::dimensionless(1.2));
        let e_wet = model().update(&mut wet, s(1.0)).unwrap();
        assert!((e_wet.value - 1.2 * e_dry.value).abs() < 1e-9);
    }

    #[test]
    fn dimensionful_mu_is_rejected() {
        let mut p = params();
        p.set("mu2_rr", Quantity::dimensionless(0.0001));
        assert!(model().update(&mut p, s(1.0)).is_err());
    }

    #[test]
    fn requires_lists_wheel_keys() {
        let req = model().requires();
        assert!(req.contains(&"front_weight".to_string()));
        assert!(req.contains(&"rear_weight".to_string()));
        assert!(RollingResistance::new(vec![]).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use sc_core::units::{constants::g0, kg, mps, s};
    use sc_core::Quantity;

    proptest! {
        #[test]
        fn energy_is_non_positive(v in 0.0_f64..40.0, mass in 1.0_f64..500.0, mu in 0.0_f64..0.02) {
            let mut p = ParamStore::new();
            p.set("mu_rr", Quantity::dimensionless(mu));
            p.set("mu2_rr", Quantity::parse(0.0, "s/m").unwrap());
            p.set_typed("velocity", mps(v));
            p.set_typed("grav_accel", g0());
            p.set_typed("load", kg(mass));
            let e = RollingResistance::single("load").update(&mut p, s(30.0)).unwrap();
            prop_assert!(e.value <= 0.0);
        }
    }
}
