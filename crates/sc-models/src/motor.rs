//! Hub motor loss model.

use crate::common::{check_finite, energy_over, set_power};
use crate::error::{ModelError, ModelResult};
use crate::traits::{keys, EnergyModel};
use sc_core::units::{amps, w, Current, Energy, Length, Power, Resistance, Time, Velocity, Voltage};
use sc_core::{Dimension, ParamStore, Quantity, Unit};
use uom::si::electric_current::ampere;
use uom::si::electrical_resistance::ohm;

/// Loss coefficient unit `W/rpm^n`.
fn watts_per_rpm(n: i8) -> Unit {
    let symbol = if n == 1 {
        "W/rpm".to_string()
    } else {
        format!("W/rpm^{n}")
    };
    Unit::new(
        symbol,
        Unit::rpm().scale().powi(-(n as i32)),
        Dimension::POWER / Dimension::FREQUENCY.powi(n),
    )
}

/// Resistances and speed-loss coefficients of the motor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorCoefficients {
    pub r_armature: Resistance,
    pub r_commutation: Resistance,
    /// Hysteresis, W/rpm.
    pub k_h: f64,
    /// Eddy current, W/rpm².
    pub k_e: f64,
    /// Bearing, W/rpm and W/rpm².
    pub k_b1: f64,
    pub k_b2: f64,
    /// Windage, W/rpm³.
    pub k_d: f64,
}

impl MotorCoefficients {
    pub const KEYS: [&'static str; 7] = [
        "motor_R_A",
        "motor_R_B",
        "motor_k_H",
        "motor_k_E",
        "motor_k_B1",
        "motor_k_B2",
        "motor_k_D",
    ];

    pub fn from_params(params: &ParamStore) -> ModelResult<Self> {
        Ok(Self {
            r_armature: params.get_as("motor_R_A")?,
            r_commutation: params.get_as("motor_R_B")?,
            k_h: params.magnitude_in("motor_k_H", &watts_per_rpm(1))?,
            k_e: params.magnitude_in("motor_k_E", &watts_per_rpm(2))?,
            k_b1: params.magnitude_in("motor_k_B1", &watts_per_rpm(1))?,
            k_b2: params.magnitude_in("motor_k_B2", &watts_per_rpm(2))?,
            k_d: params.magnitude_in("motor_k_D", &watts_per_rpm(3))?,
        })
    }
}

/// Loss breakdown at one operating point (all W, non-negative for valid inputs).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorLosses {
    pub armature: Power,
    pub commutation: Power,
    pub copper_total: Power,
    pub hysteresis: Power,
    pub eddy: Power,
    pub bearing: Power,
    pub air_drag: Power,
    pub stray_total: Power,
    pub total: Power,
}

impl MotorLosses {
    pub fn compute(current: Current, speed_rpm: f64, k: &MotorCoefficients) -> Self {
        let i = current.get::<ampere>();
        let n = speed_rpm;

        let armature = w(i * i * k.r_armature.get::<ohm>());
        let commutation = w(i * i * k.r_commutation.get::<ohm>());
        let copper_total = armature + commutation;

        let hysteresis = w(k.k_h * n);
        let eddy = w(k.k_e * n * n);
        let bearing = w((k.k_b1 + k.k_b2 * n) * n);
        let air_drag = w(k.k_d * n * n * n);
        let stray_total = hysteresis + eddy + bearing + air_drag;

        Self {
            armature,
            commutation,
            copper_total,
            hysteresis,
            eddy,
            bearing,
            air_drag,
            stray_total,
            total: copper_total + stray_total,
        }
    }

    pub const KEYS: [&'static str; 9] = [
        "motor_P_armature",
        "motor_P_commutation",
        "motor_P_copper_total",
        "motor_P_hysteresis",
        "motor_P_eddy",
        "motor_P_bearing",
        "motor_P_air_drag",
        "motor_P_stray_total",
        "motor_P_total",
    ];

    fn values(&self) -> [Power; 9] {
        [
            self.armature,
            self.commutation,
            self.copper_total,
            self.hysteresis,
            self.eddy,
            self.bearing,
            self.air_drag,
            self.stray_total,
            self.total,
        ]
    }
}

/// Efficiency chain from shaft to battery at a torque and speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OperatingPoint {
    pub current: Current,
    pub speed_rpm: f64,
    pub torque_nm: f64,
    pub shaft_power: Power,
    pub motor_input: Power,
    pub controller_loss: Power,
    pub battery_input: Power,
    pub eta_motor: f64,
    pub eta_system: f64,
    pub losses: MotorLosses,
}

/// Copper and stray losses of the drive motor.
///
/// Motor speed comes from the wheel: `omega = 2 v / d`, reported in rpm.
/// Current is the tractive demand over the pack voltage,
/// `I = (drag_power + rr_power) / battery_voltage_nominal`.
#[derive(Clone, Debug, Default)]
pub struct MotorLoss;

impl MotorLoss {
    pub fn new() -> Self {
        Self
    }

    /// Wheel-driven motor speed in rpm.
    pub fn speed_rpm(velocity: Velocity, wheel_diameter: Length) -> ModelResult<f64> {
        if wheel_diameter.value <= 0.0 {
            return Err(ModelError::InvalidArg {
                what: "wheel diameter must be positive",
            });
        }
        let omega_rad_s = 2.0 * velocity.value / wheel_diameter.value;
        Ok(Unit::rpm().from_si(omega_rad_s))
    }

    /// Motor and system efficiency for a shaft torque (N·m) at a speed (rpm).
    ///
    /// Reads `motor_k_S` (N·m/A), `motor_eta_C` and the loss coefficients.
    /// Efficiencies are 0 when the corresponding input power is not positive.
    pub fn operating_point(
        torque_nm: f64,
        speed_rpm: f64,
        params: &ParamStore,
    ) -> ModelResult<OperatingPoint> {
        let torque_constant = Unit::new("N*m/A", 1.0, Dimension::ENERGY / Dimension::CURRENT);
        let k_s = params.magnitude_in("motor_k_S", &torque_constant)?;
        let eta_c = params.ratio("motor_eta_C")?;
        if k_s <= 0.0 || eta_c <= 0.0 {
            return Err(ModelError::InvalidArg {
                what: "motor_k_S and motor_eta_C must be positive",
            });
        }
        let coeffs = MotorCoefficients::from_params(params)?;

        let current = amps(torque_nm / k_s);
        let shaft_power = w(torque_nm * Unit::rpm().to_si(speed_rpm));
        let losses = MotorLosses::compute(current, speed_rpm, &coeffs);
        let motor_input = shaft_power + losses.total;
        let eta_motor = if motor_input.value > 0.0 {
            shaft_power.value / motor_input.value
        } else {
            0.0
        };
        let controller_loss = motor_input * (1.0 / eta_c - 1.0);
        let battery_input = motor_input / eta_c;
        let eta_system = if battery_input.value > 0.0 {
            shaft_power.value / battery_input.value
        } else {
            0.0
        };

        Ok(OperatingPoint {
            current,
            speed_rpm,
            torque_nm,
            shaft_power,
            motor_input,
            controller_loss,
            battery_input,
            eta_motor,
            eta_system,
            losses,
        })
    }
}

impl EnergyModel for MotorLoss {
    fn name(&self) -> &str {
        "motor"
    }

    fn requires(&self) -> Vec<String> {
        let mut req = keys(&[
            "velocity",
            "wheel_diameter",
            "drag_power",
            "rr_power",
            "battery_voltage_nominal",
        ]);
        req.extend(keys(&MotorCoefficients::KEYS));
        req
    }

    fn writes(&self) -> Vec<String> {
        let mut out = keys(&["motor_speed", "motor_current"]);
        out.extend(keys(&MotorLosses::KEYS));
        out
    }

    fn update(&self, params: &mut ParamStore, dt: Time) -> ModelResult<Energy> {
        let v: Velocity = params.get_as("velocity")?;
        let d: Length = params.get_as("wheel_diameter")?;
        let n_rpm = check_finite(Self::speed_rpm(v, d)?, "motor", "motor speed")?;

        let drag: Power = params.get_as("drag_power")?;
        let rr: Power = params.get_as("rr_power")?;
        let volts: Voltage = params.get_as("battery_voltage_nominal")?;
        if volts.value == 0.0 {
            return Err(ModelError::NonPhysical {
                model: "motor",
                what: "zero battery voltage",
            });
        }
        let current: Current = (drag + rr) / volts;

        let coeffs = MotorCoefficients::from_params(params)?;
        let losses = MotorLosses::compute(current, n_rpm, &coeffs);
        check_finite(losses.total.value, "motor", "motor loss")?;

        params.set("motor_speed", Quantity::new(n_rpm, Unit::rpm()));
        params.set_typed("motor_current", current);
        for (key, p) in MotorLosses::KEYS.iter().zip(losses.values()) {
            set_power(params, key, p);
        }
        Ok(energy_over(-losses.total, dt))
    }
}
