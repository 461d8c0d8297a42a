// sc-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Area as UomArea, ElectricCurrent as UomElectricCurrent,
    ElectricPotential as UomElectricPotential, ElectricalResistance as UomElectricalResistance,
    Energy as UomEnergy, Force as UomForce, Length as UomLength, Mass as UomMass,
    MassDensity as UomMassDensity, Power as UomPower, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Area = UomArea;
pub type Current = UomElectricCurrent;
pub type Density = UomMassDensity;
pub type Energy = UomEnergy;
pub type Force = UomForce;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Power = UomPower;
pub type Ratio = UomRatio;
pub type Resistance = UomElectricalResistance;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type Voltage = UomElectricPotential;

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn wh(v: f64) -> Energy {
    use uom::si::energy::watt_hour;
    Energy::new::<watt_hour>(v)
}

#[inline]
pub fn j(v: f64) -> Energy {
    use uom::si::energy::joule;
    Energy::new::<joule>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn newton(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn amps(v: f64) -> Current {
    use uom::si::electric_current::ampere;
    Current::new::<ampere>(v)
}

#[inline]
pub fn volts(v: f64) -> Voltage {
    use uom::si::electric_potential::volt;
    Voltage::new::<volt>(v)
}

#[inline]
pub fn ohms(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

pub mod constants {
    use super::*;

    pub const G0_MPS2: f64 = 9.806_65;

    /// Sea-level standard air density.
    pub const RHO_AIR_STD_KGPM3: f64 = 1.225;

    /// Reference temperature for cell ratings and weather derates (25 °C).
    pub const T_REF_C: f64 = 25.0;

    #[inline]
    pub fn g0() -> Accel {
        use uom::si::acceleration::meter_per_second_squared;
        Accel::new::<meter_per_second_squared>(G0_MPS2)
    }

    #[inline]
    pub fn rho_air_std() -> Density {
        kgpm3(RHO_AIR_STD_KGPM3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::energy::joule;

    #[test]
    fn constructors_smoke() {
        let _p = w(260.8);
        let _v = mps(16.0);
        let _a = m2(0.9117);
        let _rho = constants::rho_air_std();
        let _i = amps(3.2);
        let _u = volts(96.0);
        let _r = ohms(0.02);
        let _t = degc(25.0);
        let _g0 = constants::g0();
    }

    #[test]
    fn watt_hour_is_3600_joules() {
        assert!((wh(1.0).get::<joule>() - 3600.0).abs() < 1e-9);
    }

    #[test]
    fn power_times_time_is_energy() {
        let e: Energy = w(100.0) * s(36.0);
        assert!((e.get::<joule>() - 3600.0).abs() < 1e-9);
    }
}
