//! Unit-tagged scalar values.
//!
//! A [`Quantity`] keeps the magnitude in the unit it was given (so logs show
//! `Wh` when the user wrote `Wh`) and converts through SI for arithmetic.
//! Addition, subtraction and comparison require equal dimensions and fail with
//! [`CoreError::UnitMismatch`] otherwise. Multiplication and division always
//! succeed and produce a result in SI base units.
//!
//! [`SiQuantity`] bridges into the compile-time `uom` types so models can do
//! their physics with static unit checking once a value leaves the store.

use core::cmp::Ordering;
use core::fmt;

use crate::dimension::Dimension;
use crate::error::{CoreError, CoreResult};
use crate::units::{
    Accel, Area, Current, Density, Energy, Force, Length, Mass, Power, Ratio, Resistance,
    Temperature, Time, Velocity, Voltage,
};

/// A named unit: `si = magnitude * scale + offset`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    symbol: String,
    scale: f64,
    offset: f64,
    dim: Dimension,
}

impl Unit {
    pub fn new(symbol: impl Into<String>, scale: f64, dim: Dimension) -> Self {
        Self {
            symbol: symbol.into(),
            scale,
            offset: 0.0,
            dim,
        }
    }

    /// Affine unit such as degrees Celsius.
    pub fn with_offset(symbol: impl Into<String>, scale: f64, offset: f64, dim: Dimension) -> Self {
        Self {
            symbol: symbol.into(),
            scale,
            offset,
            dim,
        }
    }

    /// Coherent SI unit for a dimension (scale 1).
    pub fn si(dim: Dimension) -> Self {
        Self::new(dim.to_string(), 1.0, dim)
    }

    pub fn dimensionless() -> Self {
        Self::si(Dimension::NONE)
    }

    pub fn watt() -> Self {
        Self::si(Dimension::POWER)
    }

    pub fn watt_hour() -> Self {
        Self::new("Wh", 3600.0, Dimension::ENERGY)
    }

    pub fn second() -> Self {
        Self::si(Dimension::TIME)
    }

    pub fn radian() -> Self {
        Self::new("rad", 1.0, Dimension::NONE)
    }

    pub fn degree() -> Self {
        Self::new("degree", core::f64::consts::PI / 180.0, Dimension::NONE)
    }

    pub fn degree_celsius() -> Self {
        Self::with_offset("degC", 1.0, 273.15, Dimension::TEMPERATURE)
    }

    pub fn rpm() -> Self {
        Self::new("rpm", 2.0 * core::f64::consts::PI / 60.0, Dimension::FREQUENCY)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    pub fn is_affine(&self) -> bool {
        self.offset != 0.0
    }

    pub fn to_si(&self, magnitude: f64) -> f64 {
        magnitude * self.scale + self.offset
    }

    pub fn from_si(&self, si: f64) -> f64 {
        (si - self.offset) / self.scale
    }

    fn ensure_compatible(&self, other: &Unit, context: &str) -> CoreResult<()> {
        if self.dim == other.dim {
            Ok(())
        } else {
            Err(CoreError::UnitMismatch {
                context: context.to_string(),
                expected: other.symbol.clone(),
                found: self.symbol.clone(),
            })
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Scalar tagged with a physical unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quantity {
    magnitude: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// Parse the unit text and attach it to `magnitude`.
    pub fn parse(magnitude: f64, unit: &str) -> CoreResult<Self> {
        Ok(Self::new(magnitude, crate::parse::parse_unit(unit)?))
    }

    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Unit::dimensionless())
    }

    /// Build from an SI value, expressed in the coherent SI unit of `dim`.
    pub fn from_si(si: f64, dim: Dimension) -> Self {
        Self::new(si, Unit::si(dim))
    }

    /// Build from an SI value, expressed in `unit`.
    pub fn from_si_in(si: f64, unit: Unit) -> Self {
        let magnitude = unit.from_si(si);
        Self::new(magnitude, unit)
    }

    /// Build from a typed `uom` quantity using that type's display unit.
    pub fn from_typed<Q: SiQuantity>(q: Q) -> Self {
        Self::from_si_in(q.to_si(), Q::display_unit())
    }

    /// Magnitude in this quantity's own unit (unit stripped).
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dim
    }

    pub fn si_value(&self) -> f64 {
        self.unit.to_si(self.magnitude)
    }

    pub fn is_finite(&self) -> bool {
        self.magnitude.is_finite()
    }

    /// Convert into another unit of the same dimension.
    pub fn to(&self, unit: &Unit) -> CoreResult<Quantity> {
        self.unit.ensure_compatible(unit, "conversion")?;
        Ok(Self::from_si_in(self.si_value(), unit.clone()))
    }

    /// Magnitude expressed in `unit`.
    pub fn magnitude_in(&self, unit: &Unit) -> CoreResult<f64> {
        self.unit.ensure_compatible(unit, "conversion")?;
        Ok(unit.from_si(self.si_value()))
    }

    /// Typed view of this quantity. Fails on dimension mismatch.
    pub fn get<Q: SiQuantity>(&self) -> CoreResult<Q> {
        if self.dimension() != Q::DIMENSION {
            return Err(CoreError::UnitMismatch {
                context: Q::NAME.to_string(),
                expected: Q::DIMENSION.to_string(),
                found: self.unit.symbol.clone(),
            });
        }
        Ok(Q::from_si(self.si_value()))
    }

    /// Sum, expressed in `self`'s unit.
    pub fn try_add(&self, rhs: &Quantity) -> CoreResult<Quantity> {
        rhs.unit.ensure_compatible(&self.unit, "addition")?;
        Ok(self.with_si(self.linear_si() + rhs.linear_si()))
    }

    /// Difference, expressed in `self`'s unit.
    pub fn try_sub(&self, rhs: &Quantity) -> CoreResult<Quantity> {
        rhs.unit.ensure_compatible(&self.unit, "subtraction")?;
        Ok(self.with_si(self.linear_si() - rhs.linear_si()))
    }

    pub fn product(&self, rhs: &Quantity) -> Quantity {
        Self::from_si(self.si_value() * rhs.si_value(), self.dimension() * rhs.dimension())
    }

    pub fn quotient(&self, rhs: &Quantity) -> Quantity {
        Self::from_si(self.si_value() / rhs.si_value(), self.dimension() / rhs.dimension())
    }

    pub fn powi(&self, n: i8) -> Quantity {
        Self::from_si(self.si_value().powi(n as i32), self.dimension().powi(n))
    }

    /// Multiply by a plain number, keeping the unit.
    pub fn scale(&self, factor: f64) -> Quantity {
        if self.unit.is_affine() {
            self.with_si(self.si_value() * factor)
        } else {
            Self::new(self.magnitude * factor, self.unit.clone())
        }
    }

    pub fn try_cmp(&self, rhs: &Quantity) -> CoreResult<Ordering> {
        rhs.unit.ensure_compatible(&self.unit, "comparison")?;
        self.si_value()
            .partial_cmp(&rhs.si_value())
            .ok_or(CoreError::InvalidArg {
                what: "comparison with NaN magnitude",
            })
    }

    /// Bound into `[lo, hi]`, keeping `self`'s unit.
    pub fn try_clamp(&self, lo: &Quantity, hi: &Quantity) -> CoreResult<Quantity> {
        if self.try_cmp(lo)? == Ordering::Less {
            return lo.to(&self.unit);
        }
        if self.try_cmp(hi)? == Ordering::Greater {
            return hi.to(&self.unit);
        }
        Ok(self.clone())
    }

    // Affine units add as intervals: 20 °C + 5 K style sums are not meaningful
    // here, so sums operate on the scaled magnitude only.
    fn linear_si(&self) -> f64 {
        self.magnitude * self.unit.scale
    }

    fn with_si(&self, linear_si: f64) -> Quantity {
        Self::new(linear_si / self.unit.scale, self.unit.clone())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.dim.is_dimensionless() && self.unit.scale == 1.0 {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.unit)
        }
    }
}

/// Bridge between the runtime [`Quantity`] and a compile-time `uom` type.
pub trait SiQuantity: Copy {
    const DIMENSION: Dimension;
    const NAME: &'static str;

    fn from_si(value: f64) -> Self;
    fn to_si(self) -> f64;

    /// Unit used when the value is written back into the parameter store.
    fn display_unit() -> Unit {
        Unit::si(Self::DIMENSION)
    }
}

macro_rules! si_quantity {
    ($ty:ty, $unit:ty, $dim:expr, $name:literal) => {
        impl SiQuantity for $ty {
            const DIMENSION: Dimension = $dim;
            const NAME: &'static str = $name;

            fn from_si(value: f64) -> Self {
                <$ty>::new::<$unit>(value)
            }

            fn to_si(self) -> f64 {
                self.value
            }
        }
    };
    ($ty:ty, $unit:ty, $dim:expr, $name:literal, $display:expr) => {
        impl SiQuantity for $ty {
            const DIMENSION: Dimension = $dim;
            const NAME: &'static str = $name;

            fn from_si(value: f64) -> Self {
                <$ty>::new::<$unit>(value)
            }

            fn to_si(self) -> f64 {
                self.value
            }

            fn display_unit() -> Unit {
                $display
            }
        }
    };
}

si_quantity!(Ratio, uom::si::ratio::ratio, Dimension::NONE, "ratio");
si_quantity!(Length, uom::si::length::meter, Dimension::LENGTH, "length");
si_quantity!(Area, uom::si::area::square_meter, Dimension::AREA, "area");
si_quantity!(Mass, uom::si::mass::kilogram, Dimension::MASS, "mass");
si_quantity!(Time, uom::si::time::second, Dimension::TIME, "time");
si_quantity!(
    Velocity,
    uom::si::velocity::meter_per_second,
    Dimension::VELOCITY,
    "velocity"
);
si_quantity!(
    Accel,
    uom::si::acceleration::meter_per_second_squared,
    Dimension::ACCELERATION,
    "acceleration"
);
si_quantity!(Force, uom::si::force::newton, Dimension::FORCE, "force");
si_quantity!(
    Energy,
    uom::si::energy::joule,
    Dimension::ENERGY,
    "energy",
    Unit::watt_hour()
);
si_quantity!(Power, uom::si::power::watt, Dimension::POWER, "power");
si_quantity!(
    Density,
    uom::si::mass_density::kilogram_per_cubic_meter,
    Dimension::DENSITY,
    "mass density"
);
si_quantity!(
    Current,
    uom::si::electric_current::ampere,
    Dimension::CURRENT,
    "electric current"
);
si_quantity!(
    Voltage,
    uom::si::electric_potential::volt,
    Dimension::VOLTAGE,
    "electric potential"
);
si_quantity!(
    Resistance,
    uom::si::electrical_resistance::ohm,
    Dimension::RESISTANCE,
    "electrical resistance"
);
si_quantity!(
    Temperature,
    uom::si::thermodynamic_temperature::kelvin,
    Dimension::TEMPERATURE,
    "temperature"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{w, wh};
    use uom::si::power::watt;

    #[test]
    fn add_keeps_left_unit() {
        let a = Quantity::new(1.0, Unit::watt_hour());
        let b = Quantity::from_si(1800.0, Dimension::ENERGY);
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.unit().symbol(), "Wh");
        assert!((sum.magnitude() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn add_incompatible_fails() {
        let p = Quantity::from_typed(w(10.0));
        let e = Quantity::from_typed(wh(10.0));
        let err = p.try_add(&e).unwrap_err();
        assert!(matches!(err, CoreError::UnitMismatch { .. }));
    }

    #[test]
    fn mul_combines_dimensions() {
        let p = Quantity::from_typed(w(100.0));
        let dt = Quantity::new(2.0, Unit::second());
        let e = p.product(&dt);
        assert_eq!(e.dimension(), Dimension::ENERGY);
        assert!((e.si_value() - 200.0).abs() < 1e-12);
    }

    #[test]
    fn typed_view_checks_dimension() {
        let p = Quantity::from_typed(w(42.0));
        let typed: Power = p.get().unwrap();
        assert!((typed.get::<watt>() - 42.0).abs() < 1e-12);
        assert!(p.get::<Energy>().is_err());
    }

    #[test]
    fn energy_displays_in_watt_hours() {
        let e = Quantity::from_typed(wh(5240.0));
        assert_eq!(e.unit().symbol(), "Wh");
        assert!((e.magnitude() - 5240.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_respects_units() {
        let lo = Quantity::new(0.0, Unit::watt_hour());
        let hi = Quantity::new(1.0, Unit::watt_hour());
        let over = Quantity::from_si(7200.0, Dimension::ENERGY);
        let clamped = over.try_clamp(&lo, &hi).unwrap();
        assert!((clamped.si_value() - 3600.0).abs() < 1e-9);
        assert_eq!(clamped.unit().symbol(), "J");
    }

    #[test]
    fn scale_keeps_unit() {
        let e = Quantity::new(2.0, Unit::watt_hour()).scale(-0.5);
        assert_eq!(e.unit().symbol(), "Wh");
        assert!((e.magnitude() + 1.0).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::numeric::approx_eq_with;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sum_is_unit_independent(a in -1.0e6_f64..1.0e6, b in -1.0e6_f64..1.0e6) {
            let lhs = Quantity::new(a, Unit::watt_hour());
            let rhs = Quantity::from_si(b, Dimension::ENERGY);
            let sum = lhs.try_add(&rhs).unwrap();
            prop_assert!(approx_eq_with(sum.si_value(), a * 3600.0 + b, 1e-6, 1e-9));
            prop_assert_eq!(sum.unit().symbol(), "Wh");
        }

        #[test]
        fn conversion_round_trips(v in -1.0e4_f64..1.0e4) {
            let q = Quantity::new(v, Unit::rpm());
            let back = q.to(&Unit::si(Dimension::FREQUENCY)).unwrap().to(&Unit::rpm()).unwrap();
            prop_assert!(approx_eq_with(back.magnitude(), v, 1e-9, 1e-9));
        }
    }
}
