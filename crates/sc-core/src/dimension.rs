//! Runtime physical dimensions.
//!
//! The parameter store is heterogeneous (one map holds watts, meters and plain
//! ratios side by side), so unit checking there happens at runtime. A
//! `Dimension` is the vector of SI base-unit exponents carried by every
//! [`Quantity`](crate::Quantity).

use core::fmt;
use core::ops::{Div, Mul};

/// Exponents of the SI base units relevant to vehicle energy accounting.
///
/// Angles are treated as dimensionless, the same way SI does.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub current: i8,
    pub temperature: i8,
}

impl Dimension {
    pub const fn new(length: i8, mass: i8, time: i8, current: i8, temperature: i8) -> Self {
        Self {
            length,
            mass,
            time,
            current,
            temperature,
        }
    }

    pub const NONE: Self = Self::new(0, 0, 0, 0, 0);
    pub const LENGTH: Self = Self::new(1, 0, 0, 0, 0);
    pub const MASS: Self = Self::new(0, 1, 0, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0);
    pub const CURRENT: Self = Self::new(0, 0, 0, 1, 0);
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 0, 1);
    pub const AREA: Self = Self::new(2, 0, 0, 0, 0);
    pub const VOLUME: Self = Self::new(3, 0, 0, 0, 0);
    pub const FREQUENCY: Self = Self::new(0, 0, -1, 0, 0);
    pub const VELOCITY: Self = Self::new(1, 0, -1, 0, 0);
    pub const ACCELERATION: Self = Self::new(1, 0, -2, 0, 0);
    pub const FORCE: Self = Self::new(1, 1, -2, 0, 0);
    pub const ENERGY: Self = Self::new(2, 1, -2, 0, 0);
    pub const POWER: Self = Self::new(2, 1, -3, 0, 0);
    pub const PRESSURE: Self = Self::new(-1, 1, -2, 0, 0);
    pub const DENSITY: Self = Self::new(-3, 1, 0, 0, 0);
    pub const VOLTAGE: Self = Self::new(2, 1, -3, -1, 0);
    pub const RESISTANCE: Self = Self::new(2, 1, -3, -2, 0);

    pub const fn product(self, rhs: Self) -> Self {
        Self::new(
            self.length + rhs.length,
            self.mass + rhs.mass,
            self.time + rhs.time,
            self.current + rhs.current,
            self.temperature + rhs.temperature,
        )
    }

    pub const fn quotient(self, rhs: Self) -> Self {
        Self::new(
            self.length - rhs.length,
            self.mass - rhs.mass,
            self.time - rhs.time,
            self.current - rhs.current,
            self.temperature - rhs.temperature,
        )
    }

    pub const fn powi(self, n: i8) -> Self {
        Self::new(
            self.length * n,
            self.mass * n,
            self.time * n,
            self.current * n,
            self.temperature * n,
        )
    }

    pub fn is_dimensionless(self) -> bool {
        self == Self::NONE
    }

    /// Conventional SI symbol for well-known dimensions.
    pub fn named_symbol(self) -> Option<&'static str> {
        const NAMED: &[(Dimension, &str)] = &[
            (Dimension::NONE, "dimensionless"),
            (Dimension::LENGTH, "m"),
            (Dimension::MASS, "kg"),
            (Dimension::TIME, "s"),
            (Dimension::CURRENT, "A"),
            (Dimension::TEMPERATURE, "K"),
            (Dimension::AREA, "m^2"),
            (Dimension::VOLUME, "m^3"),
            (Dimension::FREQUENCY, "1/s"),
            (Dimension::VELOCITY, "m/s"),
            (Dimension::ACCELERATION, "m/s^2"),
            (Dimension::FORCE, "N"),
            (Dimension::ENERGY, "J"),
            (Dimension::POWER, "W"),
            (Dimension::PRESSURE, "Pa"),
            (Dimension::DENSITY, "kg/m^3"),
            (Dimension::VOLTAGE, "V"),
            (Dimension::RESISTANCE, "ohm"),
        ];
        NAMED
            .iter()
            .find(|(dim, _)| *dim == self)
            .map(|(_, sym)| *sym)
    }

    /// Base-unit expression such as `kg*m^2/s^3`.
    pub fn base_expression(self) -> String {
        let parts = [
            ("kg", self.mass),
            ("m", self.length),
            ("s", self.time),
            ("A", self.current),
            ("K", self.temperature),
        ];
        let fmt_part = |sym: &str, exp: i8| {
            if exp == 1 {
                sym.to_string()
            } else {
                format!("{sym}^{exp}")
            }
        };
        let num: Vec<String> = parts
            .iter()
            .filter(|(_, e)| *e > 0)
            .map(|(s, e)| fmt_part(s, *e))
            .collect();
        let den: Vec<String> = parts
            .iter()
            .filter(|(_, e)| *e < 0)
            .map(|(s, e)| fmt_part(s, -*e))
            .collect();

        let num = if num.is_empty() {
            "1".to_string()
        } else {
            num.join("*")
        };
        if den.is_empty() {
            num
        } else {
            format!("{num}/{}", den.join("/"))
        }
    }
}

impl Mul for Dimension {
    type Output = Dimension;

    fn mul(self, rhs: Self) -> Self {
        self.product(rhs)
    }
}

impl Div for Dimension {
    type Output = Dimension;

    fn div(self, rhs: Self) -> Self {
        self.quotient(rhs)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.named_symbol() {
            Some(sym) => write!(f, "{sym}"),
            None => write!(f, "{}", self.base_expression()),
        }
    }
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dimension({})", self.base_expression())
    }
}
