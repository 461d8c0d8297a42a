//! Low-voltage accessory bus draw.

use crate::common::{check_finite, energy_over, set_power};
use crate::error::{ModelError, ModelResult};
use crate::traits::{keys, EnergyModel};
use sc_core::units::{amps, Current, Energy, Power, Time, Voltage};
use sc_core::ParamStore;

/// Which current rating to use for every component during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Constant,
    /// Peak rating, falling back to the constant rating when a component has none.
    Peak,
}

impl DrawMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "constant" => Some(DrawMode::Constant),
            "peak" => Some(DrawMode::Peak),
            _ => None,
        }
    }
}

/// One accessory on the low-voltage bus.
#[derive(Clone, Debug, PartialEq)]
pub struct LvComponent {
    pub name: String,
    pub current: Current,
    pub peak_current: Option<Current>,
}

impl LvComponent {
    pub fn new(name: impl Into<String>, current: Current) -> Self {
        Self {
            name: name.into(),
            current,
            peak_current: None,
        }
    }

    pub fn with_peak(mut self, peak: Current) -> Self {
        self.peak_current = Some(peak);
        self
    }

    pub fn draw(&self, mode: DrawMode) -> Current {
        match mode {
            DrawMode::Constant => self.current,
            DrawMode::Peak => self.peak_current.unwrap_or(self.current),
        }
    }
}

/// Constant accessory load: `P = -sum(I) * lv_bus_voltage`.
#[derive(Clone, Debug)]
pub struct LowVoltageDraw {
    components: Vec<LvComponent>,
    mode: DrawMode,
}

impl LowVoltageDraw {
    pub fn new(components: Vec<LvComponent>, mode: DrawMode) -> ModelResult<Self> {
        if components
            .iter()
            .any(|c| c.current.value < 0.0 || c.peak_current.is_some_and(|p| p.value < 0.0))
        {
            return Err(ModelError::InvalidArg {
                what: "LV component currents must be non-negative",
            });
        }
        Ok(Self { components, mode })
    }

    pub fn components(&self) -> &[LvComponent] {
        &self.components
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn total_current(&self) -> Current {
        self.components
            .iter()
            .fold(amps(0.0), |acc, c| acc + c.draw(self.mode))
    }
}

impl EnergyModel for LowVoltageDraw {
    fn name(&self) -> &str {
        "lv_draw"
    }

    fn requires(&self) -> Vec<String> {
        keys(&["lv_bus_voltage"])
    }

    fn writes(&self) -> Vec<String> {
        keys(&["lv_current", "lv_draw_power"])
    }

    fn update(&self, params: &mut ParamStore, dt: Time) -> ModelResult<Energy> {
        let bus: Voltage = params.get_as("lv_bus_voltage")?;
        let current = self.total_current();
        let power: Power = -(current * bus.abs());
        check_finite(power.value, "lv_draw", "LV draw power")?;

        params.set_typed("lv_current", current);
        set_power(params, "lv_draw_power", power);
        Ok(energy_over(power, dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::units::{s, volts};
    use uom::si::power::watt;

    fn components() -> Vec<LvComponent> {
        vec![
            LvComponent::new("vcu", amps(0.5)).with_peak(amps(1.0)),
            LvComponent::new("horn", amps(0.0)).with_peak(amps(3.0)),
            LvComponent::new("telemetry", amps(0.25)),
        ]
    }

    fn bus() -> ParamStore {
        let mut p = ParamStore::new();
        p.set_typed("lv_bus_voltage", volts(12.0));
        p
    }

    #[test]
    fn constant_mode() {
        let model = LowVoltageDraw::new(components(), DrawMode::Constant).unwrap();
        let mut p = bus();
        let e = model.update(&mut p, s(10.0)).unwrap();
        let power: Power = p.get_as("lv_draw_power").unwrap();
        assert!((power.get::<watt>() + 0.75 * 12.0).abs() < 1e-12);
        assert!((e.value + 0.75 * 12.0 * 10.0).abs() < 1e-9);
    }

    #[test]
    fn peak_mode_falls_back_to_constant() {
        let model = LowVoltageDraw::new(components(), DrawMode::Peak).unwrap();
        assert!((model.total_current().value - 4.25).abs() < 1e-12);
    }

    #[test]
    fn empty_bus_draws_nothing() {
        let model = LowVoltageDraw::new(vec![], DrawMode::Peak).unwrap();
        let mut p = bus();
        assert_eq!(model.update(&mut p, s(1.0)).unwrap().value, 0.0);
    }

    #[test]
    fn negative_rating_rejected() {
        let bad = vec![LvComponent::new("x", amps(-1.0))];
        assert!(LowVoltageDraw::new(bad, DrawMode::Constant).is_err());
        assert_eq!(DrawMode::parse("PEAK"), Some(DrawMode::Peak));
        assert_eq!(DrawMode::parse("burst"), None);
    }
}
