//! Turning a scenario file into a runnable simulation.

use std::ops::ControlFlow;
use std::path::Path;

use sc_core::units::amps;
use sc_models::{
    ArrayFidelity, Drag, DrawMode, EnergyModel, EsrBatteryLoss, LowVoltageDraw, LvComponent,
    MotorLoss, NoBatteryLoss, RollingResistance, SolarArray, WheelLoad,
};
use sc_project::schema::{BatteryKind, LvDrawDef, ModelKind, Scenario};
use sc_sim::VehicleModel;
use tracing::debug;

use crate::driver::Driver;
use crate::error::{AppError, AppResult};
use crate::progress::RunProgress;
use crate::run_log::RunLog;
use crate::sweep::{self, SweepReport};
use crate::weather::{ClearSky, TableWeather, WeatherSource};

/// Load-bearing parameter used when no per-wheel loads are configured.
pub const DEFAULT_WEIGHT_KEY: &str = "weight";

pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    Ok(sc_project::load_yaml(path)?)
}

fn lv_draw(def: &LvDrawDef) -> AppResult<LowVoltageDraw> {
    let mode = DrawMode::parse(&def.mode)
        .ok_or_else(|| AppError::config(format!("unknown LV draw mode '{}'", def.mode)))?;
    let components = def
        .components
        .iter()
        .map(|c| {
            let component = LvComponent::new(c.name.clone(), amps(c.current_a));
            match c.peak_current_a {
                Some(peak) => component.with_peak(amps(peak)),
                None => component,
            }
        })
        .collect();
    Ok(LowVoltageDraw::new(components, mode)?)
}

/// Instantiate one pipeline entry with its scenario section.
pub fn build_model(scenario: &Scenario, kind: ModelKind) -> AppResult<Box<dyn EnergyModel>> {
    let model: Box<dyn EnergyModel> = match kind {
        ModelKind::RollingResistance => match &scenario.rolling_resistance {
            Some(def) => Box::new(RollingResistance::new(
                def.wheels
                    .iter()
                    .map(|w| WheelLoad::new(w.name.clone(), w.weight.clone()))
                    .collect(),
            )?),
            None => Box::new(RollingResistance::single(DEFAULT_WEIGHT_KEY)),
        },
        ModelKind::Drag => Box::new(Drag::new()),
        ModelKind::Array => {
            let fidelity = ArrayFidelity::parse(&scenario.array.fidelity).ok_or_else(|| {
                AppError::config(format!("unknown array fidelity '{}'", scenario.array.fidelity))
            })?;
            Box::new(SolarArray::new(fidelity))
        }
        ModelKind::Motor => Box::new(MotorLoss::new()),
        ModelKind::LvDraw => {
            let def = scenario
                .lv_draw
                .as_ref()
                .ok_or_else(|| AppError::config("pipeline uses lv_draw but no lv_draw section is given"))?;
            Box::new(lv_draw(def)?)
        }
    };
    Ok(model)
}

/// Build and validate the vehicle model for a scenario.
pub fn build_vehicle(scenario: &Scenario) -> AppResult<VehicleModel> {
    let mut builder = VehicleModel::builder(scenario.to_param_store()?);
    for kind in &scenario.pipeline {
        builder.add_model(build_model(scenario, *kind)?);
    }
    match scenario.battery {
        BatteryKind::Esr => builder.set_battery(Box::new(EsrBatteryLoss::new())),
        BatteryKind::Disabled => builder.set_battery(Box::new(NoBatteryLoss)),
    };
    Ok(builder.build()?)
}

/// Weather for the scenario: its table, clear sky for an empty table, or none.
pub fn weather_source(scenario: &Scenario) -> Option<Box<dyn WeatherSource>> {
    let def = scenario.weather.as_ref()?;
    if def.records.is_empty() {
        Some(Box::new(ClearSky))
    } else {
        Some(Box::new(TableWeather::from_defs(&def.records)))
    }
}

/// A scenario ready to run: the vehicle, its driver and the sweep entries.
pub struct Simulation {
    pub name: String,
    pub vehicle: VehicleModel,
    pub driver: Driver,
    pub sweep: Vec<String>,
}

impl Simulation {
    pub fn from_scenario(scenario: &Scenario) -> AppResult<Self> {
        let start = scenario.start_time().ok_or_else(|| {
            AppError::config("scenario has no start time; set `start` or a datetime parameter")
        })?;
        let vehicle = build_vehicle(scenario)?;
        let mut driver = Driver::new(start).with_log(scenario.log.clone());
        if let Some(source) = weather_source(scenario) {
            driver = driver.with_weather(source);
        }
        debug!(
            scenario = %scenario.name,
            models = ?vehicle.model_names(),
            "simulation assembled"
        );
        Ok(Self {
            name: scenario.name.clone(),
            vehicle,
            driver,
            sweep: scenario.sweep.clone(),
        })
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        Self::from_scenario(&load_scenario(path)?)
    }

    /// Override the logged parameters.
    pub fn set_log(&mut self, params: Vec<String>) {
        self.driver.set_log(params);
    }

    /// One race day from the initial parameters.
    pub fn run(&mut self) -> AppResult<RunLog> {
        self.vehicle.reset();
        let log = self.driver.run(&mut self.vehicle);
        self.vehicle.reset();
        log
    }

    pub fn run_with_progress(
        &mut self,
        progress: &mut dyn FnMut(&RunProgress) -> ControlFlow<()>,
    ) -> AppResult<RunLog> {
        self.vehicle.reset();
        let log = self.driver.run_with_progress(&mut self.vehicle, Some(progress));
        self.vehicle.reset();
        log
    }

    /// Grid search over the scenario's sweep entries plus `extra` entries.
    pub fn sweep(&mut self, extra: &[String]) -> AppResult<SweepReport> {
        let specs: Vec<&str> = self
            .sweep
            .iter()
            .chain(extra)
            .map(String::as_str)
            .collect();
        let axes = sweep::parse_axes(&specs)?;
        Ok(sweep::run_grid(&self.driver, &mut self.vehicle, &axes))
    }
}
