//! The vehicle model: one parameter store, an ordered model pipeline and the
//! energy accounting that ties them together.

use sc_core::units::{j, Energy, Time};
use sc_core::{ParamChange, ParamSnapshot, ParamStore, Quantity};
use sc_models::{EnergyModel, NoBatteryLoss};
use tracing::{debug, trace};

use crate::error::{SimError, SimResult};
use crate::pipeline::{self, BATTERY_MAX_ENERGY, TOTAL_ENERGY};

/// Energy returned by one model in one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Contribution {
    pub model: String,
    pub energy: Energy,
}

/// Which bound the running total hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClampBound {
    Empty,
    Full,
}

/// Outcome of one [`VehicleModel::update`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// 1-based step index since construction or the last reset.
    pub step: u64,
    pub pre_clamp: Energy,
    pub post_clamp: Energy,
    /// Contributions in execution order, battery last.
    pub contributions: Vec<Contribution>,
    pub clamped: Option<ClampBound>,
}

impl StepReport {
    pub fn was_clamped(&self) -> bool {
        self.clamped.is_some()
    }

    /// Sum of all contributions before clamping.
    pub fn net(&self) -> Energy {
        self.contributions
            .iter()
            .fold(j(0.0), |acc, c| acc + c.energy)
    }
}

/// Collects the initial parameters and models, then validates them.
pub struct VehicleModelBuilder {
    initial: ParamStore,
    models: Vec<Box<dyn EnergyModel>>,
    battery: Option<Box<dyn EnergyModel>>,
}

impl VehicleModelBuilder {
    pub fn new(initial: ParamStore) -> Self {
        Self {
            initial,
            models: Vec::new(),
            battery: None,
        }
    }

    /// Append a model; models run in the order they are added.
    pub fn add_model(&mut self, model: Box<dyn EnergyModel>) -> &mut Self {
        self.models.push(model);
        self
    }

    pub fn with_model(mut self, model: impl EnergyModel + 'static) -> Self {
        self.models.push(Box::new(model));
        self
    }

    /// Install the battery model, which always runs after every other model.
    pub fn set_battery(&mut self, model: Box<dyn EnergyModel>) -> &mut Self {
        self.battery = Some(model);
        self
    }

    pub fn with_battery(mut self, model: impl EnergyModel + 'static) -> Self {
        self.battery = Some(Box::new(model));
        self
    }

    /// Validate the initial store and the pipeline read/write ordering.
    pub fn build(self) -> SimResult<VehicleModel> {
        let timestep = pipeline::validate_initial(&self.initial)?;
        let battery = self.battery.unwrap_or_else(|| Box::new(NoBatteryLoss));
        pipeline::validate_reads(&self.initial, &self.models, battery.as_ref())?;

        debug!(
            models = self.models.len(),
            battery = battery.name(),
            params = self.initial.len(),
            "vehicle model built"
        );
        Ok(VehicleModel {
            initial: self.initial.snapshot(),
            params: self.initial,
            models: self.models,
            battery,
            timestep,
            last_step: None,
            steps: 0,
        })
    }
}

/// Owns the live parameter store and steps the model pipeline.
///
/// Each [`update`](Self::update) runs every model in registration order,
/// then the battery model, adding each returned energy to `total_energy`.
/// The total is clamped into `[0, battery_max_energy]` only after the whole
/// pipeline has run.
pub struct VehicleModel {
    initial: ParamSnapshot,
    params: ParamStore,
    models: Vec<Box<dyn EnergyModel>>,
    battery: Box<dyn EnergyModel>,
    timestep: Time,
    last_step: Option<ParamSnapshot>,
    steps: u64,
}

impl VehicleModel {
    pub fn builder(initial: ParamStore) -> VehicleModelBuilder {
        VehicleModelBuilder::new(initial)
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    /// Overwrite one parameter in the live store (weather injection, sweeps).
    pub fn set_param(&mut self, name: impl Into<String>, value: Quantity) {
        self.params.set(name, value);
    }

    pub fn baseline(&self) -> &ParamSnapshot {
        &self.initial
    }

    pub fn timestep(&self) -> Time {
        self.timestep
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    pub fn total_energy(&self) -> SimResult<Energy> {
        Ok(self.params.get_as(TOTAL_ENERGY)?)
    }

    /// Names of the registered models in execution order, battery last.
    pub fn model_names(&self) -> Vec<&str> {
        self.models
            .iter()
            .map(|m| m.name())
            .chain(std::iter::once(self.battery.name()))
            .collect()
    }

    /// Advance one timestep.
    pub fn update(&mut self) -> SimResult<StepReport> {
        self.last_step = Some(self.params.snapshot());
        let step = self.steps + 1;
        let dt = self.timestep;

        let mut contributions = Vec::with_capacity(self.models.len() + 1);
        for model in self.models.iter().chain(std::iter::once(&self.battery)) {
            let energy = model
                .update(&mut self.params, dt)
                .map_err(|source| SimError::Model {
                    model: model.name().to_string(),
                    source,
                })?;
            let total = self
                .params
                .get(TOTAL_ENERGY)?
                .try_add(&Quantity::from_typed(energy))?;
            self.params.set(TOTAL_ENERGY, total);
            trace!(step, model = model.name(), energy_j = energy.value, "contribution");
            contributions.push(Contribution {
                model: model.name().to_string(),
                energy,
            });
        }

        let total = self.params.get(TOTAL_ENERGY)?.clone();
        let max = self.params.get(BATTERY_MAX_ENERGY)?.clone();
        let zero = max.scale(0.0);
        let pre_clamp: Energy = total.get()?;
        let clamped_total = total.try_clamp(&zero, &max)?;
        let post_clamp: Energy = clamped_total.get()?;

        let clamped = if pre_clamp.value < 0.0 {
            Some(ClampBound::Empty)
        } else if pre_clamp > post_clamp {
            Some(ClampBound::Full)
        } else {
            None
        };
        if let Some(bound) = clamped {
            debug!(
                step,
                ?bound,
                pre_clamp_j = pre_clamp.value,
                post_clamp_j = post_clamp.value,
                "total energy clamped"
            );
        }
        self.params.set(TOTAL_ENERGY, clamped_total);
        self.steps = step;

        Ok(StepReport {
            step,
            pre_clamp,
            post_clamp,
            contributions,
            clamped,
        })
    }

    /// Restore every parameter to its initial value and forget step history.
    pub fn reset(&mut self) {
        self.params.restore(&self.initial);
        self.last_step = None;
        self.steps = 0;
        trace!("vehicle model reset");
    }

    /// Parameter changes made by the most recent step (empty before the first).
    pub fn changes_since_last_step(&self) -> Vec<ParamChange> {
        match &self.last_step {
            Some(before) => self.params.diff(before),
            None => Vec::new(),
        }
    }
}
