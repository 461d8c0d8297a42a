//! Core trait for energy contribution models.

use crate::error::ModelResult;
use sc_core::units::{Energy, Time};
use sc_core::ParamStore;

/// One physical effect evaluated once per timestep.
///
/// Models read inputs from the shared store, write their outputs and
/// diagnostics back into it, and return the signed energy change for the
/// step (negative = consumption, positive = generation), already multiplied
/// by the timestep. Per-step state lives in the store; a model only holds
/// configuration fixed at construction.
pub trait EnergyModel: Send + Sync {
    /// Model name for logs and error reports.
    fn name(&self) -> &str;

    /// Store keys that must exist before this model runs.
    fn requires(&self) -> Vec<String>;

    /// Store keys read when present.
    fn optional(&self) -> Vec<String> {
        Vec::new()
    }

    /// Store keys this model writes.
    fn writes(&self) -> Vec<String>;

    /// Evaluate one timestep.
    fn update(&self, params: &mut ParamStore, dt: Time) -> ModelResult<Energy>;
}

/// Collect string keys from a static list.
pub(crate) fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
