//! Vehicle energy simulation engine.
//!
//! Provides:
//! - `VehicleModelBuilder`, which validates the initial store and the
//!   read/write ordering of the model pipeline
//! - `VehicleModel`, which steps the pipeline, accumulates signed energy and
//!   clamps it to the battery capacity
//! - `StepReport` with pre- and post-clamp totals and per-model contributions

pub mod error;
pub mod pipeline;
pub mod vehicle;

pub use error::{SimError, SimResult};
pub use pipeline::{BATTERY_MAX_ENERGY, TIMESTEP, TOTAL_ENERGY};
pub use vehicle::{ClampBound, Contribution, StepReport, VehicleModel, VehicleModelBuilder};
