//! sc-models: energy contribution models for a solar car.
//!
//! Each model reads named quantities from the shared [`ParamStore`], writes
//! its outputs back, and returns the signed energy for one timestep:
//! - aerodynamic drag
//! - rolling resistance, per wheel
//! - solar array at four fidelity levels
//! - motor copper and stray losses
//! - low-voltage accessory draw
//! - battery internal-resistance loss (the battery slot)
//!
//! All models implement [`EnergyModel`] and declare the keys they require,
//! optionally read and write so a pipeline can be checked before it runs.
//!
//! [`ParamStore`]: sc_core::ParamStore

pub mod array;
pub mod battery;
pub mod common;
pub mod drag;
pub mod error;
pub mod lv_draw;
pub mod motor;
pub mod optics;
pub mod rolling_resistance;
pub mod traits;

// Re-exports
pub use array::{ArrayFidelity, SolarArray};
pub use battery::{EsrBatteryLoss, NoBatteryLoss};
pub use drag::Drag;
pub use error::{ModelError, ModelResult};
pub use lv_draw::{DrawMode, LowVoltageDraw, LvComponent};
pub use motor::{MotorCoefficients, MotorLoss, MotorLosses, OperatingPoint};
pub use optics::LaminationOptics;
pub use rolling_resistance::{RollingResistance, WheelLoad};
pub use traits::EnergyModel;
