//! sc-core: stable foundation for the solar car energy simulator.
//!
//! Contains:
//! - units (uom SI types + constructors + physical constants)
//! - dimension / quantity (runtime unit-tagged values used by the parameter store)
//! - parse (unit expression parser, e.g. `kg/m^3`, `W/rpm^2`, `mph`)
//! - params (the shared parameter store and its immutable snapshots)
//! - numeric (tolerant comparison, finiteness checks, clamps)
//! - error (shared error types)

pub mod dimension;
pub mod error;
pub mod numeric;
pub mod params;
pub mod parse;
pub mod quantity;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use dimension::Dimension;
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use params::{ParamChange, ParamSnapshot, ParamStore};
pub use parse::parse_unit;
pub use quantity::{Quantity, SiQuantity, Unit};
pub use units::*;
