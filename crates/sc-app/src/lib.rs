//! Race-day service layer for the solar car simulator.
//!
//! This crate sits between scenario files and the command line: it builds
//! the vehicle model from a scenario, drives it across a race day with
//! optional weather, runs grid searches and collects run logs.

pub mod driver;
pub mod error;
pub mod progress;
pub mod run_log;
pub mod scenario_service;
pub mod sweep;
pub mod weather;

// Re-export key types for convenience
pub use driver::{Driver, ProgressFn, RACEDAY_LEN, TIMESTAMP};
pub use error::{AppError, AppResult};
pub use progress::RunProgress;
pub use run_log::{LogRow, RunLog, RunSummary};
pub use scenario_service::{build_model, build_vehicle, load_scenario, weather_source, Simulation};
pub use sweep::{
    configurations, parse_axes, run_grid, Configuration, GridAxis, SweepOutcome, SweepReport,
};
pub use weather::{
    ClearSky, TableWeather, WeatherModifiers, WeatherRecord, WeatherSource, VEHICLE_HEADING,
};
