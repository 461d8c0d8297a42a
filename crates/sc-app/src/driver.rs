//! The race-day driver: a fixed number of steps on a wall clock.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use chrono::{Duration, NaiveDateTime};
use sc_core::units::Time;
use sc_core::{Quantity, Unit};
use sc_project::seconds_since_midnight;
use sc_sim::VehicleModel;
use tracing::{debug, info, warn};
use uom::si::energy::watt_hour;

use crate::error::{AppError, AppResult};
use crate::progress::RunProgress;
use crate::run_log::{LogRow, RunLog};
use crate::weather::{WeatherModifiers, WeatherSource};

/// Length of the race day; divided by the timestep to get the step count.
pub const RACEDAY_LEN: &str = "raceday_len";
/// Seconds since local midnight, advanced by the driver every step.
pub use sc_project::TIMESTAMP;

pub type ProgressFn<'a> = &'a mut dyn FnMut(&RunProgress) -> ControlFlow<()>;

/// Runs a vehicle model across one race day.
pub struct Driver {
    start: NaiveDateTime,
    log_params: Vec<String>,
    weather: Option<Box<dyn WeatherSource>>,
}

impl Driver {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            log_params: Vec::new(),
            weather: None,
        }
    }

    pub fn with_log(mut self, params: Vec<String>) -> Self {
        self.log_params = params;
        self
    }

    pub fn set_log(&mut self, params: Vec<String>) {
        self.log_params = params;
    }

    pub fn with_weather(mut self, source: Box<dyn WeatherSource>) -> Self {
        self.weather = Some(source);
        self
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn log_params(&self) -> &[String] {
        &self.log_params
    }

    pub fn has_weather(&self) -> bool {
        self.weather.is_some()
    }

    /// `floor(raceday_len / timestep)`, read from the live store.
    pub fn step_count(vehicle: &VehicleModel) -> AppResult<u64> {
        let len: Time = vehicle.params().get_as(RACEDAY_LEN)?;
        let dt = vehicle.timestep();
        let steps = (len.value / dt.value).floor();
        if !steps.is_finite() || steps < 0.0 {
            return Err(AppError::config(format!(
                "raceday_len of {} s is not a usable duration",
                len.value
            )));
        }
        Ok(steps as u64)
    }

    /// Wall-clock time `elapsed_s` seconds after the start.
    fn clock_at(&self, elapsed_s: f64) -> AppResult<NaiveDateTime> {
        let out_of_range = || {
            AppError::config(format!(
                "{elapsed_s} s after {} is outside the representable calendar",
                self.start
            ))
        };
        let ms = (elapsed_s * 1000.0).round();
        if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        Duration::try_milliseconds(ms as i64)
            .and_then(|d| self.start.checked_add_signed(d))
            .ok_or_else(out_of_range)
    }

    pub fn run(&self, vehicle: &mut VehicleModel) -> AppResult<RunLog> {
        self.run_with_progress(vehicle, None)
    }

    /// Run every step, or until `progress` returns [`ControlFlow::Break`].
    ///
    /// A failing step aborts the run. A failing weather lookup does not: that
    /// step runs with neutral modifiers.
    pub fn run_with_progress(
        &self,
        vehicle: &mut VehicleModel,
        mut progress: Option<ProgressFn<'_>>,
    ) -> AppResult<RunLog> {
        let total_steps = Self::step_count(vehicle)?;
        let dt_s = vehicle.timestep().value;
        let mut log = RunLog::new(self.log_params.clone());
        let mut missing: BTreeSet<String> = BTreeSet::new();

        info!(
            start = %self.start,
            steps = total_steps,
            timestep_s = dt_s,
            weather = self.weather.is_some(),
            "starting race-day run"
        );

        for i in 0..total_steps {
            let now = self.clock_at(dt_s * i as f64)?;
            vehicle.set_param(
                TIMESTAMP,
                Quantity::new(seconds_since_midnight(now), Unit::second()),
            );

            if let Some(source) = &self.weather {
                let modifiers = match WeatherModifiers::for_step(source.as_ref(), vehicle.params(), now) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!(time = %now, error = %e, "weather unavailable, running step without modifiers");
                        WeatherModifiers::NEUTRAL
                    }
                };
                modifiers.inject(vehicle);
            }

            let report = vehicle.update()?;
            log.summary.record(&report);

            let mut values = Vec::with_capacity(self.log_params.len());
            for (idx, name) in self.log_params.iter().enumerate() {
                match vehicle.params().get_opt(name) {
                    Some(q) => {
                        if log.units[idx].is_none() {
                            log.units[idx] = Some(q.unit().symbol().to_string());
                        }
                        values.push(Some(q.magnitude()));
                    }
                    None => {
                        if missing.insert(name.clone()) {
                            warn!(param = %name, step = report.step, "requested log parameter is not in the store");
                        }
                        values.push(None);
                    }
                }
            }
            log.rows.push(LogRow {
                step: report.step,
                time: now,
                values,
            });

            if let Some(cb) = progress.as_deref_mut() {
                let event = RunProgress {
                    step: report.step,
                    total_steps,
                    time: now,
                    total_energy_wh: report.post_clamp.get::<watt_hour>(),
                    clamped: report.was_clamped(),
                };
                if cb(&event).is_break() {
                    debug!(step = report.step, "run stopped by caller");
                    log.stopped_early = true;
                    break;
                }
            }
        }

        for name in log.empty_series() {
            if missing.insert(name.clone()) {
                warn!(param = %name, "requested log parameter has no finite values");
            }
        }
        log.flagged = missing;
        info!(
            steps = log.summary.steps,
            final_energy_wh = log.summary.final_energy_wh,
            empty_clamps = log.summary.empty_clamps,
            full_clamps = log.summary.full_clamps,
            flagged = log.flagged.len(),
            "run finished"
        );
        Ok(log)
    }
}
