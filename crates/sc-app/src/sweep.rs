//! Grid search over named parameter ranges.
//!
//! An axis is written `name:start:stop:step:unit`. Values follow half-open
//! range semantics: `start, start + step, ...` while below `stop`. The grid is
//! the Cartesian product of all axes; each configuration runs a full race
//! day on a freshly reset vehicle.

use std::fmt;
use std::str::FromStr;

use sc_core::{parse_unit, Quantity, Unit};
use sc_sim::{VehicleModel, TIMESTEP};
use tracing::{info, warn};

use crate::driver::Driver;
use crate::error::{AppError, AppResult};
use crate::run_log::RunLog;

/// Upper bound on the number of values a single axis may expand to.
pub const MAX_AXIS_VALUES: usize = 100_000;

/// One swept parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    pub name: String,
    pub unit: Unit,
    pub values: Vec<f64>,
}

impl GridAxis {
    pub fn parse(spec: &str) -> AppResult<Self> {
        let bad = |what: &str| AppError::config(format!("sweep entry '{spec}': {what}"));
        let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
        let &[name, start, stop, step, unit] = parts.as_slice() else {
            return Err(bad("expected name:start:stop:step:unit"));
        };
        if name.is_empty() {
            return Err(bad("empty parameter name"));
        }
        if name == TIMESTEP {
            return Err(bad("the timestep is fixed when the vehicle is built"));
        }
        let num = |text: &str, what: &str| -> AppResult<f64> {
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| bad(&format!("{what} '{text}' is not a finite number")))
        };
        let (start, stop, step) = (num(start, "start")?, num(stop, "stop")?, num(step, "step")?);
        if step <= 0.0 {
            return Err(bad("step must be positive"));
        }
        let count = ((stop - start) / step).ceil();
        if count < 1.0 {
            return Err(bad("range is empty"));
        }
        if count > MAX_AXIS_VALUES as f64 {
            return Err(bad("range has too many values"));
        }
        let unit = parse_unit(unit).map_err(|e| bad(&e.to_string()))?;
        let values = (0..count as usize).map(|i| start + i as f64 * step).collect();
        Ok(Self {
            name: name.to_string(),
            unit,
            values,
        })
    }

    pub fn quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.values.iter().map(|v| Quantity::new(*v, self.unit.clone()))
    }
}

impl FromStr for GridAxis {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse every entry, skipping malformed ones with a warning.
///
/// Fails only when entries were given and none of them is valid.
pub fn parse_axes<S: AsRef<str>>(specs: &[S]) -> AppResult<Vec<GridAxis>> {
    let mut axes: Vec<GridAxis> = Vec::new();
    for spec in specs {
        let spec = spec.as_ref();
        match GridAxis::parse(spec) {
            Ok(axis) if axes.iter().any(|a| a.name == axis.name) => {
                warn!(entry = spec, "duplicate sweep axis skipped");
            }
            Ok(axis) => axes.push(axis),
            Err(e) => warn!(entry = spec, error = %e, "malformed sweep entry skipped"),
        }
    }
    if axes.is_empty() && !specs.is_empty() {
        return Err(AppError::config(format!(
            "none of the {} sweep entries is valid",
            specs.len()
        )));
    }
    Ok(axes)
}

/// One point of the grid: parameter overrides applied before the run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Configuration {
    pub assignments: Vec<(String, Quantity)>,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.assignments.is_empty() {
            return write!(f, "baseline");
        }
        for (i, (name, q)) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={q}")?;
        }
        Ok(())
    }
}

/// Cartesian product of the axes, first axis varying slowest.
///
/// No axes yields a single empty configuration.
pub fn configurations(axes: &[GridAxis]) -> Vec<Configuration> {
    axes.iter().fold(vec![Configuration::default()], |acc, axis| {
        acc.iter()
            .flat_map(|config| {
                axis.quantities().map(move |q| {
                    let mut next = config.clone();
                    next.assignments.push((axis.name.clone(), q));
                    next
                })
            })
            .collect()
    })
}

/// Result of one configuration.
#[derive(Debug)]
pub struct SweepOutcome {
    pub configuration: Configuration,
    pub result: AppResult<RunLog>,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub outcomes: Vec<SweepOutcome>,
}

impl SweepReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&Configuration, &RunLog)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|log| (&o.configuration, log)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Configuration, &AppError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.configuration, e)))
    }
}

/// Run every configuration, resetting the vehicle before and after each.
///
/// A configuration whose run fails is recorded and the search moves on.
pub fn run_grid(driver: &Driver, vehicle: &mut VehicleModel, axes: &[GridAxis]) -> SweepReport {
    let configs = configurations(axes);
    info!(axes = axes.len(), configurations = configs.len(), "starting grid search");

    let mut report = SweepReport::default();
    vehicle.reset();
    for (i, configuration) in configs.into_iter().enumerate() {
        for (name, value) in &configuration.assignments {
            vehicle.set_param(name.clone(), value.clone());
        }
        let result = driver.run(vehicle);
        match &result {
            Ok(log) => info!(
                index = i,
                config = %configuration,
                final_energy_wh = log.summary.final_energy_wh,
                "configuration finished"
            ),
            Err(e) => warn!(index = i, config = %configuration, error = %e, "configuration failed"),
        }
        vehicle.reset();
        report.outcomes.push(SweepOutcome {
            configuration,
            result,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(spec: &str) -> GridAxis {
        GridAxis::parse(spec).unwrap()
    }

    #[test]
    fn half_open_ranges() {
        assert_eq!(axis("velocity:10:12:1:mph").values, vec![10.0, 11.0]);
        assert_eq!(axis("velocity:10:12.5:1:mph").values, vec![10.0, 11.0, 12.0]);
        assert_eq!(axis("drag_coeff:0.1:0.2:0.05:").values.len(), 2);
        assert_eq!(axis("velocity:10:12:1:mph").unit.symbol(), "mph");
    }

    #[test]
    fn malformed_entries() {
        for spec in [
            "velocity:10:12:1",
            "velocity:10:12:0:mph",
            "velocity:12:10:1:mph",
            "velocity:a:12:1:mph",
            ":10:12:1:mph",
            "velocity:10:12:1:warp",
            "timestep:10:20:5:s",
            "velocity:0:1e9:1e-3:mph",
        ] {
            assert!(GridAxis::parse(spec).is_err(), "{spec} should be rejected");
        }
    }

    #[test]
    fn skips_bad_entries_unless_all_bad() {
        let axes = parse_axes(&["velocity:10:12:1:mph", "oops", "velocity:1:2:1:mph"]).unwrap();
        assert_eq!(axes.len(), 1);
        assert!(parse_axes(&["oops", "also:bad"]).is_err());
        assert!(parse_axes::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn cartesian_product_order() {
        let axes = vec![axis("a:0:2:1:"), axis("b:10:13:1:m")];
        let configs = configurations(&axes);
        assert_eq!(configs.len(), 6);
        let first: Vec<f64> = configs[0].assignments.iter().map(|(_, q)| q.magnitude()).collect();
        let last: Vec<f64> = configs[5].assignments.iter().map(|(_, q)| q.magnitude()).collect();
        assert_eq!(first, vec![0.0, 10.0]);
        assert_eq!(last, vec![1.0, 12.0]);
        assert_eq!(configurations(&[]), vec![Configuration::default()]);
    }

    #[test]
    fn display_lists_assignments() {
        let configs = configurations(&[axis("velocity:10:11:1:mph")]);
        assert_eq!(configs[0].to_string(), format!("velocity={}", Quantity::new(10.0, parse_unit("mph").unwrap())));
        assert_eq!(Configuration::default().to_string(), "baseline");
    }
}
