//! Per-run logs and summaries.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDateTime;
use sc_sim::{ClampBound, StepReport};
use serde::Serialize;
use uom::si::energy::watt_hour;

use crate::error::{AppError, AppResult};

/// One logged timestep: requested magnitudes in their own units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    pub step: u64,
    pub time: NaiveDateTime,
    /// Aligned with [`RunLog::columns`]; `None` where the parameter was absent.
    pub values: Vec<Option<f64>>,
}

/// Energy bookkeeping across a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub final_energy_wh: f64,
    pub min_energy_wh: f64,
    pub max_energy_wh: f64,
    pub empty_clamps: u64,
    pub full_clamps: u64,
    /// Generation discarded because the pack was full.
    pub clipped_surplus_wh: f64,
    /// Demand that could not be met because the pack was empty.
    pub unmet_demand_wh: f64,
}

impl RunSummary {
    pub(crate) fn record(&mut self, report: &StepReport) {
        let post = report.post_clamp.get::<watt_hour>();
        let pre = report.pre_clamp.get::<watt_hour>();
        if self.steps == 0 {
            self.min_energy_wh = post;
            self.max_energy_wh = post;
        } else {
            self.min_energy_wh = self.min_energy_wh.min(post);
            self.max_energy_wh = self.max_energy_wh.max(post);
        }
        self.steps += 1;
        self.final_energy_wh = post;
        match report.clamped {
            Some(ClampBound::Empty) => {
                self.empty_clamps += 1;
                self.unmet_demand_wh += post - pre;
            }
            Some(ClampBound::Full) => {
                self.full_clamps += 1;
                self.clipped_surplus_wh += pre - post;
            }
            None => {}
        }
    }
}

/// Everything the driver collected for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunLog {
    pub columns: Vec<String>,
    pub units: Vec<Option<String>>,
    pub rows: Vec<LogRow>,
    /// Requested parameters missing from the store at some step, or with no
    /// finite value across the run.
    pub flagged: BTreeSet<String>,
    pub summary: RunSummary,
    pub stopped_early: bool,
}

impl RunLog {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            units: vec![None; columns.len()],
            columns,
            ..Self::default()
        }
    }

    /// Values of one column across all rows.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Columns with no finite value in any row, including every column of
    /// a log without rows.
    pub fn empty_series(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| {
                !self
                    .rows
                    .iter()
                    .any(|r| r.values[*idx].is_some_and(f64::is_finite))
            })
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn is_flagged(&self, name: &str) -> bool {
        self.flagged.contains(name)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save_yaml(&self, path: &Path) -> AppResult<()> {
        std::fs::write(path, self.to_yaml()?).map_err(|source| AppError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::units::wh;
    use sc_sim::Contribution;

    fn report(step: u64, pre: f64, post: f64, clamped: Option<ClampBound>) -> StepReport {
        StepReport {
            step,
            pre_clamp: wh(pre),
            post_clamp: wh(post),
            contributions: vec![Contribution {
                model: "drag".into(),
                energy: wh(pre - 100.0),
            }],
            clamped,
        }
    }

    #[test]
    fn summary_tracks_clamps() {
        let mut s = RunSummary::default();
        s.record(&report(1, 120.0, 100.0, Some(ClampBound::Full)));
        s.record(&report(2, 40.0, 40.0, None));
        s.record(&report(3, -15.0, 0.0, Some(ClampBound::Empty)));

        assert_eq!(s.steps, 3);
        assert_eq!(s.full_clamps, 1);
        assert_eq!(s.empty_clamps, 1);
        assert!((s.clipped_surplus_wh - 20.0).abs() < 1e-9);
        assert!((s.unmet_demand_wh - 15.0).abs() < 1e-9);
        assert!((s.max_energy_wh - 100.0).abs() < 1e-9);
        assert_eq!(s.min_energy_wh, 0.0);
        assert_eq!(s.final_energy_wh, 0.0);
    }

    #[test]
    fn column_lookup() {
        let mut log = RunLog::new(vec!["a".into(), "b".into()]);
        log.rows.push(LogRow {
            step: 1,
            time: NaiveDateTime::default(),
            values: vec![Some(1.0), None],
        });
        assert_eq!(log.column("b"), Some(vec![None]));
        assert_eq!(log.column("c"), None);
        assert!(log.to_yaml().unwrap().contains("columns"));
    }

    #[test]
    fn nan_and_absent_series_are_empty() {
        let mut log = RunLog::new(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(log.empty_series().len(), 3);
        for v in [1.0, f64::NAN] {
            log.rows.push(LogRow {
                step: 1,
                time: NaiveDateTime::default(),
                values: vec![Some(v), Some(f64::NAN), None],
            });
        }
        assert_eq!(log.empty_series(), vec!["b".to_string(), "c".to_string()]);
    }
}
