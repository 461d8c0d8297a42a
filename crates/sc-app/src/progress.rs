use chrono::NaiveDateTime;

/// Reported to a progress callback after every completed step.
#[derive(Debug, Clone)]
pub struct RunProgress {
    pub step: u64,
    pub total_steps: u64,
    pub time: NaiveDateTime,
    pub total_energy_wh: f64,
    pub clamped: bool,
}

impl RunProgress {
    pub fn fraction_complete(&self) -> f64 {
        if self.total_steps == 0 {
            1.0
        } else {
            self.step as f64 / self.total_steps as f64
        }
    }
}
