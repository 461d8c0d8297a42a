use std::ops::ControlFlow;
use std::path::Path;

use chrono::NaiveDateTime;
use sc_app::{AppError, AppResult, Simulation, WeatherRecord, WeatherSource};

const SCENARIO: &str = r#"
version: 1
name: driver smoke
parameters:
  timestamp: { value: "2025-07-04T09:00:00", unit: datetime }
  timestep: { value: 1, unit: hour }
  raceday_len: { value: 3.5, unit: hour }
  total_energy: { value: 1000, unit: Wh }
  battery_max_energy: { value: 1200, unit: Wh }
  velocity: { value: 16, unit: m/s }
  air_density: { value: 1.225, unit: kg/m^3 }
  drag_coeff: { value: 0.1305 }
  frontal_area: { value: 0.9117, unit: m^2 }
  num_cells: { value: 258 }
  p_mpp: { value: 3.98, unit: W }
  cell_efficiency: { value: 0.254 }
pipeline: [drag, array]
log: [total_energy, drag_power, array_power, not_a_param]
"#;

fn simulation() -> Simulation {
    let scenario = sc_project::parse_yaml(SCENARIO).unwrap();
    Simulation::from_scenario(&scenario).unwrap()
}

fn energies(log: &sc_app::RunLog) -> Vec<f64> {
    log.column("total_energy")
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

#[test]
fn runs_floor_of_raceday_over_timestep() {
    let mut sim = simulation();
    let log = sim.run().unwrap();
    assert_eq!(log.rows.len(), 3);
    assert_eq!(log.summary.steps, 3);
    assert_eq!(log.rows[0].time.to_string(), "2025-07-04 09:00:00");
    assert_eq!(log.rows[2].time.to_string(), "2025-07-04 11:00:00");
    assert_eq!(log.units[0].as_deref(), Some("Wh"));

    let drag = -0.5 * 1.225 * 0.1305 * 0.9117 * 16.0_f64.powi(3);
    let array = 258.0 * 3.98 * 0.254;
    let expected = 1000.0 + drag + array;
    assert!((energies(&log)[0] - expected).abs() < 1e-6);
}

#[test]
fn missing_log_params_are_flagged_not_zeroed() {
    let mut sim = simulation();
    let log = sim.run().unwrap();
    assert!(log.is_flagged("not_a_param"));
    assert!(!log.is_flagged("drag_power"));
    assert!(log.column("not_a_param").unwrap().iter().all(Option::is_none));
}

#[test]
fn single_run_equals_one_element_grid() {
    let mut sim = simulation();
    let single = sim.run().unwrap();

    let baseline = sim.sweep(&[]).unwrap();
    assert_eq!(baseline.outcomes.len(), 1);
    let (_, grid_log) = baseline.succeeded().next().unwrap();
    assert_eq!(grid_log.rows, single.rows);

    let one = sim.sweep(&["velocity:16:17:1:m/s".to_string()]).unwrap();
    assert_eq!(one.outcomes.len(), 1);
    let (_, one_log) = one.succeeded().next().unwrap();
    assert_eq!(energies(one_log), energies(&single));
}

#[test]
fn grid_configurations_do_not_leak() {
    let mut sim = simulation();
    let before = sim.run().unwrap();

    let report = sim.sweep(&["velocity:10:12:1:mph".to_string()]).unwrap();
    assert_eq!(report.outcomes.len(), 2);
    let logs: Vec<_> = report.succeeded().map(|(_, log)| energies(log)).collect();
    assert_eq!(logs.len(), 2);
    assert_ne!(logs[0], logs[1]);
    // slower car, less drag
    assert!(logs[0][0] > logs[1][0]);

    // rerunning configuration one from scratch matches its grid result
    let again = sim.sweep(&["velocity:10:11:1:mph".to_string()]).unwrap();
    let (_, again_log) = again.succeeded().next().unwrap();
    assert_eq!(energies(again_log), logs[0]);

    let after = sim.run().unwrap();
    assert_eq!(before.rows, after.rows);
    assert!(sim.vehicle.params().iter().eq(sim.vehicle.baseline().iter()));
}

#[test]
fn failed_configurations_are_recorded() {
    let mut sim = simulation();
    let report = sim.sweep(&["velocity:1:3:1:kg".to_string()]).unwrap();
    assert_eq!(report.failed().count(), 2);
    assert_eq!(report.succeeded().count(), 0);
    let (_, err) = report.failed().next().unwrap();
    assert!(matches!(err, AppError::Simulation(_)));
    assert!(sim.run().is_ok());
}

#[test]
fn invalid_sweep_entries() {
    let mut sim = simulation();
    let mixed = sim
        .sweep(&["bogus".to_string(), "velocity:10:11:1:mph".to_string()])
        .unwrap();
    assert_eq!(mixed.outcomes.len(), 1);
    assert!(matches!(
        sim.sweep(&["bogus".to_string()]),
        Err(AppError::InvalidConfiguration(_))
    ));
}

#[test]
fn progress_can_stop_the_run() {
    let mut sim = simulation();
    let mut seen = Vec::new();
    let log = sim
        .run_with_progress(&mut |p| {
            seen.push(p.step);
            if p.step == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
    assert_eq!(seen, vec![1, 2]);
    assert!(log.stopped_early);
    assert_eq!(log.rows.len(), 2);
}

struct Offline;

impl WeatherSource for Offline {
    fn record_at(&self, _at: NaiveDateTime) -> AppResult<WeatherRecord> {
        Err(AppError::ExternalDataUnavailable("no network".into()))
    }
}

#[test]
fn weather_failure_falls_back_to_no_modifiers() {
    let mut sim = simulation();
    let plain = sim.run().unwrap();

    sim.driver = sc_app::Driver::new(sim.driver.start())
        .with_log(vec!["total_energy".into(), "weather_wind_modifier".into()])
        .with_weather(Box::new(Offline));
    let log = sim.run().unwrap();
    assert_eq!(log.rows.len(), 3);
    assert!(log.column("weather_wind_modifier").unwrap().iter().all(|v| *v == Some(1.0)));
    assert_eq!(energies(&log), energies(&plain));
}

#[test]
fn bundled_race_day_stays_within_capacity() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/race_day.yaml");
    let mut sim = Simulation::load(&path).unwrap();
    let log = sim.run().unwrap();
    assert_eq!(log.summary.steps, 16);
    assert!(log.flagged.is_empty(), "flagged: {:?}", log.flagged);
    for e in energies(&log) {
        assert!((0.0..=5.0).contains(&e), "{e} kWh out of bounds");
    }

    let report = sim.sweep(&[]).unwrap();
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.failed().count(), 0);
}

#[test]
fn start_time_stands_in_for_timestamp() {
    let yaml = r#"
version: 1
name: start only
start: 2025-07-04T09:00:00
parameters:
  timestep: { value: 1, unit: hour }
  raceday_len: { value: 3, unit: hour }
  total_energy: { value: 1000, unit: Wh }
  battery_max_energy: { value: 1200, unit: Wh }
  velocity: { value: 16, unit: m/s }
  air_density: { value: 1.225, unit: kg/m^3 }
  drag_coeff: { value: 0.1305 }
  frontal_area: { value: 0.9117, unit: m^2 }
  num_cells: { value: 258 }
  p_mpp: { value: 3.98, unit: W }
  cell_efficiency: { value: 0.254 }
  latitude_deg: { value: 38, unit: degree }
pipeline: [drag, array]
array: { fidelity: incidence }
log: [timestamp, array_power]
"#;
    let scenario = sc_project::parse_yaml(yaml).unwrap();
    let mut sim = Simulation::from_scenario(&scenario).unwrap();
    let log = sim.run().unwrap();
    assert_eq!(log.rows.len(), 3);
    let stamps: Vec<f64> = log.column("timestamp").unwrap().into_iter().flatten().collect();
    assert_eq!(stamps, vec![9.0 * 3600.0, 10.0 * 3600.0, 11.0 * 3600.0]);
    assert!(log.flagged.is_empty(), "flagged: {:?}", log.flagged);
}

#[test]
fn series_without_finite_values_are_flagged() {
    let mut sim = simulation();
    sim.vehicle
        .set_param("sensor_trim", sc_core::Quantity::dimensionless(f64::NAN));
    sim.set_log(vec!["total_energy".into(), "sensor_trim".into()]);
    let log = sim.driver.run(&mut sim.vehicle).unwrap();
    assert_eq!(log.rows.len(), 3);
    assert!(log.is_flagged("sensor_trim"));
    assert!(!log.is_flagged("total_energy"));
}

#[test]
fn clock_overflow_is_an_error() {
    let yaml = SCENARIO
        .replace("{ value: 1, unit: hour }", "{ value: 1.0e12, unit: s }")
        .replace("{ value: 3.5, unit: hour }", "{ value: 1.0e13, unit: s }");
    let scenario = sc_project::parse_yaml(&yaml).unwrap();
    let mut sim = Simulation::from_scenario(&scenario).unwrap();
    assert!(matches!(sim.run(), Err(AppError::InvalidConfiguration(_))));
}
