//! End-to-end engine tests with the physics models.

use sc_core::units::{kgpm3, m2, mps, s, w, wh, Energy};
use sc_core::{ParamStore, Quantity, Unit};
use sc_models::{ArrayFidelity, Drag, EsrBatteryLoss, SolarArray};
use sc_sim::{SimError, VehicleModel, BATTERY_MAX_ENERGY, TIMESTEP, TOTAL_ENERGY};
use uom::si::energy::watt_hour;

fn base() -> ParamStore {
    let mut p = ParamStore::new();
    p.set(TOTAL_ENERGY, Quantity::new(3000.0, Unit::watt_hour()));
    p.set_typed(BATTERY_MAX_ENERGY, wh(5000.0));
    p.set(TIMESTEP, Quantity::parse(1.0, "hour").unwrap());
    p.set_typed("air_density", kgpm3(1.225));
    p.set_typed("velocity", mps(16.0));
    p.set("drag_coeff", Quantity::dimensionless(0.1305));
    p.set_typed("frontal_area", m2(0.9117));
    p.set("num_cells", Quantity::dimensionless(258.0));
    p.set_typed("p_mpp", w(3.98));
    p.set("cell_efficiency", Quantity::dimensionless(0.254));
    p
}

#[test]
fn drag_and_nameplate_over_one_hour() {
    let mut vm = VehicleModel::builder(base())
        .with_model(Drag::new())
        .with_model(SolarArray::new(ArrayFidelity::Nameplate))
        .build()
        .unwrap();
    let report = vm.update().unwrap();

    let drag_wh = -0.5 * 1.225 * 0.1305 * 0.9117 * 16.0_f64.powi(3);
    let array_wh = 258.0 * 3.98 * 0.254;
    let total: Energy = vm.total_energy().unwrap();
    assert!((total.get::<watt_hour>() - (3000.0 + drag_wh + array_wh)).abs() < 1e-6);
    assert_eq!(report.contributions[0].model, "drag");
    assert_eq!(report.contributions[1].model, "array");

    // total keeps the unit it was seeded with
    assert_eq!(vm.params().get(TOTAL_ENERGY).unwrap().unit().symbol(), "Wh");
}

#[test]
fn battery_without_tractive_fields_is_rejected_at_build() {
    let mut p = base();
    p.set("cells_in_series", Quantity::dimensionless(26.0));
    p.set("cells_in_parallel", Quantity::dimensionless(12.0));
    p.set("cell_internal_impedance", Quantity::parse(25.0, "mohm").unwrap());
    p.set("battery_voltage_nominal", Quantity::parse(96.0, "V").unwrap());

    let err = VehicleModel::builder(p.clone())
        .with_model(Drag::new())
        .with_battery(EsrBatteryLoss::new())
        .build()
        .err()
        .unwrap();
    assert_eq!(
        err,
        SimError::UnsatisfiedRead {
            model: "battery_esr".into(),
            key: "rr_power".into()
        }
    );

    p.set("rr_power", Quantity::parse(0.0, "W").unwrap());
    let mut vm = VehicleModel::builder(p)
        .with_model(Drag::new())
        .with_battery(EsrBatteryLoss::new())
        .build()
        .unwrap();
    let report = vm.update().unwrap();
    assert_eq!(report.contributions.last().unwrap().model, "battery_esr");
    assert!(report.contributions.last().unwrap().energy.value < 0.0);
}

#[test]
fn repeated_runs_after_reset_match() {
    let mut vm = VehicleModel::builder(base())
        .with_model(Drag::new())
        .with_model(SolarArray::new(ArrayFidelity::Nameplate))
        .build()
        .unwrap();
    let first: Vec<f64> = (0..5)
        .map(|_| vm.update().unwrap().post_clamp.value)
        .collect();
    vm.reset();
    let second: Vec<f64> = (0..5)
        .map(|_| vm.update().unwrap().post_clamp.value)
        .collect();
    assert_eq!(first, second);
    assert!(vm.params().contains("total_array_energy"));
}

#[test]
fn timestep_is_fixed_at_build() {
    let vm = VehicleModel::builder(base()).build().unwrap();
    assert_eq!(vm.timestep(), s(3600.0));
}
