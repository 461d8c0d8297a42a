use std::collections::BTreeMap;

use sc_project::schema::*;
use sc_project::{load_yaml, parse_yaml, save_yaml, validate_scenario, ProjectError, ValidationError};

fn scenario() -> Scenario {
    let mut parameters = BTreeMap::new();
    parameters.insert("timestamp".to_string(), ParameterDef::datetime("2025-07-04T09:00:00"));
    parameters.insert("timestep".to_string(), ParameterDef::number(60.0, "s"));
    parameters.insert("velocity".to_string(), ParameterDef::number(20.0, "mph"));
    parameters.insert("drag_coeff".to_string(), ParameterDef::number(0.13, ""));
    Scenario {
        version: 1,
        name: "Roundtrip".to_string(),
        start: None,
        parameters,
        pipeline: vec![ModelKind::RollingResistance, ModelKind::Drag],
        battery: BatteryKind::Esr,
        array: ArrayDef {
            fidelity: "incidence".to_string(),
        },
        rolling_resistance: Some(RollingResistanceDef {
            wheels: vec![WheelDef {
                name: "all".to_string(),
                weight: "weight".to_string(),
            }],
        }),
        lv_draw: None,
        weather: None,
        log: vec!["velocity".to_string(), "total_energy".to_string()],
        sweep: vec!["velocity:10:12:1:mph".to_string()],
    }
}

#[test]
fn roundtrip_yaml_scenario() {
    let scenario = scenario();
    validate_scenario(&scenario).unwrap();

    let path = std::env::temp_dir().join("sc_project_roundtrip.yaml");
    save_yaml(&path, &scenario).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(scenario, loaded);
}

#[test]
fn defaults_fill_missing_sections() {
    let yaml = r#"
version: 1
name: bare
start: 2025-07-04T08:00:00
"#;
    let s = parse_yaml(yaml).unwrap();
    assert_eq!(
        s.pipeline,
        vec![ModelKind::RollingResistance, ModelKind::Drag, ModelKind::Array]
    );
    assert_eq!(s.battery, BatteryKind::Disabled);
    assert_eq!(s.array.fidelity, "nameplate");
    assert_eq!(s.log, vec!["velocity", "total_energy", "array_power"]);
    assert!(s.parameters.is_empty());
}

#[test]
fn integer_values_and_bare_units() {
    let yaml = r#"
version: 1
name: ints
parameters:
  timestamp: { value: "2025-07-04T10:15:00", unit: datetime }
  front_weight: { value: 160, unit: kg }
  num_cells: { value: 258 }
battery: none
"#;
    let s = parse_yaml(yaml).unwrap();
    let store = s.to_param_store().unwrap();
    assert_eq!(store.get("front_weight").unwrap().magnitude(), 160.0);
    assert_eq!(store.ratio("num_cells").unwrap(), 258.0);
    assert_eq!(store.get("timestamp").unwrap().magnitude(), 10.0 * 3600.0 + 15.0 * 60.0);
    assert_eq!(
        s.start_time().unwrap().to_string(),
        "2025-07-04 10:15:00"
    );
}

#[test]
fn unknown_model_is_a_yaml_error() {
    let yaml = "version: 1\nname: x\nstart: 2025-07-04T08:00:00\npipeline: [warp_drive]\n";
    assert!(matches!(parse_yaml(yaml), Err(ProjectError::Yaml(_))));
}

#[test]
fn version_zero_is_rejected() {
    let yaml = "version: 0\nname: x\nstart: 2025-07-04T08:00:00\n";
    assert!(matches!(
        parse_yaml(yaml),
        Err(ProjectError::Validation(ValidationError::UnsupportedVersion { version: 0 }))
    ));
}

#[test]
fn unconvertible_parameter_is_skipped() {
    let yaml = r#"
version: 1
name: skip
parameters:
  timestamp: { value: "2025-07-04T10:15:00", unit: datetime }
  front_weight: { value: 160, unit: kg }
  unused_note: { value: 1, unit: furlongs }
"#;
    let s = parse_yaml(yaml).unwrap();
    let store = s.to_param_store().unwrap();
    assert!(store.contains("front_weight"));
    assert!(!store.contains("unused_note"));
}

#[test]
fn every_parameter_unconvertible_is_rejected() {
    let yaml = r#"
version: 1
name: none
start: 2025-07-04T08:00:00
parameters:
  unused_note: { value: 1, unit: furlongs }
"#;
    assert!(matches!(
        parse_yaml(yaml),
        Err(ProjectError::Validation(ValidationError::InvalidValue { .. }))
    ));
}
