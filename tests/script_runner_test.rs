use std::io::Write;

use smart_charging::core::CommandReport;
use smart_charging::{
    ChargingEngine, CommandOutput, CommandScript, EngineConfig, ErrorCategory, InMemoryStore,
    ScriptRunner,
};
use tempfile::NamedTempFile;

const SCRIPT: &str = r#"
[[commands]]
op = "save_group"
identifier = "1f0e6a4c-8b7d-4c3e-9a21-5d6f7e8a9b0c"
name = "Depot"
capacity = 10.0

[[commands]]
op = "save_charge_station"
identifier = "2a1b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d"
group_identifier = "1f0e6a4c-8b7d-4c3e-9a21-5d6f7e8a9b0c"
name = "North"

[[commands]]
op = "save_connector"
identifier = 1
charge_station_identifier = "2a1b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d"
max_current_in_amps = 5.0

[[commands]]
op = "save_connector"
identifier = 2
charge_station_identifier = "2a1b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d"
max_current_in_amps = 6.0

[[commands]]
op = "group_total"
identifier = "1f0e6a4c-8b7d-4c3e-9a21-5d6f7e8a9b0c"
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_script_run_reports_each_command() {
    let file = write_temp(SCRIPT);
    let script = CommandScript::from_file(file.path()).unwrap();
    assert_eq!(script.len(), 5);

    let runner = ScriptRunner::new(ChargingEngine::with_defaults(InMemoryStore::new()));
    let summary = runner.run(script.into_commands()).await;

    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.first_failure, Some(ErrorCategory::Capacity));
    match &summary.reports[3] {
        CommandReport::Failed {
            index, category, ..
        } => {
            assert_eq!(*index, 3);
            assert_eq!(category, "Capacity");
        }
        other => panic!("unexpected report: {other:?}"),
    }
    match &summary.reports[4] {
        CommandReport::Ok { output, .. } => {
            assert_eq!(output, &CommandOutput::Total { amps: 5.0 })
        }
        other => panic!("unexpected report: {other:?}"),
    }

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["failed"], 1);
    assert_eq!(json["reports"][3]["result"], "failed");
    assert_eq!(json["reports"][4]["output"]["kind"], "total");
}

#[tokio::test]
async fn test_engine_config_caps_group_capacity() {
    let config_file = write_temp("[capacity]\nmax_group_capacity = 8.0\n");
    let config = EngineConfig::from_file(config_file.path()).unwrap();

    let runner = ScriptRunner::new(ChargingEngine::new(InMemoryStore::new(), &config));
    let summary = runner
        .run(CommandScript::from_toml_str(SCRIPT).unwrap().into_commands())
        .await;

    // The group is rejected, so every dependent command fails too.
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.first_failure, Some(ErrorCategory::Validation));
}
