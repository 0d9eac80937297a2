use scn_engine::prelude::*;
use scn_engine::{allowed_transitions, validate_transition, Phase};
use scn_scenario::ManifestError;
use scn_test_utils::{action, test_registry, CallLog, ScenarioTree};
use proptest::prelude::*;

#[test]
fn from_config_reads_scenarios_from_disk() {
    let tree = ScenarioTree::new()
        .scenario(ScenarioKind::Mission, "Great_Northern_Wall", &[action("Test.Ok")])
        .scenario(ScenarioKind::Quest, "Primeval_Armor", &[action("Test.Wait")]);
    let dir = tree.write_temp();

    let config = EngineConfig::from_toml_str(&format!(
        "scenarios_dir = {:?}\ndefinition_cache_capacity = 4\ndialog_keys = [\"npc_reply\"]\n",
        dir.path().display().to_string()
    ))
    .unwrap();
    let log = CallLog::new();
    let mut runtime = ScenarioRuntime::from_config(&config, test_registry(&log)).unwrap();

    assert_eq!(runtime.identifiers().missions.len(), 1);
    assert!(runtime.mission("great northern wall"));
    assert!(runtime.quest("Primeval_Armor"));
    runtime.run_until_idle(50);

    assert!(runtime.last_success());
    assert_eq!(runtime.tracker().completed_runs(), 2);
    assert_eq!(log.canonical_names(), vec!["Test.Ok", "Test.Wait"]);
}

#[test]
fn edits_are_picked_up_without_cache() {
    let tree = ScenarioTree::new().scenario(ScenarioKind::Run, "Edit", &[action("Test.Ok")]);
    let dir = tree.write_temp();
    let config = EngineConfig::new().with_scenarios_dir(dir.path());
    let log = CallLog::new();
    let mut runtime = ScenarioRuntime::from_config(&config, test_registry(&log)).unwrap();

    assert!(runtime.run("Edit"));
    runtime.run_until_idle(10);
    assert!(runtime.last_success());

    ScenarioTree::new()
        .scenario(ScenarioKind::Run, "Edit", &[action("Test.Fail")])
        .write_to(dir.path(), "manifest.json");

    assert!(runtime.run("Edit"));
    runtime.run_until_idle(10);
    assert!(!runtime.last_success());
}

#[test]
fn missing_manifest_is_a_startup_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::new().with_scenarios_dir(dir.path());
    let err = ScenarioRuntime::from_config(&config, HandlerRegistry::new()).unwrap_err();
    assert!(matches!(err, EngineError::Manifest(ManifestError::Io { .. })));
}

#[test]
fn duplicate_manifest_key_is_a_startup_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("manifest.json"),
        r#"{"runs": {"A": "a.json", "A": "b.json"}}"#,
    )
    .unwrap();
    let config = EngineConfig::new().with_scenarios_dir(dir.path());
    let err = ScenarioRuntime::from_config(&config, HandlerRegistry::new()).unwrap_err();
    assert!(matches!(err, EngineError::Manifest(ManifestError::DuplicateKey { .. })));
}

fn phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Idle),
        Just(Phase::Running),
        Just(Phase::StepFailedOptional),
        Just(Phase::StepFailedFatal),
        Just(Phase::RunComplete),
    ]
}

proptest! {
    #[test]
    fn validation_matches_transition_table(from in phase(), to in phase()) {
        let allowed = allowed_transitions(from).contains(&to);
        prop_assert_eq!(validate_transition(from, to).is_ok(), allowed);
    }
}
