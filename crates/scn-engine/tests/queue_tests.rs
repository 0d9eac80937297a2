use proptest::prelude::*;
use scn_engine::prelude::*;
use scn_test_utils::{action, test_registry, CallLog, ScenarioTree};

const KEYS: [&str; 4] = ["Alpha", "Bravo", "Charlie", "Delta"];

fn tree() -> ScenarioTree {
    ScenarioTree::new()
        .scenario(ScenarioKind::Run, "Alpha", &[action("Test.Ok")])
        .scenario(ScenarioKind::Run, "Bravo", &[action("Test.Wait"), action("Test.Ok")])
        .scenario(ScenarioKind::Run, "Charlie", &[])
        .scenario(ScenarioKind::Run, "Delta", &[action("Test.Fail"), action("Test.Ok")])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn runs_complete_in_fifo_order_with_a_visible_gap(picks in prop::collection::vec(0usize..KEYS.len(), 1..8)) {
        let tree = tree();
        let log = CallLog::new();
        let mut runtime = ScenarioRuntime::new(tree.manifest(), tree.source(), test_registry(&log), &EngineConfig::default());
        let tracker = runtime.tracker();

        let mut expected = Vec::new();
        for &pick in &picks {
            let run_id = runtime.run_with(KEYS[pick], EnqueueOptions::new());
            prop_assert!(run_id.is_some());
            expected.extend(run_id);
        }

        let mut completed = Vec::new();
        let mut previous_tick_completed = false;
        for _ in 0..200 {
            if runtime.is_idle() {
                break;
            }
            let outcome = runtime.tick();

            // A new run is never popped on the tick that completed the previous one
            if previous_tick_completed {
                let stepped = matches!(outcome, TickOutcome::StepPending { .. } | TickOutcome::StepCompleted { .. });
                prop_assert!(!stepped, "next run stepped on the tick after a completion: {:?}", outcome);
            }

            if let TickOutcome::RunCompleted { run_id, succeeded } = outcome {
                // Sampled between ticks, the finished run is what readers see
                let record = tracker.last_result();
                prop_assert_eq!(record.run_id, Some(run_id));
                prop_assert_eq!(record.succeeded, succeeded);
                prop_assert_eq!(tracker.completed_runs(), completed.len() as u64 + 1);
                completed.push(run_id);
            }
            previous_tick_completed = outcome.is_run_completed();
        }

        prop_assert_eq!(completed, expected);
        prop_assert_eq!(runtime.last_success(), picks.last() != Some(&3));
    }

    #[test]
    fn unknown_keys_never_change_state(key in "[a-z]{1,12}") {
        prop_assume!(!KEYS.iter().any(|k| k.eq_ignore_ascii_case(&key)));
        let tree = tree();
        let log = CallLog::new();
        let mut runtime = ScenarioRuntime::new(tree.manifest(), tree.source(), test_registry(&log), &EngineConfig::default());

        prop_assert!(!runtime.run(&key));
        prop_assert!(!runtime.mission(&key));
        prop_assert_eq!(runtime.pending_len(), 0);
        prop_assert_eq!(runtime.tracker().completed_runs(), 0);
        prop_assert_eq!(runtime.tick(), TickOutcome::Idle);
    }
}

#[test]
fn clear_pending_between_ticks() {
    let tree = tree();
    let log = CallLog::new();
    let mut runtime = ScenarioRuntime::new(tree.manifest(), tree.source(), test_registry(&log), &EngineConfig::default());

    runtime.run("Bravo");
    runtime.run("Alpha");
    runtime.run("Charlie");
    runtime.tick();

    assert_eq!(runtime.clear_pending(), 2);
    runtime.run_until_idle(100);
    assert_eq!(runtime.tracker().completed_runs(), 1);
    assert_eq!(log.canonical_names(), vec!["Test.Wait", "Test.Ok"]);
}
