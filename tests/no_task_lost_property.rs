//! Property: no task is ever lost. For any mix of well-behaved, flaky, and
//! hopeless tasks, successes plus terminal failures account for the whole
//! task set, and the per-kind outcome matches the retry budget.

mod common;

use common::{fast_config, CountingProvisioner, ExecutorMode, ScriptedExecutor};
use proptest::prelude::*;
use rota_core::{Scheduler, Task};
use serde_json::json;

#[derive(Debug, Clone)]
enum TaskKind {
    Success,
    /// Fails the first `n` attempts with a retryable failure.
    Flaky(u32),
    Terminal,
}

fn kind_strategy() -> impl Strategy<Value = TaskKind> {
    prop_oneof![
        Just(TaskKind::Success),
        (1u32..=5).prop_map(TaskKind::Flaky),
        Just(TaskKind::Terminal),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, ..ProptestConfig::default() })]

    #[test]
    fn no_task_lost(
        kinds in prop::collection::vec(kind_strategy(), 0..25),
        workers in 1usize..4,
    ) {
        tokio_test::block_on(async move {
            let tasks: Vec<Task> = kinds
                .iter()
                .map(|kind| match kind {
                    TaskKind::Success => Task::new(json!({ "kind": "success" })),
                    TaskKind::Flaky(fail_times) => {
                        Task::new(json!({ "kind": "flaky", "fail_times": fail_times }))
                    }
                    TaskKind::Terminal => Task::new(json!({ "kind": "terminal" })),
                })
                .collect();
            let total = tasks.len();

            // With max_task_retries = 3 a task gets at most 4 attempts:
            // flaky tasks failing up to 3 times recover, the rest exhaust
            // the budget and join the declared-terminal tasks.
            let expected_successes = kinds
                .iter()
                .filter(|kind| match kind {
                    TaskKind::Success => true,
                    TaskKind::Flaky(fail_times) => *fail_times <= 3,
                    TaskKind::Terminal => false,
                })
                .count();

            let scheduler = Scheduler::new(
                fast_config(workers),
                CountingProvisioner::new(0),
                ScriptedExecutor::new(ExecutorMode::PayloadDriven),
            )
            .unwrap();
            let snapshot = scheduler.run(tasks).await.unwrap();

            prop_assert_eq!(snapshot.successes + snapshot.terminal_failures, total);
            prop_assert_eq!(snapshot.pending, 0);
            prop_assert_eq!(snapshot.successes, expected_successes);
            prop_assert_eq!(snapshot.records.len(), total);
            Ok(())
        })?;
    }
}
