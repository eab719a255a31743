// tests/claims_property.rs

use std::collections::HashSet;

use proptest::prelude::*;
use taskbridge::engine::{ProcessedSet, select_eligible};
use taskbridge::store::{StatusUpdate, TaskStore};
use taskbridge::types::TaskStatus;
use taskbridge_test_utils::builders::StoreDocBuilder;

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Queued),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
        Just(TaskStatus::Error),
    ]
}

// A store of up to `max` tasks named t0..tN with random statuses, plus a
// random subset of those ids (and some unknown ones) as the seed.
fn store_and_seed(max: usize) -> impl Strategy<Value = (TaskStore, Vec<TaskStatus>, HashSet<String>)> {
    (1..=max).prop_flat_map(|n| {
        (
            proptest::collection::vec(status_strategy(), n),
            proptest::collection::hash_set(0..n + 3, 0..n),
        )
            .prop_map(|(statuses, seed_idx)| {
                let mut builder = StoreDocBuilder::new();
                for (i, status) in statuses.iter().enumerate() {
                    builder = builder.with_status(&format!("t{i}"), &format!("task {i}"), *status);
                }
                let store = TaskStore::parse(&builder.build()).unwrap();
                let seed = seed_idx.into_iter().map(|i| format!("t{i}")).collect();
                (store, statuses, seed)
            })
    })
}

proptest! {
    #[test]
    fn eligible_is_exactly_queued_minus_processed((store, statuses, seed) in store_and_seed(12)) {
        let processed = ProcessedSet::from_seed(seed.clone());
        let eligible: Vec<String> = select_eligible(&store, &processed)
            .into_iter()
            .map(|t| t.id)
            .collect();

        let expected: Vec<String> = statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == TaskStatus::Queued)
            .map(|(i, _)| format!("t{i}"))
            .filter(|id| !seed.contains(id))
            .collect();

        prop_assert_eq!(eligible, expected);
    }

    #[test]
    fn claiming_everything_eligible_leaves_nothing((store, _statuses, seed) in store_and_seed(12)) {
        let mut processed = ProcessedSet::from_seed(seed);
        for task in select_eligible(&store, &processed) {
            prop_assert!(processed.claim(&task.id));
            prop_assert!(!processed.claim(&task.id));
        }
        prop_assert!(select_eligible(&store, &processed).is_empty());
    }

    #[test]
    fn status_never_moves_backwards(
        (mut store, statuses, _seed) in store_and_seed(6),
        updates in proptest::collection::vec((0..6usize, status_strategy()), 0..20),
    ) {
        let mut current = statuses.clone();
        for (idx, target) in updates {
            if idx >= current.len() {
                continue;
            }
            let update = match target {
                TaskStatus::Queued => continue,
                TaskStatus::InProgress => StatusUpdate::in_progress(),
                TaskStatus::Completed => StatusUpdate::completed(),
                TaskStatus::Error => StatusUpdate::error("boom"),
            };
            store.apply(&format!("t{idx}"), &update);

            let after = store.get(&format!("t{idx}")).unwrap().status;
            prop_assert!(after == current[idx] || current[idx].can_transition_to(after));
            if current[idx].is_terminal() {
                prop_assert_eq!(after, current[idx]);
            }
            current[idx] = after;
        }
    }
}
