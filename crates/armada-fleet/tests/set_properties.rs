//! Property tests for the machine-set membership algebra

use armada_core::{Machine, MachineState, Result};
use armada_fleet::{LeasableMachine, MachineSet};
use async_trait::async_trait;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

struct StubHandle {
    machine: Machine,
}

impl StubHandle {
    fn new(id: String) -> Arc<dyn LeasableMachine> {
        Arc::new(Self {
            machine: Machine {
                id,
                name: None,
                state: MachineState::Started,
                instance_id: String::new(),
                version: None,
                metadata: BTreeMap::new(),
            },
        })
    }
}

#[async_trait]
impl LeasableMachine for StubHandle {
    fn machine(&self) -> &Machine {
        &self.machine
    }

    async fn release_lease(&self) -> Result<()> {
        Ok(())
    }
}

fn run_removal(member_ids: &[String], removal_ids: &[String]) -> Vec<String> {
    armada_testkit::init_tracing();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");

    runtime.block_on(async {
        let members: Vec<Arc<dyn LeasableMachine>> = member_ids
            .iter()
            .map(|id| StubHandle::new(id.clone()))
            .collect();
        let removals: Vec<Arc<dyn LeasableMachine>> = removal_ids
            .iter()
            .map(|id| StubHandle::new(id.clone()))
            .collect();

        let mut set = MachineSet::new(members);
        set.remove_machines(&removals).await;
        set.machines()
            .iter()
            .map(|handle| handle.machine().id.clone())
            .collect()
    })
}

// Small id space so member/removal overlaps and duplicate ids both occur.
fn id_strategy() -> impl Strategy<Value = String> {
    (0u8..16).prop_map(|n| format!("m{n}"))
}

proptest! {
    /// Survivors are exactly the members whose id is outside the removal
    /// set, in original relative order, and the result is always a concrete
    /// (possibly empty) sequence.
    #[test]
    fn removal_preserves_order_and_length(
        member_ids in proptest::collection::vec(id_strategy(), 0..12),
        removal_ids in proptest::collection::vec(id_strategy(), 0..6),
    ) {
        let survivors = run_removal(&member_ids, &removal_ids);

        let removal_set: HashSet<&str> =
            removal_ids.iter().map(String::as_str).collect();
        let expected: Vec<String> = member_ids
            .iter()
            .filter(|id| !removal_set.contains(id.as_str()))
            .cloned()
            .collect();

        prop_assert_eq!(&survivors, &expected);

        let matching = member_ids
            .iter()
            .filter(|id| removal_set.contains(id.as_str()))
            .count();
        prop_assert_eq!(survivors.len(), member_ids.len() - matching);
    }

    /// Removing an empty list changes nothing.
    #[test]
    fn empty_removal_is_identity(
        member_ids in proptest::collection::vec(id_strategy(), 0..12),
    ) {
        let survivors = run_removal(&member_ids, &[]);
        prop_assert_eq!(survivors, member_ids);
    }

    /// Removing every member leaves an empty, still-usable set.
    #[test]
    fn full_removal_empties_the_set(
        member_ids in proptest::collection::vec(id_strategy(), 1..12),
    ) {
        let survivors = run_removal(&member_ids, &member_ids);
        prop_assert!(survivors.is_empty());
    }
}
