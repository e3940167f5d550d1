//! Property tests for the identity-stable handle registry: stability,
//! non-collision and no-reuse under arbitrary membership churn.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;

use simlink_shared::{Handle, HandleRegistry};

struct Entry(Arc<u32>);

const POOL_SIZE: usize = 8;

/// Applies a sequence of membership masks (bit i = object i live this tick)
/// and checks the registry invariants after every refresh.
fn check_churn(masks: Vec<u8>) {
    let pool: Vec<Arc<u32>> = (0..POOL_SIZE as u32).map(Arc::new).collect();
    let mut registry: HandleRegistry<Entry> = HandleRegistry::new();

    let mut previous_round: HashMap<usize, Handle> = HashMap::new();
    let mut ever_assigned: HashSet<Handle> = HashSet::new();

    for mask in masks {
        let live: Vec<Arc<u32>> = pool
            .iter()
            .enumerate()
            .filter(|(index, _)| mask & (1 << index) != 0)
            .map(|(_, object)| object.clone())
            .collect();

        registry.refresh(&live, |entry| &entry.0, Entry);

        let mut this_round: HashMap<usize, Handle> = HashMap::new();
        let mut seen_handles: HashSet<Handle> = HashSet::new();
        for (handle, entry) in registry.iter() {
            // non-collision: one handle per live object
            assert!(seen_handles.insert(handle), "handle {handle} collided");
            let index = pool
                .iter()
                .position(|object| Arc::ptr_eq(object, &entry.0))
                .expect("registry entry wraps an unknown object");
            this_round.insert(index, handle);
        }
        assert_eq!(registry.len(), live.len());

        for (index, handle) in &this_round {
            match previous_round.get(index) {
                // stability: present last tick and this tick => same handle
                Some(previous) => assert_eq!(
                    previous, handle,
                    "object {index} changed handle across ticks"
                ),
                // no reuse: a newcomer never receives a previously-seen handle
                None => assert!(
                    !ever_assigned.contains(handle),
                    "handle {handle} was reallocated to object {index}"
                ),
            }
        }
        ever_assigned.extend(this_round.values().copied());

        previous_round = this_round;
    }
}

proptest! {
    #[test]
    fn churn_preserves_registry_invariants(masks in prop::collection::vec(any::<u8>(), 1..64)) {
        check_churn(masks);
    }
}

#[test]
fn full_turnover_allocates_fresh_handles() {
    // every object leaves, then re-enters; all handles must be new
    check_churn(vec![0b1111, 0b0000, 0b1111]);
}
