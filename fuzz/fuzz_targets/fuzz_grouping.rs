#![no_main]

//! Grouping must place every trigger in exactly one non-empty list, keep
//! document order inside each list, and be deterministic.

use libfuzzer_sys::fuzz_target;
use mklb_core::{Partition, Trigger};

fuzz_target!(|groups: Vec<Option<String>>| {
    let triggers: Vec<_> = groups
        .iter()
        .cloned()
        .enumerate()
        .map(|(node, group)| Trigger { node, group })
        .collect();

    let lists = Partition::from_triggers(triggers.clone()).into_lists();
    let mut seen: Vec<usize> = lists.iter().flatten().copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..groups.len()).collect::<Vec<_>>());

    for list in &lists {
        assert!(!list.is_empty());
        assert!(list.windows(2).all(|w| w[0] < w[1]));
    }

    assert_eq!(lists, Partition::from_triggers(triggers).into_lists());
});
