//! Property tests for call context and request identifiers.

use hermes_core::{Context, RequestId};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Depth(usize);

proptest! {
    #[test]
    fn extending_never_mutates_parent(values in proptest::collection::vec(any::<u64>(), 1..32)) {
        let mut contexts = vec![Context::background()];
        for v in &values {
            let next = contexts.last().unwrap().with_value(*v);
            contexts.push(next);
        }

        for (depth, ctx) in contexts.iter().enumerate() {
            prop_assert_eq!(ctx.len(), depth);
            let expected = depth.checked_sub(1).map(|i| values[i]);
            prop_assert_eq!(ctx.value::<u64>().copied(), expected);
        }
    }

    #[test]
    fn lookup_finds_nearest_of_each_type(depth in 0usize..16, noise in 0usize..16) {
        let mut ctx = Context::background().with_value(Depth(depth));
        for i in 0..noise {
            ctx = ctx.with_value(i as u32);
        }
        prop_assert_eq!(ctx.value::<Depth>(), Some(&Depth(depth)));
    }
}

#[tokio::test]
async fn concurrent_tasks_get_distinct_request_ids() {
    let tasks: Vec<_> = (0..64)
        .map(|_| tokio::spawn(async { RequestId::new() }))
        .collect();

    let mut seen = HashSet::new();
    for task in tasks {
        let id = task.await.unwrap();
        assert!(!id.as_uuid().is_nil());
        assert!(seen.insert(id));
    }
}
