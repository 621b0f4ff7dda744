//! Property tests for ordered containers and reference bookkeeping.
//!
//! Core guarantees exercised here:
//! - A container never holds the same member twice, whatever sequence of
//!   inserts, removals or repeated assignments is applied.
//! - An insert at a valid position places the member exactly there.
//! - Detaching an identifier removes every reference to it and nothing else.

use proptest::prelude::*;
use scriptorium_model::{Container, FieldValue, ReferenceIndex, Resource, ResourceId, ResourceKind};
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, Option<usize>),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8, proptest::option::of(0usize..10)).prop_map(|(id, pos)| Op::Insert(id, pos)),
        (0u8..8).prop_map(Op::Remove),
    ]
}

fn id(n: u8) -> ResourceId {
    ResourceId::new(format!("r{n}"))
}

proptest! {
    /// Tenet: members stay unique and inserts land where asked.
    #[test]
    fn container_members_stay_unique(ops in prop::collection::vec(op(), 0..40)) {
        let mut container = Container::new();
        for op in ops {
            match op {
                Op::Insert(n, position) => {
                    container.insert(id(n), position);
                    let at = container.position(&id(n)).unwrap();
                    match position {
                        Some(p) if p < container.len() => prop_assert_eq!(at, p),
                        _ => {}
                    }
                }
                Op::Remove(n) => {
                    container.remove(&id(n));
                    prop_assert!(!container.contains(&id(n)));
                }
            }
            let unique: HashSet<_> = container.members().iter().collect();
            prop_assert_eq!(unique.len(), container.len());
        }
    }

    /// Tenet: detaching leaves only the other references behind.
    #[test]
    fn detach_removes_exactly_one_identifier(
        members in prop::collection::vec(0u8..6, 0..12),
        victim in 0u8..6,
    ) {
        let ids: Vec<_> = members.iter().map(|n| id(*n)).collect();
        let mut chapter = Resource::new(ResourceKind::Chapter, "chapter".into());
        chapter.assign("content", FieldValue::Collection(ids.clone())).unwrap();

        let index = ReferenceIndex::build([&chapter]);
        prop_assert_eq!(index.is_referenced(&id(victim)), ids.contains(&id(victim)));

        chapter.detach(&id(victim));
        let mut seen = HashSet::new();
        let expected: Vec<_> = ids
            .into_iter()
            .filter(|m| seen.insert(m.clone()) && *m != id(victim))
            .collect();
        prop_assert_eq!(chapter.as_container().unwrap().members(), expected.as_slice());
        prop_assert!(!chapter.refers_to(&id(victim)));
    }
}
