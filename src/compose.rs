//! Declarative child composition.
//!
//! Containers receive their children as an ordered list of (name, block)
//! pairs. `compose` builds that list the way a class-body declaration
//! would: generations of declared children merge oldest ancestor first, a
//! name declared again (even as a shadow placeholder) removes the
//! inherited entry of that name, and each generation is internally ordered
//! by creation sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::block::BlockDef;

static CREATION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Next definition-time sequence number.
///
/// Ticked once per constructed definition, never during value processing.
pub(crate) fn next_sequence() -> u64 {
    CREATION_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// One declared entry in a generation: a named child, or a shadow
/// placeholder that removes an inherited child of the same name.
#[derive(Debug)]
pub struct ChildDecl {
    name: String,
    block: Option<BlockDef>,
}

pub fn child(name: impl Into<String>, block: BlockDef) -> ChildDecl {
    ChildDecl {
        name: name.into(),
        block: Some(block),
    }
}

pub fn shadow(name: impl Into<String>) -> ChildDecl {
    ChildDecl {
        name: name.into(),
        block: None,
    }
}

/// Merge declared generations, oldest ancestor first, into the final
/// ordered child list.
///
/// The result feeds a container constructor, which binds the names. Order
/// is significant and preserved: inherited entries first, then the
/// generation's own declarations sorted by creation sequence.
pub fn compose(generations: Vec<Vec<ChildDecl>>) -> Vec<(String, BlockDef)> {
    let mut resolved: Vec<(String, BlockDef)> = Vec::new();
    for generation in generations {
        // Every name declared in this generation shadows the inherited
        // entry, whether or not it supplies a replacement block.
        for decl in &generation {
            resolved.retain(|(name, _)| name != &decl.name);
        }
        let mut declared: Vec<(String, BlockDef)> = generation
            .into_iter()
            .filter_map(|decl| decl.block.map(|block| (decl.name, block)))
            .collect();
        declared.sort_by_key(|(_, block)| block.sequence());
        resolved.extend(declared);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{CharBlock, TextBlock};

    #[test]
    fn sequence_is_monotonic() {
        let a = next_sequence();
        let b = next_sequence();
        assert!(b > a);
    }

    #[test]
    fn single_generation_orders_by_creation_sequence() {
        // declared out of order relative to construction
        let first = BlockDef::new(CharBlock::default());
        let second = BlockDef::new(TextBlock::default());
        let resolved = compose(vec![vec![child("body", second), child("title", first)]]);
        let names: Vec<_> = resolved.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["title", "body"]);
    }

    #[test]
    fn shadowing_removes_inherited_entries() {
        let base = vec![
            child("a", BlockDef::new(CharBlock::default())),
            child("b", BlockDef::new(CharBlock::default())),
        ];
        let derived = vec![child("c", BlockDef::new(TextBlock::default())), shadow("a")];
        let resolved = compose(vec![base, derived]);
        let names: Vec<_> = resolved.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn redeclaring_with_a_block_moves_it_to_the_newer_generation() {
        let base = vec![
            child("a", BlockDef::new(CharBlock::default())),
            child("b", BlockDef::new(CharBlock::default())),
        ];
        let derived = vec![child("a", BlockDef::new(TextBlock::default()))];
        let resolved = compose(vec![base, derived]);
        let names: Vec<_> = resolved.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
