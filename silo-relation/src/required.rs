use crate::relation::RelationDescription;
use silo_common::TableName;
use std::collections::{BTreeSet, HashSet};

/// The set of relation identifiers selected as "required" by [`select_required`].
///
/// Kept separate from `RelationDescription` itself — the driver applies it in one pass over the
/// relations rather than having the selector reach across the module boundary to mutate them.
#[derive(Clone, Debug, Default)]
pub struct RequiredSet {
    identifiers: HashSet<String>,
}

impl RequiredSet {
    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// Apply the selection to the relations it was computed from, one pass, each relation's
    /// `is_required` set exactly once.
    pub fn apply(&self, relations: &[&RelationDescription]) {
        for relation in relations {
            relation.set_is_required(self.identifiers.contains(&relation.identifier()));
        }
    }
}

/// Seed with every relation whose target table matches `selector`, then walk `ordered` (as
/// produced by [`crate::order::order_by_dependencies`]) from the most-dependent relation back to
/// the least, adding any relation that a currently-required relation depends on. This grows the
/// required set to the full transitive closure of ancestors-under-depends-on of the seed.
pub fn select_required(
    relations: &[&RelationDescription],
    ordered: &[usize],
    selector: impl Fn(&TableName) -> bool,
) -> RequiredSet {
    let dependencies: Vec<BTreeSet<String>> = relations.iter().map(|r| r.dependencies()).collect();

    let mut required: HashSet<usize> = relations
        .iter()
        .enumerate()
        .filter(|(_, r)| selector(r.target_table_name()))
        .map(|(i, _)| i)
        .collect();

    for &idx in ordered.iter().rev() {
        if required.contains(&idx) {
            continue;
        }
        let identifier = relations[idx].identifier();
        let depended_on = required.iter().any(|&req_idx| dependencies[req_idx].contains(&identifier));
        if depended_on {
            required.insert(idx);
        }
    }

    RequiredSet {
        identifiers: required.into_iter().map(|i| relations[i].identifier()).collect(),
    }
}
