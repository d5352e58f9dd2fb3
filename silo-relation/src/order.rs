use crate::error::Error;
use crate::relation::RelationDescription;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

const CATALOG_PREFIX: &str = "pg_catalog";

struct Sortable {
    dependencies: BTreeSet<String>,
    tie_breaker: usize,
}

/// Produce a stable topological order over `relations`, returning the indices of `relations`
/// in execution order (dependencies before dependents).
///
/// Requires every relation's design to already be loaded (via [`RelationDescription::table_design`])
/// — this function reads `dependencies()` synchronously and does no I/O itself. The caller is
/// expected to have preloaded designs through a bounded-concurrency pool first.
pub fn order_by_dependencies(relations: &[&RelationDescription]) -> Result<Vec<usize>, Error> {
    let n = relations.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let known_tables: HashSet<String> = relations.iter().map(|r| r.identifier()).collect();
    let id_to_idx: HashMap<String, usize> = relations
        .iter()
        .enumerate()
        .map(|(i, r)| (r.identifier(), i))
        .collect();

    let mut sortables: Vec<Sortable> = Vec::with_capacity(n);
    let mut catalog_dependent = vec![false; n];
    let mut unknown_by_relation: Vec<Vec<String>> = vec![Vec::new(); n];

    for (i, relation) in relations.iter().enumerate() {
        let mut resolved = BTreeSet::new();
        for dep in relation.dependencies() {
            if dep.starts_with(CATALOG_PREFIX) {
                catalog_dependent[i] = true;
            } else if !known_tables.contains(&dep) {
                unknown_by_relation[i].push(dep);
            } else {
                resolved.insert(dep);
            }
        }
        sortables.push(Sortable {
            dependencies: resolved,
            tie_breaker: i,
        });
    }

    let all_unknown: BTreeSet<&String> = unknown_by_relation.iter().flatten().collect();
    if !all_unknown.is_empty() {
        let relations_with_unknowns: Vec<String> = relations
            .iter()
            .enumerate()
            .filter(|(i, _)| !unknown_by_relation[*i].is_empty())
            .map(|(_, r)| r.identifier())
            .collect();
        log::warn!(
            "relations with unknown dependencies: {}; unknown identifiers: {}",
            relations_with_unknowns.join(", "),
            all_unknown.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        );
    }

    let no_internal: HashSet<String> = relations
        .iter()
        .enumerate()
        .filter(|(i, _)| !catalog_dependent[*i])
        .map(|(_, r)| r.identifier())
        .collect();

    for (i, sortable) in sortables.iter_mut().enumerate() {
        if catalog_dependent[i] {
            sortable.dependencies.extend(no_internal.iter().cloned());
        }
    }

    let mut orders: Vec<Option<i64>> = vec![None; n];
    let mut latest: i64 = 0;
    let mut heap: BinaryHeap<Reverse<(i64, usize)>> = BinaryHeap::new();
    for i in 0..n {
        heap.push(Reverse((1, i)));
    }

    while let Some(Reverse((min_priority, tie_breaker))) = heap.pop() {
        let i = tie_breaker;
        if orders[i].is_some() {
            continue;
        }
        if min_priority > 2 * n as i64 {
            return Err(Error::CyclicDependency(n));
        }

        let dep_indices: Vec<usize> = sortables[i]
            .dependencies
            .iter()
            .filter_map(|id| id_to_idx.get(id).copied())
            .collect();

        if dep_indices.is_empty() {
            let order = latest + 1;
            latest = order;
            orders[i] = Some(order);
            continue;
        }

        let current: Vec<Option<i64>> = dep_indices.iter().map(|&d| orders[d]).collect();
        if current.iter().all(Option::is_some) {
            let max_others = current.into_iter().flatten().max().unwrap();
            let order = max_others.max(latest) + 1;
            latest = order;
            orders[i] = Some(order);
        } else if current.iter().any(Option::is_some) {
            let max_assigned = current.into_iter().flatten().max().unwrap();
            let priority = max_assigned.max(latest).max(min_priority) + 1;
            heap.push(Reverse((priority, tie_breaker)));
        } else {
            let priority = latest.max(min_priority) + 1;
            heap.push(Reverse((priority, tie_breaker)));
        }
    }

    let mut result: Vec<usize> = (0..n).collect();
    result.sort_by_key(|&i| orders[i].expect("every relation receives an order or the loop fails first"));
    Ok(result)
}
