//! Overhead resolution: the fixed-point pass that turns raw per-operation
//! costs into isolated ones.
//!
//! Each candidate declares which tags contaminate it and by what multiplier.
//! Tag membership is discovered lazily from whichever candidates are in the
//! batch, so the resolver re-attempts deferred candidates pass after pass
//! rather than topologically sorting a known graph. A pass that defers every
//! remaining candidate means the batch can never resolve: either a genuine
//! dependency cycle, or a reference to a tag nothing in the batch publishes.
//! Either way the whole resolution aborts — a partially resolved batch is a
//! wrong answer, not a partial one.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::harness::Measurement;

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    /// The remaining candidates each wait on a tag only another remaining
    /// candidate can publish.
    #[error("mutually dependent overheads among candidates: {}", candidates.join(", "))]
    MutuallyDependent { candidates: Vec<String> },

    /// At least one declared overhead tag is published by no candidate in
    /// the batch at all.
    #[error("overhead tag(s) published by no candidate: {}", tags.join(", "))]
    UnknownTag { tags: Vec<String> },
}

/// Resolved cost per tag, scoped to a single resolution run and discarded
/// afterwards. A tag's entry is written when a publisher finalizes; when
/// several candidates publish the same tag, the entry is overwritten in
/// resolution order, which is registration order within each pass. Consumers
/// observe whichever value is current at the moment of their own resolution.
#[derive(Debug, Default)]
pub struct OverheadTable {
    costs: BTreeMap<String, f64>,
}

impl OverheadTable {
    pub fn get(&self, tag: &str) -> Option<f64> {
        self.costs.get(tag).copied()
    }

    pub fn publish(&mut self, tag: &str, cost_per_op: f64) {
        self.costs.insert(tag.to_string(), cost_per_op);
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// Resolve every measurement's isolated per-operation cost in place.
///
/// On success, every `resolved_per_op` is populated, in the same unit as the
/// raw measurement. On failure nothing is written back: unrelated candidates
/// keep their raw state untouched and no partial results escape.
pub fn resolve(measurements: &mut [Measurement]) -> Result<(), ResolveError> {
    let mut resolved: Vec<Option<f64>> = vec![None; measurements.len()];
    let mut table = OverheadTable::default();
    let mut worklist: Vec<usize> = (0..measurements.len()).collect();

    while !worklist.is_empty() {
        let mut remaining = Vec::new();

        for &idx in &worklist {
            let m = &measurements[idx];
            let mut cost = m.raw_per_op;
            let mut deferred = false;
            for overhead in &m.spec.overheads {
                match table.get(&overhead.tag) {
                    Some(published) => cost -= published * overhead.multiplier,
                    None => {
                        deferred = true;
                        break;
                    }
                }
            }
            if deferred {
                remaining.push(idx);
                continue;
            }
            resolved[idx] = Some(cost);
            for tag in &m.spec.tags {
                table.publish(tag, cost);
            }
        }

        if remaining.len() == worklist.len() {
            return Err(stuck(measurements, &remaining, &table));
        }
        worklist = remaining;
    }

    for (m, cost) in measurements.iter_mut().zip(resolved) {
        m.resolved_per_op = cost;
    }
    Ok(())
}

/// Classify a stuck pass. Tags already in the table are satisfied, so a
/// missing tag can only be published by a still-deferred candidate (a cycle)
/// or by nobody (a dangling reference). Dangling references are reported in
/// preference to the cycle diagnosis since they are the more actionable of
/// the two.
fn stuck(measurements: &[Measurement], remaining: &[usize], table: &OverheadTable) -> ResolveError {
    let publishable: BTreeSet<&str> = remaining
        .iter()
        .flat_map(|&idx| measurements[idx].spec.tags.iter())
        .map(String::as_str)
        .collect();

    let missing: BTreeSet<&str> = remaining
        .iter()
        .flat_map(|&idx| measurements[idx].spec.overheads.iter())
        .filter(|overhead| table.get(&overhead.tag).is_none())
        .map(|overhead| overhead.tag.as_str())
        .collect();

    let unknown: Vec<String> = missing
        .iter()
        .filter(|tag| !publishable.contains(*tag))
        .map(|tag| tag.to_string())
        .collect();

    if !unknown.is_empty() {
        ResolveError::UnknownTag { tags: unknown }
    } else {
        ResolveError::MutuallyDependent {
            candidates: remaining
                .iter()
                .map(|&idx| measurements[idx].spec.label().to_string())
                .collect(),
        }
    }
}
