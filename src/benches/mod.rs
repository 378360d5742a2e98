//! The operation catalog: one candidate per low-level operation under study.
//!
//! Every module contributes candidates to the explicit registry below; there
//! is no discovery mechanism beyond this list. Baseline loop candidates come
//! first so the common overhead tags resolve in the first pass.


use std::collections::BTreeSet;

use crate::candidate::Candidate;

/// Expand an expression 32 times, for loop bodies that measure an operation
/// without per-operation loop control. Candidates using this stride their
/// outer loop by 32 and declare the `unrolled32` overhead.
macro_rules! repeat32 {
    ($body:expr) => {{
        $body; $body; $body; $body; $body; $body; $body; $body;
        $body; $body; $body; $body; $body; $body; $body; $body;
        $body; $body; $body; $body; $body; $body; $body; $body;
        $body; $body; $body; $body; $body; $body; $body; $body;
    }};
}
pub(crate) use repeat32;

/// The full catalog, baselines first. `seed` feeds candidates that build
/// randomized fixtures; `num_ops` feeds those whose fixture size must match
/// the trial length.
pub fn registry(seed: u64, num_ops: u64) -> Vec<Box<dyn Candidate>> {
    let mut out = loops::candidates();
    out.extend(basic::candidates());
    out.extend(vars::candidates());
    out.extend(calls::candidates());
    out.extend(creation::candidates());
    out.extend(maps::candidates(seed, num_ops));
    out.extend(iteration::candidates(num_ops));
    out.extend(zips::candidates());
    out.extend(errors::candidates());
    out.extend(dynamics::candidates());
    out
}

/// Report section order and headers for the default catalog.
pub fn default_categories() -> Vec<(&'static str, &'static str)> {
    vec![
        ("basic", "Basic Operations"),
        ("function", "Call Overhead"),
        ("object_creation", "Object Creation"),
        ("error", "Error Handling"),
        ("iteration", "Iteration (time per item)"),
        ("map", "HashMap Operations"),
        ("zip", "Zip Iteration"),
        ("dynamic", "Dynamic Typing Probes"),
    ]
}

/// Restrict the catalog to candidates in the given categories, keeping every
/// transitive overhead publisher so the restricted batch still resolves. An
/// empty filter keeps everything. Registration order is preserved.
pub fn select(all: Vec<Box<dyn Candidate>>, categories: &[String]) -> Vec<Box<dyn Candidate>> {
    if categories.is_empty() {
        return all;
    }

    let mut keep: Vec<bool> = all
        .iter()
        .map(|c| {
            c.spec()
                .categories
                .iter()
                .any(|category| categories.contains(category))
        })
        .collect();

    loop {
        let needed: BTreeSet<&str> = all
            .iter()
            .zip(&keep)
            .filter(|(_, kept)| **kept)
            .flat_map(|(c, _)| c.spec().overheads.iter())
            .map(|overhead| overhead.tag.as_str())
            .collect();

        let mut changed = false;
        for (i, c) in all.iter().enumerate() {
            if !keep[i] && c.spec().tags.iter().any(|tag| needed.contains(tag.as_str())) {
                keep[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    all.into_iter()
        .zip(keep)
        .filter_map(|(c, kept)| kept.then_some(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Measurement;
    use crate::resolve::resolve;

    fn fake_measurements(candidates: &[Box<dyn Candidate>]) -> Vec<Measurement> {
        candidates
            .iter()
            .map(|c| Measurement {
                spec: c.spec().clone(),
                num_ops: 32,
                raw_times: vec![],
                raw_per_op: 1.0,
                resolved_per_op: None,
            })
            .collect()
    }

    #[test]
    fn test_every_declared_overhead_tag_is_published() {
        let candidates = registry(0, 3200);
        let published: BTreeSet<String> = candidates
            .iter()
            .flat_map(|c| c.spec().tags.iter().cloned())
            .collect();
        for c in &candidates {
            for overhead in &c.spec().overheads {
                assert!(
                    published.contains(&overhead.tag),
                    "tag {:?} declared by {:?} has no publisher",
                    overhead.tag,
                    c.spec().label()
                );
            }
        }
    }

    #[test]
    fn test_catalog_overhead_graph_resolves() {
        let candidates = registry(0, 3200);
        let mut ms = fake_measurements(&candidates);
        resolve(&mut ms).expect("catalog graph must be acyclic and complete");
        assert!(ms.iter().all(|m| m.resolved_per_op.is_some()));
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let candidates = registry(0, 3200);
        let mut names = BTreeSet::new();
        for c in &candidates {
            if let Some(name) = &c.spec().name {
                assert!(names.insert(name.clone()), "duplicate name {name:?}");
            }
        }
    }

    #[test]
    fn test_every_catalog_category_has_a_description() {
        let described: BTreeSet<&str> =
            default_categories().iter().map(|(tag, _)| *tag).collect();
        for c in registry(0, 3200) {
            for category in &c.spec().categories {
                assert!(
                    described.contains(category.as_str()),
                    "category {category:?} missing from default_categories"
                );
            }
        }
    }

    #[test]
    fn test_select_keeps_transitive_publishers() {
        let selected = select(registry(0, 3200), &["map".to_string()]);
        assert!(!selected.is_empty());
        // The restricted batch must still resolve on its own.
        let mut ms = fake_measurements(&selected);
        resolve(&mut ms).expect("filtered batch must keep its overhead sources");
        // Nothing outside "map" other than overhead sources survives.
        for c in &selected {
            let in_map = c.spec().categories.iter().any(|cat| cat == "map");
            if !in_map {
                assert!(!c.spec().tags.is_empty(), "{:?} kept without reason", c.spec().label());
            }
        }
    }

    #[test]
    fn test_select_empty_filter_keeps_all() {
        let total = registry(0, 3200).len();
        assert_eq!(select(registry(0, 3200), &[]).len(), total);
    }

    #[test]
    fn test_trial_smoke_run_of_whole_catalog() {
        use crate::harness::{run_trials, HarnessConfig};
        use crate::timer::Timer;

        let cfg = HarnessConfig {
            num_ops: 3_200,
            repetitions: 1,
            seed: 7,
        };
        let timer = Timer::new();
        let mut candidates = registry(cfg.seed, cfg.num_ops);
        let mut ms = run_trials(&cfg, &timer, &mut candidates);
        resolve(&mut ms).unwrap();
        assert_eq!(ms.len(), candidates.len());
    }
}
