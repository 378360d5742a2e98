use serde::{Deserialize, Serialize};

use crate::harness::Measurement;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub unit: String,
    pub num_ops: u64,
    pub repetitions: u32,
    pub seed: u64,
    /// Clock in effect and its measured resolution. Nanosecond-scale numbers
    /// from a coarse clock are meaningless; consumers can check here.
    pub clock_source: String,
    pub clock_resolution_ns: u128,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCost {
    pub name: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub raw_per_op_ns: f64,
    pub resolved_per_op_ns: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpcostReport {
    pub run: RunMeta,
    pub results: Vec<ResolvedCost>,
}

impl OpcostReport {
    /// Build the machine-readable report from a resolved batch. Unnamed
    /// candidates are overhead sources and are omitted, as in the text
    /// report.
    pub fn from_measurements(run: RunMeta, measurements: &[Measurement]) -> Self {
        let results = measurements
            .iter()
            .filter_map(|m| {
                let name = m.spec.name.clone()?;
                Some(ResolvedCost {
                    name,
                    categories: m.spec.categories.clone(),
                    tags: m.spec.tags.clone(),
                    raw_per_op_ns: m.raw_per_op * 1e9,
                    resolved_per_op_ns: m.final_per_op() * 1e9,
                })
            })
            .collect();
        Self { run, results }
    }
}
