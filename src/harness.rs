//! Trial loop: repeated timed runs per candidate, minimum-of-trials raw cost.
//!
//! Trials are strictly serial — exactly one candidate's `run` executes at a
//! time, and resolution happens strictly after every trial in the batch has
//! completed, never interleaved with timing.

use std::time::Duration;

use crate::candidate::{Candidate, CandidateSpec};
use crate::timer::Timer;

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Logical repetitions of the operation per timed trial.
    pub num_ops: u64,
    /// Independent trials per candidate; the minimum observed duration wins.
    pub repetitions: u32,
    /// Seed for candidates that build randomized fixture data.
    pub seed: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            num_ops: 100_000,
            repetitions: 10,
            seed: 0,
        }
    }
}

/// Measurement record for one candidate, phase by phase: the raw trial
/// durations, the per-op raw cost (`min(raw_times) / num_ops`, seconds), and
/// the resolved cost once overhead subtraction has run. Keeping the phases in
/// separate fields is deliberate; a single mutable cost field that changes
/// meaning across the pipeline invites order-of-operations bugs.
#[derive(Clone, Debug)]
pub struct Measurement {
    pub spec: CandidateSpec,
    pub num_ops: u64,
    pub raw_times: Vec<Duration>,
    /// Seconds per operation before overhead subtraction.
    pub raw_per_op: f64,
    /// Seconds per operation after overhead subtraction; `None` until the
    /// batch has resolved.
    pub resolved_per_op: Option<f64>,
}

impl Measurement {
    /// Isolated cost once resolved, raw cost until then. Reporting always
    /// happens after a successful resolution pass.
    pub fn final_per_op(&self) -> f64 {
        self.resolved_per_op.unwrap_or(self.raw_per_op)
    }
}

/// Per-operation raw cost: minimum trial duration over `num_ops`. The minimum
/// suppresses scheduling interference; a mean would average it in.
pub fn raw_per_op(raw_times: &[Duration], num_ops: u64) -> f64 {
    let min = raw_times.iter().min().copied().unwrap_or_default();
    min.as_secs_f64() / num_ops.max(1) as f64
}

/// One timed trial: prepare, time the run, clean up.
///
/// Cleanup is guaranteed on all exit paths. A panic escaping `run` is a
/// catalog programming error and propagates, but the fixture is still torn
/// down on the way out.
pub fn trial(timer: &Timer, candidate: &mut dyn Candidate, num_ops: u64) -> Duration {
    candidate.prepare();
    let mut armed = Cleanup { candidate };
    timer.time(|| armed.candidate.run(num_ops))
}

struct Cleanup<'a> {
    candidate: &'a mut dyn Candidate,
}

impl Drop for Cleanup<'_> {
    fn drop(&mut self) {
        self.candidate.cleanup();
    }
}

/// Run every candidate through `repetitions` trials and collect raw
/// measurements. Each repetition sweeps the whole batch before the next
/// begins, so short-lived system noise lands on one trial of many candidates
/// rather than on every trial of one.
pub fn run_trials(
    cfg: &HarnessConfig,
    timer: &Timer,
    candidates: &mut [Box<dyn Candidate>],
) -> Vec<Measurement> {
    let mut raw: Vec<Vec<Duration>> = candidates
        .iter()
        .map(|_| Vec::with_capacity(cfg.repetitions as usize))
        .collect();

    for _ in 0..cfg.repetitions {
        for (times, candidate) in raw.iter_mut().zip(candidates.iter_mut()) {
            times.push(trial(timer, candidate.as_mut(), cfg.num_ops));
        }
    }

    candidates
        .iter()
        .zip(raw)
        .map(|(candidate, raw_times)| Measurement {
            spec: candidate.spec().clone(),
            num_ops: cfg.num_ops,
            raw_per_op: raw_per_op(&raw_times, cfg.num_ops),
            raw_times,
            resolved_per_op: None,
        })
        .collect()
}
