//! Clock selection for timed trials.
//!
//! The monotonic source (`std::time::Instant`) is preferred; the wall-clock
//! source exists as an explicit degraded mode. Whichever source is in effect,
//! its measured resolution is carried on the `Timer` so callers can surface
//! it — sub-microsecond readings are meaningless on a coarse clock, and that
//! must never be silent.

use std::hint::black_box;
use std::time::{Duration, Instant, SystemTime};

use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ClockSource {
    /// `Instant`: monotonic, highest resolution the platform offers.
    #[default]
    Monotonic,
    /// `SystemTime`: subject to adjustment; readings that go backwards
    /// clamp to zero.
    Wall,
}

impl ClockSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockSource::Monotonic => "monotonic",
            ClockSource::Wall => "wall",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Timer {
    source: ClockSource,
    resolution: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::with_source(ClockSource::Monotonic)
    }

    pub fn with_source(source: ClockSource) -> Self {
        Self {
            source,
            resolution: probe_resolution(source),
        }
    }

    pub fn source(&self) -> ClockSource {
        self.source
    }

    /// Smallest non-zero delta observed between back-to-back readings.
    pub fn resolution(&self) -> Duration {
        self.resolution
    }

    /// Read clock, invoke `f`, read clock; return the elapsed duration.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> Duration {
        match self.source {
            ClockSource::Monotonic => {
                let t0 = Instant::now();
                black_box(f());
                t0.elapsed()
            }
            ClockSource::Wall => {
                let t0 = SystemTime::now();
                black_box(f());
                SystemTime::now()
                    .duration_since(t0)
                    .unwrap_or(Duration::ZERO)
            }
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

fn probe_resolution(source: ClockSource) -> Duration {
    // Upper bound in case the clock never visibly advances within the spin
    // budget (a frozen wall clock, say).
    let mut best = Duration::from_millis(1);
    for _ in 0..64 {
        let sample = match source {
            ClockSource::Monotonic => {
                let t0 = Instant::now();
                let mut delta = t0.elapsed();
                let mut spins = 0u32;
                while delta.is_zero() && spins < 1_000_000 {
                    delta = t0.elapsed();
                    spins += 1;
                }
                delta
            }
            ClockSource::Wall => {
                let t0 = SystemTime::now();
                let mut delta = Duration::ZERO;
                let mut spins = 0u32;
                while delta.is_zero() && spins < 1_000_000 {
                    delta = SystemTime::now().duration_since(t0).unwrap_or(Duration::ZERO);
                    spins += 1;
                }
                delta
            }
        };
        if !sample.is_zero() {
            best = best.min(sample);
        }
    }
    best
}
