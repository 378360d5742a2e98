use clap::ValueEnum;

pub mod benches;
pub mod candidate;
pub mod harness;
pub mod report;
pub mod resolve;
pub mod schema;
pub mod timer;

/// Time unit for reported magnitudes. Each maps to an exact power-of-ten
/// multiplier applied uniformly to every resolved cost at format time.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum Unit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
    /// Microseconds.
    Us,
    /// Nanoseconds.
    #[default]
    Ns,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::S => "s",
            Unit::Ms => "ms",
            Unit::Us => "us",
            Unit::Ns => "ns",
        }
    }

    /// Multiplier from seconds to this unit.
    pub fn multiplier(&self) -> f64 {
        match self {
            Unit::S => 1e0,
            Unit::Ms => 1e3,
            Unit::Us => 1e6,
            Unit::Ns => 1e9,
        }
    }
}
