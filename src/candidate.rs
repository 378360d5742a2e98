//! The unit of measurement: a named, categorized, tagged benchmark with a
//! prepare / timed run / cleanup lifecycle and declared overhead dependencies.

/// A declared contamination from another measurement: `multiplier` times the
/// resolved cost published under `tag` is subtracted from this candidate's
/// raw cost before it is considered final.
#[derive(Debug, Clone, PartialEq)]
pub struct Overhead {
    pub tag: String,
    pub multiplier: f64,
}

impl Overhead {
    /// An overhead with the default multiplier of 1.0.
    pub fn of(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            multiplier: 1.0,
        }
    }

    pub fn scaled(tag: impl Into<String>, multiplier: f64) -> Self {
        Self {
            tag: tag.into(),
            multiplier,
        }
    }
}

/// Static description of a candidate: what to call it, where to report it,
/// which tags it publishes, and which overheads contaminate it.
///
/// Candidates with no `name` are still measured (they may exist only as
/// overhead sources) but are excluded from reports.
#[derive(Debug, Clone, Default)]
pub struct CandidateSpec {
    pub name: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub overheads: Vec<Overhead>,
}

impl CandidateSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn overhead(mut self, overhead: Overhead) -> Self {
        self.overheads.push(overhead);
        self
    }

    /// Best identifier available for diagnostics: the display name, else the
    /// first published tag.
    pub fn label(&self) -> &str {
        match (&self.name, self.tags.first()) {
            (Some(name), _) => name,
            (None, Some(tag)) => tag,
            (None, None) => "<unnamed>",
        }
    }
}

/// One measurable unit of operation cost.
///
/// `prepare` may allocate fixture state and must leave the instance ready for
/// `run`; `run(num_ops)` is the timed hot path and must be idempotent over the
/// instance's own state (repeat calls must not change its cost profile);
/// `cleanup` releases whatever `prepare` allocated and is invoked
/// unconditionally after timing, including when `run` panics.
pub trait Candidate {
    fn spec(&self) -> &CandidateSpec;

    fn prepare(&mut self) {}

    fn run(&mut self, num_ops: u64);

    fn cleanup(&mut self) {}
}

/// Declarative candidate: a spec, a fixture constructor, and a run body.
///
/// The body is a plain fn pointer so every catalog entry pays the same
/// dispatch cost in the timed loop, which the baseline candidates then
/// calibrate away. Fixture state lives between `prepare` and `cleanup` only.
pub struct Bench<S> {
    spec: CandidateSpec,
    make: Box<dyn Fn() -> S>,
    body: fn(&mut S, u64),
    state: Option<S>,
}

impl<S: 'static> Bench<S> {
    pub fn boxed(
        spec: CandidateSpec,
        make: impl Fn() -> S + 'static,
        body: fn(&mut S, u64),
    ) -> Box<dyn Candidate> {
        Box::new(Self {
            spec,
            make: Box::new(make),
            body,
            state: None,
        })
    }
}

impl Bench<()> {
    /// A candidate with no fixture state.
    pub fn stateless(spec: CandidateSpec, body: fn(&mut (), u64)) -> Box<dyn Candidate> {
        Self::boxed(spec, || (), body)
    }
}

impl<S> Candidate for Bench<S> {
    fn spec(&self) -> &CandidateSpec {
        &self.spec
    }

    fn prepare(&mut self) {
        self.state = Some((self.make)());
    }

    fn run(&mut self, num_ops: u64) {
        // A missing fixture is a catalog programming error, not a runtime
        // condition to recover from.
        let state = self.state.as_mut().expect("prepare() must run before run()");
        (self.body)(state, num_ops);
    }

    fn cleanup(&mut self) {
        self.state = None;
    }
}
