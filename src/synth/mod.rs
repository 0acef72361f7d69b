//! Output synthesizer for simulated tool runs
//!
//! NEXUS never executes a real security tool. Instead it renders a plausible
//! transcript from a per-tool template, filled with the caller's parameters,
//! random figures and the current wall-clock time. Tools without a template
//! (catalogued or not) get a generic transcript echoing their parameters.
//!
//! Randomness and time are injected so the same seed and clock produce the
//! same output.

mod templates;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};

use crate::storage::{ExecutionStatus, ToolParameters};

/// Source of the wall-clock time printed in transcripts
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the host's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A rendered transcript
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedOutput {
    /// Always [`ExecutionStatus::Success`]; synthesis has no failure path
    pub status: ExecutionStatus,
    /// Transcript text
    pub output: String,
    /// Synthetic duration in seconds, drawn from `[0.5, 2.0)`
    pub elapsed_seconds: f64,
}

/// Read-only view over a parameter map with template-friendly accessors
pub(crate) struct Params<'a>(pub(crate) &'a ToolParameters);

impl Params<'_> {
    /// Text for `key`, or `default` when the key is missing, null or an
    /// empty string. Strings render bare; other values render as JSON.
    pub(crate) fn text(&self, key: &str, default: &str) -> String {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => default.to_string(),
            Some(serde_json::Value::String(s)) if s.is_empty() => default.to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub(crate) fn pretty_json(&self) -> String {
        serde_json::to_string_pretty(self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Renders a transcript for `tool_name` using the given clock and RNG
///
/// This is a pure function of its inputs; [`OutputSynthesizer`] wraps it
/// with shared state.
pub fn synthesize_with<R: Rng + ?Sized>(
    tool_name: &str,
    parameters: &ToolParameters,
    clock: &dyn Clock,
    rng: &mut R,
) -> SynthesizedOutput {
    let params = Params(parameters);
    let output = match tool_name {
        "nmap" => templates::nmap(&params, rng),
        "nikto" => templates::nikto(&params, rng, clock.now()),
        "sqlmap" => templates::sqlmap(&params, clock.now()),
        "hydra" => templates::hydra(&params, rng),
        "dirb" => templates::dirb(&params, clock.now()),
        "john" => templates::john(rng),
        "netcat" => templates::netcat(&params),
        "whois" => templates::whois(&params),
        "theHarvester" => templates::the_harvester(&params, rng),
        other => templates::generic(other, &params),
    };

    SynthesizedOutput {
        status: ExecutionStatus::Success,
        output,
        elapsed_seconds: rng.random_range(0.5..2.0),
    }
}

/// Names of tools with a dedicated template
pub const TEMPLATED_TOOLS: [&str; 9] = [
    "nmap",
    "nikto",
    "sqlmap",
    "hydra",
    "dirb",
    "john",
    "netcat",
    "whois",
    "theHarvester",
];

/// Shared synthesizer holding a clock and a seeded RNG
///
/// # Examples
///
/// ```
/// use nexus::synth::OutputSynthesizer;
///
/// let synth = OutputSynthesizer::new();
/// let mut params = serde_json::Map::new();
/// params.insert("target".into(), "10.0.0.5".into());
/// let result = synth.synthesize("nmap", &params);
/// assert!(result.output.contains("10.0.0.5"));
/// ```
pub struct OutputSynthesizer {
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl OutputSynthesizer {
    /// Creates a synthesizer using the system clock and OS entropy
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a reproducible synthesizer
    pub fn deterministic(clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self {
            clock,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Renders a transcript for `tool_name`
    pub fn synthesize(&self, tool_name: &str, parameters: &ToolParameters) -> SynthesizedOutput {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        synthesize_with(tool_name, parameters, self.clock.as_ref(), &mut *rng)
    }
}

impl Default for OutputSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OutputSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSynthesizer").finish_non_exhaustive()
    }
}
