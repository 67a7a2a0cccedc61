//! Session configuration.

use keel_delegate::SynthesizerConfig;
use keel_switch::PlannerConfig;

/// Configuration for one lowering session.
#[derive(Clone, Debug)]
pub struct LoweringConfig {
    pub planner: PlannerConfig,
    pub synthesizer: SynthesizerConfig,
    /// Plan switches on the rayon pool. Off, they are planned in order on
    /// the calling thread.
    pub parallel: bool,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            synthesizer: SynthesizerConfig::default(),
            parallel: true,
        }
    }
}

impl LoweringConfig {
    /// Defaults overridden by `KEEL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let sequential = lookup("KEEL_SEQUENTIAL").is_some_and(|raw| {
            !matches!(raw.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off")
        });
        Self {
            planner: PlannerConfig::from_lookup(&lookup),
            synthesizer: SynthesizerConfig::from_lookup(&lookup),
            parallel: !sequential,
        }
    }

    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
