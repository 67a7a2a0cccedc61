//! Planner configuration.
//!
//! Every threshold here changes only the shape of a plan, never which target
//! a value reaches. The defaults follow the cut-offs the managed-runtime
//! compilers have settled on; tune them per back end.
//!
//! # Environment
//!
//! [`PlannerConfig::from_env`] reads:
//!
//! - `KEEL_STRING_SWITCH`: `hash`, `length` or `linear`
//! - `KEEL_STRING_HASH_THRESHOLD`: minimum case count for non-linear string dispatch

use bitflags::bitflags;

bitflags! {
    /// Runtime primitives the target offers for string dispatch.
    ///
    /// Missing capabilities degrade string switches to a linear chain of
    /// equality tests; they never make planning fail.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TargetCaps: u8 {
        /// `string.Length` without a null check of its own.
        const STRING_LENGTH = 1 << 0;
        /// Indexed UTF-16 code unit access (`s[i]`).
        const STRING_CHARS = 1 << 1;
    }
}

impl Default for TargetCaps {
    fn default() -> Self {
        TargetCaps::all()
    }
}

/// How string switches above the hash threshold are dispatched.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StringStrategy {
    /// FNV-1a hash, then an equality guard per candidate.
    #[default]
    Hash,
    /// Length, then one discriminating character, then an equality guard.
    LengthThenChar,
    /// Always a chain of equality tests.
    Linear,
}

impl StringStrategy {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hash" => Some(StringStrategy::Hash),
            "length" | "length-then-char" => Some(StringStrategy::LengthThenChar),
            "linear" => Some(StringStrategy::Linear),
            _ => None,
        }
    }
}

/// Tunable planner thresholds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlannerConfig {
    /// A bucket stays a bucket while `span <= density_factor * labels`.
    pub density_factor: u32,
    /// Buckets with fewer labels become equality tests.
    pub min_table_labels: usize,
    /// Up to this many buckets are chained; more get a binary search.
    pub linear_bucket_limit: usize,
    /// Widest jump table, in entries.
    pub max_table_span: u64,
    /// Search-tree leaves with at most this many points become equality chains.
    pub max_equality_chain: usize,
    /// String switches with fewer cases stay linear.
    pub string_hash_threshold: usize,
    pub string_strategy: StringStrategy,
    pub caps: TargetCaps,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            density_factor: 2,
            min_table_labels: 3,
            linear_bucket_limit: 3,
            max_table_span: u64::from(u32::MAX),
            max_equality_chain: 3,
            string_hash_threshold: 7,
            string_strategy: StringStrategy::Hash,
            caps: TargetCaps::all(),
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by `KEEL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`. Unparseable values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup("KEEL_STRING_SWITCH") {
            match StringStrategy::parse(&raw) {
                Some(strategy) => config.string_strategy = strategy,
                None => tracing::warn!(value = %raw, "ignoring unknown KEEL_STRING_SWITCH"),
            }
        }
        if let Some(raw) = lookup("KEEL_STRING_HASH_THRESHOLD") {
            match raw.trim().parse::<usize>() {
                Ok(threshold) => config.string_hash_threshold = threshold,
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring KEEL_STRING_HASH_THRESHOLD");
                }
            }
        }
        config
    }

    #[must_use]
    pub fn with_string_strategy(mut self, strategy: StringStrategy) -> Self {
        self.string_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_caps(mut self, caps: TargetCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Whether the target can run hash or length dispatch at all.
    pub fn supports_string_dispatch(&self) -> bool {
        self.caps
            .contains(TargetCaps::STRING_LENGTH | TargetCaps::STRING_CHARS)
    }
}
