//! Synthesizer configuration.
//!
//! # Environment
//!
//! [`SynthesizerConfig::from_env`] reads:
//!
//! - `KEEL_CACHE_SCOPE`: `positional` or `minimal`
//! - `KEEL_DISABLE_DELEGATE_CACHE`: `1`/`true` turns caching off (the
//!   behaviour of language versions before method-group caching)

use crate::scope::ScopePolicy;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SynthesizerConfig {
    /// When `false`, every site lowers to a fresh construction.
    pub enabled: bool,
    pub scope_policy: ScopePolicy,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scope_policy: ScopePolicy::Positional,
        }
    }
}

impl SynthesizerConfig {
    /// Defaults overridden by `KEEL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`. Unparseable values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup("KEEL_CACHE_SCOPE") {
            match ScopePolicy::parse(&raw) {
                Some(policy) => config.scope_policy = policy,
                None => tracing::warn!(value = %raw, "ignoring unknown KEEL_CACHE_SCOPE"),
            }
        }
        if let Some(raw) = lookup("KEEL_DISABLE_DELEGATE_CACHE") {
            match parse_flag(&raw) {
                Some(disabled) => config.enabled = !disabled,
                None => tracing::warn!(value = %raw, "ignoring KEEL_DISABLE_DELEGATE_CACHE"),
            }
        }
        config
    }

    /// Caching switched off entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scope_policy(mut self, policy: ScopePolicy) -> Self {
        self.scope_policy = policy;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
