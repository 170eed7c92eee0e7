//! Buffer configuration.
//!
//! Every [`Rope`](crate::Rope) and [`Buffer`](crate::Buffer) receives its tuning explicitly through a
//! [`BufferConfig`]; there is no process-wide state. Hosts that want environment-driven tuning can
//! use [`BufferConfig::from_env`].

use std::env;

use thiserror::Error;

/// Default merge threshold, in codepoints.
pub const DEFAULT_MERGE_THRESHOLD: usize = 2 * 1024;

/// Smallest merge threshold accepted by [`BufferConfig::validate`].
pub const MIN_MERGE_THRESHOLD: usize = 2;

/// Characters (besides whitespace) that terminate a word.
pub const DEFAULT_WORD_SEPARATORS: &str = "./\\()\"'-:,.;<>~!@#$%^&*|+=[]{}`~?";

/// Environment variable overriding [`BufferConfig::merge_threshold`].
pub const MERGE_THRESHOLD_ENV: &str = "EDIT_ENGINE_MERGE_THRESHOLD";

/// Environment variable overriding [`BufferConfig::word_separators`].
pub const WORD_SEPARATORS_ENV: &str = "EDIT_ENGINE_WORD_SEPARATORS";

/// Errors produced while building a [`BufferConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("merge threshold must be at least 2, got {0}")]
    /// The merge threshold is too small to make progress when splitting leaves.
    MergeThresholdTooSmall(usize),

    #[error("invalid value for {name}: '{value}'")]
    /// An environment variable could not be parsed.
    InvalidEnvValue {
        /// Variable name.
        name: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}

/// Tuning knobs for a rope-backed buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferConfig {
    /// Codepoint count below which adjacent rope leaves are fused into one node.
    pub merge_threshold: usize,
    /// Characters treated as word boundaries by [`Buffer::word`](crate::Buffer::word).
    pub word_separators: String,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            word_separators: DEFAULT_WORD_SEPARATORS.to_string(),
        }
    }
}

impl BufferConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the merge threshold.
    pub fn with_merge_threshold(mut self, merge_threshold: usize) -> Self {
        self.merge_threshold = merge_threshold;
        self
    }

    /// Override the word separator set.
    pub fn with_word_separators(mut self, separators: impl Into<String>) -> Self {
        self.word_separators = separators.into();
        self
    }

    /// Check that the config can drive a rope.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merge_threshold < MIN_MERGE_THRESHOLD {
            return Err(ConfigError::MergeThresholdTooSmall(self.merge_threshold));
        }
        Ok(())
    }

    /// Load configuration from environment variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(MERGE_THRESHOLD_ENV) {
            config.merge_threshold = raw.trim().parse().map_err(|_| ConfigError::InvalidEnvValue {
                name: MERGE_THRESHOLD_ENV,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(WORD_SEPARATORS_ENV) {
            config.word_separators = raw;
        }

        config.validate()?;
        tracing::debug!(
            merge_threshold = config.merge_threshold,
            "loaded buffer config from environment"
        );
        Ok(config)
    }
}
