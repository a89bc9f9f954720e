//! Sequence construction options.
//!
//! [`SequenceOptions`] is the serializable form of the options accepted by
//! [`make_sequence`](crate::make_sequence):
//!
//! | option | effect |
//! |--------|--------|
//! | `finite = n` | declares an exact finite length `n` |
//! | `memo = true` | grow-only cache, default batch size |
//! | `memo = n` | grow-only cache, batch size `n` |
//! | `cache = n` | sliding-window cache of `n` elements |
//!
//! `memo` and `cache` are mutually exclusive.
//!
//! # Example
//!
//! ```ignore
//! use sequence_engine::SequenceOptions;
//!
//! let options = SequenceOptions::new().with_cache(32);
//! options.save_toml("primes.toml")?;
//!
//! let loaded = SequenceOptions::load_toml("primes.toml")?;
//! assert_eq!(loaded, options);
//! ```

use crate::cache::{CachePolicy, DEFAULT_MEMO_BATCH};
use crate::error::{Result, SequenceError};
use std::fs;
use std::path::Path;

/// Options for building a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequenceOptions {
    /// Declared exact length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finite: Option<usize>,

    /// Grow-only cache: `true` or a batch size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<MemoOption>,

    /// Sliding-window cache size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<usize>,
}

/// Value of the `memo` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MemoOption {
    /// `memo = true` / `memo = false`
    Enabled(bool),

    /// `memo = n`
    BatchSize(usize),
}

impl MemoOption {
    fn batch(self) -> Option<usize> {
        match self {
            Self::Enabled(true) => Some(DEFAULT_MEMO_BATCH),
            Self::Enabled(false) => None,
            Self::BatchSize(n) => Some(n),
        }
    }
}

impl SequenceOptions {
    /// No length declaration, no cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an exact finite length.
    pub fn with_finite(mut self, n: usize) -> Self {
        self.finite = Some(n);
        self
    }

    /// Enable or disable the grow-only cache with the default batch size.
    pub fn with_memo(mut self, enabled: bool) -> Self {
        self.memo = Some(MemoOption::Enabled(enabled));
        self
    }

    /// Enable the grow-only cache with an explicit batch size.
    pub fn with_memo_batch(mut self, batch: usize) -> Self {
        self.memo = Some(MemoOption::BatchSize(batch));
        self
    }

    /// Enable a sliding-window cache of `size` elements.
    pub fn with_cache(mut self, size: usize) -> Self {
        self.cache = Some(size);
        self
    }

    /// Validate the options.
    ///
    /// Fails with `InvalidCacheConfig` when `memo` and `cache` are both
    /// enabled, or when a batch or window size is zero.
    pub fn validate(&self) -> Result<()> {
        let memo = self.memo.map(MemoOption::batch);

        if let (Some(Some(_)), Some(_)) = (memo, self.cache) {
            return Err(SequenceError::InvalidCacheConfig(
                "memo and cache are mutually exclusive".to_string(),
            ));
        }

        if memo == Some(Some(0)) {
            return Err(SequenceError::InvalidCacheConfig(
                "memo batch size must be > 0".to_string(),
            ));
        }

        if self.cache == Some(0) {
            return Err(SequenceError::InvalidCacheConfig(
                "cache size must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the cache policy these options select.
    pub fn cache_policy(&self) -> Result<CachePolicy> {
        self.validate()?;

        if let Some(batch) = self.memo.and_then(MemoOption::batch) {
            return Ok(CachePolicy::Memo { batch });
        }
        if let Some(size) = self.cache {
            return Ok(CachePolicy::SlidingWindow { size });
        }
        Ok(CachePolicy::None)
    }

    /// Save options to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load and validate options from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let options: SequenceOptions = toml::from_str(&contents)?;
        options.validate()?;
        Ok(options)
    }

    /// Save options to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load and validate options from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let options: SequenceOptions = serde_json::from_str(&contents)?;
        options.validate()?;
        Ok(options)
    }
}
