//! The splitter interface: turning a byte source into content-addressed
//! blocks.
//!
//! Concrete chunking strategies live in their own crates (currently only
//! `deuce_splitter_uniform`); they all expose the same three operations so
//! the registries and the reconciliation engine never care how block
//! boundaries were chosen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::Block;
use crate::error::ValidationError;

/// Read state of a splitter.
///
/// A splitter starts `Idle` and moves to `Processing` on the first read
/// attempt. While `Processing` the input source is immutable; a caller must
/// explicitly reset before reassigning it. This is a misuse guard against
/// swapping the source mid-stream, not a lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitterState {
    #[default]
    Idle,
    Processing,
}

/// Per-variant splitter options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterOptions {
    /// Target block size in bytes. Must be positive.
    pub chunk_size: u64,
}

/// Configuration blob shared across splitter variants, keyed by variant
/// name. A splitter only reads its own key, so one config can be handed to
/// any splitter and unknown keys are simply ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitterConfig(BTreeMap<String, SplitterOptions>);

impl SplitterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, variant: impl Into<String>, options: SplitterOptions) {
        self.0.insert(variant.into(), options);
    }

    pub fn get(&self, variant: &str) -> Option<&SplitterOptions> {
        self.0.get(variant)
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SplitterError {
    /// The input source cannot be replaced while a read is in progress.
    #[error("cannot replace the input source while processing; reset the splitter first")]
    SourceBusy,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A strategy for partitioning a byte stream into blocks.
///
/// Implementations read sequentially from a single source and are not meant
/// to be shared between callers; run one splitter per source.
pub trait FileSplitter {
    /// Apply the options stored under this splitter's variant name in
    /// `config`. A config with no entry for this variant is a no-op, not an
    /// error; a non-positive `chunk_size` is rejected.
    fn configure(&mut self, config: &SplitterConfig) -> Result<(), SplitterError>;

    /// Read the next block from the source.
    ///
    /// Returns the starting offset the block was read from together with
    /// the block, or `None` at end of stream (not an error).
    fn get_block(&mut self) -> Result<Option<(u64, Block)>, SplitterError>;

    /// Read up to `count` blocks, stopping early the first time end of
    /// stream is reached.
    fn get_blocks(&mut self, count: usize) -> Result<Vec<(u64, Block)>, SplitterError> {
        let mut blocks = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            match self.get_block()? {
                Some(entry) => blocks.push(entry),
                None => break,
            }
        }
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_keyed_by_variant() {
        let mut config = SplitterConfig::new();
        config.set("uniform", SplitterOptions { chunk_size: 512 });

        assert_eq!(config.get("uniform").unwrap().chunk_size, 512);
        assert!(config.get("cdc").is_none());
    }

    #[test]
    fn test_config_serde_shape() {
        let mut config = SplitterConfig::new();
        config.set("uniform", SplitterOptions { chunk_size: 1024 });
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({"uniform": {"chunk_size": 1024}}));
    }
}
