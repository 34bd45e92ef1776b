//! Fixed-size block splitter.
//!
//! Reads a `Read + Seek` source in chunks of a configured size (1 MiB by
//! default) and turns each chunk into a content-addressed
//! [`Block`](deuce_core::Block). The final block of a stream may be shorter
//! than the chunk size; concatenating the blocks in offset order always
//! reproduces the source bytes exactly.

use std::io::{Read, Seek};

use bytes::Bytes;
use deuce_core::splitter::{FileSplitter, SplitterConfig, SplitterError, SplitterState};
use deuce_core::{Block, ProjectId, ValidationError, VaultId};

/// Key this splitter reads from a [`SplitterConfig`].
pub const VARIANT: &str = "uniform";

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Splits a seekable byte source into fixed-size blocks scoped to one
/// `(project, vault)` pair.
///
/// Synchronous and sequential: one source, one reader. The source can only
/// be swapped while the splitter is idle; once a read has happened the
/// splitter is `Processing` until [`reset`](UniformSplitter::reset) is
/// called.
#[derive(Debug)]
pub struct UniformSplitter<R> {
    project_id: ProjectId,
    vault_id: VaultId,
    source: R,
    chunk_size: u64,
    state: SplitterState,
}

impl<R: Read + Seek> UniformSplitter<R> {
    pub fn new(project_id: ProjectId, vault_id: VaultId, source: R) -> Self {
        Self {
            project_id,
            vault_id,
            source,
            chunk_size: DEFAULT_CHUNK_SIZE,
            state: SplitterState::Idle,
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn state(&self) -> SplitterState {
        self.state
    }

    /// Return the splitter to `Idle` so the source may be reassigned.
    pub fn reset(&mut self) {
        self.state = SplitterState::Idle;
    }

    /// Swap in a new input source, returning the old one.
    ///
    /// Fails with [`SplitterError::SourceBusy`] while a read is in
    /// progress; call [`reset`](UniformSplitter::reset) first.
    pub fn replace_source(&mut self, source: R) -> Result<R, SplitterError> {
        if self.state == SplitterState::Processing {
            return Err(SplitterError::SourceBusy);
        }
        Ok(std::mem::replace(&mut self.source, source))
    }

    /// Consume the splitter and hand back its source.
    pub fn into_source(self) -> R {
        self.source
    }
}

impl<R: Read + Seek> FileSplitter for UniformSplitter<R> {
    fn configure(&mut self, config: &SplitterConfig) -> Result<(), SplitterError> {
        let Some(options) = config.get(VARIANT) else {
            // shared config without our key; leave the current settings
            return Ok(());
        };
        if options.chunk_size == 0 {
            return Err(ValidationError::ChunkSize.into());
        }
        self.chunk_size = options.chunk_size;
        Ok(())
    }

    fn get_block(&mut self) -> Result<Option<(u64, Block)>, SplitterError> {
        self.state = SplitterState::Processing;

        let offset = self.source.stream_position()?;
        let mut buf = Vec::new();
        (&mut self.source).take(self.chunk_size).read_to_end(&mut buf)?;
        if buf.is_empty() {
            return Ok(None);
        }

        let block = Block::from_data(
            self.project_id.clone(),
            self.vault_id.clone(),
            Bytes::from(buf),
        );
        Ok(Some((offset, block)))
    }
}
