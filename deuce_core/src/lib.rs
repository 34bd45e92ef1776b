//! Core Deuce client types and invariants.
//!
//! This crate defines the entities shared by all Deuce client crates:
//!
//! - Content-addressed block identity (`id::BlockId`, a SHA-1 digest)
//! - Validated identifier newtypes (`ProjectId`, `VaultId`, `FileId`,
//!   `StorageId`)
//! - The `Block`, `File` and `Vault` entities with their in-memory
//!   registries, mirrors of remote state scoped to a `(project, vault)` pair
//! - The block/offset reconciliation engine (`prepare_assignment`) that
//!   validates a file's parallel block and offset maps before a commit
//! - The `FileSplitter` trait implemented by chunking strategies such as
//!   `deuce_splitter_uniform`
//!
//! Everything here is synchronous and performs no network I/O. Validation
//! failures surface before any request is made; the HTTP surface lives in
//! `deuce_client`.

pub mod assignment;
pub mod block;
pub mod error;
pub mod file;
pub mod id;
pub mod splitter;
pub mod vault;

pub use assignment::{AssignmentError, BlockAssignment, prepare_assignment};
pub use block::{Block, Blocks};
pub use error::ValidationError;
pub use file::{File, Files};
pub use id::{BlockId, FileId, ProjectId, StorageId, VaultId};
pub use splitter::{FileSplitter, SplitterConfig, SplitterError, SplitterState};
pub use vault::{Vault, VaultStatus};
