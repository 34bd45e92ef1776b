use crate::id::BlockId;
use thiserror::Error;

/// Input validation failures, raised synchronously before any network call.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("block id must be 40 lowercase hex characters, got '{0}'")]
    BlockIdFormat(String),

    #[error("project id must be 1-128 graphic ASCII characters, got '{0}'")]
    ProjectIdFormat(String),

    #[error("vault id must be 1-128 characters from [a-zA-Z0-9_-], got '{0}'")]
    VaultIdFormat(String),

    #[error("file id '{0}' is not a valid UUID")]
    FileIdFormat(String),

    #[error("storage id '{0}' is not a valid UUID")]
    StorageIdFormat(String),

    #[error("chunk size must be a positive number of bytes")]
    ChunkSize,

    #[error("data does not hash to block id {expected}, got {actual}")]
    DataDigestMismatch { expected: BlockId, actual: BlockId },

    #[error("entity is scoped to '{entity_scope}' but the registry holds '{registry_scope}'")]
    ScopeMismatch {
        entity_scope: String,
        registry_scope: String,
    },

    #[error("invalid vault status value '{0}'")]
    VaultStatus(String),
}
