use deuce_core::{AssignmentError, BlockId, FileId, ValidationError, VaultId};
use thiserror::Error;

use crate::auth::AuthError;

/// Errors from Deuce API calls.
///
/// Validation and consistency failures surface before a request is sent;
/// `UnexpectedStatus` carries whatever the server answered and is never
/// retried here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{endpoint} returned HTTP {status} with content '{body}'")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("no vault named '{0}' exists")]
    VaultNotFound(VaultId),

    #[error("file {0} is not in the vault")]
    FileNotInVault(FileId),

    #[error("block {0} has no data attached to upload")]
    BlockDataMissing(BlockId),

    #[error("response is missing required header '{0}'")]
    MissingHeader(&'static str),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("credentials produce an invalid header value: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
