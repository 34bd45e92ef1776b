//! Async HTTP client for the Deuce block storage REST API.
//!
//! [`DeuceClient`] exposes one method per remote operation: vault
//! create/exists/delete/statistics, block list/upload/download/delete, file
//! create, block-to-file assignment and file block listing. All entity
//! state lives in the [`deuce_core`] registries; the client only moves
//! bytes and updates those mirrors from responses.
//!
//! Authentication is a boundary, not an implementation: anything that can
//! produce a token implements [`Authenticator`]. Retries are deliberately
//! absent; an unexpected status is returned to the caller with its body.

mod auth;
mod client;
mod error;
mod paths;

pub use auth::{AuthError, Authenticator, StaticCredentials};
pub use client::DeuceClient;
pub use error::ApiError;
