//! The authentication boundary.
//!
//! Token acquisition (identity services, key files, whatever a deployment
//! uses) stays outside this crate; the client only needs something that can
//! hand it a token and a project id.

use async_trait::async_trait;
use deuce_core::ProjectId;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("failed to obtain an auth token: {0}")]
pub struct AuthError(pub String);

/// Source of the `X-Auth-Token` and `X-Project-ID` request headers.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// A currently valid token; implementations may refresh under the hood.
    async fn auth_token(&self) -> Result<String, AuthError>;

    /// The tenant scope all requests run under.
    fn project_id(&self) -> &ProjectId;
}

/// Preset project id and token, for tests and deployments that obtain
/// tokens elsewhere.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    project_id: ProjectId,
    token: String,
}

impl StaticCredentials {
    pub fn new(project_id: ProjectId, token: impl Into<String>) -> Self {
        Self {
            project_id,
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticCredentials {
    async fn auth_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }

    fn project_id(&self) -> &ProjectId {
        &self.project_id
    }
}
