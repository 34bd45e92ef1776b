use std::path::Path;

use anyhow::{Context, Result};
use deuce_client::StaticCredentials;
use deuce_core::ProjectId;
use serde::Deserialize;

#[derive(Deserialize)]
struct UserConfig {
    project_id: String,
    token: String,
}

/// Load credentials from a JSON user-config file:
/// `{"project_id": "...", "token": "..."}`.
pub fn load(path: &Path) -> Result<StaticCredentials> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read user config {}", path.display()))?;
    let config: UserConfig = serde_json::from_str(&text)
        .with_context(|| format!("invalid user config {}", path.display()))?;
    let project_id = ProjectId::new(config.project_id).context("invalid project_id")?;
    Ok(StaticCredentials::new(project_id, config.token))
}
