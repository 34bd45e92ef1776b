//! The `Vault` entity and its status machine.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::block::Blocks;
use crate::error::ValidationError;
use crate::file::Files;
use crate::id::{ProjectId, VaultId};

/// Lifecycle status of a vault as observed through remote operations.
///
/// Only the outcome of a remote call moves the status: create → `Created`,
/// delete → `Deleted`, existence check → `Valid`/`Invalid`. Parsing any
/// other string is a validation error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultStatus {
    #[default]
    Unknown,
    Created,
    Deleted,
    Valid,
    Invalid,
}

impl fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VaultStatus::Unknown => "unknown",
            VaultStatus::Created => "created",
            VaultStatus::Deleted => "deleted",
            VaultStatus::Valid => "valid",
            VaultStatus::Invalid => "invalid",
        };
        f.write_str(s)
    }
}

impl FromStr for VaultStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" => Ok(VaultStatus::Unknown),
            "created" => Ok(VaultStatus::Created),
            "deleted" => Ok(VaultStatus::Deleted),
            "valid" => Ok(VaultStatus::Valid),
            "invalid" => Ok(VaultStatus::Invalid),
            _ => Err(ValidationError::VaultStatus(s.to_string())),
        }
    }
}

/// A named, tenant-scoped container for blocks and files, mirroring remote
/// state. Intended for single-threaded, non-reentrant use; callers that
/// share a vault across threads must serialize access themselves.
#[derive(Debug, Clone)]
pub struct Vault {
    project_id: ProjectId,
    vault_id: VaultId,
    status: VaultStatus,
    statistics: Option<serde_json::Value>,
    blocks: Blocks,
    files: Files,
}

impl Vault {
    pub fn new(project_id: ProjectId, vault_id: VaultId) -> Self {
        let blocks = Blocks::new(project_id.clone(), vault_id.clone());
        let files = Files::new(project_id.clone(), vault_id.clone());
        Self {
            project_id,
            vault_id,
            status: VaultStatus::Unknown,
            statistics: None,
            blocks,
            files,
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn vault_id(&self) -> &VaultId {
        &self.vault_id
    }

    pub fn status(&self) -> VaultStatus {
        self.status
    }

    pub fn set_status(&mut self, status: VaultStatus) {
        self.status = status;
    }

    /// Last-fetched statistics blob, cached verbatim.
    pub fn statistics(&self) -> Option<&serde_json::Value> {
        self.statistics.as_ref()
    }

    pub fn set_statistics(&mut self, statistics: serde_json::Value) {
        self.statistics = Some(statistics);
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Blocks {
        &mut self.blocks
    }

    pub fn files(&self) -> &Files {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut Files {
        &mut self.files
    }
}
