use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;
use tracing::debug;

use deuce_core::{
    Block, BlockId, File, FileId, ProjectId, Vault, VaultId, VaultStatus, prepare_assignment,
};

use crate::auth::Authenticator;
use crate::error::ApiError;
use crate::paths;

/// HTTP client for one Deuce server, scoped to the authenticator's project.
///
/// Every method maps to a single REST call with fixed success codes; any
/// other status is returned as [`ApiError::UnexpectedStatus`] with the
/// response body. Methods that take a `&mut Vault` update its status or
/// registries from the outcome, mirroring what the server just confirmed.
pub struct DeuceClient {
    base_url: String,
    http: reqwest::Client,
    authenticator: Arc<dyn Authenticator>,
}

impl DeuceClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    pub fn new(authenticator: Arc<dyn Authenticator>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
            authenticator,
        }
    }

    pub fn project_id(&self) -> &ProjectId {
        self.authenticator.project_id()
    }

    async fn common_headers(&self) -> Result<HeaderMap, ApiError> {
        let token = self.authenticator.auth_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert("X-Auth-Token", HeaderValue::from_str(&token)?);
        headers.insert(
            "X-Project-ID",
            HeaderValue::from_str(self.project_id().as_str())?,
        );
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn unexpected(endpoint: &'static str, res: reqwest::Response) -> ApiError {
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        debug!(endpoint, status, body = %body, "unexpected response");
        ApiError::UnexpectedStatus {
            endpoint,
            status,
            body,
        }
    }

    /// `PUT <vault-path>`; 201 creates the vault.
    pub async fn create_vault(&self, vault_id: &VaultId) -> Result<Vault, ApiError> {
        let url = self.url(&paths::vault_path(vault_id));
        debug!(%url, "create vault");
        let res = self
            .http
            .put(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            201 => {
                let mut vault = Vault::new(self.project_id().clone(), vault_id.clone());
                vault.set_status(VaultStatus::Created);
                Ok(vault)
            }
            _ => Err(Self::unexpected("create vault", res).await),
        }
    }

    async fn head_vault(&self, vault_id: &VaultId) -> Result<bool, ApiError> {
        let url = self.url(&paths::vault_path(vault_id));
        debug!(%url, "vault exists");
        let res = self
            .http
            .head(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            204 => Ok(true),
            404 => Ok(false),
            _ => Err(Self::unexpected("vault exists", res).await),
        }
    }

    /// `HEAD <vault-path>`; 204 means the vault exists, 404 that it does
    /// not. The vault's status becomes `Valid` or `Invalid` accordingly.
    pub async fn vault_exists(&self, vault: &mut Vault) -> Result<bool, ApiError> {
        let vault_id = vault.vault_id().clone();
        let exists = self.head_vault(&vault_id).await?;
        vault.set_status(if exists {
            VaultStatus::Valid
        } else {
            VaultStatus::Invalid
        });
        Ok(exists)
    }

    /// Existence check by name; returns a `Valid` vault mirror or
    /// [`ApiError::VaultNotFound`].
    pub async fn get_vault(&self, vault_id: &VaultId) -> Result<Vault, ApiError> {
        if self.head_vault(vault_id).await? {
            let mut vault = Vault::new(self.project_id().clone(), vault_id.clone());
            vault.set_status(VaultStatus::Valid);
            Ok(vault)
        } else {
            Err(ApiError::VaultNotFound(vault_id.clone()))
        }
    }

    /// `DELETE <vault-path>`; 204 deletes the vault.
    pub async fn delete_vault(&self, vault: &mut Vault) -> Result<(), ApiError> {
        let url = self.url(&paths::vault_path(vault.vault_id()));
        debug!(%url, "delete vault");
        let res = self
            .http
            .delete(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            204 => {
                vault.set_status(VaultStatus::Deleted);
                Ok(())
            }
            _ => Err(Self::unexpected("delete vault", res).await),
        }
    }

    /// `GET <vault-path>`; the JSON body is cached verbatim on the vault,
    /// last fetch wins.
    pub async fn get_vault_statistics(&self, vault: &mut Vault) -> Result<(), ApiError> {
        let url = self.url(&paths::vault_path(vault.vault_id()));
        debug!(%url, "get vault statistics");
        let res = self
            .http
            .get(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            200 => {
                let statistics: serde_json::Value = res.json().await?;
                vault.set_statistics(statistics);
                Ok(())
            }
            _ => Err(Self::unexpected("get vault statistics", res).await),
        }
    }

    /// `GET <blocks-path>[?marker=M,limit=N]`; each listed id is upserted
    /// into the vault's block registry as a metadata-only block. Returns
    /// the listed ids.
    pub async fn list_blocks(
        &self,
        vault: &mut Vault,
        marker: Option<&BlockId>,
        limit: Option<u64>,
    ) -> Result<Vec<BlockId>, ApiError> {
        let url = format!(
            "{}{}",
            self.url(&paths::blocks_path(vault.vault_id())),
            paths::list_query(marker, limit)
        );
        debug!(%url, "list blocks");
        let res = self
            .http
            .get(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            200 => {
                let block_ids: Vec<BlockId> = res.json().await?;
                let project_id = vault.project_id().clone();
                let listed_vault_id = vault.vault_id().clone();
                for block_id in &block_ids {
                    vault.blocks_mut().insert(Block::new(
                        project_id.clone(),
                        listed_vault_id.clone(),
                        *block_id,
                    ))?;
                }
                Ok(block_ids)
            }
            _ => Err(Self::unexpected("list blocks", res).await),
        }
    }

    /// `PUT <block-path>` with the raw block bytes; 201 stores the block.
    ///
    /// The block must carry data; a metadata-only block is rejected before
    /// the request, since an arbitrary body can never satisfy the server's
    /// content-address check.
    pub async fn upload_block(&self, vault: &Vault, block: &Block) -> Result<(), ApiError> {
        let data = block
            .data()
            .cloned()
            .ok_or(ApiError::BlockDataMissing(*block.block_id()))?;
        let url = self.url(&paths::block_path(vault.vault_id(), block.block_id()));
        debug!(%url, size = data.len(), "upload block");
        let res = self
            .http
            .put(&url)
            .headers(self.common_headers().await?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;
        match res.status().as_u16() {
            201 => Ok(()),
            _ => Err(Self::unexpected("upload block", res).await),
        }
    }

    /// `DELETE <block-path>`; 204 deletes the block on the server. The
    /// local registries are left untouched.
    pub async fn delete_block(&self, vault: &Vault, block_id: &BlockId) -> Result<(), ApiError> {
        let url = self.url(&paths::block_path(vault.vault_id(), block_id));
        debug!(%url, "delete block");
        let res = self
            .http
            .delete(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            204 => Ok(()),
            _ => Err(Self::unexpected("delete block", res).await),
        }
    }

    /// `GET <block-path>`; the body is stored on the block through the
    /// digest-validating setter, so bytes that do not hash to the block id
    /// are rejected client-side.
    pub async fn download_block(&self, vault: &Vault, block: &mut Block) -> Result<(), ApiError> {
        let url = self.url(&paths::block_path(vault.vault_id(), block.block_id()));
        debug!(%url, "download block");
        let res = self
            .http
            .get(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            200 => {
                let data: Bytes = res.bytes().await?;
                block.set_data(data)?;
                Ok(())
            }
            _ => Err(Self::unexpected("download block", res).await),
        }
    }

    /// `POST <files-path>`; 201 answers with the new file's id and
    /// location in the `x-file-id` and `location` headers. The file is
    /// inserted into the vault's file registry and its id returned.
    pub async fn create_file(&self, vault: &mut Vault) -> Result<FileId, ApiError> {
        let url = self.url(&paths::files_path(vault.vault_id()));
        debug!(%url, "create file");
        let res = self
            .http
            .post(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            201 => {
                let file_id: FileId = header_str(&res, "x-file-id")?.parse()?;
                let location = header_str(&res, "location")?.to_string();
                let file = File::new(
                    vault.project_id().clone(),
                    vault.vault_id().clone(),
                    file_id,
                    Some(location),
                );
                vault.files_mut().insert(file)?;
                Ok(file_id)
            }
            _ => Err(Self::unexpected("create file", res).await),
        }
    }

    /// `POST <file-path>` with `{"blocks": [{"id", "offset", "size"}, ...]}`.
    ///
    /// The payload is validated and built by
    /// [`prepare_assignment`](deuce_core::prepare_assignment) before
    /// anything is sent; an inconsistent file aborts with no request and no
    /// mutation. The 200 response lists the block ids the server still
    /// needs uploaded — ids it already holds are deduplicated away.
    pub async fn assign_blocks_to_file(
        &self,
        vault: &Vault,
        file_id: &FileId,
        pairs: Option<&[(BlockId, u64)]>,
    ) -> Result<Vec<BlockId>, ApiError> {
        let payload = prepare_assignment(vault, file_id, pairs)?;

        let url = self.url(&paths::file_path(vault.vault_id(), file_id));
        debug!(%url, entries = payload.len(), "assign blocks to file");
        let res = self
            .http
            .post(&url)
            .headers(self.common_headers().await?)
            .json(&serde_json::json!({ "blocks": payload }))
            .send()
            .await?;
        match res.status().as_u16() {
            200 => Ok(res.json().await?),
            _ => Err(Self::unexpected("assign blocks to file", res).await),
        }
    }

    /// `GET <fileblocks-path>[?marker=M,limit=N]`; each `(block id,
    /// offset)` pair is merged into the file's offset map. Returns the
    /// listed ids.
    pub async fn list_file_blocks(
        &self,
        vault: &mut Vault,
        file_id: &FileId,
        marker: Option<&BlockId>,
        limit: Option<u64>,
    ) -> Result<Vec<BlockId>, ApiError> {
        if !vault.files().contains(file_id) {
            return Err(ApiError::FileNotInVault(*file_id));
        }

        let url = format!(
            "{}{}",
            self.url(&paths::fileblocks_path(vault.vault_id(), file_id)),
            paths::list_query(marker, limit)
        );
        debug!(%url, "list file blocks");
        let res = self
            .http
            .get(&url)
            .headers(self.common_headers().await?)
            .send()
            .await?;
        match res.status().as_u16() {
            200 => {
                let entries: Vec<(BlockId, u64)> = res.json().await?;
                let file = vault
                    .files_mut()
                    .get_mut(file_id)
                    .ok_or(ApiError::FileNotInVault(*file_id))?;
                let mut block_ids = Vec::with_capacity(entries.len());
                for (block_id, offset) in entries {
                    file.assign_block(offset, block_id);
                    block_ids.push(block_id);
                }
                Ok(block_ids)
            }
            _ => Err(Self::unexpected("list file blocks", res).await),
        }
    }
}

fn header_str<'r>(res: &'r reqwest::Response, name: &'static str) -> Result<&'r str, ApiError> {
    res.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingHeader(name))
}
