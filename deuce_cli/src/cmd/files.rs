use anyhow::{Context, Result};
use deuce_client::DeuceClient;
use deuce_core::splitter::{FileSplitter, SplitterConfig, SplitterOptions};
use deuce_core::{BlockId, File, FileId, VaultId};
use deuce_splitter_uniform::UniformSplitter;
use tracing::debug;

use crate::FilesCmd;

/// Blocks read from the splitter per batch while uploading.
const SPLIT_BATCH: usize = 16;

pub async fn run_files(client: &DeuceClient, vault_name: &str, cmd: FilesCmd) -> Result<()> {
    let vault_id = VaultId::new(vault_name)?;
    match cmd {
        FilesCmd::Create => {
            let mut vault = client.get_vault(&vault_id).await?;
            let file_id = client
                .create_file(&mut vault)
                .await
                .context("failed to create file")?;
            let file = vault
                .files()
                .get(&file_id)
                .context("created file missing from vault registry")?;
            println!("created file {file_id}");
            if let Some(url) = file.url() {
                println!("location: {url}");
            }
        }
        FilesCmd::Upload { path, chunk_size } => {
            let mut vault = client.get_vault(&vault_id).await?;
            let file_id = client
                .create_file(&mut vault)
                .await
                .context("failed to create file")?;

            let source = std::fs::File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let mut splitter = UniformSplitter::new(
                client.project_id().clone(),
                vault.vault_id().clone(),
                source,
            );
            if let Some(chunk_size) = chunk_size {
                let mut config = SplitterConfig::new();
                config.set(
                    deuce_splitter_uniform::VARIANT,
                    SplitterOptions { chunk_size },
                );
                splitter.configure(&config)?;
            }

            // populate the vault and file registries batch by batch
            let mut total_blocks = 0usize;
            loop {
                let batch = splitter.get_blocks(SPLIT_BATCH)?;
                if batch.is_empty() {
                    break;
                }
                total_blocks += batch.len();
                debug!(total_blocks, "split progress");
                for (offset, block) in batch {
                    vault.blocks_mut().insert(block.clone())?;
                    let file = vault
                        .files_mut()
                        .get_mut(&file_id)
                        .context("file missing from vault registry")?;
                    file.add_block_at(offset, block)?;
                }
            }

            let to_upload = client
                .assign_blocks_to_file(&vault, &file_id, None)
                .await
                .context("failed to assign blocks to file")?;
            println!(
                "assigned {} blocks to file {}; {} still need upload",
                total_blocks,
                file_id,
                to_upload.len()
            );

            for block_id in &to_upload {
                let block = vault
                    .blocks()
                    .get(block_id)
                    .with_context(|| format!("block {block_id} missing from local registry"))?;
                client
                    .upload_block(&vault, block)
                    .await
                    .with_context(|| format!("failed to upload block {block_id}"))?;
            }
            println!("uploaded {} as file {}", path.display(), file_id);
        }
        FilesCmd::ListBlocks {
            file_id,
            marker,
            limit,
        } => {
            let file_id: FileId = file_id.parse()?;
            let marker: Option<BlockId> = marker.as_deref().map(str::parse).transpose()?;
            let mut vault = client.get_vault(&vault_id).await?;
            // register a local mirror so the listing has a file to merge into
            let local_vault_id = vault.vault_id().clone();
            vault.files_mut().insert(File::new(
                client.project_id().clone(),
                local_vault_id,
                file_id,
                None,
            ))?;

            client
                .list_file_blocks(&mut vault, &file_id, marker.as_ref(), limit)
                .await
                .context("failed to list file blocks")?;
            let file = vault
                .files()
                .get(&file_id)
                .context("file missing from vault registry")?;
            for (offset, block_id) in file.offsets() {
                println!("{offset:>12}  {block_id}");
            }
            println!("{} blocks in file {}", file.offsets().len(), file_id);
        }
    }

    Ok(())
}
