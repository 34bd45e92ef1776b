use anyhow::{Context, Result};
use bytes::Bytes;
use deuce_client::DeuceClient;
use deuce_core::{Block, BlockId, VaultId};

use crate::BlocksCmd;

pub async fn run_blocks(client: &DeuceClient, vault_name: &str, cmd: BlocksCmd) -> Result<()> {
    let vault_id = VaultId::new(vault_name)?;
    match cmd {
        BlocksCmd::List { marker, limit } => {
            let marker: Option<BlockId> = marker.as_deref().map(str::parse).transpose()?;
            let mut vault = client.get_vault(&vault_id).await?;
            let block_ids = client
                .list_blocks(&mut vault, marker.as_ref(), limit)
                .await
                .context("failed to list blocks")?;
            for block_id in &block_ids {
                println!("{block_id}");
            }
            println!("{} blocks in vault '{}'", block_ids.len(), vault.vault_id());
        }
        BlocksCmd::Upload { path } => {
            let vault = client.get_vault(&vault_id).await?;
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let block = Block::from_data(
                client.project_id().clone(),
                vault.vault_id().clone(),
                Bytes::from(data),
            );
            client
                .upload_block(&vault, &block)
                .await
                .context("failed to upload block")?;
            println!("uploaded block: id={} size={}", block.block_id(), block.len());
        }
        BlocksCmd::Download { block_id, out } => {
            let block_id: BlockId = block_id.parse()?;
            let vault = client.get_vault(&vault_id).await?;
            let mut block = Block::new(
                client.project_id().clone(),
                vault.vault_id().clone(),
                block_id,
            );
            client
                .download_block(&vault, &mut block)
                .await
                .context("failed to download block")?;
            let data = block.data().context("downloaded block has no data")?;
            tokio::fs::write(&out, data)
                .await
                .with_context(|| format!("failed to write to {}", out.display()))?;
            println!("downloaded {} bytes to {}", data.len(), out.display());
        }
        BlocksCmd::Delete { block_id } => {
            let block_id: BlockId = block_id.parse()?;
            let vault = client.get_vault(&vault_id).await?;
            client
                .delete_block(&vault, &block_id)
                .await
                .context("failed to delete block")?;
            println!("deleted block {block_id}");
        }
    }

    Ok(())
}
