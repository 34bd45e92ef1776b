use anyhow::{Context, Result};
use deuce_client::DeuceClient;
use deuce_core::{Vault, VaultId};

use crate::VaultCmd;

pub async fn run_vault(client: &DeuceClient, vault_name: &str, cmd: VaultCmd) -> Result<()> {
    let vault_id = VaultId::new(vault_name)?;
    match cmd {
        VaultCmd::Create => {
            let vault = client
                .create_vault(&vault_id)
                .await
                .context("failed to create vault")?;
            println!("created vault '{}'", vault.vault_id());
        }
        VaultCmd::Exists => {
            let mut vault = Vault::new(client.project_id().clone(), vault_id);
            if client.vault_exists(&mut vault).await? {
                println!("vault '{}' exists", vault.vault_id());
            } else {
                println!("vault '{}' does NOT exist", vault.vault_id());
            }
        }
        VaultCmd::Stats => {
            let mut vault = client.get_vault(&vault_id).await?;
            client
                .get_vault_statistics(&mut vault)
                .await
                .context("failed to get vault statistics")?;
            let stats = vault
                .statistics()
                .context("server returned no statistics")?;
            println!("{}", serde_json::to_string_pretty(stats)?);
        }
        VaultCmd::Delete => {
            let mut vault = client.get_vault(&vault_id).await?;
            client
                .delete_vault(&mut vault)
                .await
                .context("failed to delete vault")?;
            println!("deleted vault '{}'", vault.vault_id());
        }
    }

    Ok(())
}
