use anyhow::Result;
use deuce_client::DeuceClient;

use crate::Commands;

mod blocks;
mod files;
mod vault;

pub async fn run_command(client: &DeuceClient, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Vault { vault_name, cmd } => vault::run_vault(client, &vault_name, cmd).await,
        Commands::Blocks { vault_name, cmd } => blocks::run_blocks(client, &vault_name, cmd).await,
        Commands::Files { vault_name, cmd } => files::run_files(client, &vault_name, cmd).await,
    }
}
