use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use deuce_client::DeuceClient;

mod cmd;
mod credentials;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the Deuce server
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:8080")]
    url: String,

    /// JSON file with the credentials: {"project_id": ..., "token": ...}
    #[arg(long, value_name = "PATH")]
    user_config: PathBuf,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vault lifecycle operations
    Vault {
        #[arg(long, value_name = "NAME")]
        vault_name: String,
        #[command(subcommand)]
        cmd: VaultCmd,
    },
    /// Block operations within a vault
    Blocks {
        #[arg(long, value_name = "NAME")]
        vault_name: String,
        #[command(subcommand)]
        cmd: BlocksCmd,
    },
    /// File operations within a vault
    Files {
        #[arg(long, value_name = "NAME")]
        vault_name: String,
        #[command(subcommand)]
        cmd: FilesCmd,
    },
}

#[derive(Subcommand)]
enum VaultCmd {
    /// Create a vault with the given name
    Create,
    /// Check whether a vault with the given name exists
    Exists,
    /// Print the statistics of a vault
    Stats,
    /// Delete a vault
    Delete,
}

#[derive(Subcommand)]
enum BlocksCmd {
    /// List the block ids stored in the vault
    List {
        /// Block id to start the listing at; unset means from the beginning
        #[arg(long, value_name = "BLOCK_ID")]
        marker: Option<String>,
        /// Maximum number of entries to return
        #[arg(long, value_name = "COUNT")]
        limit: Option<u64>,
    },
    /// Upload a local file as a single block
    Upload {
        /// Local file whose bytes become the block
        path: PathBuf,
    },
    /// Download a block into a local file
    Download {
        /// Block id in hex (SHA-1, 40 characters)
        #[arg(long)]
        block_id: String,
        /// Output file path to write the block to
        #[arg(long)]
        out: PathBuf,
    },
    /// Delete a block from the vault
    Delete {
        /// Block id in hex (SHA-1, 40 characters)
        #[arg(long)]
        block_id: String,
    },
}

#[derive(Subcommand)]
enum FilesCmd {
    /// Create an empty file and print its id
    Create,
    /// Split a local file into blocks, assign them to a new remote file
    /// and upload only the blocks the server does not already have
    Upload {
        /// Local file to upload
        path: PathBuf,
        /// Block size in bytes; defaults to 1 MiB
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<u64>,
    },
    /// List the blocks assigned to a file
    ListBlocks {
        /// Server-assigned file id (UUID)
        #[arg(long)]
        file_id: String,
        /// Block id to start the listing at
        #[arg(long, value_name = "BLOCK_ID")]
        marker: Option<String>,
        /// Maximum number of entries to return
        #[arg(long, value_name = "COUNT")]
        limit: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let credentials = credentials::load(&cli.user_config)?;
    let client = DeuceClient::new(Arc::new(credentials), cli.url.clone());

    cmd::run_command(&client, cli.cmd).await
}
