use anyhow::Result;
use clap::{Parser, Subcommand};
use school_assist_core::env_config::env_string;
use school_assist_storage::StorageBackend;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "school-assist")]
#[command(about = "Chat assistant for school management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP chat server
    Serve {
        #[arg(short, long, env = "SCHOOL_ASSIST_PORT", default_value = "8080")]
        port: u16,
        #[arg(short = 'H', long, env = "SCHOOL_ASSIST_HOST", default_value = "127.0.0.1")]
        host: String,
    },
    /// Create or upgrade the PostgreSQL schema
    Migrate,
    /// Send one chat message as a user and print the reply
    Chat {
        /// Id of the user sending the message
        user_id: String,
        message: String,
    },
}

const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Opens PostgreSQL when `DATABASE_URL` is set, otherwise an empty
/// in-memory store.
pub(crate) async fn open_storage() -> Result<StorageBackend> {
    if let Some(url) = env_string(DATABASE_URL_VAR) {
        let storage = StorageBackend::new_postgres(&url).await?;
        return Ok(storage);
    }
    tracing::warn!("{DATABASE_URL_VAR} not set, using in-memory storage (data is lost on exit)");
    Ok(StorageBackend::new_memory())
}

pub(crate) fn database_url() -> Result<String> {
    env_string(DATABASE_URL_VAR)
        .ok_or_else(|| anyhow::anyhow!("{DATABASE_URL_VAR} must be set"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Chat { user_id, message } => commands::chat::run(&user_id, &message).await?,
    }

    Ok(())
}
