use anyhow::anyhow;
use clap::Parser;
use reactforge::config::Config;
use reactforge::server::{self, ServerAppState};
use std::path::PathBuf;

/// ReactForge - prompt-to-React-project generation server
#[derive(Parser, Debug)]
#[command(name = "reactforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind the server to
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Conversation store root
    #[arg(long, env = "REACTFORGE_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    if config.anthropic_api_key.is_none() {
        // Not fatal: the list endpoint still works, generation reports it per request
        log::warn!("ANTHROPIC_API_KEY not found in environment variables");
    }
    log::info!(
        "Using model {} (max_tokens {}), data dir {:?}",
        config.model,
        config.max_tokens,
        config.data_dir
    );

    let state = ServerAppState::new(&config);

    server::run_server(cli.port, &cli.bind, state)
        .await
        .map_err(|e| anyhow!(e))
}
