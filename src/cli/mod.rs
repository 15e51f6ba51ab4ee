use crate::errors::AppResult;
use clap::{Parser, Subcommand};
use tracing::info;

pub mod commands;
pub mod context;

use context::{Context, GlobalArgs};

/// Dash inscriptions: mint, decode and serve
#[derive(Parser)]
#[command(name = "darinals")]
#[command(about = "Dash commit/reveal inscriptions")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Inscribe a file or hex payload: mint <address> <content-type-or-file> [hex-data]
    Mint(commands::mint::MintCommand),
    /// Wallet management: new, sync, balance, send, split
    Wallet(commands::wallet::WalletCommand),
    /// dar-20 token deploy, mint and transfer
    #[command(name = "dar-20", alias = "dar20")]
    Dar20(commands::dar20::Dar20Command),
    /// Decode the inscription of a reveal transaction
    Decode(commands::decode::DecodeCommand),
    /// Serve decoded inscriptions over HTTP
    Server(commands::server::ServerCommand),
    /// Test Dash Core RPC connectivity
    TestRpc(commands::test_rpc::TestRpcCommand),
}

pub async fn run() -> AppResult<()> {
    // Uses RUST_LOG environment variable (defaults to "info" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    let ctx = Context::new(cli.global.load_config()?)?;

    // An interrupted broadcast takes precedence over whatever was asked for
    let sequencer = ctx.sequencer();
    if sequencer.has_pending()? {
        info!("found pending transactions, rebroadcasting");
        sequencer.resume_pending().await?;
        return Ok(());
    }

    match cli.command {
        Commands::Mint(command) => command.run(&ctx).await,
        Commands::Wallet(command) => command.run(&ctx).await,
        Commands::Dar20(command) => command.run(&ctx).await,
        Commands::Decode(command) => command.run(&ctx).await,
        Commands::Server(command) => command.run(&ctx).await,
        Commands::TestRpc(command) => command.run(&ctx).await,
    }
}
