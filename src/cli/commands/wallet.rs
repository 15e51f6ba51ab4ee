use clap::{Args, Subcommand};
use tracing::info;

use crate::cli::context::Context;
use crate::errors::AppResult;
use crate::network::DashAddress;
use crate::types::SignedTransaction;
use crate::utils::currency::format_duffs_as_dash;

/// Manage the local single-key wallet
#[derive(Args)]
pub struct WalletCommand {
    #[command(subcommand)]
    pub action: WalletAction,
}

#[derive(Subcommand)]
pub enum WalletAction {
    /// Create a wallet file with a fresh key
    New,
    /// Refresh cached coins from the node
    Sync,
    /// Show the balance of cached coins
    Balance,
    /// Pay an amount in duffs to an address
    Send {
        address: String,
        /// Amount in duffs
        amount: u64,
    },
    /// Split every cached coin into equal outputs to the wallet itself
    Split {
        /// Number of outputs
        count: usize,
    },
}

impl WalletCommand {
    pub async fn run(&self, ctx: &Context) -> AppResult<()> {
        let manager = ctx.wallet_manager();

        match &self.action {
            WalletAction::New => {
                let wallet = manager.create()?;
                println!("address {}", wallet.address);
            }
            WalletAction::Sync => {
                let wallet = manager.sync(ctx.node.as_ref()).await?;
                println!("balance {}", format_duffs_as_dash(wallet.balance()));
            }
            WalletAction::Balance => {
                let wallet = manager.load()?;
                println!("{} {}", wallet.address, format_duffs_as_dash(wallet.balance()));
            }
            WalletAction::Send { address, amount } => {
                let to = DashAddress::parse(address, ctx.network())?;
                let tx = manager.send(&to, *amount)?;
                info!("Sending {} duffs to {}", amount, to);
                broadcast(ctx, &tx).await?;
            }
            WalletAction::Split { count } => {
                let tx = manager.split(*count)?;
                info!("Splitting wallet coins into {} outputs", count);
                broadcast(ctx, &tx).await?;
            }
        }
        Ok(())
    }
}

/// Wallet transactions are resubmitted on transient rejections
async fn broadcast(ctx: &Context, tx: &SignedTransaction) -> AppResult<()> {
    ctx.sequencer()
        .broadcast_all(std::slice::from_ref(&tx.hex), true)
        .await?;
    println!("{}", tx.txid);
    Ok(())
}
