use clap::{Args, Subcommand};
use tracing::info;

use super::mint::mint_and_report;
use crate::cli::context::Context;
use crate::errors::AppResult;
use crate::inscription::token::{self, Deploy, Transfer, TransferOp, CONTENT_TYPE};
use crate::minter::MintContent;

/// dar-20 token operations, each inscribed as a JSON payload
#[derive(Args)]
pub struct Dar20Command {
    #[command(subcommand)]
    pub action: Dar20Action,
}

#[derive(Subcommand)]
pub enum Dar20Action {
    /// Deploy a new ticker
    Deploy {
        /// Address receiving the inscription
        address: String,
        /// Ticker, stored lowercased
        tick: String,
        /// Maximum supply
        max: String,
        /// Per-mint limit
        lim: String,
    },
    /// Mint an amount of a deployed ticker
    Mint {
        address: String,
        tick: String,
        amt: String,
        /// Number of separate mints
        #[arg(default_value_t = 1)]
        repeat: u32,
    },
    /// Inscribe a transfer of an amount
    Transfer {
        address: String,
        tick: String,
        amt: String,
        /// Number of separate inscriptions
        #[arg(default_value_t = 1)]
        repeat: u32,
    },
}

impl Dar20Command {
    pub async fn run(&self, ctx: &Context) -> AppResult<()> {
        match &self.action {
            Dar20Action::Deploy {
                address,
                tick,
                max,
                lim,
            } => {
                let payload = token::payload(&Deploy::new(tick, max, lim))?;
                info!("Deploying dar-20 token {}", tick.to_lowercase());
                mint_and_report(ctx, address, &MintContent::new(CONTENT_TYPE, payload)).await?;
            }
            Dar20Action::Mint {
                address,
                tick,
                amt,
                repeat,
            } => {
                transfer(ctx, TransferOp::Mint, address, tick, amt, *repeat).await?;
            }
            Dar20Action::Transfer {
                address,
                tick,
                amt,
                repeat,
            } => {
                transfer(ctx, TransferOp::Transfer, address, tick, amt, *repeat).await?;
            }
        }
        Ok(())
    }
}

async fn transfer(
    ctx: &Context,
    op: TransferOp,
    address: &str,
    tick: &str,
    amt: &str,
    repeat: u32,
) -> AppResult<()> {
    let content = MintContent::new(CONTENT_TYPE, token::payload(&Transfer::new(op, tick, amt))?);
    let repeat = repeat.max(1);
    for i in 0..repeat {
        println!("Minting dar-20 token... {} of {} times", i + 1, repeat);
        mint_and_report(ctx, address, &content).await?;
    }
    Ok(())
}
