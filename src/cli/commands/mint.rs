use clap::Args;

use crate::cli::context::Context;
use crate::errors::AppResult;
use crate::minter::{MintContent, PreparedMint};
use crate::network::DashAddress;

/// Inscribe a file or hex data and send it to an address
#[derive(Args)]
pub struct MintCommand {
    /// Address receiving the inscription
    pub address: String,

    /// Path of a file to inscribe, or the content type of `hex_data`
    pub content_type_or_file: String,

    /// Payload as hex, when the previous argument is a content type
    pub hex_data: Option<String>,
}

impl MintCommand {
    pub async fn run(&self, ctx: &Context) -> AppResult<()> {
        let content = MintContent::from_args(&self.content_type_or_file, self.hex_data.as_deref())?;
        mint_and_report(ctx, &self.address, &content).await?;
        Ok(())
    }
}

/// Mint `content` to `address` and print the resulting ids
pub(crate) async fn mint_and_report(
    ctx: &Context,
    address: &str,
    content: &MintContent,
) -> AppResult<PreparedMint> {
    let destination = DashAddress::parse(address, ctx.network())?;

    let prepared = ctx.minter()?.mint(&destination, content).await?;

    println!("Commit transaction: {}", prepared.commit.transaction.txid);
    println!("Reveal transaction: {}", prepared.reveal.transaction.txid);
    println!("Inscription ID: {}", prepared.inscription_id());
    Ok(prepared)
}
