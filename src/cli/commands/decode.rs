use bitcoin::Txid;
use clap::Args;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::cli::context::Context;
use crate::errors::{io_context, AppResult, RpcError};
use crate::inscription::extract;

/// Decode the inscription revealed by a transaction
#[derive(Args)]
pub struct DecodeCommand {
    /// Reveal transaction ID
    pub txid: String,

    /// Write the payload to this file instead of printing it
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl DecodeCommand {
    pub async fn run(&self, ctx: &Context) -> AppResult<()> {
        let txid = Txid::from_str(&self.txid).map_err(|_| RpcError::InvalidTxid {
            txid: self.txid.clone(),
        })?;

        info!("Decoding inscription from {}", txid);
        let inscription = extract(ctx.node.as_ref(), &txid).await?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &inscription.body).map_err(|e| io_context(e, path))?;
                println!("Content type: {}", inscription.content_type);
                println!(
                    "Wrote {} bytes to {}",
                    inscription.body.len(),
                    path.display()
                );
            }
            None => {
                println!("Content type: {}", inscription.content_type);
                println!("{}", inscription.body_text());
            }
        }
        Ok(())
    }
}
