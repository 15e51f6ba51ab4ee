use clap::Args;
use std::sync::Arc;

use crate::cli::context::Context;
use crate::errors::AppResult;
use crate::rpc::ScriptCache;
use crate::server::{serve, DecodeService};

/// Serve decoded inscriptions over HTTP at `/tx/{txid}`
#[derive(Args)]
pub struct ServerCommand {
    /// Listen port (overrides darinals.toml)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}

impl ServerCommand {
    pub async fn run(&self, ctx: &Context) -> AppResult<()> {
        let port = self.port.unwrap_or(ctx.config.server.port);
        let service = Arc::new(DecodeService::with_cache(
            ctx.node.clone(),
            ScriptCache::with_capacity(ctx.config.server.cache_capacity),
        ));

        println!("Listening on port {}", port);
        println!();
        println!("Example:");
        println!("http://localhost:{}/tx/<reveal txid>", port);

        serve(service, port).await
    }
}
