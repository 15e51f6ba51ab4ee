use clap::Args;
use tracing::{error, info};

use crate::cli::context::Context;
use crate::errors::{AppError, AppResult};

/// Test Dash Core RPC connectivity
#[derive(Args)]
pub struct TestRpcCommand {}

impl TestRpcCommand {
    pub async fn run(&self, ctx: &Context) -> AppResult<()> {
        info!("=== Testing Dash Core RPC Connection ===");
        info!("Testing connection to: {}", ctx.config.node_rpc.url);
        info!("Username: {}", ctx.config.node_rpc.username);

        match ctx.node.test_connection().await {
            Ok(height) => {
                println!("Dash Core RPC connection test PASSED");
                println!("Block height: {}", height);
                Ok(())
            }
            Err(e) => {
                error!("RPC connection test failed: {}", e);
                println!("Dash Core RPC connection test FAILED");
                println!("Error: {}", e);
                println!("\nTroubleshooting tips:");
                println!("1. Check that dashd is running");
                println!("2. Verify the RPC URL is correct");
                println!("3. Ensure RPC credentials are valid");
                println!("4. Check that server=1 is set in dash.conf");

                Err(AppError::Config(format!("RPC test failed: {}", e)))
            }
        }
    }
}
