//! One-shot queries answered straight from the chain.

use clap::Args;
use eyre::WrapErr;
use std::{sync::Arc, time::Duration};
use tracing::debug;
use txwatch_chain::JsonRpcChainClient;
use txwatch_tracker::{Parser, ToolParser};

/// Node connection of the one-shot commands.
#[derive(Debug, Clone, Args)]
pub(crate) struct ChainArgs {
    /// HTTP JSON-RPC endpoint of the node.
    #[arg(long = "chain.url", value_name = "URL")]
    pub(crate) url: String,

    /// Deadline of each chain call, in seconds.
    #[arg(long = "chain.timeout", value_name = "SECONDS", default_value_t = 10)]
    pub(crate) timeout: u64,
}

impl ChainArgs {
    fn parser(&self) -> eyre::Result<ToolParser<JsonRpcChainClient>> {
        let client = JsonRpcChainClient::new(self.url.clone())
            .wrap_err_with(|| format!("invalid chain url {}", self.url))?;
        debug!(
            target: "txwatch::cli",
            url = client.url(),
            timeout = self.timeout,
            "querying chain"
        );
        let timeout = Duration::from_secs(self.timeout);
        Ok(ToolParser::new(Arc::new(client), timeout, timeout))
    }
}

/// `txwatch block-number`
#[derive(Debug, Args)]
pub(crate) struct BlockNumberCommand {
    #[command(flatten)]
    pub(crate) chain: ChainArgs,
}

impl BlockNumberCommand {
    /// Prints the chain head, `0` if the node could not be reached.
    pub(crate) async fn execute(self) -> eyre::Result<()> {
        let head = self.chain.parser()?.current_block().await;
        println!("{}", serde_json::to_string(&head)?);
        Ok(())
    }
}

/// `txwatch transactions`
#[derive(Debug, Args)]
pub(crate) struct TransactionsCommand {
    /// The address to look up.
    #[arg(value_name = "ADDRESS")]
    pub(crate) address: String,

    #[command(flatten)]
    pub(crate) chain: ChainArgs,
}

impl TransactionsCommand {
    /// Prints every trace of the address up to the chain head as a JSON array.
    pub(crate) async fn execute(self) -> eyre::Result<()> {
        let transactions = self.chain.parser()?.transactions(self.address).await;
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        Ok(())
    }
}
