//! `txwatch server`

use clap::Args;
use eyre::WrapErr;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::info;
use txwatch_chain::JsonRpcChainClient;
use txwatch_config::Config;
use txwatch_rpc::{launch, RpcServerHandle};
use txwatch_tasks::TokioTaskExecutor;
use txwatch_tracker::ServiceParser;

/// Track subscribed addresses and serve them over JSON-RPC.
#[derive(Debug, Args)]
pub(crate) struct Command {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "FILE")]
    pub(crate) config: PathBuf,

    /// Overrides `chain.url` of the configuration file.
    #[arg(long = "chain.url", value_name = "URL")]
    pub(crate) chain_url: Option<String>,

    /// Overrides `rpc.addr` of the configuration file.
    #[arg(long = "http.addr", value_name = "ADDR")]
    pub(crate) http_addr: Option<SocketAddr>,
}

impl Command {
    fn load_config(&self) -> eyre::Result<Config> {
        let mut config = Config::from_path(&self.config)
            .wrap_err_with(|| format!("failed to load config from {}", self.config.display()))?;
        if let Some(url) = &self.chain_url {
            config.chain.url = url.clone();
        }
        if let Some(addr) = self.http_addr {
            config.rpc.addr = addr;
        }
        Ok(config)
    }

    /// Runs the tracker and the RPC server until the future is dropped or the server stops.
    pub(crate) async fn execute(self) -> eyre::Result<()> {
        let config = self.load_config()?;
        info!(
            target: "txwatch::cli",
            path = %self.config.display(),
            chain = %config.chain.url,
            "loaded configuration"
        );

        let chain = Arc::new(
            JsonRpcChainClient::new(config.chain.url.clone()).wrap_err("invalid chain url")?,
        );
        let parser = ServiceParser::spawn(chain, config.tracker, &TokioTaskExecutor::default())
            .await
            .wrap_err("failed to start tracker")?;
        let parser = Arc::new(parser);

        let server = launch(parser.clone(), config.rpc.addr).await?;
        info!(target: "txwatch::cli", url = %server.http_url(), "serving parser API");

        let _stop = StopOnDrop { parser, server: server.clone() };
        server.stopped().await;
        Ok(())
    }
}

/// Stops the tracker and the RPC server once the command future is dropped.
#[derive(Debug)]
struct StopOnDrop {
    parser: Arc<ServiceParser>,
    server: RpcServerHandle,
}

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        info!(target: "txwatch::cli", "shutting down");
        self.server.stop();
        self.parser.shutdown();
    }
}
