use crate::{ParserApiServer, ParserRpc};
use jsonrpsee::server::{ServerBuilder, ServerHandle};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use txwatch_tracker::Parser;

/// Errors while starting the RPC server.
#[derive(Debug, thiserror::Error)]
pub enum RpcServerError {
    /// Binding or starting the server failed.
    #[error("failed to start the RPC server on {addr}: {source}")]
    Start {
        /// The requested listen address.
        addr: SocketAddr,
        /// The underlying error.
        #[source]
        source: jsonrpsee::core::Error,
    },
}

/// A running RPC server.
///
/// The server keeps running when the handle is dropped; call [`RpcServerHandle::stop`].
#[derive(Debug, Clone)]
pub struct RpcServerHandle {
    local_addr: SocketAddr,
    handle: ServerHandle,
}

impl RpcServerHandle {
    /// The address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The HTTP url of the server.
    pub fn http_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Tells the server to stop. Does nothing if it already stopped.
    pub fn stop(&self) {
        let _ = self.handle.stop();
    }

    /// Resolves once the server has stopped.
    pub async fn stopped(self) {
        self.handle.stopped().await
    }
}

/// Serves `parser` over HTTP and WebSocket on `addr`.
pub async fn launch<P>(parser: Arc<P>, addr: SocketAddr) -> Result<RpcServerHandle, RpcServerError>
where
    P: Parser + ?Sized + 'static,
{
    let server = ServerBuilder::default()
        .build(addr)
        .await
        .map_err(|source| RpcServerError::Start { addr, source })?;
    let local_addr = server.local_addr().map_err(|source| RpcServerError::Start { addr, source })?;
    let handle = server
        .start(ParserRpc::new(parser).into_rpc())
        .map_err(|source| RpcServerError::Start { addr, source })?;

    info!(target: "rpc", %local_addr, "RPC server started");
    Ok(RpcServerHandle { local_addr, handle })
}
