//! Admin API server.

use crate::admin_api::router::route_request;
use crate::repository::MockRepository;
use crate::resolver::MockResolver;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Shared state handed to every connection.
pub struct AdminState {
    pub repository: Arc<MockRepository>,
    pub resolver: MockResolver,
}

/// HTTP server hosting the admin API and the mock interception path.
pub struct AdminApiServer {
    listener: TcpListener,
    state: Arc<AdminState>,
}

impl AdminApiServer {
    /// Bind the listener. Serving starts with [`AdminApiServer::run`].
    pub async fn bind(addr: SocketAddr, state: Arc<AdminState>) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, state })
    }

    /// The address the server is bound to (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, anyhow::Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections until the process terminates.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        info!(
            "Mockbird listening on http://{}",
            self.listener.local_addr()?
        );

        loop {
            let (stream, _) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { route_request(req, state).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Connection error: {}", e);
                }
            });
        }
    }
}
