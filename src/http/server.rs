//! TLS server construction and lifecycle.
//!
//! # Responsibilities
//! - Bind the wildcard dual-stack address at the resolved port
//! - Terminate TLS with the store-resolved certificate
//! - Disable send-delay (TCP_NODELAY) on accepted connections
//! - Expose start/stop semantics through a handle

use std::io;
use std::net::{Ipv6Addr, SocketAddr};
use std::time::Duration;

use axum::Router;
use axum_server::accept::NoDelayAcceptor;
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use axum_server::Handle;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::certs::store::StoreCertificate;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to load tls material: {0}")]
    Tls(#[source] io::Error),
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Build the rustls server configuration from a store certificate.
pub async fn tls_config(identity: &StoreCertificate) -> Result<RustlsConfig, ServerError> {
    RustlsConfig::from_der(identity.chain_der().to_vec(), identity.key_der().to_vec())
        .await
        .map_err(ServerError::Tls)
}

/// Bind `[::]:port` and serve the router over TLS.
///
/// Binding the IPv6 unspecified address gives a dual-stack wildcard socket
/// on hosts with dual-stack sockets enabled. Returns once the listening
/// socket is live; bind failures surface from the serve task unchanged.
pub async fn serve(
    port: u16,
    tls: RustlsConfig,
    router: Router,
) -> Result<RunningServer, ServerError> {
    let addr = SocketAddr::from((Ipv6Addr::UNSPECIFIED, port));
    let acceptor = RustlsAcceptor::new(tls).acceptor(NoDelayAcceptor::new());
    let handle = Handle::new();

    let server = axum_server::bind(addr)
        .acceptor(acceptor)
        .handle(handle.clone());
    let app = router.into_make_service();
    let task = tokio::spawn(async move { server.serve(app).await });

    match handle.listening().await {
        Some(local_addr) => {
            tracing::info!(address = %local_addr, "https server listening");
            Ok(RunningServer {
                handle,
                task,
                local_addr,
            })
        }
        // the serve task already exited; recover its error
        None => match task.await {
            Ok(Err(e)) => Err(ServerError::Serve(e)),
            Ok(Ok(())) => Err(ServerError::Serve(io::Error::other(
                "server exited before listening",
            ))),
            Err(join) => Err(ServerError::Task(join)),
        },
    }
}

/// A live TLS server with start/stop semantics.
pub struct RunningServer {
    handle: Handle,
    task: JoinHandle<io::Result<()>>,
    local_addr: SocketAddr,
}

impl RunningServer {
    /// The address the server actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections, drain in-flight requests, and wait for
    /// the serve task to finish.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.handle.graceful_shutdown(Some(Duration::from_secs(10)));
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ServerError::Serve(e)),
            Err(join) => Err(ServerError::Task(join)),
        }
    }
}
