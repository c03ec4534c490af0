//! Orchestrator-integration adapter.
//!
//! The orchestrator hands the listener a logical bind URL (typically with a
//! wildcard host, e.g. `https://+:8443`) and expects the address it should
//! advertise for service discovery back. Reconciliation replaces the
//! wildcard host with the node's discovery host and the port with the one
//! the server actually bound.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

/// The bind URL could not carry the reconciled host or port.
#[derive(Debug, Clone, Error)]
#[error("bind url {url} cannot be reconciled with the bound address")]
pub struct IntegrationError {
    pub url: Url,
}

/// Adapter reconciling bound addresses with orchestrator-advertised URLs.
#[derive(Debug, Clone)]
pub struct ListenerIntegration {
    node_host: String,
}

impl ListenerIntegration {
    pub fn new(node_host: impl Into<String>) -> Self {
        Self {
            node_host: node_host.into(),
        }
    }

    pub fn node_host(&self) -> &str {
        &self.node_host
    }

    /// Compute the URL to advertise for service discovery.
    ///
    /// Wildcard hosts (`+`, `0.0.0.0`, `[::]`) are replaced by the node
    /// host; a concrete host in the bind URL is kept as-is. The port is
    /// always taken from the actually bound address.
    pub fn publish_url(&self, bind_url: &Url, bound: SocketAddr) -> Result<Url, IntegrationError> {
        let mut url = bind_url.clone();

        let wildcard = matches!(url.host_str(), None | Some("+" | "0.0.0.0" | "[::]"));
        if wildcard {
            url.set_host(Some(self.node_host.as_str()))
                .map_err(|_| IntegrationError {
                    url: bind_url.clone(),
                })?;
        }
        url.set_port(Some(bound.port()))
            .map_err(|_| IntegrationError {
                url: bind_url.clone(),
            })?;

        Ok(url)
    }
}
