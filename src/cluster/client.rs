//! Thin client for the orchestrator's HTTP management endpoint.
//!
//! One instance lives for the whole process and is shared read-only through
//! the singleton registry. Only the calls the web tier actually needs are
//! surfaced here; the orchestrator's management API is otherwise external.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("management endpoint url is invalid: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("management request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("management endpoint returned status {0}")]
    Status(StatusCode),
}

/// Published endpoints for a resolved service.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedService {
    pub name: String,
    pub endpoints: Vec<Url>,
}

/// Client for the cluster's management endpoint.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    management_endpoint: Url,
    http: reqwest::Client,
}

impl ClusterClient {
    pub fn new(management_endpoint: Url, http: reqwest::Client) -> Self {
        Self {
            management_endpoint,
            http,
        }
    }

    pub fn management_endpoint(&self) -> &Url {
        &self.management_endpoint
    }

    /// Resolve the published endpoints of a logical service name.
    pub async fn resolve_service(&self, service: &Url) -> Result<ResolvedService, ClusterError> {
        let mut url = self.management_endpoint.join("v1/services/resolve")?;
        url.query_pairs_mut()
            .append_pair("service", service.as_str());

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClusterError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}
