//! Application startup seam and process-lifetime singletons.

use std::sync::Arc;

use axum::Router;

use crate::activation::context::ActivationContext;
use crate::cluster::client::ClusterClient;
use crate::config::watcher::SharedSettings;

/// Process-lifetime collaborators handed to the downstream application.
///
/// Constructed once per activation and passed explicitly into
/// [`Startup::configure`]; no ambient registration, no globals.
#[derive(Clone)]
pub struct AppServices {
    /// Shared outbound HTTP client.
    pub http_client: reqwest::Client,

    /// Client for the orchestrator's management endpoint.
    pub cluster: Arc<ClusterClient>,

    /// The orchestrator-provided activation context.
    pub context: Arc<ActivationContext>,

    /// Live view of the settings file.
    pub settings: SharedSettings,
}

/// Downstream application startup collaborator.
///
/// Owns all route and middleware wiring; the activation layer only hands it
/// the singleton registry and serves whatever router it returns.
pub trait Startup: Send + Sync {
    fn configure(&self, services: AppServices) -> Router;
}
