//! Endpoint activation: from a declared endpoint to a running TLS server.
//!
//! `create_instance_listeners` is the entry point the orchestrator's hosting
//! layer calls at instance startup. Each returned descriptor names a logical
//! endpoint and carries the factory the hosting layer opens with the bind
//! URL it wants advertised.

use std::path::PathBuf;
use std::sync::Arc;

use notify::RecommendedWatcher;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::activation::context::{ActivationContext, EndpointNotFound, ENDPOINT_HTTPS};
use crate::activation::integration::{IntegrationError, ListenerIntegration};
use crate::certs::store::{CertificateStore, StoreError};
use crate::cluster::client::ClusterClient;
use crate::config::loader::{load_settings, SettingsError};
use crate::config::watcher;
use crate::http::server::{self, RunningServer, ServerError};
use crate::http::startup::{AppServices, Startup};

/// Errors raised (or passed through) while opening a listener.
///
/// Only the two certificate cases originate here; everything else is a
/// collaborator failure propagated unchanged. All of them abort the
/// activation with no partial state retained.
#[derive(Debug, Error)]
pub enum ActivationError {
    #[error(transparent)]
    Endpoint(#[from] EndpointNotFound),
    #[error("certificate subject name is not configured; set certificate.subject_name in the settings file")]
    SubjectNotConfigured,
    #[error("https certificate with subject {subject:?} was not found in the trusted-identity store")]
    CertificateNotFound { subject: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("settings watcher failed to start: {0}")]
    Watch(#[from] notify::Error),
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Create the listener descriptors for one service instance.
///
/// Eagerly built; every call returns a fresh, independent sequence. The
/// single entry is the HTTPS endpoint declared as [`ENDPOINT_HTTPS`] in the
/// deployment manifest. Nothing binds until the hosting layer opens it.
pub fn create_instance_listeners(
    context: Arc<ActivationContext>,
    startup: Arc<dyn Startup>,
) -> Vec<InstanceListener> {
    vec![InstanceListener {
        name: ENDPOINT_HTTPS.to_string(),
        listener: WebListener::new(context, startup, ENDPOINT_HTTPS),
    }]
}

/// A listener descriptor: logical endpoint name plus its factory.
pub struct InstanceListener {
    name: String,
    listener: WebListener,
}

impl InstanceListener {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listener(&self) -> &WebListener {
        &self.listener
    }

    pub fn into_listener(self) -> WebListener {
        self.listener
    }
}

/// Factory for the HTTPS web listener.
///
/// Single-shot: `open` runs once per instance lifetime and either returns a
/// running server handle or fails the activation outright.
pub struct WebListener {
    context: Arc<ActivationContext>,
    startup: Arc<dyn Startup>,
    endpoint_name: String,
    settings_path: PathBuf,
}

impl WebListener {
    pub fn new(
        context: Arc<ActivationContext>,
        startup: Arc<dyn Startup>,
        endpoint_name: impl Into<String>,
    ) -> Self {
        Self {
            context,
            startup,
            endpoint_name: endpoint_name.into(),
            settings_path: PathBuf::from("appsettings.json"),
        }
    }

    /// Override the settings file location (default: `appsettings.json` in
    /// the working directory).
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = path.into();
        self
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    /// Build and start the web server for this endpoint.
    ///
    /// Resolves the port from the manifest endpoint table, loads the
    /// required settings file and starts its change watcher, resolves the
    /// TLS certificate from the trusted-identity store by configured
    /// subject name, wires the singleton registry into the startup
    /// collaborator, and serves on the dual-stack wildcard address. The
    /// returned handle advertises the URL reconciled by `integration`.
    pub async fn open(
        &self,
        bind_url: &Url,
        integration: &ListenerIntegration,
    ) -> Result<WebServerHandle, ActivationError> {
        let port = self.context.endpoint(&self.endpoint_name)?.port();

        tracing::info!(
            service = %self.context.service_name(),
            url = %bind_url,
            "starting web listener"
        );

        let initial = load_settings(&self.settings_path)?;
        let (settings, settings_watcher) = watcher::watch(self.settings_path.clone(), initial)?;

        let snapshot = settings.load_full();
        let subject = snapshot
            .certificate
            .subject_name
            .clone()
            .ok_or(ActivationError::SubjectNotConfigured)?;

        let store = CertificateStore::at(&snapshot.certificate.store_path);
        let identity = {
            // scoped session: released on every exit path, including the
            // not-found failure below
            let session = store.open_read_only()?;
            let mut matches = session.find_by_subject(&subject)?;
            if matches.is_empty() {
                return Err(ActivationError::CertificateNotFound { subject });
            }
            // first match in enumeration order, no further disambiguation
            matches.remove(0)
        };

        tracing::debug!(
            subject = %identity.subject(),
            path = %identity.path().display(),
            "https certificate resolved"
        );

        let tls = server::tls_config(&identity).await?;

        let http_client = reqwest::Client::new();
        let services = AppServices {
            http_client: http_client.clone(),
            cluster: Arc::new(ClusterClient::new(
                snapshot.cluster.management_endpoint.clone(),
                http_client,
            )),
            context: self.context.clone(),
            settings,
        };

        let router = self
            .startup
            .configure(services)
            .layer(TraceLayer::new_for_http());

        let server = server::serve(port, tls, router).await?;
        let publish_url = integration.publish_url(bind_url, server.local_addr())?;

        tracing::info!(
            address = %server.local_addr(),
            publish = %publish_url,
            "web listener open"
        );

        Ok(WebServerHandle {
            server,
            publish_url,
            _settings_watcher: settings_watcher,
        })
    }
}

/// Handle to an open listener: the running server, the URL the orchestrator
/// advertises for it, and the settings watcher kept alive alongside.
pub struct WebServerHandle {
    server: RunningServer,
    publish_url: Url,
    _settings_watcher: RecommendedWatcher,
}

impl std::fmt::Debug for WebServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServerHandle")
            .field("local_addr", &self.server.local_addr())
            .field("publish_url", &self.publish_url)
            .finish_non_exhaustive()
    }
}

impl WebServerHandle {
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.server.local_addr()
    }

    /// The reconciled URL to advertise for service discovery.
    pub fn publish_url(&self) -> &Url {
        &self.publish_url
    }

    /// Gracefully stop the server.
    pub async fn shutdown(self) -> Result<(), ActivationError> {
        self.server.shutdown().await?;
        Ok(())
    }
}
