//! Local hosting harness for the voting web front end.
//!
//! Stands in for the orchestrator's hosting layer: builds the activation
//! context from command-line flags, opens every instance listener, and keeps
//! them running until Ctrl+C. In a real deployment the orchestrator performs
//! these steps and supplies the context itself.

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use voting_web::activation::integration::ListenerIntegration;
use voting_web::activation::listener::create_instance_listeners;
use voting_web::activation::naming;
use voting_web::{ActivationContext, AppServices, EndpointDescriptor, Startup, ENDPOINT_HTTPS};

#[derive(Parser, Debug)]
#[command(name = "voting-web", about = "Orchestrated HTTPS web front end")]
struct Args {
    /// Path to the settings file.
    #[arg(long, default_value = "appsettings.json")]
    settings: PathBuf,

    /// Application identity this instance belongs to.
    #[arg(long, default_value = "fabric:/VotingApplication")]
    application_name: String,

    /// Port declared for the EndpointHttps endpoint.
    #[arg(long, default_value_t = 8443)]
    https_port: u16,

    /// Host name advertised in published URLs.
    #[arg(long, default_value = "localhost")]
    node_host: String,
}

/// Minimal startup collaborator for the harness.
///
/// The real application's routes live behind this seam; here only a
/// liveness probe and an identity echo are wired.
struct HarnessStartup;

impl Startup for HarnessStartup {
    fn configure(&self, services: AppServices) -> Router {
        let application = services.context.application_name().to_string();
        let data_service = naming::data_service_uri(&services.context)
            .map(|u| u.to_string())
            .unwrap_or_default();

        Router::new()
            .route("/healthz", get(|| async { "ok" }))
            .route(
                "/identity",
                get(move || {
                    let body = format!("{application} -> {data_service}");
                    async move { body }
                }),
            )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voting_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    tracing::info!(
        application = %args.application_name,
        https_port = args.https_port,
        "voting-web v0.1.0 starting"
    );

    let context = Arc::new(ActivationContext::new(
        args.application_name.clone(),
        format!("{}/VotingWeb", args.application_name),
        [EndpointDescriptor::new(ENDPOINT_HTTPS, args.https_port)],
    ));

    let integration = ListenerIntegration::new(args.node_host);
    let bind_url: Url = format!("https://+:{}", args.https_port).parse()?;

    let mut handles = Vec::new();
    for instance in create_instance_listeners(context.clone(), Arc::new(HarnessStartup)) {
        let name = instance.name().to_string();
        let listener = instance
            .into_listener()
            .with_settings_path(args.settings.clone());

        let handle = listener.open(&bind_url, &integration).await?;
        tracing::info!(endpoint = %name, publish = %handle.publish_url(), "listener open");
        handles.push(handle);
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    for handle in handles {
        handle.shutdown().await?;
    }

    tracing::info!("shutdown complete");
    Ok(())
}
