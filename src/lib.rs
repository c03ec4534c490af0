//! Orchestrated HTTPS endpoint activation for the voting web front end.
//!
//! This crate is the bootstrap layer between a cluster orchestrator and the
//! web application proper. The orchestrator hands each service instance an
//! activation context (identity plus the endpoints declared in its manifest);
//! this crate turns that into a running TLS-terminated web server and hands
//! route wiring to the downstream [`Startup`] collaborator.
//!
//! # Activation flow
//!
//! ```text
//! orchestrator hosting layer
//!     │ create_instance_listeners(context, startup)
//!     ▼
//! [InstanceListener "EndpointHttps"]
//!     │ open(bind_url, integration)
//!     ▼
//! port lookup ──▶ settings load + watch ──▶ certificate store search
//!     │                                     (subject DN, scoped session)
//!     ▼
//! TLS server on [::]:port ──▶ Startup::configure(AppServices) ──▶ router
//!     │
//!     ▼
//! publish-URL reconciliation ──▶ WebServerHandle (start/stop)
//! ```
//!
//! There is no retry loop, no reconfiguration path, and no business logic
//! here; every failure either aborts the activation (the certificate cases)
//! or propagates untouched from the collaborator that produced it.

pub mod activation;
pub mod certs;
pub mod cluster;
pub mod config;
pub mod http;

pub use activation::context::{ActivationContext, EndpointDescriptor, ENDPOINT_HTTPS};
pub use activation::listener::{create_instance_listeners, InstanceListener, WebListener};
pub use config::schema::AppSettings;
pub use http::startup::{AppServices, Startup};
