//! Orchestrator-facing activation surface.
//!
//! The orchestrator's hosting layer calls [`listener::create_instance_listeners`]
//! once per instance, then opens each returned listener with the bind URL it
//! wants advertised. Everything in this module is single-shot: a fresh
//! descriptor sequence per call, one `open` per listener lifetime.

pub mod context;
pub mod integration;
pub mod listener;
pub mod naming;

pub use context::{ActivationContext, EndpointDescriptor, ENDPOINT_HTTPS};
pub use integration::ListenerIntegration;
pub use listener::{create_instance_listeners, InstanceListener, WebListener, WebServerHandle};
