//! Service activation context handed over by the orchestrator.
//!
//! The context is owned by the orchestrator and read-only here: identity
//! (application and service names) plus the endpoint table declared in the
//! instance's deployment manifest.

use std::collections::BTreeMap;

use thiserror::Error;

/// Logical name of the HTTPS endpoint this service declares in its manifest.
pub const ENDPOINT_HTTPS: &str = "EndpointHttps";

/// Lookup failure for an endpoint that was never declared in the manifest.
///
/// This is a configuration error external to the activation layer; it is
/// surfaced as-is, with no local handling.
#[derive(Debug, Clone, Error)]
#[error("endpoint {name:?} is not declared in the service manifest")]
pub struct EndpointNotFound {
    pub name: String,
}

/// A named, manifest-declared network port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    name: String,
    port: u16,
}

impl EndpointDescriptor {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Identity and endpoint table for one service instance.
///
/// Valid for the lifetime of the instance; shared via `Arc` with every
/// collaborator that needs it.
#[derive(Debug, Clone)]
pub struct ActivationContext {
    application_name: String,
    service_name: String,
    endpoints: BTreeMap<String, EndpointDescriptor>,
}

impl ActivationContext {
    pub fn new(
        application_name: impl Into<String>,
        service_name: impl Into<String>,
        endpoints: impl IntoIterator<Item = EndpointDescriptor>,
    ) -> Self {
        Self {
            application_name: application_name.into(),
            service_name: service_name.into(),
            endpoints: endpoints
                .into_iter()
                .map(|e| (e.name.clone(), e))
                .collect(),
        }
    }

    /// Application identity, e.g. `fabric:/VotingApplication`.
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Fully qualified name of this service instance.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Look up a declared endpoint by its logical name.
    pub fn endpoint(&self, name: &str) -> Result<&EndpointDescriptor, EndpointNotFound> {
        self.endpoints.get(name).ok_or_else(|| EndpointNotFound {
            name: name.to_string(),
        })
    }
}
