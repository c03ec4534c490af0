//! Settings schema definitions.
//!
//! All types derive Serde traits for deserialization from the JSON settings
//! file; every section has defaults so a minimal file stays valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Root settings for the web service instance.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppSettings {
    /// TLS certificate resolution.
    pub certificate: CertificateSettings,

    /// Cluster management access.
    pub cluster: ClusterSettings,
}

/// Where to find the HTTPS certificate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CertificateSettings {
    /// Exact subject distinguished name of the server certificate,
    /// e.g. `CN=chinanorth2.cloudapp.chinacloudapi.cn`.
    ///
    /// Required for the HTTPS listener; leaving it unset fails activation.
    pub subject_name: Option<String>,

    /// Root directory of the machine trusted-identity store.
    pub store_path: PathBuf,
}

impl Default for CertificateSettings {
    fn default() -> Self {
        Self {
            subject_name: None,
            store_path: PathBuf::from("/etc/ssl/trusted-identities"),
        }
    }
}

/// Cluster management endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterSettings {
    /// Base URL of the orchestrator's HTTP management endpoint.
    pub management_endpoint: Url,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            management_endpoint: Url::parse("http://localhost:19080")
                .expect("default management endpoint is a valid url"),
        }
    }
}
