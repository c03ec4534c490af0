//! Shared utilities for activation and certificate-store tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::Router;
use rcgen::{CertificateParams, DnType, KeyPair};
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{ClientConfig, DigitallySignedStruct, Error, SignatureScheme};

use voting_web::{AppServices, Startup};

/// Startup collaborator used by the tests: a single echo route.
pub struct TestStartup;

impl Startup for TestStartup {
    fn configure(&self, services: AppServices) -> Router {
        let application = services.context.application_name().to_string();
        Router::new().route(
            "/",
            axum::routing::get(move || {
                let application = application.clone();
                async move { application }
            }),
        )
    }
}

/// Write a self-signed certificate and its key into a store directory.
///
/// Takes the full subject DN (`CN=<common name>`) so call sites read like
/// the store searches they feed. Uses `<stem>.pem` / `<stem>.key` file
/// names; returns the certificate DER so tests can compare what a handshake
/// later presents.
pub fn write_store_certificate(store: &Path, stem: &str, subject: &str) -> Vec<u8> {
    // the DN attribute carries the bare common name, not the CN= prefix
    let common_name = subject.strip_prefix("CN=").unwrap_or(subject);

    let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    let mut dn = rcgen::DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;

    let key = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();

    std::fs::write(store.join(format!("{stem}.pem")), cert.pem()).unwrap();
    std::fs::write(store.join(format!("{stem}.key")), key.serialize_pem()).unwrap();

    cert.der().to_vec()
}

/// Write a settings file pointing at the given store.
pub fn write_settings(dir: &Path, subject: Option<&str>, store_path: &Path) -> PathBuf {
    let path = dir.join("appsettings.json");
    let settings = serde_json::json!({
        "certificate": {
            "subject_name": subject,
            "store_path": store_path,
        },
        "cluster": {
            "management_endpoint": "http://localhost:19080",
        },
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&settings).unwrap()).unwrap();
    path
}

/// Verifier that accepts any server certificate and records the end entity.
#[derive(Debug)]
struct CaptureVerifier {
    seen: Arc<Mutex<Option<Vec<u8>>>>,
}

impl ServerCertVerifier for CaptureVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        *self.seen.lock().unwrap() = Some(end_entity.as_ref().to_vec());
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ED25519,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PKCS1_SHA256,
        ]
    }
}

/// Run a TLS handshake against `addr` and return the certificate the server
/// presented as its end entity.
pub async fn probe_presented_certificate(addr: SocketAddr) -> Vec<u8> {
    let seen = Arc::new(Mutex::new(None));
    let verifier = Arc::new(CaptureVerifier { seen: seen.clone() });

    let config = ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth();

    let connector = tokio_rustls::TlsConnector::from(Arc::new(config));
    let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let domain = ServerName::try_from("localhost").unwrap();
    let _tls = connector.connect(domain, stream).await.unwrap();

    let presented = seen.lock().unwrap().take();
    presented.expect("server presented no certificate")
}
