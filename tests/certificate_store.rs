//! Certificate resolution tests: fatal-absence semantics and the
//! deterministic first-match tie-break.

use std::sync::Arc;

use tempfile::TempDir;
use url::Url;

use voting_web::activation::integration::ListenerIntegration;
use voting_web::activation::listener::{create_instance_listeners, ActivationError};
use voting_web::certs::store::{CertificateStore, StoreError};
use voting_web::{ActivationContext, EndpointDescriptor, ENDPOINT_HTTPS};

mod common;

const SUBJECT: &str = "CN=chinanorth2.cloudapp.chinacloudapi.cn";

fn context(port: u16) -> Arc<ActivationContext> {
    Arc::new(ActivationContext::new(
        "fabric:/VotingApplication",
        "fabric:/VotingApplication/VotingWeb",
        [EndpointDescriptor::new(ENDPOINT_HTTPS, port)],
    ))
}

fn bind_url(port: u16) -> Url {
    format!("https://+:{port}").parse().unwrap()
}

#[tokio::test]
async fn missing_certificate_is_fatal_and_names_the_subject() {
    let port = 28447;
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    std::fs::create_dir(&store).unwrap();
    // a certificate for a different subject only
    common::write_store_certificate(&store, "other", "CN=somewhere.else.example");
    let settings = common::write_settings(dir.path(), Some(SUBJECT), &store);

    let integration = ListenerIntegration::new("localhost");

    // repeated failing activations must not leak store sessions
    for _ in 0..50 {
        let listeners = create_instance_listeners(context(port), Arc::new(common::TestStartup));
        let listener = listeners
            .into_iter()
            .next()
            .unwrap()
            .into_listener()
            .with_settings_path(&settings);

        let err = listener
            .open(&bind_url(port), &integration)
            .await
            .unwrap_err();
        assert!(matches!(err, ActivationError::CertificateNotFound { .. }));
        assert!(err.to_string().contains(SUBJECT));
    }

    // the store is still fully usable after every failure
    let session = CertificateStore::at(&store).open_read_only().unwrap();
    assert!(session.find_by_subject(SUBJECT).unwrap().is_empty());
}

#[tokio::test]
async fn unconfigured_subject_is_fatal() {
    let port = 28448;
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    std::fs::create_dir(&store).unwrap();
    common::write_store_certificate(&store, "web", SUBJECT);
    let settings = common::write_settings(dir.path(), None, &store);

    let listeners = create_instance_listeners(context(port), Arc::new(common::TestStartup));
    let listener = listeners
        .into_iter()
        .next()
        .unwrap()
        .into_listener()
        .with_settings_path(&settings);

    let integration = ListenerIntegration::new("localhost");
    let err = listener
        .open(&bind_url(port), &integration)
        .await
        .unwrap_err();
    assert!(matches!(err, ActivationError::SubjectNotConfigured));
}

#[tokio::test]
async fn first_store_match_wins_deterministically() {
    let port = 28449;
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    std::fs::create_dir(&store).unwrap();
    // two certificates with the same subject; file-name order decides
    let alpha_der = common::write_store_certificate(&store, "alpha", SUBJECT);
    let beta_der = common::write_store_certificate(&store, "beta", SUBJECT);
    assert_ne!(alpha_der, beta_der);
    let settings = common::write_settings(dir.path(), Some(SUBJECT), &store);

    let session = CertificateStore::at(&store).open_read_only().unwrap();
    let matches = session.find_by_subject(SUBJECT).unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].leaf_der(), alpha_der.as_slice());
    assert_eq!(matches[1].leaf_der(), beta_der.as_slice());
    drop(session);

    let listeners = create_instance_listeners(context(port), Arc::new(common::TestStartup));
    let listener = listeners
        .into_iter()
        .next()
        .unwrap()
        .into_listener()
        .with_settings_path(&settings);

    let integration = ListenerIntegration::new("localhost");
    let handle = listener.open(&bind_url(port), &integration).await.unwrap();

    let probe_addr = format!("127.0.0.1:{port}").parse().unwrap();
    let presented = common::probe_presented_certificate(probe_addr).await;
    assert_eq!(presented, alpha_der);

    handle.shutdown().await.unwrap();
}

#[test]
fn find_by_subject_skips_other_subjects() {
    let dir = TempDir::new().unwrap();
    common::write_store_certificate(dir.path(), "web", SUBJECT);
    common::write_store_certificate(dir.path(), "other", "CN=somewhere.else.example");

    let session = CertificateStore::at(dir.path()).open_read_only().unwrap();
    let matches = session.find_by_subject(SUBJECT).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].subject(), SUBJECT);

    // the certificate itself carries exactly the searched DN, with a single
    // CN attribute and no doubled prefix
    let (_, cert) = x509_parser::parse_x509_certificate(matches[0].leaf_der()).unwrap();
    assert_eq!(cert.subject().to_string(), SUBJECT);
}

#[test]
fn certificate_without_a_key_is_an_error() {
    let dir = TempDir::new().unwrap();
    common::write_store_certificate(dir.path(), "web", SUBJECT);
    std::fs::remove_file(dir.path().join("web.key")).unwrap();

    let session = CertificateStore::at(dir.path()).open_read_only().unwrap();
    let err = session.find_by_subject(SUBJECT).unwrap_err();
    assert!(matches!(err, StoreError::MissingKey { .. }));
}

#[test]
fn missing_store_directory_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-store");

    let err = CertificateStore::at(&missing).open_read_only().unwrap_err();
    assert!(matches!(err, StoreError::Open { .. }));
}
