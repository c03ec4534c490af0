//! Read-only access to the trusted-identity store.
//!
//! The store is a directory of PEM certificates (`.pem`, `.crt` or `.cer`),
//! each with its private key in a sibling file sharing the stem with a
//! `.key` extension. Sessions are scoped: a session snapshots the directory
//! listing at open time and is released when dropped, on every exit path.
//!
//! Enumeration order is lexicographic by file name, which makes "first
//! match" deterministic for a fixed store state.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use x509_parser::parse_x509_certificate;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open certificate store {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read certificate {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("certificate {path} is not valid PEM: {source}")]
    Pem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("certificate {path} is not valid X.509: {detail}")]
    X509 { path: PathBuf, detail: String },
    #[error("certificate {path} has no private key alongside it (expected {key_path})")]
    MissingKey { path: PathBuf, key_path: PathBuf },
    #[error("private key {path} is not valid PEM")]
    BadKey { path: PathBuf },
}

/// Handle to a trusted-identity store rooted at a directory.
#[derive(Debug, Clone)]
pub struct CertificateStore {
    root: PathBuf,
}

impl CertificateStore {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open a read-only session over the store.
    ///
    /// The session holds a snapshot of the certificate files present at open
    /// time, sorted by file name.
    pub fn open_read_only(&self) -> Result<StoreSession, StoreError> {
        let dir = fs::read_dir(&self.root).map_err(|source| StoreError::Open {
            path: self.root.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|source| StoreError::Open {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("pem" | "crt" | "cer")
            ) {
                entries.push(path);
            }
        }
        entries.sort();

        Ok(StoreSession { entries })
    }
}

/// Scoped read-only session; dropped (released) when it goes out of scope.
#[derive(Debug)]
pub struct StoreSession {
    entries: Vec<PathBuf>,
}

impl StoreSession {
    /// Find certificates whose subject distinguished name exactly equals
    /// `subject`, e.g. `CN=chinanorth2.cloudapp.chinacloudapi.cn`.
    ///
    /// Matches come back in the session's enumeration order. No further
    /// disambiguation (validity period, issuer, key usage) is applied.
    pub fn find_by_subject(&self, subject: &str) -> Result<Vec<StoreCertificate>, StoreError> {
        let mut matches = Vec::new();

        for path in &self.entries {
            let chain = read_chain(path)?;
            let Some(leaf) = chain.first() else {
                continue;
            };

            let (_, cert) =
                parse_x509_certificate(leaf).map_err(|e| StoreError::X509 {
                    path: path.clone(),
                    detail: e.to_string(),
                })?;

            if cert.subject().to_string() == subject {
                let key_der = read_key(path)?;
                matches.push(StoreCertificate {
                    path: path.clone(),
                    subject: subject.to_string(),
                    chain_der: chain,
                    key_der,
                });
            }
        }

        Ok(matches)
    }
}

/// A certificate selected from the store, with its full chain and key.
#[derive(Clone)]
pub struct StoreCertificate {
    path: PathBuf,
    subject: String,
    chain_der: Vec<Vec<u8>>,
    key_der: Vec<u8>,
}

// manual impl: key material stays out of log output
impl std::fmt::Debug for StoreCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCertificate")
            .field("path", &self.path)
            .field("subject", &self.subject)
            .field("chain_len", &self.chain_der.len())
            .finish_non_exhaustive()
    }
}

impl StoreCertificate {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// DER certificate chain, leaf first. Never empty.
    pub fn chain_der(&self) -> &[Vec<u8>] {
        &self.chain_der
    }

    pub fn leaf_der(&self) -> &[u8] {
        &self.chain_der[0]
    }

    pub fn key_der(&self) -> &[u8] {
        &self.key_der
    }
}

fn read_chain(path: &Path) -> Result<Vec<Vec<u8>>, StoreError> {
    let data = fs::read(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let chain = rustls_pemfile::certs(&mut data.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| StoreError::Pem {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(chain.into_iter().map(|c| c.as_ref().to_vec()).collect())
}

fn read_key(cert_path: &Path) -> Result<Vec<u8>, StoreError> {
    let key_path = cert_path.with_extension("key");
    let data = fs::read(&key_path).map_err(|_| StoreError::MissingKey {
        path: cert_path.to_path_buf(),
        key_path: key_path.clone(),
    })?;

    let key = rustls_pemfile::private_key(&mut data.as_slice())
        .map_err(|_| StoreError::BadKey {
            path: key_path.clone(),
        })?
        .ok_or(StoreError::BadKey { path: key_path })?;

    Ok(key.secret_der().to_vec())
}
