//! Machine-scope trusted-identity certificate store.

pub mod store;

pub use store::{CertificateStore, StoreCertificate, StoreError, StoreSession};
