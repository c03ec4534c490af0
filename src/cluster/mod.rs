//! Cluster management access.

pub mod client;

pub use client::{ClusterClient, ClusterError, ResolvedService};
