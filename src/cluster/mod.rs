//! Cluster access
//!
//! Submits converted manifests to a Kubernetes API server and manages the
//! services and replication controllers of a compose project.

pub mod client;
pub mod commands;
#[cfg(test)]
pub(crate) mod fake;
pub mod kubeconfig;
pub mod uploader;

pub use client::{ClusterApi, HttpClusterClient};
pub use kubeconfig::{ClusterConfig, ClusterOverrides, Kubeconfig};
pub use uploader::{UploadSummary, Uploader};
