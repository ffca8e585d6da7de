//! kompose - Convert Docker Compose projects into Kubernetes manifests
//!
//! kompose reads a compose file and generates the Kubernetes objects that run
//! the same services:
//!
//! - Services and ReplicationControllers for every compose service
//! - Optional Deployments, DaemonSets and ReplicaSets
//! - JSON or YAML output, per resource, aggregated, or on stdout
//! - Submitting generated manifests to a cluster and managing them there

pub mod cluster;
pub mod compose;
pub mod convert;
pub mod error;
pub mod kubernetes;

pub use error::{KomposeError, Result};
