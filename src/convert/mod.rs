//! Compose to Kubernetes conversion
//!
//! Each compose service becomes a Service plus a ReplicationController, and
//! optionally a Deployment, DaemonSet or ReplicaSet. Manifests are written as
//! JSON or YAML to one file per resource, one aggregate file, or stdout.

pub mod builder;
pub mod converter;
pub mod mapper;
pub mod serializer;
pub mod sink;
pub mod unsupported;

pub use builder::{build_resources, ResourceSet};
pub use converter::{ConversionSummary, ConvertOptions, Converter, Manifests};
pub use serializer::{serialize, OutputFormat};
pub use sink::{OutputSink, OutputTarget};
