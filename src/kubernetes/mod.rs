//! Kubernetes resource manifests
//!
//! Serde representations of the objects kompose writes and submits. Field
//! names follow the API's camelCase encoding; empty fields are omitted.

pub mod resources;
pub mod types;

pub use resources::{
    DaemonSet, Deployment, KubeResource, ReplicaSet, ReplicationController, ResourceKind, Scale,
    ScaleSpec, Service,
};
pub use types::{
    Container, ContainerPort, EnvVar, IntOrString, LabelSelector, ObjectMeta, PodSpec,
    PodTemplateSpec, RestartPolicy, ServicePort, Volume, VolumeMount,
};

/// Namespace used when the kubeconfig context does not name one
pub const DEFAULT_NAMESPACE: &str = "default";
