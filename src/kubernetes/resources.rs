//! Top-level resource objects

use super::types::{LabelSelector, ObjectMeta, PodTemplateSpec, ServicePort};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kinds of resource the converter emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Service,
    ReplicationController,
    Deployment,
    DaemonSet,
    ReplicaSet,
}

impl ResourceKind {
    /// Suffix used in generated file names
    pub fn suffix(&self) -> &'static str {
        match self {
            ResourceKind::Service => "svc",
            ResourceKind::ReplicationController => "rc",
            ResourceKind::Deployment => "deployment",
            ResourceKind::DaemonSet => "daemonset",
            ResourceKind::ReplicaSet => "replicaset",
        }
    }

    /// The `kind` field value
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceKind::Service => "Service",
            ResourceKind::ReplicationController => "ReplicationController",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::ReplicaSet => "ReplicaSet",
        }
    }

    /// The `apiVersion` field value
    pub fn api_version(&self) -> &'static str {
        match self {
            ResourceKind::Service | ResourceKind::ReplicationController => "v1",
            ResourceKind::Deployment | ResourceKind::DaemonSet | ResourceKind::ReplicaSet => {
                "extensions/v1beta1"
            }
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Service => write!(f, "service"),
            ResourceKind::ReplicationController => write!(f, "replication controller"),
            ResourceKind::Deployment => write!(f, "deployment"),
            ResourceKind::DaemonSet => write!(f, "daemon set"),
            ResourceKind::ReplicaSet => write!(f, "replica set"),
        }
    }
}

/// A serializable top-level object
pub trait KubeResource: Serialize {
    /// Kind of this object
    const KIND: ResourceKind;
}

macro_rules! kube_resource {
    ($ty:ident, $kind:expr) => {
        impl KubeResource for $ty {
            const KIND: ResourceKind = $kind;
        }
    };
}

/// Service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    pub kind: String,
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: ServiceSpec,
}

/// Service specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Exposed ports
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ServicePort>,
    /// Pod selector
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub selector: BTreeMap<String, String>,
    /// Cluster IP assigned by the control plane
    #[serde(rename = "clusterIP", skip_serializing_if = "Option::is_none")]
    pub cluster_ip: Option<String>,
}

/// Replication controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplicationController {
    pub kind: String,
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: ReplicationControllerSpec,
}

/// Replication controller specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationControllerSpec {
    /// Desired replica count
    pub replicas: i32,
    /// Pod selector
    pub selector: BTreeMap<String, String>,
    /// Pod template
    pub template: PodTemplateSpec,
}

/// Deployment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deployment {
    pub kind: String,
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: DeploymentSpec,
}

/// Deployment specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentSpec {
    /// Desired replica count
    pub replicas: i32,
    /// Pod selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    /// Pod template
    pub template: PodTemplateSpec,
}

/// Daemon set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DaemonSet {
    pub kind: String,
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: DaemonSetSpec,
}

/// Daemon set specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSetSpec {
    /// Pod selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    /// Pod template
    pub template: PodTemplateSpec,
}

/// Replica set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplicaSet {
    pub kind: String,
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: ReplicaSetSpec,
}

/// Replica set specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaSetSpec {
    /// Desired replica count
    pub replicas: i32,
    /// Pod selector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    /// Pod template
    pub template: PodTemplateSpec,
}

kube_resource!(Service, ResourceKind::Service);
kube_resource!(ReplicationController, ResourceKind::ReplicationController);
kube_resource!(Deployment, ResourceKind::Deployment);
kube_resource!(DaemonSet, ResourceKind::DaemonSet);
kube_resource!(ReplicaSet, ResourceKind::ReplicaSet);

/// Scale subresource of a replication controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scale {
    pub kind: String,
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: ScaleSpec,
}

/// Scale specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleSpec {
    /// Desired replica count
    pub replicas: i32,
}
