//! Resource construction for a single compose service

use super::mapper::{map_container_ports, map_envs, map_service_ports, map_volumes};
use crate::compose::ServiceDescriptor;
use crate::error::{KomposeError, Result};
use crate::kubernetes::resources::{
    DaemonSetSpec, DeploymentSpec, ReplicaSetSpec, ReplicationControllerSpec, ServiceSpec,
};
use crate::kubernetes::types::{LabelSelector, SecurityContext};
use crate::kubernetes::{
    Container, DaemonSet, Deployment, KubeResource, ObjectMeta, PodTemplateSpec, ReplicaSet,
    ReplicationController, RestartPolicy, Service,
};
use std::collections::BTreeMap;

/// Label every generated object carries
pub const SERVICE_LABEL: &str = "service";

/// All five resources generated for one compose service
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSet {
    pub service: Service,
    pub replication_controller: ReplicationController,
    pub deployment: Deployment,
    pub daemon_set: DaemonSet,
    pub replica_set: ReplicaSet,
}

impl ResourceSet {
    /// Pod templates of the four controllers
    pub fn templates(&self) -> [&PodTemplateSpec; 4] {
        [
            &self.replication_controller.spec.template,
            &self.deployment.spec.template,
            &self.daemon_set.spec.template,
            &self.replica_set.spec.template,
        ]
    }
}

fn selector(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(SERVICE_LABEL.to_string(), name.to_string())])
}

fn template(name: &str, image: &str) -> PodTemplateSpec {
    let mut template = PodTemplateSpec::default();
    template.spec.containers.push(Container {
        name: name.to_string(),
        image: image.to_string(),
        ..Default::default()
    });
    template
}

/// Service skeleton
pub fn init_service(name: &str) -> Service {
    Service {
        kind: Service::KIND.kind().to_string(),
        api_version: Service::KIND.api_version().to_string(),
        metadata: ObjectMeta::named(name),
        spec: ServiceSpec {
            selector: selector(name),
            ..Default::default()
        },
    }
}

/// Replication controller skeleton
pub fn init_replication_controller(name: &str, image: &str) -> ReplicationController {
    ReplicationController {
        kind: ReplicationController::KIND.kind().to_string(),
        api_version: ReplicationController::KIND.api_version().to_string(),
        metadata: ObjectMeta::named(name),
        spec: ReplicationControllerSpec {
            replicas: 1,
            selector: selector(name),
            template: template(name, image),
        },
    }
}

/// Deployment skeleton
pub fn init_deployment(name: &str, image: &str) -> Deployment {
    Deployment {
        kind: Deployment::KIND.kind().to_string(),
        api_version: Deployment::KIND.api_version().to_string(),
        metadata: ObjectMeta::named(name),
        spec: DeploymentSpec {
            replicas: 1,
            selector: Some(LabelSelector {
                match_labels: selector(name),
            }),
            template: template(name, image),
        },
    }
}

/// Daemon set skeleton
pub fn init_daemon_set(name: &str, image: &str) -> DaemonSet {
    let mut template = template(name, image);
    template.metadata.name = name.to_string();

    DaemonSet {
        kind: DaemonSet::KIND.kind().to_string(),
        api_version: DaemonSet::KIND.api_version().to_string(),
        metadata: ObjectMeta::named(name),
        spec: DaemonSetSpec {
            selector: None,
            template,
        },
    }
}

/// Replica set skeleton
pub fn init_replica_set(name: &str, image: &str) -> ReplicaSet {
    ReplicaSet {
        kind: ReplicaSet::KIND.kind().to_string(),
        api_version: ReplicaSet::KIND.api_version().to_string(),
        metadata: ObjectMeta::named(name),
        spec: ReplicaSetSpec {
            replicas: 1,
            selector: Some(LabelSelector {
                match_labels: selector(name),
            }),
            template: template(name, image),
        },
    }
}

/// Map the compose restart policy onto the pod restart policy
pub fn restart_policy(service: &ServiceDescriptor) -> Result<RestartPolicy> {
    match service.restart.as_deref() {
        None | Some("") | Some("always") => Ok(RestartPolicy::Always),
        Some("no") => Ok(RestartPolicy::Never),
        Some("on-failure") => Ok(RestartPolicy::OnFailure),
        Some(other) => Err(KomposeError::UnknownRestartPolicy {
            service: service.name.clone(),
            policy: other.to_string(),
        }),
    }
}

/// `service=<name>` merged with the descriptor labels, which win on collision
pub fn labels(service: &ServiceDescriptor) -> BTreeMap<String, String> {
    let mut labels = selector(&service.name);
    for (key, value) in &service.labels {
        labels.insert(key.clone(), value.clone());
    }
    labels
}

/// Build and populate every resource for one service
pub fn build_resources(service: &ServiceDescriptor) -> Result<ResourceSet> {
    let name = service.name.as_str();
    let image = service.image.as_str();

    let mut set = ResourceSet {
        service: init_service(name),
        replication_controller: init_replication_controller(name, image),
        deployment: init_deployment(name, image),
        daemon_set: init_daemon_set(name, image),
        replica_set: init_replica_set(name, image),
    };

    let env = map_envs(service)?;
    let bindings = map_volumes(service);
    let ports = map_container_ports(service)?;
    let service_ports = map_service_ports(service)?;
    let labels = labels(service);
    let restart = restart_policy(service)?;
    let security_context = service.privileged.then(|| SecurityContext {
        privileged: Some(true),
    });

    let templates = [
        &mut set.replication_controller.spec.template,
        &mut set.deployment.spec.template,
        &mut set.daemon_set.spec.template,
        &mut set.replica_set.spec.template,
    ];

    for template in templates {
        let container = &mut template.spec.containers[0];
        container.env = env.clone();
        container.command = service.command.clone();
        container.working_dir = service.working_dir.clone();
        container.volume_mounts = bindings.iter().map(|b| b.mount()).collect();
        container.ports = ports.clone();
        container.security_context = security_context.clone();

        template.spec.volumes = bindings.iter().map(|b| b.volume()).collect();
        template.spec.restart_policy = Some(restart);
        template.metadata.labels = labels.clone();
    }

    set.service.spec.ports = service_ports;

    set.service.metadata.labels = labels.clone();
    set.replication_controller.metadata.labels = labels.clone();
    set.deployment.metadata.labels = labels.clone();
    set.daemon_set.metadata.labels = labels.clone();
    set.replica_set.metadata.labels = labels;

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::IntOrString;

    fn web() -> ServiceDescriptor {
        ServiceDescriptor::new("web", "nginx")
            .env("MODE=production")
            .port("8080:80")
            .volume("/srv/www:/usr/share/nginx/html:rw")
            .label("tier", "frontend")
    }

    #[test]
    fn test_skeletons() {
        let set = build_resources(&ServiceDescriptor::new("web", "nginx")).unwrap();

        assert_eq!(set.service.kind, "Service");
        assert_eq!(set.service.api_version, "v1");
        assert_eq!(set.service.spec.selector["service"], "web");

        assert_eq!(set.replication_controller.api_version, "v1");
        assert_eq!(set.replication_controller.spec.replicas, 1);
        assert_eq!(set.replication_controller.spec.selector["service"], "web");

        assert_eq!(set.deployment.api_version, "extensions/v1beta1");
        assert_eq!(set.deployment.spec.replicas, 1);
        assert_eq!(
            set.deployment.spec.selector.as_ref().unwrap().match_labels["service"],
            "web"
        );
        assert_eq!(set.replica_set.spec.replicas, 1);
        assert_eq!(set.daemon_set.kind, "DaemonSet");
        assert_eq!(set.daemon_set.spec.template.metadata.name, "web");

        for template in set.templates() {
            assert_eq!(template.spec.containers.len(), 1);
            assert_eq!(template.spec.containers[0].name, "web");
            assert_eq!(template.spec.containers[0].image, "nginx");
            assert_eq!(template.spec.restart_policy, Some(RestartPolicy::Always));
            assert!(template.spec.containers[0].security_context.is_none());
        }
    }

    #[test]
    fn test_populated_identically() {
        let set = build_resources(&web()).unwrap();
        let first = set.templates()[0].clone();

        for template in set.templates() {
            assert_eq!(template.spec, first.spec);
            assert_eq!(template.metadata.labels, first.metadata.labels);
        }

        let container = &first.spec.containers[0];
        assert_eq!(container.env[0].name, "MODE");
        assert_eq!(container.ports[0].container_port, 80);
        assert_eq!(container.volume_mounts.len(), 1);
        assert!(!container.volume_mounts[0].read_only);
        assert_eq!(container.volume_mounts[0].name, first.spec.volumes[0].name);

        assert_eq!(set.service.spec.ports[0].port, 8080);
        assert_eq!(set.service.spec.ports[0].target_port, IntOrString::Int(80));
    }

    #[test]
    fn test_labels_merge() {
        let service = web().label("service", "override");
        let set = build_resources(&service).unwrap();

        assert_eq!(set.service.metadata.labels["tier"], "frontend");
        assert_eq!(set.service.metadata.labels["service"], "override");
        // Selectors keep the service name
        assert_eq!(set.service.spec.selector["service"], "web");
        assert_eq!(set.replication_controller.metadata.labels["service"], "override");
    }

    #[test]
    fn test_restart_policies() {
        let policy = |p: &str| restart_policy(&ServiceDescriptor::new("web", "nginx").restart(p));

        assert_eq!(policy("always").unwrap(), RestartPolicy::Always);
        assert_eq!(policy("no").unwrap(), RestartPolicy::Never);
        assert_eq!(policy("on-failure").unwrap(), RestartPolicy::OnFailure);

        let err = policy("unless-stopped").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown restart policy unless-stopped for service web"
        );
    }

    #[test]
    fn test_privileged_security_context() {
        let mut service = web();
        service.privileged = true;
        let set = build_resources(&service).unwrap();

        for template in set.templates() {
            let context = template.spec.containers[0].security_context.as_ref().unwrap();
            assert_eq!(context.privileged, Some(true));
        }
    }

    #[test]
    fn test_invalid_entries_fail() {
        let service = ServiceDescriptor::new("web", "nginx").env("BROKEN");
        assert!(matches!(
            build_resources(&service),
            Err(KomposeError::MalformedEnvEntry { .. })
        ));

        let service = ServiceDescriptor::new("web", "nginx").port("eighty");
        assert!(matches!(
            build_resources(&service),
            Err(KomposeError::InvalidPort { .. })
        ));
    }
}
