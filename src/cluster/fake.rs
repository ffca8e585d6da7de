//! In-memory `ClusterApi` for tests

use super::client::ClusterApi;
use crate::error::{KomposeError, Result};
use crate::kubernetes::{ObjectMeta, ReplicationController, ResourceKind, Scale, ScaleSpec, Service};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

#[derive(Default)]
pub struct FakeCluster {
    pub services: RefCell<BTreeMap<String, Service>>,
    pub controllers: RefCell<BTreeMap<String, ReplicationController>>,
    /// Every call in order, as `"<verb> <kind> <name>"`
    pub calls: RefCell<Vec<String>>,
    /// Names whose creation is refused
    pub rejected: HashSet<String>,
}

fn not_found(collection: &str, name: &str) -> KomposeError {
    KomposeError::Cluster(format!(
        "404 Not Found: {} \"{}\" not found",
        collection, name
    ))
}

impl FakeCluster {
    pub fn with_service(self, service: Service) -> Self {
        self.services
            .borrow_mut()
            .insert(service.metadata.name.clone(), service);
        self
    }

    pub fn with_controller(self, rc: ReplicationController) -> Self {
        self.controllers
            .borrow_mut()
            .insert(rc.metadata.name.clone(), rc);
        self
    }

    pub fn reject(mut self, name: &str) -> Self {
        self.rejected.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, verb: &str, kind: ResourceKind, name: &str) {
        self.calls
            .borrow_mut()
            .push(format!("{} {} {}", verb, kind.suffix(), name));
    }
}

impl ClusterApi for FakeCluster {
    fn namespace(&self) -> &str {
        "default"
    }

    async fn create_service(&self, service: &Service) -> Result<Service> {
        let name = &service.metadata.name;
        self.record("create", ResourceKind::Service, name);
        if self.rejected.contains(name) {
            return Err(KomposeError::Cluster(format!(
                "409 Conflict: services \"{}\" already exists",
                name
            )));
        }
        self.services
            .borrow_mut()
            .insert(name.clone(), service.clone());
        Ok(service.clone())
    }

    async fn get_service(&self, name: &str) -> Result<Service> {
        self.record("get", ResourceKind::Service, name);
        self.services
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("services", name))
    }

    async fn delete_service(&self, name: &str) -> Result<()> {
        self.record("delete", ResourceKind::Service, name);
        self.services
            .borrow_mut()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found("services", name))
    }

    async fn create_replication_controller(
        &self,
        rc: &ReplicationController,
    ) -> Result<ReplicationController> {
        let name = &rc.metadata.name;
        self.record("create", ResourceKind::ReplicationController, name);
        if self.rejected.contains(name) {
            return Err(KomposeError::Cluster(format!(
                "409 Conflict: replicationcontrollers \"{}\" already exists",
                name
            )));
        }
        self.controllers
            .borrow_mut()
            .insert(name.clone(), rc.clone());
        Ok(rc.clone())
    }

    async fn get_replication_controller(&self, name: &str) -> Result<ReplicationController> {
        self.record("get", ResourceKind::ReplicationController, name);
        self.controllers
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("replicationcontrollers", name))
    }

    async fn delete_replication_controller(&self, name: &str) -> Result<()> {
        self.record("delete", ResourceKind::ReplicationController, name);
        self.controllers
            .borrow_mut()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found("replicationcontrollers", name))
    }

    async fn get_scale(&self, name: &str) -> Result<Scale> {
        self.record("get-scale", ResourceKind::ReplicationController, name);
        let controllers = self.controllers.borrow();
        let rc = controllers
            .get(name)
            .ok_or_else(|| not_found("replicationcontrollers", name))?;
        Ok(Scale {
            kind: "Scale".to_string(),
            api_version: "extensions/v1beta1".to_string(),
            metadata: ObjectMeta::named(name),
            spec: ScaleSpec {
                replicas: rc.spec.replicas,
            },
        })
    }

    async fn update_scale(&self, scale: &Scale) -> Result<Scale> {
        let name = &scale.metadata.name;
        self.record("update-scale", ResourceKind::ReplicationController, name);
        let mut controllers = self.controllers.borrow_mut();
        let rc = controllers
            .get_mut(name)
            .ok_or_else(|| not_found("replicationcontrollers", name))?;
        rc.spec.replicas = scale.spec.replicas;
        Ok(scale.clone())
    }
}
