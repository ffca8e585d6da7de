//! Project-level cluster commands: `ps`, `delete` and `scale`

use super::client::ClusterApi;
use crate::error::{KomposeError, Result};
use crate::kubernetes::{ReplicationController, Service};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

/// Prefix a cluster failure with what was being attempted
fn context(error: KomposeError, what: String) -> KomposeError {
    match error {
        KomposeError::Cluster(message) => KomposeError::Cluster(format!("{}: {}", what, message)),
        other => other,
    }
}

fn join_pairs(pairs: &BTreeMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

fn service_row(service: &Service) -> String {
    let ports = service
        .spec
        .ports
        .iter()
        .map(|p| format!("{}({})", p.protocol, p.port))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{:<20}{:<20}{:<20}{:<20}",
        service.metadata.name,
        service.spec.cluster_ip.as_deref().unwrap_or(""),
        ports,
        join_pairs(&service.spec.selector)
    )
}

fn controller_row(rc: &ReplicationController) -> String {
    let containers = &rc.spec.template.spec.containers;
    let names = containers
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let images = containers
        .iter()
        .map(|c| c.image.as_str())
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{:<15}{:<15}{:<30}{:<10}{:<20}",
        rc.metadata.name,
        names,
        images,
        rc.spec.replicas,
        join_pairs(&rc.spec.selector)
    )
}

/// List the services and replication controllers of a project
pub async fn ps<C: ClusterApi, W: Write>(
    client: &C,
    names: &[String],
    services: bool,
    controllers: bool,
    out: &mut W,
) -> Result<()> {
    if services {
        writeln!(
            out,
            "{:<20}{:<20}{:<20}{:<20}",
            "Name", "Cluster IP", "Ports", "Selectors"
        )?;
        for name in names {
            match client.get_service(name).await {
                Ok(service) => writeln!(out, "{}", service_row(&service))?,
                Err(e) => debug!("Cannot find service for {}: {}", name, e),
            }
        }
    }

    if controllers {
        writeln!(
            out,
            "{:<15}{:<15}{:<30}{:<10}{:<20}",
            "Name", "Containers", "Images", "Replicas", "Selectors"
        )?;
        for name in names {
            match client.get_replication_controller(name).await {
                Ok(rc) => writeln!(out, "{}", controller_row(&rc))?,
                Err(e) => debug!("Cannot find rc for {}: {}", name, e),
            }
        }
    }

    Ok(())
}

/// Delete the service and/or replication controller of every (or one) project service
pub async fn delete<C: ClusterApi>(
    client: &C,
    names: &[String],
    only: Option<&str>,
    services: bool,
    controllers: bool,
) -> Result<()> {
    for name in names {
        if only.is_some_and(|only| only != name.as_str()) {
            continue;
        }

        if services {
            client
                .delete_service(name)
                .await
                .map_err(|e| context(e, format!("Unable to delete service {}", name)))?;
            debug!("Deleted service {}", name);
        }
        if controllers {
            client
                .delete_replication_controller(name)
                .await
                .map_err(|e| {
                    context(e, format!("Unable to delete replication controller {}", name))
                })?;
            debug!("Deleted replication controller {}", name);
        }
    }

    Ok(())
}

/// Set the replica count of every (or one) project replication controller
pub async fn scale<C: ClusterApi, W: Write>(
    client: &C,
    names: &[String],
    replicas: i64,
    only: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let count = i32::try_from(replicas)
        .ok()
        .filter(|n| *n > 0)
        .ok_or(KomposeError::InvalidScale(replicas))?;

    for name in names {
        if only.is_some_and(|only| only != name.as_str()) {
            continue;
        }

        let mut current = client
            .get_scale(name)
            .await
            .map_err(|e| context(e, "Error retrieving scaling data".to_string()))?;
        current.spec.replicas = count;

        let updated = client
            .update_scale(&current)
            .await
            .map_err(|e| context(e, "Error updating scaling data".to_string()))?;

        writeln!(out, "Scaling {} to: {}", name, updated.spec.replicas)?;
    }

    Ok(())
}
