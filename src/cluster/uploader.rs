//! Submit previously converted manifests to a cluster

use super::client::ClusterApi;
use crate::error::{KomposeError, Result};
use crate::kubernetes::{ReplicationController, ResourceKind, Service};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Outcome of an upload run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Objects accepted by the cluster
    pub submitted: usize,
    /// Objects the cluster refused
    pub failed: usize,
}

/// Reads manifests from a directory and creates them in the cluster
pub struct Uploader<'a, C: ClusterApi> {
    client: &'a C,
    dir: PathBuf,
}

impl<'a, C: ClusterApi> Uploader<'a, C> {
    /// Create an uploader for a manifest directory
    pub fn new(client: &'a C, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    /// Submit services, then replication controllers
    pub async fn upload(&self) -> Result<UploadSummary> {
        let files = manifest_files(&self.dir)?;
        let mut summary = UploadSummary::default();

        for path in files.iter().filter(|p| file_name(p).contains("svc")) {
            let Some(service) = decode::<Service>(path)? else {
                continue;
            };
            let name = service.metadata.name.clone();
            match self.client.create_service(&service).await {
                Ok(created) => {
                    info!("Successfully created service {}", name);
                    debug!("{:?}", created);
                    summary.submitted += 1;
                }
                Err(e) => {
                    error!("Failed to create {} {}: {}", ResourceKind::Service, name, e);
                    summary.failed += 1;
                }
            }
        }

        for path in files.iter().filter(|p| file_name(p).contains("rc")) {
            let Some(rc) = decode::<ReplicationController>(path)? else {
                continue;
            };
            let name = rc.metadata.name.clone();
            match self.client.create_replication_controller(&rc).await {
                Ok(created) => {
                    info!("Successfully created replication controller {}", name);
                    debug!("{:?}", created);
                    summary.submitted += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to create {} {}: {}",
                        ResourceKind::ReplicationController,
                        name,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Regular files directly inside `dir`, sorted by name
fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| KomposeError::Io(e.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Decode a manifest by the format its name mentions; `None` if it names neither
fn decode<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let name = file_name(path);

    let decoded = if name.contains("json") {
        let data = std::fs::read(path)?;
        serde_json::from_slice(&data).map_err(KomposeError::from)
    } else if name.contains("yaml") {
        let data = std::fs::read(path)?;
        serde_yaml::from_slice(&data).map_err(KomposeError::from)
    } else {
        warn!("Skipping {}: neither json nor yaml", path.display());
        return Ok(None);
    };

    decoded
        .map(Some)
        .inspect_err(|e| error!("Failed to decode manifest {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::fake::FakeCluster;
    use crate::compose::{ComposeParser, ServiceDescriptor};
    use crate::convert::{build_resources, serialize, ConvertOptions, Converter, OutputFormat};
    use tempfile::tempdir;

    fn write_manifests(dir: &Path, name: &str, format: OutputFormat) {
        let set = build_resources(&ServiceDescriptor::new(name, "nginx").port("80")).unwrap();
        let ext = format.extension();
        std::fs::write(
            dir.join(format!("{}-svc.{}", name, ext)),
            serialize(&set.service, format).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.join(format!("{}-rc.{}", name, ext)),
            serialize(&set.replication_controller, format).unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_services_before_controllers() {
        let temp = tempdir().unwrap();
        write_manifests(temp.path(), "web", OutputFormat::Json);
        write_manifests(temp.path(), "db", OutputFormat::Yaml);
        std::fs::write(temp.path().join("README.md"), "notes").unwrap();

        let cluster = FakeCluster::default();
        let summary = Uploader::new(&cluster, temp.path()).upload().await.unwrap();

        assert_eq!(
            summary,
            UploadSummary {
                submitted: 4,
                failed: 0
            }
        );
        assert_eq!(
            cluster.calls(),
            vec!["create svc db", "create svc web", "create rc db", "create rc web"]
        );
        assert_eq!(
            cluster.services.borrow()["web"].spec.ports[0].port,
            80
        );
    }

    #[tokio::test]
    async fn test_failed_submission_continues() {
        let temp = tempdir().unwrap();
        write_manifests(temp.path(), "api", OutputFormat::Json);
        write_manifests(temp.path(), "web", OutputFormat::Json);

        let cluster = FakeCluster::default().reject("api");
        let summary = Uploader::new(&cluster, temp.path()).upload().await.unwrap();

        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.failed, 2);
        assert!(cluster.services.borrow().contains_key("web"));
        assert!(cluster.controllers.borrow().contains_key("web"));
    }

    #[tokio::test]
    async fn test_undecodable_manifest_is_fatal() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("web-svc.json"), "{ not json").unwrap();
        write_manifests(temp.path(), "zz", OutputFormat::Json);

        let cluster = FakeCluster::default();
        let result = Uploader::new(&cluster, temp.path()).upload().await;

        assert!(matches!(result, Err(KomposeError::Json(_))));
        assert!(cluster.calls().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_yaml_manifest_is_fatal() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("web-rc.yaml"), "spec: [unclosed").unwrap();

        let cluster = FakeCluster::default();
        let result = Uploader::new(&cluster, temp.path()).upload().await;

        assert!(matches!(result, Err(KomposeError::Yaml(_))));
        assert!(cluster.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_converted_project() {
        let temp = tempdir().unwrap();
        let config = ComposeParser::parse_str(
            r#"
services:
  web:
    image: nginx
    ports:
      - "80"
"#,
        )
        .unwrap();
        let options = ConvertOptions {
            output_dir: temp.path().to_path_buf(),
            ..Default::default()
        };
        Converter::new(options).unwrap().convert(&config).unwrap();

        let cluster = FakeCluster::default();
        let summary = Uploader::new(&cluster, temp.path()).upload().await.unwrap();

        assert_eq!(summary.submitted, 2);
        assert_eq!(
            cluster.controllers.borrow()["web"].spec.template.spec.containers[0].image,
            "nginx"
        );
    }
}
