//! Project conversion: the per-service loop and emission order

use super::builder::build_resources;
use super::serializer::{serialize, OutputFormat};
use super::sink::{OutputSink, OutputTarget};
use super::unsupported::check_unsupported_keys;
use crate::compose::{ComposeConfig, ServiceDescriptor};
use crate::error::{KomposeError, Result};
use crate::kubernetes::ResourceKind;
use indexmap::IndexMap;
use std::path::PathBuf;

/// Options controlling a conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Single file receiving every manifest
    pub out: Option<PathBuf>,
    /// Write every manifest to standard output
    pub stdout: bool,
    /// Generate YAML instead of JSON
    pub yaml: bool,
    /// Generate Deployments
    pub deployment: bool,
    /// Generate DaemonSets
    pub daemonset: bool,
    /// Generate ReplicaSets
    pub replicaset: bool,
    /// Generate a chart
    pub chart: bool,
    /// Directory for per-resource files
    pub output_dir: PathBuf,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            out: None,
            stdout: false,
            yaml: false,
            deployment: false,
            daemonset: false,
            replicaset: false,
            chart: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ConvertOptions {
    /// Reject mutually exclusive option combinations
    pub fn validate(&self) -> Result<()> {
        if self.out.is_some() && self.stdout {
            return Err(KomposeError::ConfigurationConflict(
                "--out and --stdout can't be set at the same time".to_string(),
            ));
        }

        if self.chart && self.stdout {
            return Err(KomposeError::ConfigurationConflict(
                "chart cannot be generated when --stdout is specified".to_string(),
            ));
        }

        let controllers = [self.deployment, self.daemonset, self.replicaset]
            .iter()
            .filter(|requested| **requested)
            .count();
        if self.single_output() && controllers > 1 {
            return Err(KomposeError::ConfigurationConflict(
                "only one type of Kubernetes controller can be generated when --out or --stdout is specified"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Whether everything goes to one destination
    pub fn single_output(&self) -> bool {
        self.out.is_some() || self.stdout
    }

    /// Encoding of the manifests
    pub fn format(&self) -> OutputFormat {
        if self.yaml {
            OutputFormat::Yaml
        } else {
            OutputFormat::Json
        }
    }

    /// Destination of the manifests
    pub fn target(&self) -> OutputTarget {
        match (&self.out, self.stdout) {
            (Some(path), _) => OutputTarget::Aggregate(path.clone()),
            (None, true) => OutputTarget::Stdout,
            (None, false) => OutputTarget::PerResource(self.output_dir.clone()),
        }
    }

    /// Whether replication controllers are emitted
    ///
    /// A single destination holds at most one controller kind, so an explicit
    /// controller request replaces them there.
    pub fn emits_replication_controllers(&self) -> bool {
        !self.single_output() || !(self.deployment || self.daemonset || self.replicaset)
    }
}

/// Serialized manifests of a project, keyed by service name per kind
#[derive(Debug, Default)]
pub struct Manifests {
    /// Services; linked names without a definition have no payload
    pub services: IndexMap<String, Option<Vec<u8>>>,
    pub deployments: IndexMap<String, Vec<u8>>,
    pub daemon_sets: IndexMap<String, Vec<u8>>,
    pub replica_sets: IndexMap<String, Vec<u8>>,
    pub replication_controllers: IndexMap<String, Vec<u8>>,
    /// Distinct link targets, in first-seen order
    pub links: Vec<String>,
}

impl Manifests {
    /// Manifests in emission order
    pub fn ordered(&self) -> Vec<(&str, ResourceKind, &[u8])> {
        let services = self
            .services
            .iter()
            .filter_map(|(name, data)| {
                data.as_deref()
                    .map(|data| (name.as_str(), ResourceKind::Service, data))
            });

        services
            .chain(entries(&self.deployments, ResourceKind::Deployment))
            .chain(entries(&self.daemon_sets, ResourceKind::DaemonSet))
            .chain(entries(&self.replica_sets, ResourceKind::ReplicaSet))
            .chain(entries(
                &self.replication_controllers,
                ResourceKind::ReplicationController,
            ))
            .collect()
    }
}

fn entries(
    map: &IndexMap<String, Vec<u8>>,
    kind: ResourceKind,
) -> impl Iterator<Item = (&str, ResourceKind, &[u8])> {
    map.iter()
        .map(move |(name, data)| (name.as_str(), kind, data.as_slice()))
}

/// Result of writing a project
#[derive(Debug, Default)]
pub struct ConversionSummary {
    /// Emitted resources in order
    pub emitted: Vec<(String, ResourceKind)>,
    /// Files created
    pub files: Vec<PathBuf>,
}

/// Converts compose projects into Kubernetes manifests
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter, validating the options
    pub fn new(options: ConvertOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Build and serialize every requested resource of a project
    pub fn render(&self, config: &ComposeConfig) -> Result<Manifests> {
        let format = self.options.format();
        let emit_rc = self.options.emits_replication_controllers();
        let mut manifests = Manifests::default();

        for (name, service) in &config.services {
            check_unsupported_keys(name, service);

            let descriptor = ServiceDescriptor::from_config(name, service);
            let set = build_resources(&descriptor)?;

            manifests
                .services
                .insert(name.clone(), Some(serialize(&set.service, format)?));

            if self.options.deployment {
                manifests
                    .deployments
                    .insert(name.clone(), serialize(&set.deployment, format)?);
            }
            if self.options.daemonset {
                manifests
                    .daemon_sets
                    .insert(name.clone(), serialize(&set.daemon_set, format)?);
            }
            if self.options.replicaset {
                manifests
                    .replica_sets
                    .insert(name.clone(), serialize(&set.replica_set, format)?);
            }
            if emit_rc {
                manifests.replication_controllers.insert(
                    name.clone(),
                    serialize(&set.replication_controller, format)?,
                );
            }

            for link in &descriptor.links {
                if !manifests.links.contains(link) {
                    manifests.links.push(link.clone());
                }
            }
        }

        for link in &manifests.links {
            if !manifests.services.contains_key(link) {
                tracing::debug!("Linked service {} is not defined in the project", link);
                manifests.services.insert(link.clone(), None);
            }
        }

        Ok(manifests)
    }

    /// Convert a project and write every manifest to the configured target
    pub fn convert(&self, config: &ComposeConfig) -> Result<ConversionSummary> {
        self.options.validate()?;

        if self.options.chart {
            tracing::warn!("Chart generation is not supported; writing manifests only");
        }

        let manifests = self.render(config)?;
        let mut sink = OutputSink::open(&self.options.target(), self.options.format())?;
        let mut summary = ConversionSummary::default();

        for (name, kind, data) in manifests.ordered() {
            sink.write(name, kind, data)?;
            summary.emitted.push((name.to_string(), kind));
        }

        summary.files = sink.finish()?;
        tracing::info!("Converted {} services", config.services.len());

        Ok(summary)
    }
}
