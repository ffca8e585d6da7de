//! Cluster access configuration from kubeconfig files

use crate::error::{KomposeError, Result};
use crate::kubernetes::DEFAULT_NAMESPACE;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parsed kubeconfig file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Kubeconfig {
    pub clusters: Vec<NamedCluster>,
    pub users: Vec<NamedUser>,
    pub contexts: Vec<NamedContext>,
    pub current_context: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterEntry,
}

/// Cluster endpoint and trust settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClusterEntry {
    pub server: String,
    pub certificate_authority: Option<PathBuf>,
    pub certificate_authority_data: Option<String>,
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedUser {
    pub name: String,
    pub user: UserEntry,
}

/// User credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserEntry {
    pub token: Option<String>,
    #[serde(rename = "tokenFile")]
    pub token_file: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextEntry,
}

/// Context binding a cluster, a user and a namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextEntry {
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
}

impl Kubeconfig {
    /// `$KUBECONFIG` (first entry), else `~/.kube/config`
    pub fn default_path() -> Option<PathBuf> {
        if let Some(paths) = std::env::var_os("KUBECONFIG") {
            if let Some(first) = std::env::split_paths(&paths).next() {
                return Some(first);
            }
        }
        dirs::home_dir().map(|home| home.join(".kube").join("config"))
    }

    /// Load a kubeconfig file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KomposeError::Kubeconfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse_str(&content)
    }

    /// Parse kubeconfig content
    pub fn parse_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| KomposeError::Kubeconfig(format!("Failed to parse kubeconfig: {}", e)))
    }

    fn context(&self, name: &str) -> Result<&ContextEntry> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.context)
            .ok_or_else(|| KomposeError::Kubeconfig(format!("context {} not found", name)))
    }

    fn cluster(&self, name: &str) -> Result<&ClusterEntry> {
        self.clusters
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.cluster)
            .ok_or_else(|| KomposeError::Kubeconfig(format!("cluster {} not found", name)))
    }

    fn user(&self, name: &str) -> Option<&UserEntry> {
        self.users.iter().find(|u| u.name == name).map(|u| &u.user)
    }
}

/// Settings given on the command line, taking precedence over kubeconfig
#[derive(Debug, Clone, Default)]
pub struct ClusterOverrides {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub server: Option<String>,
    pub token: Option<String>,
    pub namespace: Option<String>,
    pub insecure: bool,
}

/// Resolved connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// API server URL
    pub server: String,
    /// Namespace for every request
    pub namespace: String,
    /// Bearer token
    pub token: Option<String>,
    /// Basic auth credentials
    pub basic_auth: Option<(String, String)>,
    /// PEM bundle of trusted CAs
    pub ca_pem: Option<Vec<u8>>,
    /// Skip TLS verification
    pub insecure: bool,
}

impl ClusterConfig {
    /// Settings for a bare server URL
    pub fn new(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            token: None,
            basic_auth: None,
            ca_pem: None,
            insecure: false,
        }
    }

    /// Settings of a kubeconfig context (the current one unless named)
    pub fn from_kubeconfig(config: &Kubeconfig, context: Option<&str>) -> Result<Self> {
        let context_name = context
            .map(str::to_string)
            .or_else(|| config.current_context.clone())
            .ok_or_else(|| KomposeError::Kubeconfig("no current context set".to_string()))?;

        let context = config.context(&context_name)?;
        let cluster = config.cluster(&context.cluster)?;
        if cluster.server.is_empty() {
            return Err(KomposeError::Kubeconfig(format!(
                "cluster {} has no server",
                context.cluster
            )));
        }

        let mut resolved = Self::new(&cluster.server);
        resolved.insecure = cluster.insecure_skip_tls_verify;
        if let Some(namespace) = &context.namespace {
            resolved.namespace = namespace.clone();
        }

        let ca = (
            &cluster.certificate_authority_data,
            &cluster.certificate_authority,
        );
        resolved.ca_pem = match ca {
            (Some(data), _) => Some(
                base64::engine::general_purpose::STANDARD
                    .decode(data.trim())
                    .map_err(|e| {
                        KomposeError::Kubeconfig(format!(
                            "invalid certificate-authority-data: {}",
                            e
                        ))
                    })?,
            ),
            (None, Some(path)) => Some(std::fs::read(path).map_err(|e| {
                KomposeError::Kubeconfig(format!("Failed to read {}: {}", path.display(), e))
            })?),
            (None, None) => None,
        };

        if let Some(user) = config.user(&context.user) {
            resolved.token = match (&user.token, &user.token_file) {
                (Some(token), _) => Some(token.clone()),
                (None, Some(path)) => Some(
                    std::fs::read_to_string(path)
                        .map_err(|e| {
                            KomposeError::Kubeconfig(format!(
                                "Failed to read {}: {}",
                                path.display(),
                                e
                            ))
                        })?
                        .trim()
                        .to_string(),
                ),
                (None, None) => None,
            };
            if let (Some(username), Some(password)) = (&user.username, &user.password) {
                resolved.basic_auth = Some((username.clone(), password.clone()));
            }
        }

        Ok(resolved)
    }

    /// Resolve settings from kubeconfig and command line overrides
    pub fn resolve(overrides: &ClusterOverrides) -> Result<Self> {
        let path = overrides.kubeconfig.clone().or_else(Kubeconfig::default_path);

        let mut resolved = match path.filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Loading kubeconfig from {}", path.display());
                let kubeconfig = Kubeconfig::load(&path)?;
                let from_file = Self::from_kubeconfig(&kubeconfig, overrides.context.as_deref());
                match (from_file, &overrides.server) {
                    (Ok(config), _) => config,
                    (Err(_), Some(server)) => Self::new(server),
                    (Err(e), None) => return Err(e),
                }
            }
            None => match &overrides.server {
                Some(server) => Self::new(server),
                None => {
                    return Err(KomposeError::Kubeconfig(
                        "no kubeconfig found and no --server given".to_string(),
                    ))
                }
            },
        };

        if let Some(server) = &overrides.server {
            resolved.server = server.trim_end_matches('/').to_string();
        }
        if let Some(token) = &overrides.token {
            resolved.token = Some(token.clone());
        }
        if let Some(namespace) = &overrides.namespace {
            resolved.namespace = namespace.clone();
        }
        resolved.insecure |= overrides.insecure;

        Ok(resolved)
    }
}
