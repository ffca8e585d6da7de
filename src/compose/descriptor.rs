//! Normalized per-service descriptors
//!
//! Compose accepts several spellings for most service fields (maps or lists,
//! short or long syntax). The converter works on one string-based form,
//! produced here from a parsed [`ServiceConfig`].

use super::config::{
    CommandConfig, EnvironmentConfig, LabelsConfig, PortConfig, ServiceConfig, VolumeMount,
};
use indexmap::IndexMap;

/// A compose service reduced to the fields the converter maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceDescriptor {
    /// Service name
    pub name: String,
    /// Image reference
    pub image: String,
    /// Command tokens
    pub command: Vec<String>,
    /// Working directory
    pub working_dir: String,
    /// Raw `KEY=VALUE` or `KEY:VALUE` entries
    pub environment: Vec<String>,
    /// Raw `port` or `host:container` entries
    pub ports: Vec<String>,
    /// Raw `host:container[:mode]` entries
    pub volumes: Vec<String>,
    /// Linked service names
    pub links: Vec<String>,
    /// Labels
    pub labels: IndexMap<String, String>,
    /// Privileged mode
    pub privileged: bool,
    /// Restart policy as written
    pub restart: Option<String>,
}

impl ServiceDescriptor {
    /// Create an empty descriptor for an image
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_string(),
            image: image.to_string(),
            ..Default::default()
        }
    }

    /// Normalize a parsed compose service
    pub fn from_config(name: &str, service: &ServiceConfig) -> Self {
        let command = match &service.command {
            Some(CommandConfig::Shell(s)) => split_command(s),
            Some(CommandConfig::Exec(arr)) => arr.clone(),
            None => Vec::new(),
        };

        Self {
            name: name.to_string(),
            image: service.image.clone().unwrap_or_default(),
            command,
            working_dir: service.working_dir.clone().unwrap_or_default(),
            environment: service
                .environment
                .as_ref()
                .map(environment_entries)
                .unwrap_or_default(),
            ports: service
                .ports
                .as_ref()
                .map(|ports| ports.iter().map(port_entry).collect())
                .unwrap_or_default(),
            volumes: service
                .volumes
                .as_ref()
                .map(|volumes| volumes.iter().map(volume_entry).collect())
                .unwrap_or_default(),
            links: service.links.clone().unwrap_or_default(),
            labels: service.labels.as_ref().map(label_map).unwrap_or_default(),
            privileged: service.privileged.unwrap_or(false),
            restart: service.restart.clone(),
        }
    }

    /// Builder-style environment entry
    pub fn env(mut self, entry: &str) -> Self {
        self.environment.push(entry.to_string());
        self
    }

    /// Builder-style port entry
    pub fn port(mut self, entry: &str) -> Self {
        self.ports.push(entry.to_string());
        self
    }

    /// Builder-style volume entry
    pub fn volume(mut self, entry: &str) -> Self {
        self.volumes.push(entry.to_string());
        self
    }

    /// Builder-style label
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Builder-style restart policy
    pub fn restart(mut self, policy: &str) -> Self {
        self.restart = Some(policy.to_string());
        self
    }
}

fn environment_entries(env: &EnvironmentConfig) -> Vec<String> {
    match env {
        EnvironmentConfig::Array(arr) => arr.clone(),
        EnvironmentConfig::Map(map) => map
            .iter()
            .filter_map(|(key, value)| match value {
                Some(v) => Some(format!("{}={}", key, v)),
                // A bare key passes the value through from the host
                None => match std::env::var(key) {
                    Ok(v) => Some(format!("{}={}", key, v)),
                    Err(_) => {
                        tracing::debug!("Skipping unset environment variable {}", key);
                        None
                    }
                },
            })
            .collect(),
    }
}

fn port_entry(port: &PortConfig) -> String {
    match port {
        PortConfig::Number(n) => n.to_string(),
        PortConfig::Short(s) => s.clone(),
        PortConfig::Long(long) => match &long.published {
            Some(published) => format!("{}:{}", published, long.target),
            None => long.target.to_string(),
        },
    }
}

fn volume_entry(volume: &VolumeMount) -> String {
    match volume {
        VolumeMount::Short(s) => s.clone(),
        VolumeMount::Long(long) => match &long.source {
            Some(source) => {
                let mode = if long.read_only.unwrap_or(false) {
                    "ro"
                } else {
                    "rw"
                };
                format!("{}:{}:{}", source, long.target, mode)
            }
            None => long.target.clone(),
        },
    }
}

fn label_map(labels: &LabelsConfig) -> IndexMap<String, String> {
    match labels {
        LabelsConfig::Map(map) => map
            .iter()
            .map(|(key, value)| {
                let value = value.as_ref().map(ToString::to_string).unwrap_or_default();
                (key.clone(), value)
            })
            .collect(),
        LabelsConfig::Array(arr) => arr
            .iter()
            .map(|item| match item.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (item.to_string(), String::new()),
            })
            .collect(),
    }
}

/// Split a shell-form command into tokens, honouring quotes and backslashes
pub fn split_command(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => match chars.next() {
                Some(next @ ('"' | '\\' | '$' | '`')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_token = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    tokens
}
