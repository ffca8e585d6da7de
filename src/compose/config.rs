//! Docker Compose configuration types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Docker Compose file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Compose file version
    #[serde(default)]
    pub version: Option<String>,
    /// Project name
    #[serde(default)]
    pub name: Option<String>,
    /// Services, in file order
    #[serde(default)]
    pub services: IndexMap<String, ServiceConfig>,
}

/// Service configuration
///
/// Only `image`, `command`, `working_dir`, `environment`, `ports`, `volumes`,
/// `links`, `labels`, `privileged` and `restart` reach the generated
/// manifests. The rest are parsed so they can be reported as unsupported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Image name
    #[serde(default)]
    pub image: Option<String>,
    /// Build configuration
    #[serde(default)]
    pub build: Option<BuildConfig>,
    /// Dockerfile (compose v1)
    #[serde(default)]
    pub dockerfile: Option<String>,
    /// Command to run
    #[serde(default)]
    pub command: Option<CommandConfig>,
    /// Entrypoint
    #[serde(default)]
    pub entrypoint: Option<CommandConfig>,
    /// Container name
    #[serde(default)]
    pub container_name: Option<String>,
    /// Hostname
    #[serde(default)]
    pub hostname: Option<String>,
    /// Domain name
    #[serde(default)]
    pub domainname: Option<String>,
    /// Environment variables
    #[serde(default)]
    pub environment: Option<EnvironmentConfig>,
    /// Environment file
    #[serde(default)]
    pub env_file: Option<StringOrList>,
    /// Exposed ports
    #[serde(default)]
    pub expose: Option<Vec<ScalarConfig>>,
    /// Port mappings
    #[serde(default)]
    pub ports: Option<Vec<PortConfig>>,
    /// Volume mounts
    #[serde(default)]
    pub volumes: Option<Vec<VolumeMount>>,
    /// Volume driver (compose v1)
    #[serde(default)]
    pub volume_driver: Option<String>,
    /// Volumes from other services or containers
    #[serde(default)]
    pub volumes_from: Option<Vec<String>>,
    /// Links to other services
    #[serde(default)]
    pub links: Option<Vec<String>>,
    /// Links to containers outside the project
    #[serde(default)]
    pub external_links: Option<Vec<String>>,
    /// Labels
    #[serde(default)]
    pub labels: Option<LabelsConfig>,
    /// Logging configuration
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    /// Log driver (compose v1)
    #[serde(default)]
    pub log_driver: Option<String>,
    /// Log options (compose v1)
    #[serde(default)]
    pub log_opt: Option<IndexMap<String, String>>,
    /// Restart policy
    #[serde(default)]
    pub restart: Option<String>,
    /// Working directory
    #[serde(default)]
    pub working_dir: Option<String>,
    /// User
    #[serde(default)]
    pub user: Option<String>,
    /// Privileged mode
    #[serde(default)]
    pub privileged: Option<bool>,
    /// Read only root filesystem
    #[serde(default)]
    pub read_only: Option<bool>,
    /// Stdin open
    #[serde(default)]
    pub stdin_open: Option<bool>,
    /// TTY
    #[serde(default)]
    pub tty: Option<bool>,
    /// Extra hosts
    #[serde(default)]
    pub extra_hosts: Option<ListOrMap>,
    /// DNS servers
    #[serde(default)]
    pub dns: Option<StringOrList>,
    /// DNS search domains
    #[serde(default)]
    pub dns_search: Option<StringOrList>,
    /// Capabilities to add
    #[serde(default)]
    pub cap_add: Option<Vec<String>>,
    /// Capabilities to drop
    #[serde(default)]
    pub cap_drop: Option<Vec<String>>,
    /// Security options
    #[serde(default)]
    pub security_opt: Option<Vec<String>>,
    /// Devices
    #[serde(default)]
    pub devices: Option<Vec<String>>,
    /// CPU set
    #[serde(default)]
    pub cpuset: Option<String>,
    /// CPU shares
    #[serde(default)]
    pub cpu_shares: Option<ScalarConfig>,
    /// Memory limit
    #[serde(default)]
    pub mem_limit: Option<ScalarConfig>,
    /// Memory plus swap limit
    #[serde(default)]
    pub memswap_limit: Option<ScalarConfig>,
    /// IPC mode
    #[serde(default)]
    pub ipc: Option<String>,
    /// PID mode
    #[serde(default)]
    pub pid: Option<String>,
    /// UTS mode
    #[serde(default)]
    pub uts: Option<String>,
    /// Network mode
    #[serde(default)]
    pub network_mode: Option<String>,
    /// Network mode (compose v1)
    #[serde(default)]
    pub net: Option<String>,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildConfig {
    /// Simple context path
    Simple(String),
    /// Full build configuration
    Full(BuildConfigFull),
}

/// Full build configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfigFull {
    /// Build context
    pub context: Option<String>,
    /// Dockerfile path
    pub dockerfile: Option<String>,
    /// Build arguments
    #[serde(default)]
    pub args: Option<IndexMap<String, String>>,
    /// Target stage
    pub target: Option<String>,
}

/// Command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    /// Shell command string
    Shell(String),
    /// Exec form array
    Exec(Vec<String>),
}

/// Environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvironmentConfig {
    /// Array of KEY=value strings
    Array(Vec<String>),
    /// Map of key to value
    Map(IndexMap<String, Option<ScalarConfig>>),
}

/// A value that may be written as a single string or a list of strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    /// Single value
    Single(String),
    /// Multiple values
    List(Vec<String>),
}

/// Scalar value that compose accepts as a number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarConfig {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    String(String),
}

impl std::fmt::Display for ScalarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarConfig::Bool(b) => write!(f, "{}", b),
            ScalarConfig::Int(i) => write!(f, "{}", i),
            ScalarConfig::Float(v) => write!(f, "{}", v),
            ScalarConfig::String(s) => write!(f, "{}", s),
        }
    }
}

/// Port configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortConfig {
    /// Bare port number: 80
    Number(u16),
    /// Short syntax: "8080:80"
    Short(String),
    /// Long syntax
    Long(PortConfigLong),
}

/// Long port configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortConfigLong {
    /// Target port in container
    pub target: u16,
    /// Published port on host
    pub published: Option<ScalarConfig>,
    /// Host IP to bind to
    pub host_ip: Option<String>,
    /// Protocol (tcp/udp)
    pub protocol: Option<String>,
    /// Mode (host/ingress)
    pub mode: Option<String>,
}

/// Volume mount configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VolumeMount {
    /// Short syntax: "host:container:mode"
    Short(String),
    /// Long syntax
    Long(VolumeMountLong),
}

/// Long volume mount configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeMountLong {
    /// Mount type (volume, bind, tmpfs, npipe)
    #[serde(rename = "type")]
    pub mount_type: Option<String>,
    /// Source path or volume name
    pub source: Option<String>,
    /// Target path in container
    pub target: String,
    /// Read only
    pub read_only: Option<bool>,
}

/// Labels configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelsConfig {
    /// Array of "key=value" strings
    Array(Vec<String>),
    /// Map of key to value
    Map(IndexMap<String, Option<ScalarConfig>>),
}

/// Entries written as a list of strings or as a map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListOrMap {
    /// List of "key=value" (or "host:ip") strings
    List(Vec<String>),
    /// Map of key to value
    Map(IndexMap<String, Option<ScalarConfig>>),
}

impl ListOrMap {
    /// No entries
    pub fn is_empty(&self) -> bool {
        match self {
            ListOrMap::List(list) => list.is_empty(),
            ListOrMap::Map(map) => map.is_empty(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Driver
    pub driver: Option<String>,
    /// Options
    #[serde(default)]
    pub options: Option<IndexMap<String, String>>,
}
