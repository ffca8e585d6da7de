//! Error types for kompose

use thiserror::Error;

/// Result type for kompose operations
pub type Result<T> = std::result::Result<T, KomposeError>;

/// kompose error types
#[derive(Error, Debug)]
pub enum KomposeError {
    #[error("Invalid container env {entry} for service {service}")]
    MalformedEnvEntry { service: String, entry: String },

    #[error("Invalid container port {port} for service {service}")]
    InvalidPort { service: String, port: String },

    #[error("Unknown restart policy {policy} for service {service}")]
    UnknownRestartPolicy { service: String, policy: String },

    #[error("Failed to marshal the {kind}: {message}")]
    Serialization { kind: String, message: String },

    #[error("Error: {0}")]
    ConfigurationConflict(String),

    #[error("Compose file parse error: {0}")]
    ComposeParse(String),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("Cluster error: {0}")]
    Cluster(String),

    #[error("Scale must be defined and a positive number, got {0}")]
    InvalidScale(i64),

    #[error("Failed to write {context}: {source}")]
    Write {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl KomposeError {
    /// Wrap an IO failure with the name of what was being written
    pub fn write(context: impl Into<String>, source: std::io::Error) -> Self {
        KomposeError::Write {
            context: context.into(),
            source,
        }
    }
}
