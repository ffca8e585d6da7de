//! Manifest encoding

use crate::error::{KomposeError, Result};
use crate::kubernetes::KubeResource;

/// Text encoding for generated manifests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// File extension
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    /// Line written after each document in a shared stream
    pub fn separator(&self) -> &'static str {
        match self {
            OutputFormat::Json => "",
            OutputFormat::Yaml => "---",
        }
    }
}

/// Encode a resource
pub fn serialize<R: KubeResource>(resource: &R, format: OutputFormat) -> Result<Vec<u8>> {
    let failed = |message: String| KomposeError::Serialization {
        kind: R::KIND.to_string(),
        message,
    };

    let data = match format {
        OutputFormat::Json => {
            serde_json::to_vec_pretty(resource).map_err(|e| failed(e.to_string()))?
        }
        OutputFormat::Yaml => serde_yaml::to_string(resource)
            .map_err(|e| failed(e.to_string()))?
            .into_bytes(),
    };

    tracing::debug!("{}", String::from_utf8_lossy(&data));
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ServiceDescriptor;
    use crate::convert::builder::build_resources;
    use crate::kubernetes::{ReplicationController, Service};

    #[test]
    fn test_json_shape() {
        let set = build_resources(&ServiceDescriptor::new("web", "nginx").port("80")).unwrap();
        let data = serialize(&set.service, OutputFormat::Json).unwrap();
        let text = String::from_utf8(data).unwrap();

        assert!(text.starts_with("{\n  \"kind\": \"Service\""));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["apiVersion"], "v1");
        assert_eq!(value["metadata"]["labels"]["service"], "web");
        assert_eq!(value["spec"]["ports"][0]["port"], 80);
        assert_eq!(value["spec"]["ports"][0]["targetPort"], 80);
        assert_eq!(value["spec"]["ports"][0]["name"], "80");
        assert_eq!(value["spec"]["ports"][0]["protocol"], "TCP");
    }

    #[test]
    fn test_yaml_round_trip() {
        let set = build_resources(
            &ServiceDescriptor::new("db", "postgres")
                .env("POSTGRES_PASSWORD=secret")
                .restart("no"),
        )
        .unwrap();

        let data = serialize(&set.replication_controller, OutputFormat::Yaml).unwrap();
        let text = String::from_utf8(data).unwrap();
        assert!(text.contains("restartPolicy: Never"));

        let decoded: ReplicationController = serde_yaml::from_str(&text).unwrap();
        assert_eq!(decoded, set.replication_controller);
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let set = build_resources(
            &ServiceDescriptor::new("web", "nginx")
                .volume("/a:/a")
                .label("b", "2")
                .label("a", "1"),
        )
        .unwrap();

        for format in [OutputFormat::Json, OutputFormat::Yaml] {
            let first = serialize(&set.deployment, format).unwrap();
            let second = serialize(&set.deployment, format).unwrap();
            assert_eq!(first, second);
        }

        let json = serialize(&set.service, OutputFormat::Json).unwrap();
        let decoded: Service = serde_json::from_slice(&json).unwrap();
        assert_eq!(decoded, set.service);
    }
}
