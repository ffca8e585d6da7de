//! Field mapping from compose mini-syntaxes to resource records

use crate::compose::ServiceDescriptor;
use crate::error::{KomposeError, Result};
use crate::kubernetes::types::{
    ContainerPort, EnvVar, HostPathVolumeSource, IntOrString, ServicePort, Volume, VolumeMount,
};
use rand::Rng;

/// Alphabet for generated volume names
const VOLUME_NAME_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated volume names
pub const VOLUME_NAME_LEN: usize = 20;

/// A host path bound into the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBinding {
    /// Path on the node
    pub host_path: String,
    /// Path inside the container
    pub container_path: String,
    /// Mounted read only
    pub read_only: bool,
    /// Name shared by the mount and its volume
    pub generated_name: String,
}

impl VolumeBinding {
    /// The container-side mount
    pub fn mount(&self) -> VolumeMount {
        VolumeMount {
            name: self.generated_name.clone(),
            read_only: self.read_only,
            mount_path: self.container_path.clone(),
        }
    }

    /// The pod-side hostPath volume
    pub fn volume(&self) -> Volume {
        Volume {
            name: self.generated_name.clone(),
            host_path: Some(HostPathVolumeSource {
                path: self.host_path.clone(),
            }),
        }
    }
}

/// Generate a random lowercase alphanumeric name of `len` characters
pub fn random_name(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| VOLUME_NAME_CHARS[rng.gen_range(0..VOLUME_NAME_CHARS.len())] as char)
        .collect()
}

/// Parse one `KEY=VALUE` or `KEY: 'VALUE'` environment entry
pub fn parse_env(service: &str, raw: &str) -> Result<EnvVar> {
    let malformed = || KomposeError::MalformedEnvEntry {
        service: service.to_string(),
        entry: raw.to_string(),
    };

    let (name, value) = match raw.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => {
            let (name, value) = raw.split_once(':').ok_or_else(malformed)?;
            let value = value.trim();
            let value = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .unwrap_or(value);
            (name.trim(), value)
        }
    };

    if name.is_empty() {
        return Err(malformed());
    }

    Ok(EnvVar {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Parse one `host:container[:mode]` volume entry
///
/// Entries without a `:` have no host side and yield `None`, as do entries
/// with an empty container path such as `/host::rw`.
pub fn parse_volume(raw: &str) -> Option<VolumeBinding> {
    let (host, rest) = raw.split_once(':')?;

    // Only an explicit "rw" mode makes the mount writable
    let (container, read_only) = match (rest.split_once(':'), rest.rsplit_once(':')) {
        (Some((container, _)), Some((_, mode))) => (container, mode != "rw"),
        _ => (rest, true),
    };
    if container.trim().is_empty() {
        return None;
    }

    Some(VolumeBinding {
        host_path: host.trim().to_string(),
        container_path: container.trim().to_string(),
        read_only,
        generated_name: random_name(VOLUME_NAME_LEN),
    })
}

fn parse_port_number(service: &str, raw: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| KomposeError::InvalidPort {
            service: service.to_string(),
            port: raw.to_string(),
        })
}

/// Parse the container side of a `port` or `host:container` entry
pub fn parse_container_port(service: &str, raw: &str) -> Result<ContainerPort> {
    let target = raw.split_once(':').map(|(_, target)| target).unwrap_or(raw);

    Ok(ContainerPort {
        container_port: parse_port_number(service, raw, target)?,
    })
}

/// Parse both sides of a `port` or `host:container` entry into a service port
pub fn parse_service_port(service: &str, raw: &str) -> Result<ServicePort> {
    let (exposed, target) = raw.split_once(':').unwrap_or((raw, raw));

    let port = parse_port_number(service, raw, exposed)?;
    let target_port = parse_port_number(service, raw, target)?;

    Ok(ServicePort {
        name: port.to_string(),
        protocol: "TCP".to_string(),
        port,
        target_port: IntOrString::Int(target_port),
    })
}

/// Map every environment entry of a service
pub fn map_envs(service: &ServiceDescriptor) -> Result<Vec<EnvVar>> {
    service
        .environment
        .iter()
        .map(|raw| parse_env(&service.name, raw))
        .collect()
}

/// Map every volume entry of a service, skipping those missing either side
pub fn map_volumes(service: &ServiceDescriptor) -> Vec<VolumeBinding> {
    service
        .volumes
        .iter()
        .filter_map(|raw| {
            let binding = parse_volume(raw);
            if binding.is_none() {
                tracing::debug!(
                    "Skipping volume {} for service {}: no host or container path",
                    raw,
                    service.name
                );
            }
            binding
        })
        .collect()
}

/// Map every port entry of a service to container ports
pub fn map_container_ports(service: &ServiceDescriptor) -> Result<Vec<ContainerPort>> {
    service
        .ports
        .iter()
        .map(|raw| parse_container_port(&service.name, raw))
        .collect()
}

/// Map every port entry of a service to service ports
pub fn map_service_ports(service: &ServiceDescriptor) -> Result<Vec<ServicePort>> {
    service
        .ports
        .iter()
        .map(|raw| parse_service_port(&service.name, raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_equals() {
        let env = parse_env("web", "FOO = bar").unwrap();
        assert_eq!(env.name, "FOO");
        assert_eq!(env.value, "bar");

        // Only the first separator splits
        let env = parse_env("web", "URL=http://host:80/?a=b").unwrap();
        assert_eq!(env.name, "URL");
        assert_eq!(env.value, "http://host:80/?a=b");
    }

    #[test]
    fn test_parse_env_colon_strips_quotes() {
        let env = parse_env("web", "FOO: 'bar'").unwrap();
        assert_eq!(env.name, "FOO");
        assert_eq!(env.value, "bar");

        let env = parse_env("web", "FOO: bar").unwrap();
        assert_eq!(env.value, "bar");
    }

    #[test]
    fn test_parse_env_malformed() {
        let err = parse_env("web", "FOOBAR").unwrap_err();
        assert!(matches!(
            err,
            KomposeError::MalformedEnvEntry { ref service, ref entry }
                if service == "web" && entry == "FOOBAR"
        ));

        assert!(parse_env("web", " = value").is_err());
    }

    #[test]
    fn test_parse_volume_modes() {
        let volume = parse_volume("/host:/container").unwrap();
        assert_eq!(volume.host_path, "/host");
        assert_eq!(volume.container_path, "/container");
        assert!(volume.read_only);

        let volume = parse_volume("/host:/container:rw").unwrap();
        assert_eq!(volume.container_path, "/container");
        assert!(!volume.read_only);

        let volume = parse_volume("/host:/container:ro").unwrap();
        assert_eq!(volume.container_path, "/container");
        assert!(volume.read_only);
    }

    #[test]
    fn test_parse_volume_without_host_is_skipped() {
        assert!(parse_volume("/data").is_none());

        let service = ServiceDescriptor::new("web", "nginx")
            .volume("/data")
            .volume("/a:/b");
        let volumes = map_volumes(&service);
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].host_path, "/a");
    }

    #[test]
    fn test_parse_volume_without_container_is_skipped() {
        assert!(parse_volume("a::rw").is_none());
        assert!(parse_volume("/host:").is_none());
        assert!(parse_volume("/host: :ro").is_none());

        let service = ServiceDescriptor::new("web", "nginx")
            .volume("a::rw")
            .volume("/a:/b:rw");
        let volumes = map_volumes(&service);
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].container_path, "/b");
        assert!(!volumes[0].read_only);
    }

    #[test]
    fn test_generated_volume_names() {
        let a = parse_volume("/a:/a").unwrap();
        let b = parse_volume("/b:/b").unwrap();

        assert_eq!(a.generated_name.len(), VOLUME_NAME_LEN);
        assert!(a
            .generated_name
            .bytes()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(a.generated_name, b.generated_name);

        assert_eq!(a.mount().name, a.volume().name);
        assert_eq!(a.volume().host_path.unwrap().path, "/a");
    }

    #[test]
    fn test_parse_ports_with_host_side() {
        let container = parse_container_port("web", "8080:80").unwrap();
        assert_eq!(container.container_port, 80);

        let service = parse_service_port("web", "8080:80").unwrap();
        assert_eq!(service.port, 8080);
        assert_eq!(service.target_port, IntOrString::Int(80));
        assert_eq!(service.name, "8080");
        assert_eq!(service.protocol, "TCP");
    }

    #[test]
    fn test_parse_ports_without_host_side() {
        assert_eq!(parse_container_port("web", "80").unwrap().container_port, 80);

        let service = parse_service_port("web", "80").unwrap();
        assert_eq!(service.port, 80);
        assert_eq!(service.target_port, IntOrString::Int(80));
        assert_eq!(service.name, "80");
    }

    #[test]
    fn test_parse_ports_invalid() {
        assert!(matches!(
            parse_container_port("web", "http"),
            Err(KomposeError::InvalidPort { .. })
        ));
        assert!(matches!(
            parse_service_port("web", "http:80"),
            Err(KomposeError::InvalidPort { .. })
        ));
        assert!(matches!(
            parse_service_port("web", "80:http"),
            Err(KomposeError::InvalidPort { .. })
        ));
        // The host side is not validated for container ports
        assert_eq!(
            parse_container_port("web", "http:80").unwrap().container_port,
            80
        );
    }
}
