//! Detection of compose keys with no Kubernetes counterpart

use crate::compose::ServiceConfig;

type IsSet = fn(&ServiceConfig) -> bool;

/// Compose keys that are parsed but dropped, with a check for whether a
/// service sets them
pub const UNSUPPORTED_KEYS: &[(&str, IsSet)] = &[
    ("build", |s| s.build.is_some()),
    ("cap_add", |s| s.cap_add.as_ref().is_some_and(|v| !v.is_empty())),
    ("cap_drop", |s| s.cap_drop.as_ref().is_some_and(|v| !v.is_empty())),
    ("cpuset", |s| s.cpuset.is_some()),
    ("cpu_shares", |s| s.cpu_shares.is_some()),
    ("container_name", |s| s.container_name.is_some()),
    ("devices", |s| s.devices.as_ref().is_some_and(|v| !v.is_empty())),
    ("dns", |s| s.dns.is_some()),
    ("dns_search", |s| s.dns_search.is_some()),
    ("dockerfile", |s| s.dockerfile.is_some()),
    ("domainname", |s| s.domainname.is_some()),
    ("entrypoint", |s| s.entrypoint.is_some()),
    ("env_file", |s| s.env_file.is_some()),
    ("hostname", |s| s.hostname.is_some()),
    ("log_driver", |s| s.log_driver.is_some()),
    ("log_opt", |s| s.log_opt.as_ref().is_some_and(|m| !m.is_empty())),
    ("logging", |s| s.logging.is_some()),
    ("mem_limit", |s| s.mem_limit.is_some()),
    ("memswap_limit", |s| s.memswap_limit.is_some()),
    ("net", |s| s.net.is_some()),
    ("network_mode", |s| s.network_mode.is_some()),
    ("pid", |s| s.pid.is_some()),
    ("uts", |s| s.uts.is_some()),
    ("ipc", |s| s.ipc.is_some()),
    ("read_only", |s| s.read_only == Some(true)),
    ("stdin_open", |s| s.stdin_open == Some(true)),
    ("security_opt", |s| s.security_opt.as_ref().is_some_and(|v| !v.is_empty())),
    ("tty", |s| s.tty == Some(true)),
    ("user", |s| s.user.is_some()),
    ("volume_driver", |s| s.volume_driver.is_some()),
    ("volumes_from", |s| s.volumes_from.as_ref().is_some_and(|v| !v.is_empty())),
    ("expose", |s| s.expose.as_ref().is_some_and(|v| !v.is_empty())),
    ("external_links", |s| s.external_links.as_ref().is_some_and(|v| !v.is_empty())),
    ("extra_hosts", |s| s.extra_hosts.as_ref().is_some_and(|v| !v.is_empty())),
];

/// Warn about every unsupported key the service sets, returning their names
pub fn check_unsupported_keys(name: &str, service: &ServiceConfig) -> Vec<&'static str> {
    UNSUPPORTED_KEYS
        .iter()
        .filter(|(_, is_set)| is_set(service))
        .map(|(key, _)| {
            tracing::warn!("Unsupported key {} in service {} - ignoring", key, name);
            *key
        })
        .collect()
}
