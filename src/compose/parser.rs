//! Docker Compose file parser

use super::config::ComposeConfig;
use crate::error::{KomposeError, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Default compose file names
pub const DEFAULT_COMPOSE_FILES: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// Compose file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Find compose file in directory
    pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
        for name in DEFAULT_COMPOSE_FILES {
            let path = dir.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Parse compose file from path, interpolating the process environment
    pub fn parse_file(path: &Path) -> Result<ComposeConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KomposeError::ComposeParse(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let env: HashMap<String, String> = std::env::vars().collect();
        Self::parse_str(&interpolate(&content, &env))
    }

    /// Parse compose file from string
    pub fn parse_str(content: &str) -> Result<ComposeConfig> {
        serde_yaml::from_str(content)
            .map_err(|e| KomposeError::ComposeParse(format!("Failed to parse YAML: {}", e)))
    }
}

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\$\$|\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?)-([^}]*))?\}|\$([A-Za-z_][A-Za-z0-9_]*)",
        )
        .expect("variable pattern is valid")
    })
}

/// Interpolate `${VAR}`, `$VAR`, `${VAR-default}` and `${VAR:-default}`
///
/// `$$` is a literal `$`. Unset variables without a default expand to the
/// empty string.
pub fn interpolate(content: &str, env: &HashMap<String, String>) -> String {
    variable_pattern()
        .replace_all(content, |caps: &Captures| {
            let Some(var) = caps.get(1).or_else(|| caps.get(4)) else {
                return "$".to_string();
            };
            let default = caps.get(3).map(|d| d.as_str());
            let empty_uses_default = caps.get(2).is_some_and(|c| !c.as_str().is_empty());

            match (env.get(var.as_str()), default) {
                (Some(value), Some(default)) if value.is_empty() && empty_uses_default => {
                    default.to_string()
                }
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.to_string(),
                (None, None) => {
                    tracing::warn!(
                        "The {} variable is not set. Substituting a blank string",
                        var.as_str()
                    );
                    String::new()
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::config::ListOrMap;
    use crate::compose::ServiceDescriptor;
    use tempfile::tempdir;

    #[test]
    fn test_parse_simple_compose() {
        let yaml = r#"
version: "2"
services:
  web:
    image: nginx:latest
    ports:
      - "80:80"
  db:
    image: postgres:13
    environment:
      POSTGRES_PASSWORD: secret
"#;

        let config = ComposeParser::parse_str(yaml).unwrap();
        assert_eq!(config.services.len(), 2);
        assert!(config.services.contains_key("web"));
        assert!(config.services.contains_key("db"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = ComposeParser::parse_str("services: [unclosed");
        assert!(matches!(result, Err(KomposeError::ComposeParse(_))));
    }

    #[test]
    fn test_parse_non_string_label_values() {
        let yaml = r#"
services:
  web:
    image: nginx
    labels:
      version: 2
      stable: true
      owner: ops
      empty:
"#;

        let config = ComposeParser::parse_str(yaml).unwrap();
        let web = ServiceDescriptor::from_config("web", &config.services["web"]);
        assert_eq!(web.labels["version"], "2");
        assert_eq!(web.labels["stable"], "true");
        assert_eq!(web.labels["owner"], "ops");
        assert_eq!(web.labels["empty"], "");
    }

    #[test]
    fn test_parse_extra_hosts_forms() {
        let yaml = r#"
services:
  as_map:
    image: nginx
    extra_hosts:
      somehost: 1.2.3.4
  as_list:
    image: nginx
    extra_hosts:
      - "otherhost:50.31.209.229"
  none:
    image: nginx
    extra_hosts: []
"#;

        let config = ComposeParser::parse_str(yaml).unwrap();
        let hosts = |name: &str| config.services[name].extra_hosts.clone().unwrap();
        assert!(matches!(hosts("as_map"), ListOrMap::Map(_)));
        assert!(!hosts("as_map").is_empty());
        assert!(matches!(hosts("as_list"), ListOrMap::List(_)));
        assert!(hosts("none").is_empty());
    }

    #[test]
    fn test_interpolate() {
        let mut env = HashMap::new();
        env.insert("TAG".to_string(), "1.0.0".to_string());
        env.insert("EMPTY".to_string(), String::new());

        assert_eq!(interpolate("nginx:${TAG}", &env), "nginx:1.0.0");
        assert_eq!(interpolate("nginx:$TAG", &env), "nginx:1.0.0");
        assert_eq!(interpolate("${MISSING:-9.9}", &env), "9.9");
        assert_eq!(interpolate("${EMPTY:-fallback}", &env), "fallback");
        assert_eq!(interpolate("${EMPTY-fallback}", &env), "");
        assert_eq!(interpolate("${MISSING-fallback}", &env), "fallback");
        assert_eq!(interpolate("cost $$5", &env), "cost $5");
        assert_eq!(interpolate("${MISSING}", &env), "");
    }

    #[test]
    fn test_find_compose_file() {
        let temp = tempdir().unwrap();
        assert!(ComposeParser::find_compose_file(temp.path()).is_none());

        std::fs::write(temp.path().join("docker-compose.yml"), "services: {}\n").unwrap();
        let found = ComposeParser::find_compose_file(temp.path()).unwrap();
        assert_eq!(found, temp.path().join("docker-compose.yml"));
    }
}
