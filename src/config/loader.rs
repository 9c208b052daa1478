//! Plan and instance loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::Plan;
use crate::config::validation::{validate_options, ValidationError};
use crate::model::InstanceSnapshot;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Toml(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Toml(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate a plan from a TOML file.
///
/// A plan without a `name` takes the file stem.
pub fn load_plan(path: &Path) -> Result<Plan, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut plan: Plan = toml::from_str(&content).map_err(ConfigError::Toml)?;

    if plan.name.is_empty() {
        plan.name = file_stem(path);
    }

    validate_options(&plan.config).map_err(ConfigError::Validation)?;

    Ok(plan)
}

/// Load an instance snapshot from a `.json` or TOML file.
///
/// Instance data is validated at render time, together with the plan options.
pub fn load_instance(path: &Path) -> Result<InstanceSnapshot, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut instance: InstanceSnapshot = if is_json {
        serde_json::from_str(&content).map_err(ConfigError::Json)?
    } else {
        toml::from_str(&content).map_err(ConfigError::Toml)?
    };

    if instance.name.is_empty() {
        instance.name = file_stem(path);
    }

    Ok(instance)
}

/// Write `contents` to `path` through a sibling temp file and a rename, so
/// readers never observe a half-written configuration.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, contents).map_err(ConfigError::Io)?;
    fs::rename(&tmp, path).map_err(ConfigError::Io)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_plan() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
            name = "gold"
            description = "cached plan"

            [config]
            cache_enabled = true
            upstream_keepalive = 32

            [blocks]
            server = "location /ping {{ return 204; }}"
            "#
        )
        .unwrap();

        let plan = load_plan(file.path()).unwrap();
        assert_eq!(plan.name, "gold");
        assert!(plan.config.cache_enabled);
        assert_eq!(plan.config.upstream_keepalive, Some(32));
        assert_eq!(plan.blocks.server, "location /ping { return 204; }");
    }

    #[test]
    fn test_plan_name_defaults_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bronze.toml");
        fs::write(&path, "").unwrap();
        assert_eq!(load_plan(&path).unwrap().name, "bronze");
    }

    #[test]
    fn test_invalid_plan_options_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.toml");
        fs::write(&path, "[config]\nsyslog_enabled = true\n").unwrap();
        assert!(matches!(load_plan(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_instance_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("shop.toml");
        fs::write(
            &toml_path,
            r#"
            host = "shop:9000"

            [[locations]]
            path = "/api"
            destination = "api:8080"

            [[certificates]]
            certificate_field = "default.crt"
            key_field = "default.key"
            "#,
        )
        .unwrap();
        let instance = load_instance(&toml_path).unwrap();
        assert_eq!(instance.name, "shop");
        assert_eq!(instance.host.as_deref(), Some("shop:9000"));
        assert_eq!(instance.certificates.len(), 1);

        let json_path = dir.path().join("blog.JSON");
        fs::write(&json_path, r#"{"name": "blog-1", "replicas": 3}"#).unwrap();
        let instance = load_instance(&json_path).unwrap();
        assert_eq!(instance.name, "blog-1");
        assert_eq!(instance.replicas, Some(3));
    }

    #[test]
    fn test_missing_file() {
        let err = load_instance(Path::new("/nonexistent/instance.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_write_atomically_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nginx.conf");
        write_atomically(&path, "first").unwrap();
        write_atomically(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("nginx.conf.tmp").exists());
    }
}
