//! Render engine.
//!
//! # Responsibilities
//! - Validate the render data before any expansion
//! - Expand the composed `main` template against one instance snapshot
//! - Map every failure to a `RenderError` tagged with plan and instance
//!
//! # Design Decisions
//! - Output is produced in one call and only returned on success, so a failed
//!   render never yields a truncated document
//! - All per-call state lives on the stack; the unit is shared read-only

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::schema::RuntimeOptions;
use crate::config::validation::{validate_render_data, ValidationError};
use crate::model::InstanceSnapshot;
use crate::render::composer::ComposedUnit;
use crate::render::section::Section;

/// Snapshot consumed by a single render call.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConfigurationData<'a> {
    pub config: &'a RuntimeOptions,
    pub instance: &'a InstanceSnapshot,
}

impl<'a> ConfigurationData<'a> {
    pub fn new(config: &'a RuntimeOptions, instance: &'a InstanceSnapshot) -> Self {
        Self { config, instance }
    }
}

/// Errors raised while rendering one instance.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("plan {plan}, instance {instance}: invalid render data: {}", ValidationErrors(.errors))]
    InvalidData {
        plan: String,
        instance: String,
        errors: Vec<ValidationError>,
    },

    #[error("plan {plan}, instance {instance}: template expansion failed: {source}")]
    Template {
        plan: String,
        instance: String,
        #[source]
        source: minijinja::Error,
    },
}

impl RenderError {
    /// Name of the instance whose render failed.
    pub fn instance(&self) -> &str {
        match self {
            RenderError::InvalidData { instance, .. } | RenderError::Template { instance, .. } => {
                instance
            }
        }
    }
}

struct ValidationErrors<'a>(&'a [ValidationError]);

impl fmt::Display for ValidationErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Anything that turns render data into a configuration document.
pub trait ConfigurationRenderer: Send + Sync {
    fn render(&self, data: &ConfigurationData<'_>) -> Result<String, RenderError>;
}

impl ConfigurationRenderer for ComposedUnit {
    fn render(&self, data: &ConfigurationData<'_>) -> Result<String, RenderError> {
        ComposedUnit::render(self, data)
    }
}

impl ComposedUnit {
    /// Render the full configuration document for one instance.
    pub fn render(&self, data: &ConfigurationData<'_>) -> Result<String, RenderError> {
        let plan = self.plan().unwrap_or("-").to_string();
        let instance = data.instance.name.clone();

        if let Err(errors) = validate_render_data(data.config, data.instance) {
            tracing::warn!(%plan, %instance, errors = errors.len(), "Rejected render data");
            return Err(RenderError::InvalidData {
                plan,
                instance,
                errors,
            });
        }

        let rendered = self
            .env
            .get_template(Section::Main.name())
            .and_then(|template| template.render(data));

        match rendered {
            Ok(output) => {
                tracing::debug!(%plan, %instance, bytes = output.len(), "Rendered configuration");
                Ok(output)
            }
            Err(source) => {
                tracing::warn!(%plan, %instance, error = %source, "Render failed");
                Err(RenderError::Template {
                    plan,
                    instance,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{OverrideBlocks, Plan};
    use crate::model::Location;
    use crate::render::composer::Composer;

    fn default_unit() -> ComposedUnit {
        Composer::new()
            .unwrap()
            .compose(&OverrideBlocks::default())
            .unwrap()
    }

    #[test]
    fn test_render_is_deterministic() {
        let unit = default_unit();
        let config = RuntimeOptions {
            cache_enabled: true,
            vts_enabled: true,
            ..RuntimeOptions::default()
        };
        let instance = InstanceSnapshot::new("det")
            .with_host("backend:9000")
            .with_location(Location::proxy("/api", "api:8080"));
        let data = ConfigurationData::new(&config, &instance);

        let first = unit.render(&data).unwrap();
        let second = unit.render(&data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_global_defaults() {
        let unit = default_unit();
        let config = RuntimeOptions::default();
        let instance = InstanceSnapshot::new("defaults");
        let output = unit.render(&ConfigurationData::new(&config, &instance)).unwrap();

        assert!(output.starts_with("# This file was generated by nginx-confgen."));
        assert!(output.contains("user nginx;\n"));
        assert!(output.contains("worker_processes 1;\n"));
        assert!(output.contains("worker_connections 1024;\n"));
        assert!(output.contains("listen 8080 default_server;\n"));
        assert!(output.contains("location = /_nginx_healthcheck {"));
    }

    #[test]
    fn test_configured_globals() {
        let unit = default_unit();
        let config = RuntimeOptions {
            user: Some("www-data".into()),
            worker_processes: Some(4),
            worker_connections: Some(4096),
            http_listen_options: Some("reuseport backlog=2048".into()),
            ..RuntimeOptions::default()
        };
        let instance = InstanceSnapshot::new("tuned");
        let output = unit.render(&ConfigurationData::new(&config, &instance)).unwrap();

        assert!(output.contains("user www-data;\n"));
        assert!(output.contains("worker_processes 4;\n"));
        assert!(output.contains("worker_connections 4096;\n"));
        assert!(output.contains("listen 8080 default_server reuseport backlog=2048;\n"));
    }

    #[test]
    fn test_invalid_data_names_instance() {
        let unit = Composer::new()
            .unwrap()
            .compose_plan(&Plan {
                name: "silver".into(),
                ..Plan::default()
            })
            .unwrap();
        let config = RuntimeOptions::default();
        let instance = InstanceSnapshot::new("broken").with_location(Location::proxy("", "x:80"));

        let err = unit
            .render(&ConfigurationData::new(&config, &instance))
            .unwrap_err();
        assert_eq!(err.instance(), "broken");
        assert!(matches!(err, RenderError::InvalidData { ref errors, .. } if errors.len() == 1));
        assert!(err.to_string().starts_with("plan silver, instance broken"));
    }

    #[test]
    fn test_override_expansion_error() {
        let blocks = OverrideBlocks {
            server: "{{ config.no_such_option }}".into(),
            ..OverrideBlocks::default()
        };
        let unit = Composer::new().unwrap().compose(&blocks).unwrap();
        let config = RuntimeOptions::default();
        let instance = InstanceSnapshot::new("strict");

        let err = unit
            .render(&ConfigurationData::new(&config, &instance))
            .unwrap_err();
        assert!(matches!(err, RenderError::Template { .. }));
        assert!(err.to_string().contains("plan -, instance strict"));
    }

    #[test]
    fn test_trait_object_render() {
        let renderer: Box<dyn ConfigurationRenderer> = Box::new(default_unit());
        let config = RuntimeOptions::default();
        let instance = InstanceSnapshot::new("boxed");
        let output = renderer
            .render(&ConfigurationData::new(&config, &instance))
            .unwrap();
        assert!(output.contains("instance not bound yet"));
    }
}
