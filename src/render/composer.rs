//! Template composition.
//!
//! The composer owns the skeleton environment: helpers registered, `main`
//! bound to the built-in document and every other section bound to empty
//! content. It is built once at startup and only ever cloned afterwards, so
//! composing a plan can never leak overrides into another plan.

use std::sync::Arc;

use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;

use crate::config::schema::{OverrideBlocks, Plan};
use crate::render::helpers;
use crate::render::section::Section;
use crate::render::skeleton::DEFAULT_MAIN_TEMPLATE;

/// An override block failed to parse.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("section {section} is not a valid template: {source}")]
    InvalidSection {
        section: Section,
        #[source]
        source: minijinja::Error,
    },
}

impl CompositionError {
    /// The section that failed to parse.
    pub fn section(&self) -> Section {
        match self {
            CompositionError::InvalidSection { section, .. } => *section,
        }
    }
}

/// Builds composed units from override blocks.
#[derive(Clone)]
pub struct Composer {
    skeleton: Arc<Environment<'static>>,
}

impl Composer {
    /// Build the skeleton environment.
    pub fn new() -> Result<Self, CompositionError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        helpers::register(&mut env);

        for section in Section::ALL {
            let template = match section {
                Section::Main => DEFAULT_MAIN_TEMPLATE,
                _ => "",
            };
            env.add_template(section.name(), template)
                .map_err(|source| CompositionError::InvalidSection { section, source })?;
        }

        Ok(Self {
            skeleton: Arc::new(env),
        })
    }

    /// Merge `blocks` over the skeleton.
    ///
    /// Non-empty blocks are parsed here, once, so a malformed plan is rejected
    /// before it can reach any instance render.
    pub fn compose(&self, blocks: &OverrideBlocks) -> Result<ComposedUnit, CompositionError> {
        let mut env = (*self.skeleton).clone();
        let mut overridden = Vec::new();

        for section in blocks.overridden() {
            env.add_template_owned(section.name(), blocks.get(section).to_owned())
                .map_err(|source| CompositionError::InvalidSection { section, source })?;
            overridden.push(section);
        }

        tracing::debug!(overridden = ?overridden, "Composed template sections");

        Ok(ComposedUnit {
            env: Arc::new(env),
            overridden,
            plan: None,
        })
    }

    /// Compose the blocks of `plan`, tagging the unit with the plan name.
    pub fn compose_plan(&self, plan: &Plan) -> Result<ComposedUnit, CompositionError> {
        let mut unit = self.compose(&plan.blocks).inspect_err(|err| {
            tracing::error!(plan = %plan.name, error = %err, "Plan composition failed");
        })?;
        unit.plan = Some(plan.name.clone());
        Ok(unit)
    }
}

/// A skeleton merged with overrides, ready for repeated rendering.
///
/// Cheap to clone and safe to share between threads; rendering never mutates it.
#[derive(Clone)]
pub struct ComposedUnit {
    pub(crate) env: Arc<Environment<'static>>,
    overridden: Vec<Section>,
    plan: Option<String>,
}

impl ComposedUnit {
    /// Sections replaced by caller content.
    pub fn overridden(&self) -> &[Section] {
        &self.overridden
    }

    /// Name of the plan this unit was composed from, if known.
    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }
}

impl std::fmt::Debug for ComposedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedUnit")
            .field("overridden", &self.overridden)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_composition() {
        let composer = Composer::new().unwrap();
        let unit = composer.compose(&OverrideBlocks::default()).unwrap();
        assert!(unit.overridden().is_empty());
        assert_eq!(unit.plan(), None);
        for section in Section::ALL {
            assert!(unit.env.get_template(section.name()).is_ok());
        }
    }

    #[test]
    fn test_invalid_override_names_section() {
        let composer = Composer::new().unwrap();
        let blocks = OverrideBlocks {
            http: "{% if config.cache_enabled %}proxy_cache_valid 200 1m;".into(),
            ..OverrideBlocks::default()
        };
        let err = composer.compose(&blocks).unwrap_err();
        assert_eq!(err.section(), Section::Http);
        assert!(err.to_string().contains("section http"));
    }

    #[test]
    fn test_compose_does_not_touch_skeleton() {
        let composer = Composer::new().unwrap();
        let blocks = OverrideBlocks {
            root: "worker_rlimit_nofile 4096;".into(),
            ..OverrideBlocks::default()
        };
        let unit = composer.compose(&blocks).unwrap();
        assert_eq!(unit.overridden(), &[Section::Root]);

        let root = composer.skeleton.get_template("root").unwrap();
        assert_eq!(root.source(), "");
        let root = unit.env.get_template("root").unwrap();
        assert_eq!(root.source(), "worker_rlimit_nofile 4096;");
    }

    #[test]
    fn test_compose_plan_tags_unit() {
        let composer = Composer::new().unwrap();
        let plan = Plan {
            name: "gold".into(),
            ..Plan::default()
        };
        let unit = composer.compose_plan(&plan).unwrap();
        assert_eq!(unit.plan(), Some("gold"));
    }
}
