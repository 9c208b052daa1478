//! Composed unit cache.
//!
//! Composition parses every override block, so it runs once per distinct
//! plan definition. Renders then reuse the cached unit concurrently.

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::schema::{OverrideBlocks, Plan};
use crate::render::composer::{ComposedUnit, CompositionError, Composer};

struct CachedUnit {
    blocks: OverrideBlocks,
    unit: Arc<ComposedUnit>,
}

/// Thread-safe map of plan name to its composed unit.
#[derive(Clone)]
pub struct UnitCache {
    composer: Composer,
    units: Arc<DashMap<String, CachedUnit>>,
}

impl UnitCache {
    pub fn new(composer: Composer) -> Self {
        Self {
            composer,
            units: Arc::new(DashMap::new()),
        }
    }

    /// Return the unit for `plan`, composing it if the plan is new or its
    /// blocks changed since the last call.
    ///
    /// A failed composition leaves any previously cached unit in place.
    pub fn get_or_compose(&self, plan: &Plan) -> Result<Arc<ComposedUnit>, CompositionError> {
        if let Some(cached) = self.units.get(&plan.name) {
            if cached.blocks == plan.blocks {
                return Ok(cached.unit.clone());
            }
        }

        let unit = Arc::new(self.composer.compose_plan(plan)?);
        tracing::info!(plan = %plan.name, "Composed plan template");

        self.units.insert(
            plan.name.clone(),
            CachedUnit {
                blocks: plan.blocks.clone(),
                unit: unit.clone(),
            },
        );
        Ok(unit)
    }

    /// Last successfully composed unit for `plan_name`.
    pub fn get(&self, plan_name: &str) -> Option<Arc<ComposedUnit>> {
        self.units.get(plan_name).map(|cached| cached.unit.clone())
    }

    /// Drop the unit of a deleted plan.
    pub fn invalidate(&self, plan_name: &str) -> bool {
        self.units.remove(plan_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str, server: &str) -> Plan {
        let mut plan = Plan {
            name: name.into(),
            ..Plan::default()
        };
        plan.blocks.server = server.into();
        plan
    }

    #[test]
    fn test_unchanged_plan_reuses_unit() {
        let cache = UnitCache::new(Composer::new().unwrap());
        let first = cache.get_or_compose(&plan("gold", "")).unwrap();

        // Options are not part of the composed unit.
        let mut tuned = plan("gold", "");
        tuned.config.cache_enabled = true;
        let second = cache.get_or_compose(&tuned).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_blocks_recompose() {
        let cache = UnitCache::new(Composer::new().unwrap());
        let first = cache.get_or_compose(&plan("gold", "")).unwrap();
        let second = cache
            .get_or_compose(&plan("gold", "location /x { return 204; }"))
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.plan(), Some("gold"));
    }

    #[test]
    fn test_failed_composition_keeps_previous_unit() {
        let cache = UnitCache::new(Composer::new().unwrap());
        let good = cache.get_or_compose(&plan("gold", "")).unwrap();

        assert!(cache.get_or_compose(&plan("gold", "{% for x in y %}")).is_err());
        let kept = cache.get("gold").unwrap();
        assert!(Arc::ptr_eq(&good, &kept));
    }

    #[test]
    fn test_invalidate() {
        let cache = UnitCache::new(Composer::new().unwrap());
        cache.get_or_compose(&plan("gold", "")).unwrap();
        assert!(cache.invalidate("gold"));
        assert!(!cache.invalidate("gold"));
        assert!(cache.is_empty());
    }
}
