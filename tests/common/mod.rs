//! Shared fixtures for render integration tests.

#![allow(dead_code)]

use nginx_confgen::{
    ComposedUnit, Composer, ConfigurationData, InstanceSnapshot, OverrideBlocks, RuntimeOptions,
};

/// Compose `blocks` over a fresh skeleton.
pub fn compose(blocks: OverrideBlocks) -> ComposedUnit {
    Composer::new()
        .expect("skeleton must compose")
        .compose(&blocks)
        .expect("blocks must compose")
}

/// Compose the all-defaults unit.
pub fn default_unit() -> ComposedUnit {
    compose(OverrideBlocks::default())
}

/// Render and unwrap, for tests that expect success.
pub fn render(unit: &ComposedUnit, config: &RuntimeOptions, instance: &InstanceSnapshot) -> String {
    unit.render(&ConfigurationData::new(config, instance))
        .expect("render must succeed")
}

/// Count lines whose trimmed form starts with `prefix`.
pub fn count_lines(output: &str, prefix: &str) -> usize {
    output
        .lines()
        .filter(|line| line.trim_start().starts_with(prefix))
        .count()
}

/// Body lines of the first main-server `location <path> {` block.
pub fn location_block(output: &str, path: &str) -> Option<String> {
    let header = format!("        location {} {{", path);
    let mut lines = output.lines().skip_while(|line| *line != header);
    lines.next()?;
    let body: Vec<&str> = lines.take_while(|line| *line != "        }").collect();
    Some(body.join("\n"))
}
