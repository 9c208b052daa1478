//! Plan configuration subsystem.
//!
//! # Data Flow
//! ```text
//! plan file (TOML) / instance file (TOML or JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Plan / InstanceSnapshot
//!
//! On change:
//!     watcher.rs detects a modified file
//!     → caller reloads, recomposes if blocks changed, re-renders
//! ```
//!
//! # Design Decisions
//! - Plans are immutable once loaded; changes require a full reload
//! - All option fields have defaults to allow minimal plans
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::OverrideBlocks;
pub use schema::Plan;
pub use schema::RuntimeOptions;
