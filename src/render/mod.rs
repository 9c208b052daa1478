//! Configuration rendering subsystem.
//!
//! # Data Flow
//! ```text
//! process start:
//!     Composer::new() → skeleton environment (helpers + default sections)
//!
//! per plan (cached in UnitCache):
//!     OverrideBlocks → Composer::compose → ComposedUnit (immutable, shared)
//!
//! per instance, per reconciliation:
//!     ComposedUnit + ConfigurationData
//!         → validation (reject before expansion)
//!         → main template expansion
//!         → nginx.conf text or RenderError
//! ```
//!
//! # Design Decisions
//! - Section names are a closed enum; overrides can only replace, never add
//! - Override syntax is checked at composition time, not per render
//! - Strict undefined behaviour turns typos in overrides into render errors

pub mod cache;
pub mod composer;
pub mod engine;
pub mod helpers;
pub mod section;
pub mod skeleton;

pub use cache::UnitCache;
pub use composer::{ComposedUnit, CompositionError, Composer};
pub use engine::{ConfigurationData, ConfigurationRenderer, RenderError};
pub use helpers::{build_location_key, has_root_path, HelperError};
pub use section::Section;
