//! nginx configuration rendering engine.
//!
//! Compiles a plan (runtime options + override blocks) and an instance
//! snapshot (locations, default host, certificates) into a complete nginx
//! configuration document.
//!
//! ```text
//! Plan.blocks ──▶ Composer::compose ──▶ ComposedUnit ──┐
//!                                                      ├──▶ render ──▶ nginx.conf
//! Plan.config + InstanceSnapshot ──▶ ConfigurationData ┘
//! ```

pub mod config;
pub mod model;
pub mod render;

pub use config::schema::{OverrideBlocks, Plan, RuntimeOptions};
pub use model::{CertificateItem, InstanceSnapshot, Location};
pub use render::{ComposedUnit, CompositionError, Composer, ConfigurationData, RenderError};
