//! Per-instance data model.
//!
//! # Data Flow
//! ```text
//! reconciliation collaborator (or instance file)
//!     → InstanceSnapshot (fresh per render, never mutated)
//!     → ConfigurationData { config, instance }
//!     → render engine
//! ```

pub mod instance;

pub use instance::{CertificateItem, InstanceSnapshot, Location};
