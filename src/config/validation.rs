//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of plan options (serde handles syntactic)
//! - Reject instance data the template cannot render consistently
//! - Detect proxied locations whose upstream keys would collide
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: input → Result<(), Vec<ValidationError>>
//! - Runs before any template expansion, so a rejected input never produces
//!   partial output

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::schema::RuntimeOptions;
use crate::model::InstanceSnapshot;
use crate::render::helpers::{build_location_key, is_default_certificate};

/// A single semantic problem found in plan options or instance data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("location #{index} has an empty path")]
    EmptyLocationPath { index: usize },

    #[error("location {path} sets both destination and content")]
    ConflictingLocationTarget { path: String },

    #[error("location {path} is declared more than once")]
    DuplicateLocationPath { path: String },

    #[error("locations {first} and {second} map to the same upstream key {key}")]
    LocationKeyCollision {
        first: String,
        second: String,
        key: String,
    },

    #[error("{field} is required when {feature} is enabled")]
    MissingOption {
        field: &'static str,
        feature: &'static str,
    },

    #[error("certificate #{index} has an empty {field}")]
    EmptyCertificateField { index: usize, field: &'static str },

    #[error("default certificate pair is declared more than once")]
    DuplicateDefaultCertificate,
}

/// Validate plan options in isolation.
pub fn validate_options(config: &RuntimeOptions) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.syslog_enabled && is_blank(config.syslog_server_address.as_deref()) {
        errors.push(ValidationError::MissingOption {
            field: "syslog_server_address",
            feature: "syslog",
        });
    }

    if config.cache_enabled {
        if config.cache_path.trim().is_empty() {
            errors.push(ValidationError::MissingOption {
                field: "cache_path",
                feature: "cache",
            });
        }
        if config.cache_zone_size.trim().is_empty() {
            errors.push(ValidationError::MissingOption {
                field: "cache_zone_size",
                feature: "cache",
            });
        }
    }

    into_result(errors)
}

/// Validate one instance snapshot in isolation.
pub fn validate_instance(instance: &InstanceSnapshot) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen_paths: HashSet<&str> = HashSet::new();
    let mut seen_keys: HashMap<String, &str> = HashMap::new();

    for (index, location) in instance.locations.iter().enumerate() {
        if location.path.is_empty() {
            errors.push(ValidationError::EmptyLocationPath { index });
            continue;
        }

        if location.destination.is_some() && location.content.is_some() {
            errors.push(ValidationError::ConflictingLocationTarget {
                path: location.path.clone(),
            });
        }

        if !seen_paths.insert(location.path.as_str()) {
            errors.push(ValidationError::DuplicateLocationPath {
                path: location.path.clone(),
            });
            continue;
        }

        // Only proxied locations declare an upstream named after their key.
        if location.destination.is_none() {
            continue;
        }
        // Non-empty path, so the key is always buildable here.
        let Ok(key) = build_location_key("", &location.path) else {
            continue;
        };
        match seen_keys.get(&key) {
            Some(previous) => {
                errors.push(ValidationError::LocationKeyCollision {
                    first: previous.to_string(),
                    second: location.path.clone(),
                    key,
                });
            }
            None => {
                seen_keys.insert(key, &location.path);
            }
        }
    }

    let mut default_pairs = 0;
    for (index, item) in instance.certificates.iter().enumerate() {
        if item.certificate_field.is_empty() {
            errors.push(ValidationError::EmptyCertificateField {
                index,
                field: "certificate_field",
            });
        }
        if item.key_field.is_empty() {
            errors.push(ValidationError::EmptyCertificateField {
                index,
                field: "key_field",
            });
        }
        if is_default_certificate(item) {
            default_pairs += 1;
        }
    }
    if default_pairs > 1 {
        errors.push(ValidationError::DuplicateDefaultCertificate);
    }

    into_result(errors)
}

/// Validate everything a single render consumes.
pub fn validate_render_data(
    config: &RuntimeOptions,
    instance: &InstanceSnapshot,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_options(config).err().unwrap_or_default();
    errors.extend(validate_instance(instance).err().unwrap_or_default());
    into_result(errors)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
