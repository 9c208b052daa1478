//! Helper functions available inside templates.
//!
//! Every helper is pure and deterministic. The reserved endpoint helpers
//! return constants that no user input can influence, which keeps the purge
//! and stats endpoints out of the user-configurable location namespace.

use minijinja::value::{Value, ViaDeserialize};
use minijinja::{Environment, Error, ErrorKind};
use thiserror::Error;

use crate::model::{CertificateItem, Location};

/// Prefix used by [`build_location_key`] when the caller passes none.
pub const DEFAULT_LOCATION_KEY_PREFIX: &str = "confgen_location_";

/// Upstream name used by the root fallback location.
pub const DEFAULT_UPSTREAM: &str = "confgen_default_upstream";

/// Certificate field of the pair that activates the TLS listener.
pub const DEFAULT_CERTIFICATE_FIELD: &str = "default.crt";

/// Key field of the pair that activates the TLS listener.
pub const DEFAULT_KEY_FIELD: &str = "default.key";

const MANAGE_PORT: u16 = 8800;
const PURGE_LOCATION_MATCH: &str = "^/purge/(.+)";
const VTS_LOCATION_MATCH: &str = "/status";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HelperError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Build the upstream key for a location path.
///
/// `/` maps to `root`; any other path has every `/` replaced with `_`. The
/// same key names the upstream and anchors the redirect rewrite of the
/// location, so both must come from this function.
pub fn build_location_key(prefix: &str, path: &str) -> Result<String, HelperError> {
    if path.is_empty() {
        return Err(HelperError::InvalidArgument(
            "cannot build location key: path is empty".to_string(),
        ));
    }

    let prefix = if prefix.is_empty() {
        DEFAULT_LOCATION_KEY_PREFIX
    } else {
        prefix
    };

    let suffix = if path == "/" {
        "root".to_string()
    } else {
        path.replace('/', "_")
    };

    Ok(format!("{prefix}{suffix}"))
}

/// Returns true if any location is bound to `/`.
pub fn has_root_path(locations: &[Location]) -> bool {
    locations.iter().any(|location| location.path == "/")
}

pub fn is_default_certificate(item: &CertificateItem) -> bool {
    item.certificate_field == DEFAULT_CERTIFICATE_FIELD && item.key_field == DEFAULT_KEY_FIELD
}

/// Find the certificate pair that activates the TLS listener.
pub fn default_certificate(items: &[CertificateItem]) -> Option<&CertificateItem> {
    items.iter().find(|item| is_default_certificate(item))
}

/// Port of the internal management server.
pub fn manage_port() -> u16 {
    MANAGE_PORT
}

/// Regex location match of the cache purge endpoint.
pub fn purge_location_match() -> &'static str {
    PURGE_LOCATION_MATCH
}

/// Location match of the traffic status endpoint.
pub fn vts_location_match() -> &'static str {
    VTS_LOCATION_MATCH
}

/// Register all helpers as template functions.
pub fn register(env: &mut Environment<'static>) {
    env.add_global("default_upstream", DEFAULT_UPSTREAM);
    env.add_function("build_location_key", template_build_location_key);
    env.add_function("has_root_path", template_has_root_path);
    env.add_function("default_certificate", template_default_certificate);
    env.add_function("manage_port", manage_port);
    env.add_function("purge_location_match", || purge_location_match().to_string());
    env.add_function("vts_location_match", || vts_location_match().to_string());
}

fn template_build_location_key(prefix: &str, path: &str) -> Result<String, Error> {
    build_location_key(prefix, path).map_err(|err| {
        Error::new(ErrorKind::InvalidOperation, "build_location_key failed").with_source(err)
    })
}

fn template_has_root_path(locations: ViaDeserialize<Vec<Location>>) -> bool {
    has_root_path(&locations.0)
}

// Templates only see the resolved file names.
fn template_default_certificate(items: ViaDeserialize<Vec<CertificateItem>>) -> Value {
    match default_certificate(&items.0) {
        Some(item) => minijinja::context! {
            certificate_file => item.certificate_file(),
            key_file => item.key_file(),
        },
        None => Value::from(()),
    }
}
