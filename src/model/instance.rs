//! Instance snapshot types.

use serde::{Deserialize, Serialize};

/// Everything the render engine needs to know about one proxy instance.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct InstanceSnapshot {
    /// Instance identifier, reported in render errors.
    pub name: String,

    /// Default backend address used by the root fallback location.
    pub host: Option<String>,

    /// Public path rules, rendered in order.
    pub locations: Vec<Location>,

    /// TLS material mounted for this instance.
    pub certificates: Vec<CertificateItem>,

    /// Desired replica count. Display only, never rendered.
    pub replicas: Option<u32>,
}

impl InstanceSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_certificate(mut self, item: CertificateItem) -> Self {
        self.certificates.push(item);
        self
    }
}

/// A public path that either proxies to a destination or serves literal content.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Location {
    /// nginx location match, e.g. `/api` or `= /ping`.
    pub path: String,

    /// Backend address; mutually exclusive with `content`.
    #[serde(default)]
    pub destination: Option<String>,

    /// Redirect plain HTTP requests to HTTPS before proxying.
    #[serde(default)]
    pub force_https: bool,

    /// Raw directives emitted verbatim inside the location block.
    #[serde(default)]
    pub content: Option<String>,
}

impl Location {
    /// A location proxying to `destination`.
    pub fn proxy(path: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            destination: Some(destination.into()),
            force_https: false,
            content: None,
        }
    }

    /// A location serving literal directives.
    pub fn literal(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            destination: None,
            force_https: false,
            content: Some(content.into()),
        }
    }

    pub fn force_https(mut self) -> Self {
        self.force_https = true;
        self
    }
}

/// A certificate/key pair reference.
///
/// The fields name entries of the mounted certificate secret. The optional
/// paths override where the files live relative to the certs directory.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CertificateItem {
    pub certificate_field: String,
    pub key_field: String,
    #[serde(default)]
    pub certificate_path: Option<String>,
    #[serde(default)]
    pub key_path: Option<String>,
}

impl CertificateItem {
    pub fn new(certificate_field: impl Into<String>, key_field: impl Into<String>) -> Self {
        Self {
            certificate_field: certificate_field.into(),
            key_field: key_field.into(),
            certificate_path: None,
            key_path: None,
        }
    }

    /// File holding the certificate, falling back to the field name.
    pub fn certificate_file(&self) -> &str {
        self.certificate_path
            .as_deref()
            .unwrap_or(&self.certificate_field)
    }

    /// File holding the private key, falling back to the field name.
    pub fn key_file(&self) -> &str {
        self.key_path.as_deref().unwrap_or(&self.key_field)
    }
}
