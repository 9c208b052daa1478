//! Plan schema definitions.
//!
//! A plan bundles the runtime options and the override blocks that every
//! instance created against it shares. All types derive Serde traits for
//! deserialization from plan files.

use serde::{Deserialize, Serialize};

/// A named bundle of runtime options and override blocks.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Plan {
    /// Plan identifier, used as the composed unit cache key.
    pub name: String,

    /// Free-form description shown to plan consumers.
    pub description: String,

    /// Runtime options rendered into every instance of this plan.
    pub config: RuntimeOptions,

    /// Caller-supplied replacements for the default template sections.
    pub blocks: OverrideBlocks,
}

/// Per-plan knobs and feature toggles consumed by the render engine.
///
/// Optional fields fall back to documented defaults inside the template, so an
/// empty `[config]` table yields a working configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RuntimeOptions {
    /// System user the workers run as (default: `nginx`).
    pub user: Option<String>,

    /// Number of worker processes (default: 1).
    pub worker_processes: Option<u32>,

    /// Maximum connections per worker (default: 1024).
    pub worker_connections: Option<u32>,

    /// Stamp every request with a uuid4 request id and log it.
    pub request_id_enabled: bool,

    /// Send access and error logs to syslog instead of stdout/stderr.
    pub syslog_enabled: bool,

    /// Syslog target, required when `syslog_enabled` is set.
    pub syslog_server_address: Option<String>,

    /// Syslog facility (default: `local6`).
    pub syslog_facility: Option<String>,

    /// Syslog tag (default: `confgen`).
    pub syslog_tag: Option<String>,

    /// Enable response caching and the purge endpoint.
    pub cache_enabled: bool,

    /// Directory holding the cache and its temp files.
    pub cache_path: String,

    /// Evict entries not accessed within this period.
    pub cache_inactive: String,

    /// Maximum on-disk cache size.
    pub cache_size: String,

    /// Shared memory size of the cache keys zone.
    pub cache_zone_size: String,

    /// Files loaded per cache loader iteration.
    pub cache_loader_files: u32,

    /// Enable the virtual host traffic status module.
    pub vts_enabled: bool,

    /// Idle keepalive connections kept per upstream.
    pub upstream_keepalive: Option<u32>,

    /// Extra parameters appended to the plain HTTP listener.
    pub http_listen_options: Option<String>,

    /// Extra parameters appended to the TLS listener.
    pub https_listen_options: Option<String>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            user: None,
            worker_processes: None,
            worker_connections: None,
            request_id_enabled: false,
            syslog_enabled: false,
            syslog_server_address: None,
            syslog_facility: None,
            syslog_tag: None,
            cache_enabled: false,
            cache_path: "/var/cache/nginx/confgen".to_string(),
            cache_inactive: "3d".to_string(),
            cache_size: "3g".to_string(),
            cache_zone_size: "100m".to_string(),
            cache_loader_files: 1000,
            vts_enabled: false,
            upstream_keepalive: None,
            http_listen_options: None,
            https_listen_options: None,
        }
    }
}

/// Optional replacements for the named template sections.
///
/// An empty block keeps the built-in content for that section. The set of
/// names is closed: unknown keys are rejected at load time.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq, Hash)]
#[serde(default, deny_unknown_fields)]
pub struct OverrideBlocks {
    /// Replaces the whole document skeleton.
    pub main: String,

    /// Inserted at top level, between `events` and `http`.
    pub root: String,

    /// Inserted inside `http`, before the server blocks.
    pub http: String,

    /// Inserted at the end of the main `server` block.
    pub server: String,

    /// Body of `init_by_lua_block`.
    #[serde(rename = "lua-init")]
    pub lua_init: String,

    /// Body of `init_worker_by_lua_block`.
    #[serde(rename = "lua-worker-init")]
    pub lua_worker_init: String,
}
