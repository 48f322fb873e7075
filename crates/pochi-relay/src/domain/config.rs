//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for runtime settings.  Build
//! it once at startup and share it behind an `Arc`.
//!
//! # Listen URLs
//!
//! The relay binds exactly one address.  `--urls` accepts a `;`-separated
//! list for compatibility with hosting conventions; the first entry is bound
//! and the rest are reported back in [`ListenUrls::ignored`] so the caller can
//! warn about them.
//!
//! Accepted forms: `http://<ip>:<port>`, `http://localhost:<port>`,
//! `http://*:<port>` and `http://+:<port>` (the last two bind all interfaces).

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::{Host, Url};

/// Default listen URL.
pub const DEFAULT_URLS: &str = "http://0.0.0.0:5000";
/// Default WebSocket endpoint path.
pub const DEFAULT_WS_PATH: &str = "/ws";
/// Default keep-alive ping interval, in seconds.
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 30;
/// Default maximum inbound message size, in bytes.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4096;
/// Default static web root.
pub const DEFAULT_WEB_ROOT: &str = "wwwroot";

/// Errors raised while validating configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no listen URL configured")]
    NoListenUrl,

    #[error("invalid listen URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported scheme '{scheme}' in listen URL '{url}' (only http is supported)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("listen URL '{0}' must use an IP address, localhost, '*' or '+' as host")]
    UnsupportedHost(String),

    #[error("WebSocket path '{0}' must start with '/' and name a sub-path")]
    InvalidWsPath(String),

    #[error("maximum message size must be greater than zero")]
    ZeroMessageSize,
}

/// Result of parsing a `;`-separated listen URL list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenUrls {
    /// Socket address derived from the first URL.
    pub bind_addr: SocketAddr,
    /// Every URL after the first, verbatim.
    pub ignored: Vec<String>,
}

/// Parses the `--urls` value.
///
/// # Errors
///
/// Returns [`ConfigError`] if the list is empty or the first URL is not a
/// bindable `http` URL.  Entries after the first are not validated.
pub fn parse_listen_urls(raw: &str) -> Result<ListenUrls, ConfigError> {
    let mut entries = raw.split(';').map(str::trim).filter(|s| !s.is_empty());
    let first = entries.next().ok_or(ConfigError::NoListenUrl)?;
    let bind_addr = parse_listen_url(first)?;
    Ok(ListenUrls {
        bind_addr,
        ignored: entries.map(str::to_string).collect(),
    })
}

fn parse_listen_url(raw: &str) -> Result<SocketAddr, ConfigError> {
    // `*` and `+` are wildcard hosts, which `Url` would otherwise treat as
    // (invalid) domain names.
    let normalized = raw
        .replacen("://*", "://0.0.0.0", 1)
        .replacen("://+", "://0.0.0.0", 1);

    let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" {
        return Err(ConfigError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    let ip = match url.host() {
        Some(Host::Ipv4(v4)) => IpAddr::V4(v4),
        Some(Host::Ipv6(v6)) => IpAddr::V6(v6),
        Some(Host::Domain(d)) if d.eq_ignore_ascii_case("localhost") => {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
        _ => return Err(ConfigError::UnsupportedHost(raw.to_string())),
    };
    let port = url.port_or_known_default().unwrap_or(80);

    Ok(SocketAddr::new(ip, port))
}

/// Treats a blank token as "no token".  Any other value is kept byte for byte,
/// surrounding whitespace included.
pub fn normalize_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

/// Checks that `path` is usable as the WebSocket route.
///
/// # Errors
///
/// [`ConfigError::InvalidWsPath`] unless `path` starts with `/` and is longer
/// than `/` itself.
pub fn validate_ws_path(path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') && path.len() > 1 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWsPath(path.to_string()))
    }
}

/// All runtime configuration for the relay.
///
/// # Example
///
/// ```rust
/// use pochi_relay::domain::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 5000);
/// assert_eq!(cfg.ws_path, "/ws");
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub bind_addr: SocketAddr,

    /// Shared secret clients must present.  `None` disables the check.
    pub token: Option<String>,

    /// Route of the WebSocket endpoint.
    pub ws_path: String,

    /// Interval between server-initiated WebSocket pings.  Zero disables them.
    pub keep_alive: Duration,

    /// Largest inbound message accepted, in bytes.  Bigger frames end the session.
    pub max_message_bytes: usize,

    /// Directory served for any path not claimed by an endpoint.
    pub web_root: PathBuf,

    /// Host name advertised by `/server-info` instead of the bind address.
    pub public_host: Option<String>,

    /// Optional keyboard mapping file.
    pub mappings: Option<PathBuf>,
}

impl RelayConfig {
    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_ws_path(&self.ws_path)?;
        if self.max_message_bytes == 0 {
            return Err(ConfigError::ZeroMessageSize);
        }
        Ok(())
    }

    /// `true` when the listener accepts connections on every interface.
    pub fn binds_all_interfaces(&self) -> bool {
        let ip = self.bind_addr.ip();
        ip == IpAddr::V4(Ipv4Addr::UNSPECIFIED) || ip == IpAddr::V6(Ipv6Addr::UNSPECIFIED)
    }
}

impl Default for RelayConfig {
    /// | Field             | Default          |
    /// |-------------------|------------------|
    /// | bind_addr         | `0.0.0.0:5000`   |
    /// | token             | none             |
    /// | ws_path           | `/ws`            |
    /// | keep_alive        | 30 seconds       |
    /// | max_message_bytes | 4096             |
    /// | web_root          | `wwwroot`        |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000),
            token: None,
            ws_path: DEFAULT_WS_PATH.to_string(),
            keep_alive: Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            web_root: PathBuf::from(DEFAULT_WEB_ROOT),
            public_host: None,
            mappings: None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
