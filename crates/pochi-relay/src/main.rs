//! PowerPochi relay: entry point.
//!
//! Serves the phone web page and a WebSocket endpoint on one HTTP listener,
//! and turns each remote command into key strokes on this machine.
//!
//! # Usage
//!
//! ```text
//! pochi-relay [OPTIONS]
//!
//! Options:
//!   --urls <URLS>                 Listen URL(s), ';'-separated [default: http://0.0.0.0:5000]
//!   --token <TOKEN>               Shared secret clients must present
//!   --ws-path <PATH>              WebSocket route [default: /ws]
//!   --keep-alive <SECS>           Server ping interval, 0 disables [default: 30]
//!   --max-message-bytes <BYTES>   Longer frames get an error reply [default: 4096]
//!   --web-root <DIR>              Static files for the phone page [default: wwwroot]
//!   --public-host <HOST>          Host advertised by /server-info
//!   --mappings <FILE>             Keyboard mapping TOML
//!   --log-level <LEVEL>           Used when RUST_LOG is unset [default: info]
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                        | Fallbacks                                  |
//! |---------------------------------|--------------------------------------------|
//! | `POWERPOCHI_URLS`               | `POCHI_URLS`                               |
//! | `POWERPOCHI_TOKEN`              | `POWERPOCHI_PIN`, `POCHI_TOKEN`, `POCHI_PIN` |
//! | `POWERPOCHI_WS_PATH`            |                                            |
//! | `POWERPOCHI_KEEP_ALIVE`         |                                            |
//! | `POWERPOCHI_MAX_MESSAGE_BYTES`  |                                            |
//! | `POWERPOCHI_WEB_ROOT`           |                                            |
//! | `POWERPOCHI_PUBLIC_HOST`        |                                            |
//! | `POWERPOCHI_MAPPINGS`           |                                            |
//! | `POWERPOCHI_LOG`                |                                            |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pochi_relay::application::{CommandDispatcher, CommandMetrics, KeyboardController};
use pochi_relay::domain::config::{
    normalize_token, DEFAULT_KEEP_ALIVE_SECS, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_URLS,
    DEFAULT_WEB_ROOT, DEFAULT_WS_PATH,
};
use pochi_relay::domain::{parse_listen_urls, RelayConfig};
use pochi_relay::infrastructure::injection::create_injector;
use pochi_relay::infrastructure::run_server;
use pochi_relay::infrastructure::storage::load_action_table;

const URLS_FALLBACK_ENV: &[&str] = &["POCHI_URLS"];
const TOKEN_FALLBACK_ENV: &[&str] = &["POWERPOCHI_PIN", "POCHI_TOKEN", "POCHI_PIN"];

// ── CLI argument definitions ──────────────────────────────────────────────────

/// PowerPochi presentation remote relay.
#[derive(Debug, Parser)]
#[command(
    name = "pochi-relay",
    about = "Turns phone remote commands into presentation key strokes",
    version
)]
struct Cli {
    /// Listen URL(s), separated by ';'.  Only the first is bound.
    #[arg(long, env = "POWERPOCHI_URLS")]
    urls: Option<String>,

    /// Shared secret clients must present as `?token=` or the
    /// `PowerPochi-Token` header.  Blank disables the check.
    #[arg(long, env = "POWERPOCHI_TOKEN")]
    token: Option<String>,

    /// Route of the WebSocket endpoint.
    #[arg(long, default_value = DEFAULT_WS_PATH, env = "POWERPOCHI_WS_PATH")]
    ws_path: String,

    /// Seconds between server pings.  0 disables them.
    #[arg(long, default_value_t = DEFAULT_KEEP_ALIVE_SECS, env = "POWERPOCHI_KEEP_ALIVE")]
    keep_alive: u64,

    /// Largest inbound message in bytes.  Longer frames are answered with
    /// `error:message too large`.
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_BYTES, env = "POWERPOCHI_MAX_MESSAGE_BYTES")]
    max_message_bytes: usize,

    /// Directory holding the phone web page.
    #[arg(long, default_value = DEFAULT_WEB_ROOT, env = "POWERPOCHI_WEB_ROOT")]
    web_root: PathBuf,

    /// Host name advertised by `/server-info`.
    #[arg(long, env = "POWERPOCHI_PUBLIC_HOST")]
    public_host: Option<String>,

    /// Keyboard mapping file (TOML).
    #[arg(long, env = "POWERPOCHI_MAPPINGS")]
    mappings: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info", env = "POWERPOCHI_LOG")]
    log_level: String,
}

impl Cli {
    /// Converts the parsed arguments into a [`RelayConfig`], consulting the
    /// process environment for the legacy variable names.
    fn into_config(self) -> anyhow::Result<RelayConfig> {
        self.into_config_with(|name| std::env::var(name).ok())
    }

    /// Like [`Cli::into_config`] with an injectable environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen URL, WebSocket path, or message size is
    /// invalid.
    fn into_config_with<F>(self, lookup: F) -> anyhow::Result<RelayConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let urls = self
            .urls
            .or_else(|| first_env(URLS_FALLBACK_ENV, &lookup))
            .unwrap_or_else(|| DEFAULT_URLS.to_string());
        let listen = parse_listen_urls(&urls)
            .with_context(|| format!("invalid --urls value: '{urls}'"))?;
        for url in &listen.ignored {
            warn!(%url, "only one listen URL is supported; ignoring");
        }

        let token = normalize_token(
            self.token
                .filter(|t| !t.trim().is_empty())
                .or_else(|| first_env(TOKEN_FALLBACK_ENV, &lookup)),
        );

        let config = RelayConfig {
            bind_addr: listen.bind_addr,
            token,
            ws_path: self.ws_path,
            keep_alive: Duration::from_secs(self.keep_alive),
            max_message_bytes: self.max_message_bytes,
            web_root: self.web_root,
            public_host: self.public_host.filter(|h| !h.trim().is_empty()),
            mappings: self.mappings,
        };
        config.validate().context("invalid relay configuration")?;
        Ok(config)
    }
}

/// First non-blank value among `names`.
fn first_env<F>(names: &[&str], lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str())),
        )
        .init();

    let config = cli.into_config()?;

    let table = load_action_table(config.mappings.as_deref())
        .context("failed to load keyboard mappings")?;
    let injector = create_injector();
    info!(injector = injector.name(), "keyboard injector ready");

    let controller = KeyboardController::new(Arc::new(table), injector);
    for (command, action) in controller.table().iter() {
        info!(%command, keys = %action, "binding");
    }

    if config.token.is_none() && config.binds_all_interfaces() {
        warn!("no token configured: anyone on the network can send key strokes");
    }

    let dispatcher = Arc::new(CommandDispatcher::new(Arc::new(controller)));
    let metrics = Arc::new(CommandMetrics::new());

    // ── Graceful shutdown ──────────────────────────────────────────────────────
    let shutdown = CancellationToken::new();
    let shutdown_trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                shutdown_trigger.cancel();
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, dispatcher, metrics, shutdown).await?;

    info!("PowerPochi relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::OsStr;

    use clap::{CommandFactory, FromArgMatches};

    /// Parses `args` with every `env` binding removed, so variables exported
    /// in the shell running the tests cannot leak into the result.
    fn parse_args<const N: usize>(args: [&str; N]) -> Cli {
        let matches = Cli::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args)
            .unwrap();
        Cli::from_arg_matches(&matches).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_cli_defaults() {
        // Arrange
        let cli = parse_args(["pochi-relay"]);

        // Act
        let config = cli.into_config_with(no_env).unwrap();

        // Assert
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:5000");
        assert_eq!(config.ws_path, "/ws");
        assert_eq!(config.keep_alive, Duration::from_secs(30));
        assert_eq!(config.max_message_bytes, 4096);
        assert_eq!(config.web_root, PathBuf::from("wwwroot"));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_urls_override() {
        let cli = parse_args(["pochi-relay", "--urls", "http://127.0.0.1:8080"]);
        let config = cli.into_config_with(no_env).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_only_first_of_several_urls_is_bound() {
        let cli = parse_args([
            "pochi-relay",
            "--urls",
            "http://*:7000;http://localhost:7001",
        ]);
        let config = cli.into_config_with(no_env).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:7000");
    }

    #[test]
    fn test_legacy_urls_variable_is_used_when_flag_absent() {
        let cli = parse_args(["pochi-relay"]);
        let config = cli
            .into_config_with(env_of(&[("POCHI_URLS", "http://localhost:6000")]))
            .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:6000");
    }

    #[test]
    fn test_https_url_is_rejected() {
        let cli = parse_args(["pochi-relay", "--urls", "https://0.0.0.0:5001"]);
        assert!(cli.into_config_with(no_env).is_err());
    }

    #[test]
    fn test_token_flag_wins_over_fallbacks() {
        let cli = parse_args(["pochi-relay", "--token", "abc"]);
        let config = cli
            .into_config_with(env_of(&[("POCHI_TOKEN", "zzz")]))
            .unwrap();
        assert_eq!(config.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_token_fallback_order() {
        // Arrange: two fallbacks set; the earlier name wins.
        let env = env_of(&[("POCHI_PIN", "1234"), ("POWERPOCHI_PIN", "9999")]);
        let cli = parse_args(["pochi-relay"]);

        // Act
        let config = cli.into_config_with(env).unwrap();

        // Assert
        assert_eq!(config.token.as_deref(), Some("9999"));
    }

    #[test]
    fn test_blank_token_disables_auth() {
        let cli = parse_args(["pochi-relay", "--token", "   "]);
        let config = cli.into_config_with(no_env).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn test_token_surrounding_whitespace_is_kept() {
        let cli = parse_args(["pochi-relay", "--token", " s3 "]);
        let config = cli.into_config_with(no_env).unwrap();
        assert_eq!(config.token.as_deref(), Some(" s3 "));
    }

    #[test]
    fn test_each_option_declares_its_environment_variable() {
        // Arrange
        let command = Cli::command();
        let env_of_arg = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
        };

        // Act / Assert
        for (id, var) in [
            ("urls", "POWERPOCHI_URLS"),
            ("token", "POWERPOCHI_TOKEN"),
            ("ws_path", "POWERPOCHI_WS_PATH"),
            ("keep_alive", "POWERPOCHI_KEEP_ALIVE"),
            ("max_message_bytes", "POWERPOCHI_MAX_MESSAGE_BYTES"),
            ("web_root", "POWERPOCHI_WEB_ROOT"),
            ("public_host", "POWERPOCHI_PUBLIC_HOST"),
            ("mappings", "POWERPOCHI_MAPPINGS"),
            ("log_level", "POWERPOCHI_LOG"),
        ] {
            assert_eq!(env_of_arg(id), Some(OsStr::new(var)), "{id}");
        }
    }

    #[test]
    fn test_keep_alive_zero_is_allowed() {
        let cli = parse_args(["pochi-relay", "--keep-alive", "0"]);
        let config = cli.into_config_with(no_env).unwrap();
        assert!(config.keep_alive.is_zero());
    }

    #[test]
    fn test_invalid_ws_path_is_rejected() {
        let cli = parse_args(["pochi-relay", "--ws-path", "ws"]);
        assert!(cli.into_config_with(no_env).is_err());
    }

    #[test]
    fn test_zero_message_size_is_rejected() {
        let cli = parse_args(["pochi-relay", "--max-message-bytes", "0"]);
        assert!(cli.into_config_with(no_env).is_err());
    }

    #[test]
    fn test_optional_paths() {
        let cli = parse_args([
            "pochi-relay",
            "--mappings",
            "keys.toml",
            "--web-root",
            "public",
            "--public-host",
            "slides.local",
        ]);
        let config = cli.into_config_with(no_env).unwrap();
        assert_eq!(config.mappings, Some(PathBuf::from("keys.toml")));
        assert_eq!(config.web_root, PathBuf::from("public"));
        assert_eq!(config.public_host.as_deref(), Some("slides.local"));
    }
}
