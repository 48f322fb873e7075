//! HTTP host: one listener for the WebSocket route, the health and info endpoints, and
//! the static web root.
//!
//! # Routes
//!
//! | Path            | Response                                         |
//! |-----------------|--------------------------------------------------|
//! | `<ws_path>`     | WebSocket session (see [`gateway`])              |
//! | `/health`       | `{"status":"ok"}`                                |
//! | `/metrics`      | [`MetricsSnapshot`](crate::application::MetricsSnapshot) |
//! | `/server-info`  | `{"baseUrl": ..., "webSocketUrl": ...}`          |
//! | anything else   | file from the web root, or 404                   |
//!
//! Shutdown is driven by a [`CancellationToken`]: cancelling it stops the
//! listener and, through child tokens, every open session.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::application::{CommandDispatcher, CommandMetrics, MetricsSnapshot};
use crate::domain::RelayConfig;
use crate::infrastructure::gateway::{self, SessionContext};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub session: SessionContext,
    pub server_info: Arc<ServerInfo>,
    /// Parent of every session's cancellation token.
    pub shutdown: CancellationToken,
}

/// Connection hints for the phone page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub base_url: String,
    pub web_socket_url: String,
}

impl ServerInfo {
    /// Derives the advertised URLs from the configured public host or the
    /// address actually bound.
    ///
    /// A wildcard bind address is replaced with the machine's primary LAN
    /// address, since `0.0.0.0` is useless to a phone.
    pub fn resolve(public_host: Option<&str>, local_addr: SocketAddr, ws_path: &str) -> Self {
        let host = match public_host.map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) => host.to_string(),
            None => {
                let ip = if local_addr.ip().is_unspecified() {
                    primary_lan_ip().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
                } else {
                    local_addr.ip()
                };
                format_host(ip)
            }
        };
        let authority = format!("{host}:{}", local_addr.port());
        Self {
            base_url: format!("http://{authority}"),
            web_socket_url: format!("ws://{authority}{ws_path}"),
        }
    }
}

fn format_host(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    }
}

/// Address of the interface the OS would route outbound traffic through.
///
/// Connecting a UDP socket only selects a route; no packet is sent.
fn primary_lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9)).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified() && !ip.is_loopback()).then_some(ip)
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Builds the full route table.
pub fn build_router(state: AppState) -> Router {
    let ws_path = state.config.ws_path.clone();
    let web_root = ServeDir::new(&state.config.web_root);

    Router::new()
        .route(&ws_path, get(gateway::ws_handler))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/server-info", get(server_info))
        .fallback_service(web_root)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.session.metrics.snapshot())
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfo> {
    Json(state.server_info.as_ref().clone())
}

// ── Server ────────────────────────────────────────────────────────────────────

/// A bound, not yet running relay.
///
/// Binding and serving are split so callers (and tests binding port 0) can
/// learn the real address before the first connection.
pub struct RelayServer {
    listener: TcpListener,
    state: AppState,
}

impl RelayServer {
    /// Binds `config.bind_addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(
        config: RelayConfig,
        dispatcher: Arc<CommandDispatcher>,
        metrics: Arc<CommandMetrics>,
        shutdown: CancellationToken,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.bind_addr))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read the bound address")?;

        let server_info = ServerInfo::resolve(
            config.public_host.as_deref(),
            local_addr,
            &config.ws_path,
        );
        if !config.web_root.is_dir() {
            warn!(path = %config.web_root.display(), "web root not found; static files will 404");
        }

        let session = SessionContext {
            dispatcher,
            metrics,
            keep_alive: config.keep_alive,
            max_message_bytes: config.max_message_bytes,
        };
        let state = AppState {
            config: Arc::new(config),
            session,
            server_info: Arc::new(server_info),
            shutdown,
        };
        Ok(Self { listener, state })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.state.server_info
    }

    /// Serves until the shutdown token is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the accept loop fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = self.state.shutdown.clone();
        info!(
            addr = %self.local_addr().context("failed to read the bound address")?,
            base_url = %self.state.server_info.base_url,
            ws_url = %self.state.server_info.web_socket_url,
            auth = self.state.config.token.is_some(),
            "relay listening"
        );

        let app = build_router(self.state);
        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("HTTP server failed")?;

        info!("relay stopped accepting connections");
        Ok(())
    }
}

/// Binds and serves in one call.
///
/// # Errors
///
/// Returns an error if binding fails or the server stops abnormally.
pub async fn run_server(
    config: RelayConfig,
    dispatcher: Arc<CommandDispatcher>,
    metrics: Arc<CommandMetrics>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    RelayServer::bind(config, dispatcher, metrics, shutdown)
        .await?
        .run()
        .await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_host_wins() {
        let addr: SocketAddr = "0.0.0.0:5000".parse().unwrap();

        let info = ServerInfo::resolve(Some("slides.local"), addr, "/ws");

        assert_eq!(info.base_url, "http://slides.local:5000");
        assert_eq!(info.web_socket_url, "ws://slides.local:5000/ws");
    }

    #[test]
    fn test_specific_bind_address_is_advertised() {
        let addr: SocketAddr = "192.168.1.20:8080".parse().unwrap();

        let info = ServerInfo::resolve(None, addr, "/remote");

        assert_eq!(info.base_url, "http://192.168.1.20:8080");
        assert_eq!(info.web_socket_url, "ws://192.168.1.20:8080/remote");
    }

    #[test]
    fn test_blank_public_host_is_ignored() {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        let info = ServerInfo::resolve(Some("  "), addr, "/ws");

        assert_eq!(info.base_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let addr: SocketAddr = "[::1]:5000".parse().unwrap();

        let info = ServerInfo::resolve(None, addr, "/ws");

        assert_eq!(info.web_socket_url, "ws://[::1]:5000/ws");
    }

    #[test]
    fn test_wildcard_bind_never_advertises_unspecified_address() {
        let addr: SocketAddr = "0.0.0.0:5000".parse().unwrap();

        let info = ServerInfo::resolve(None, addr, "/ws");

        assert!(!info.base_url.contains("0.0.0.0"));
        assert!(info.base_url.ends_with(":5000"));
    }

    #[test]
    fn test_server_info_json_shape() {
        let info = ServerInfo {
            base_url: "http://h:1".into(),
            web_socket_url: "ws://h:1/ws".into(),
        };

        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "baseUrl": "http://h:1", "webSocketUrl": "ws://h:1/ws" })
        );
    }
}
