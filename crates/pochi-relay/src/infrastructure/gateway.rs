//! Session gateway: authorization, WebSocket upgrade, and the per-session loop.
//!
//! # Session lifecycle
//!
//! ```text
//! request ──► authorize ──► 401 "unauthorized"
//!                 │
//!                 ▼
//!          is it an upgrade? ──► 400
//!                 │
//!                 ▼
//!        send "connected" ──► loop { frame → parse → dispatch → reply }
//!                                 │
//!                 close / fault / shutdown ──► session ends
//! ```
//!
//! Frames within a session are handled strictly in order: the reply to one
//! frame is sent before the next frame is handled.  Each session runs on a
//! child of the server's shutdown token, which is also cancelled when the
//! client goes away mid-dispatch.
//!
//! A frame longer than the configured message size gets an `error:` reply
//! like any other rejected frame.  Only frames beyond the much larger
//! transport limit (see [`transport_limit`]) end the session.

use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use pochi_core::{parse, Reply};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::{Cancelled, CommandDispatcher, CommandMetrics, DispatchResult};
use crate::infrastructure::http_server::AppState;

/// Query parameter carrying the client token.
pub const TOKEN_QUERY_PARAM: &str = "token";
/// Header carrying the client token when the query parameter is absent.
pub const TOKEN_HEADER: &str = "powerpochi-token";
/// Body of the 401 response.
pub const UNAUTHORIZED_BODY: &str = "unauthorized";
/// Reply reason for a frame over the configured message size.
pub const MESSAGE_TOO_LARGE: &str = "message too large";
/// Frames read ahead while a command is dispatching.  Once this many are
/// waiting, the socket is not read again until the command finishes.
pub const MAX_PENDING_FRAMES: usize = 64;

const MIN_TRANSPORT_LIMIT: usize = 64 * 1024;
const TRANSPORT_LIMIT_FACTOR: usize = 16;

/// What a session needs to process frames.
#[derive(Clone)]
pub struct SessionContext {
    pub dispatcher: Arc<CommandDispatcher>,
    pub metrics: Arc<CommandMetrics>,
    /// Interval between server pings.  Zero disables them.
    pub keep_alive: Duration,
    /// Largest frame, in bytes, that is parsed.  Longer ones are rejected
    /// with [`MESSAGE_TOO_LARGE`].
    pub max_message_bytes: usize,
}

/// Size at which the WebSocket layer itself refuses a frame, ending the
/// session.  Kept well above `max_message_bytes` so that oversized commands
/// still get a reply.
pub fn transport_limit(max_message_bytes: usize) -> usize {
    max_message_bytes
        .saturating_mul(TRANSPORT_LIMIT_FACTOR)
        .max(MIN_TRANSPORT_LIMIT)
}

// ── Authorization ─────────────────────────────────────────────────────────────

/// Picks the caller's token: the query value if non-blank, else the header
/// value if non-blank.
pub fn extract_token<'a>(query: Option<&'a str>, header: Option<&'a str>) -> Option<&'a str> {
    query
        .filter(|t| !t.trim().is_empty())
        .or_else(|| header.filter(|t| !t.trim().is_empty()))
}

/// Exact, case-sensitive token check.  No configured token means open access.
pub fn is_authorized(configured: Option<&str>, provided: Option<&str>) -> bool {
    match configured.filter(|t| !t.trim().is_empty()) {
        None => true,
        Some(expected) => provided.is_some_and(|p| p == expected),
    }
}

// ── HTTP entry point ──────────────────────────────────────────────────────────

/// Handler for the WebSocket route.
///
/// Authorization runs before the upgrade check, so an unauthorized plain GET
/// gets 401 rather than 400.
pub async fn ws_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let header_token = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());
    let provided = extract_token(
        query.get(TOKEN_QUERY_PARAM).map(String::as_str),
        header_token,
    );
    if !is_authorized(state.config.token.as_deref(), provided) {
        warn!(%peer, "rejected connection: bad or missing token");
        return (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response();
    }

    let Some(ws) = ws else {
        debug!(%peer, "non-WebSocket request on the WebSocket route");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let ctx = state.session.clone();
    let cancel = state.shutdown.child_token();
    let limit = transport_limit(state.config.max_message_bytes);

    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| async move {
            let session_id = Uuid::new_v4();
            info!(%session_id, %peer, "session opened");
            let (tx, rx) = socket.split();
            run_session(rx, tx, &ctx, cancel, session_id).await;
            info!(%session_id, %peer, "session closed");
        })
}

// ── Session loop ──────────────────────────────────────────────────────────────

/// Runs one session until the client closes, the connection faults, or
/// `cancel` fires.
///
/// Generic over the socket halves so it can be driven by in-memory streams.
/// Never returns an error: every way out is logged here.
///
/// The socket is still read while a command is being dispatched, so that a
/// close, the end of the stream, or a fault can cancel the dispatch.  Up to
/// [`MAX_PENDING_FRAMES`] data frames read meanwhile are held and handled
/// afterwards in order; past that, reading pauses until the reply is sent.
pub async fn run_session<R, T, E>(
    mut rx: R,
    mut tx: T,
    ctx: &SessionContext,
    cancel: CancellationToken,
    session_id: Uuid,
) where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
    T: Sink<Message> + Unpin,
    T::Error: Display,
{
    if let Err(e) = tx.send(Message::Text(Reply::Connected.to_text())).await {
        warn!(%session_id, error = %e, "failed to send greeting");
        return;
    }

    let mut keep_alive = keep_alive_timer(ctx.keep_alive);
    let mut backlog: VecDeque<Message> = VecDeque::with_capacity(MAX_PENDING_FRAMES);
    let mut peer_gone = false;

    loop {
        let frame = match backlog.pop_front() {
            Some(message) => Some(Ok(message)),
            None => tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%session_id, "session cancelled");
                    break;
                }
                _ = next_tick(keep_alive.as_mut()) => {
                    if let Err(e) = tx.send(Message::Ping(Vec::new())).await {
                        warn!(%session_id, error = %e, "keep-alive ping failed");
                        break;
                    }
                    continue;
                }
                frame = rx.next() => frame,
            },
        };

        let (text, size) = match frame {
            None => {
                debug!(%session_id, "stream ended");
                break;
            }
            Some(Err(e)) => {
                warn!(%session_id, error = %e, "connection fault");
                break;
            }
            Some(Ok(Message::Close(_))) => {
                debug!(%session_id, "client closed the session");
                break;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Text(text))) => {
                let size = text.len();
                (text, size)
            }
            Some(Ok(Message::Binary(bytes))) => {
                (String::from_utf8_lossy(&bytes).into_owned(), bytes.len())
            }
        };

        let reply = if size > ctx.max_message_bytes {
            ctx.metrics.record_parse_failure();
            debug!(%session_id, size, limit = ctx.max_message_bytes, "rejected oversized frame");
            Some(Reply::error(MESSAGE_TOO_LARGE))
        } else {
            let dispatch = handle_frame(&text, ctx, &cancel, session_id);
            tokio::pin!(dispatch);
            loop {
                tokio::select! {
                    biased;
                    reply = &mut dispatch => break reply,
                    frame = rx.next(), if !peer_gone && backlog.len() < MAX_PENDING_FRAMES => match frame {
                        Some(Ok(Message::Close(_))) | None => {
                            debug!(%session_id, "client left during dispatch");
                            peer_gone = true;
                            cancel.cancel();
                        }
                        Some(Err(e)) => {
                            warn!(%session_id, error = %e, "connection fault during dispatch");
                            peer_gone = true;
                            cancel.cancel();
                        }
                        Some(Ok(message)) => backlog.push_back(message),
                    },
                }
            }
        };

        let Some(reply) = reply else {
            debug!(%session_id, "session cancelled during dispatch");
            break;
        };
        if peer_gone {
            break;
        }

        if let Err(e) = tx.send(Message::Text(reply.to_text())).await {
            warn!(%session_id, error = %e, "failed to send reply");
            break;
        }
    }

    // Flushes any pending close acknowledgement.
    let _ = tx.close().await;
}

/// Parses and dispatches one text frame, recording the outcome.
///
/// Returns `None` when dispatch was cancelled; nothing is counted then.
async fn handle_frame(
    text: &str,
    ctx: &SessionContext,
    cancel: &CancellationToken,
    session_id: Uuid,
) -> Option<Reply> {
    let request = match parse(text) {
        Ok(request) => request,
        Err(e) => {
            ctx.metrics.record_parse_failure();
            debug!(%session_id, error = %e, "rejected frame");
            return Some(Reply::error(e.to_string()));
        }
    };

    let command = request.command;
    match ctx.dispatcher.dispatch(&request, cancel).await {
        Ok(DispatchResult::Success) => {
            ctx.metrics.record_success(command);
            Some(Reply::Ok(command))
        }
        Ok(DispatchResult::Failure { reason }) => {
            ctx.metrics.record_failure(command);
            Some(Reply::error(reason))
        }
        Err(Cancelled) => None,
    }
}

fn keep_alive_timer(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(timer)
}

async fn next_tick(timer: Option<&mut Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
