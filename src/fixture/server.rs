//! HTTP server fixture.
//!
//! # Responsibilities
//! - Bind an ephemeral loopback port
//! - Serve one handler (no routing) that follows a `ResponsePlan`
//! - Stream split bodies so the prompt part is flushed before the delay
//! - Tear down on `shutdown()` or drop, cutting any response still sleeping

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use futures_util::{future, stream, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::config::FixtureConfig;
use crate::fixture::plan::{ResponsePlan, Tail};
use crate::lifecycle::Shutdown;

/// How long `shutdown()` waits for in-flight connections before aborting.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// Error type for fixture startup.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("failed to bind: {0}")]
    Bind(#[from] io::Error),

    #[error("invalid content type: {0}")]
    ContentType(#[from] header::InvalidHeaderValue),

    #[error("invalid fixture url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Clone)]
struct FixtureState {
    plan: Arc<ResponsePlan>,
    content_type: HeaderValue,
    closing: CancellationToken,
}

/// A running server fixture.
pub struct FixtureServer {
    addr: SocketAddr,
    url: Url,
    shutdown: Shutdown,
    closing: CancellationToken,
    task: Option<JoinHandle<io::Result<()>>>,
}

impl FixtureServer {
    /// Bind and start serving `plan`.
    pub async fn start(config: &FixtureConfig, plan: ResponsePlan) -> Result<Self, FixtureError> {
        let bind: SocketAddr = config.bind_address.parse()?;
        let listener = TcpListener::bind(bind).await?;
        let addr = listener.local_addr()?;
        let url = Url::parse(&format!("http://{addr}/"))?;

        let closing = CancellationToken::new();
        let state = FixtureState {
            content_type: HeaderValue::from_str(&config.content_type)?,
            plan: Arc::new(plan),
            closing: closing.clone(),
        };
        let app = Router::new()
            .fallback(respond)
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        let shutdown = Shutdown::new();
        let signal = shutdown.signal();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
        });

        tracing::debug!(address = %addr, "Fixture listening");

        Ok(Self {
            addr,
            url,
            shutdown,
            closing,
            task: Some(task),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and cut sleeping responses, then wait a short grace
    /// period for connections to close before aborting the serve loop.
    pub async fn shutdown(mut self) {
        self.shutdown.trigger();
        self.closing.cancel();
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
                Ok(Ok(Err(e))) => tracing::warn!(address = %self.addr, error = %e, "Fixture serve loop failed"),
                Ok(_) => tracing::debug!(address = %self.addr, "Fixture stopped"),
                Err(_) => {
                    task.abort();
                    tracing::debug!(address = %self.addr, "Fixture aborted while draining");
                }
            }
        }
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
        self.closing.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// The single handler: every request gets the planned response.
async fn respond(State(state): State<FixtureState>) -> Response {
    let plan = state.plan.as_ref();
    if !plan.head_delay.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(plan.head_delay) => {}
            _ = state.closing.cancelled() => return StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }

    let (head, rest) = plan.chunks();
    let body = match rest {
        None => Body::from(head),
        Some(rest) => {
            let delay = plan.tail_delay;
            let tail = plan.tail;
            let closing = state.closing.clone();
            let trickle = stream::once(future::ready(Ok::<_, io::Error>(head))).chain(
                stream::once(async move {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = closing.cancelled() => {
                            return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "fixture shut down"));
                        }
                    }
                    match tail {
                        Tail::Deliver => Ok(rest),
                        Tail::Abort => {
                            tracing::debug!("Aborting response mid-body");
                            Err(io::Error::new(io::ErrorKind::ConnectionAborted, "fixture aborted body"))
                        }
                    }
                }),
            );
            Body::from_stream(trickle)
        }
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, state.content_type.clone()),
            (header::CONTENT_LENGTH, HeaderValue::from(plan.content_length())),
        ],
        body,
    )
        .into_response()
}
