//! CloudEvents HTTP receiver
//!
//! `POST /` accepts one CloudEvent and runs the job generator on its data.
//! Generation failures are logged and still acknowledged with `202 Accepted`;
//! only requests that are not usable CloudEvents are rejected.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use kube::ResourceExt;
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};

use cetok_job::JobGenerator;

use crate::cloudevent::CloudEvent;
use crate::error::ReceiverError;
use crate::payload::{coerce_payload, decode_data};

/// Shared state for the receiver handlers
#[derive(Clone)]
pub struct ReceiverState {
    pub generator: Arc<JobGenerator>,
}

impl ReceiverState {
    pub fn new(generator: Arc<JobGenerator>) -> Self {
        Self { generator }
    }
}

/// Summary returned for every accepted event
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// CloudEvent id
    pub id: String,
    /// Names of the Jobs created, in template order
    pub created: Vec<String>,
    /// Why generation stopped, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build the receiver router
pub fn receiver_router(state: ReceiverState) -> Router {
    Router::new()
        .route("/", post(receive_event))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

/// Handle `POST /`: decode the event, coerce its data, and generate jobs
async fn receive_event(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<EventResponse>), (StatusCode, String)> {
    let event = CloudEvent::from_http(&headers, body).map_err(|e| {
        warn!(error = %e, "rejected request");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let span = info_span!(
        "event",
        id = %event.id,
        source = %event.source,
        event_type = %event.event_type
    );

    async move {
        info!("received event");

        let data = decode_data(&event.data).map_err(|e| {
            warn!(error = %e, "rejected event data");
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;
        let payload = coerce_payload(data);
        info!(keys = ?payload.keys().collect::<Vec<_>>(), "decoded payload");

        let (created, error) = match state.generator.generate(&payload).await {
            Ok(jobs) => (jobs, None),
            Err(e) => {
                error!(error = %e, "job generation failed");
                let message = e.to_string();
                (e.created, Some(message))
            }
        };

        let created: Vec<String> = created.iter().map(|job| job.name_any()).collect();
        for name in &created {
            info!(job = %name, "generated job");
        }

        Ok::<_, (StatusCode, String)>((
            StatusCode::ACCEPTED,
            Json(EventResponse {
                id: event.id.clone(),
                created,
                error,
            }),
        ))
    }
    .instrument(span)
    .await
}

/// Serve `router` on `addr` until SIGINT or SIGTERM
pub async fn serve(addr: SocketAddr, router: Router) -> Result<(), ReceiverError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ReceiverError::Bind { addr, source })?;
    info!(addr = %addr, "CloudEvents receiver listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ReceiverError::Serve)?;

    info!("CloudEvents receiver stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
