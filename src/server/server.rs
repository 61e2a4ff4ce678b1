use anyhow::Result;
use std::{sync::Arc, time::Duration};

use tracing::{error, info};

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::mailer::{AlertDispatcher, AlertError};

use super::{log_requests, state::*, ServerConfig};

const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct SendRiskAlertBody {
    pub risk_level: Option<String>,
    pub summary: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct HistoryQuery {
    pub limit: Option<usize>,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(stats)
}

fn alert_error_status(err: &AlertError) -> StatusCode {
    match err {
        AlertError::MissingRiskLevel => StatusCode::BAD_REQUEST,
        AlertError::TransportNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        AlertError::VerificationFailed(_) | AlertError::SendFailed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn send_risk_alert(
    State(dispatcher): State<Arc<AlertDispatcher>>,
    body: Result<Json<SendRiskAlertBody>, JsonRejection>,
) -> Response {
    // A missing or malformed body is treated as an empty one; the missing
    // riskLevel is what gets reported
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let risk_level = body.risk_level.as_deref().unwrap_or("");

    info!(
        "Risk alert received ({})",
        if risk_level.is_empty() {
            "missing riskLevel".to_string()
        } else {
            format!("riskLevel={}", risk_level)
        }
    );

    match dispatcher
        .send_risk_alert(risk_level, body.summary.as_deref(), body.message.as_deref())
        .await
    {
        Ok(ack) => Json(json!({ "ok": true, "info": ack })).into_response(),
        Err(err) => (
            alert_error_status(&err),
            Json(json!({ "ok": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}

async fn get_notification_history(
    State(store): State<GuardedNotificationStore>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    match store.recent(limit) {
        Ok(notifications) => {
            Json(json!({ "ok": true, "notifications": notifications })).into_response()
        }
        Err(err) => {
            error!("Failed to read notification history: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn get_notification_stats(State(store): State<GuardedNotificationStore>) -> Response {
    match store.stats() {
        Ok(stats) => Json(json!({ "ok": true, "stats": stats })).into_response(),
        Err(err) => {
            error!("Failed to compute notification stats: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    dispatcher: Arc<AlertDispatcher>,
    notification_store: GuardedNotificationStore,
) -> Router {
    let state = ServerState::new(config, dispatcher, notification_store);

    let api_routes: Router = Router::new()
        .route("/send-risk-alert", post(send_risk_alert))
        .route("/notification-history", get(get_notification_history))
        .route("/notification-stats", get(get_notification_stats))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/api", api_routes);

    if let Some(frontend_dir) = &state.config.frontend_dir_path {
        app = app.fallback_service(ServeDir::new(frontend_dir));
    }

    // The front end is served from a different origin during development
    app.layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state, log_requests))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down");
    }
}

pub async fn run_server(
    config: ServerConfig,
    dispatcher: Arc<AlertDispatcher>,
    notification_store: GuardedNotificationStore,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, dispatcher, notification_store);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?)
}
