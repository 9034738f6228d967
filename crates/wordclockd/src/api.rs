use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::engine::DeviceInfo;
use crate::engine::Engine;
use crate::engine::EngineError;

/// Response for the /v1/ping endpoint
#[derive(Serialize)]
struct PingResponse {
    status: String,
}

/// Response for the /v1/info endpoint
#[derive(Serialize)]
struct InfoResponse {
    version: String,
    hostname: String,
}

/// One switch as listed by /v1/switches
#[derive(Debug, Serialize)]
struct SwitchResponse {
    entity_id: String,
    unique_id: String,
    name: String,
    device: DeviceInfo,
    /// `None` until the integration reported a state
    on: Option<bool>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    version: &'static str,
    engine: Arc<Engine>,
}

/// Handler for GET /v1/ping
#[tracing::instrument]
async fn ping() -> impl IntoResponse {
    tracing::debug!("Handling /v1/ping request");
    (
        StatusCode::OK,
        Json(PingResponse {
            status: "ok".to_string(),
        }),
    )
}

/// Handler for GET /v1/info
#[tracing::instrument(skip(state))]
async fn info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::debug!("Handling /v1/info request");

    let hostname = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(InfoResponse {
            version: state.version.to_string(),
            hostname,
        }),
    )
}

fn switches(engine: &Engine) -> Vec<SwitchResponse> {
    let snapshot = engine.state_snapshot();
    let mut switches: Vec<SwitchResponse> = snapshot
        .entities
        .values()
        .filter(|info| info.platform == "switch")
        .map(|info| SwitchResponse {
            entity_id: info.entity_id.clone(),
            unique_id: info.unique_id.clone(),
            name: info.name.clone(),
            device: info.device.clone(),
            on: snapshot.switches.get(&info.entity_id).map(|s| s.on),
        })
        .collect();
    switches.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
    switches
}

/// Handler for GET /v1/switches
#[tracing::instrument(skip(state))]
async fn list_switches(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(switches(&state.engine)))
}

/// Handler for GET /v1/switches/:entity_id
#[tracing::instrument(skip(state))]
async fn get_switch(
    State(state): State<Arc<AppState>>,
    Path(entity_id): Path<String>,
) -> Response {
    match switches(&state.engine)
        .into_iter()
        .find(|s| s.entity_id == entity_id)
    {
        Some(switch) => (StatusCode::OK, Json(switch)).into_response(),
        None => error_response(EngineError::UnknownEntity(entity_id)),
    }
}

/// Handler for POST /v1/switches/:entity_id/turn_on
#[tracing::instrument(skip(state))]
async fn turn_on(State(state): State<Arc<AppState>>, Path(entity_id): Path<String>) -> Response {
    command_response(state.engine.turn_on(&entity_id))
}

/// Handler for POST /v1/switches/:entity_id/turn_off
#[tracing::instrument(skip(state))]
async fn turn_off(State(state): State<Arc<AppState>>, Path(entity_id): Path<String>) -> Response {
    command_response(state.engine.turn_off(&entity_id))
}

/// Handler for POST /v1/switches/:entity_id/update
#[tracing::instrument(skip(state))]
async fn update(State(state): State<Arc<AppState>>, Path(entity_id): Path<String>) -> Response {
    command_response(state.engine.update_entity(&entity_id))
}

/// Commands are queued to the owning integration; the new state shows up in
/// /v1/switches once the device answered.
fn command_response(result: Result<(), EngineError>) -> Response {
    match result {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(PingResponse {
                status: "accepted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: EngineError) -> Response {
    let status = match e {
        EngineError::UnknownEntity(_) => StatusCode::NOT_FOUND,
        EngineError::IntegrationNotFound(_) | EngineError::IntegrationClosed(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        EngineError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::debug!("Request failed: {}", e);
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Create the API router with all endpoints
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/ping", get(ping))
        .route("/v1/info", get(info))
        .route("/v1/switches", get(list_switches))
        .route("/v1/switches/:entity_id", get(get_switch))
        .route("/v1/switches/:entity_id/turn_on", post(turn_on))
        .route("/v1/switches/:entity_id/turn_off", post(turn_off))
        .route("/v1/switches/:entity_id/update", post(update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server
///
/// This function will bind to the specified address and serve the API endpoints.
/// It will run until the provided shutdown signal is triggered.
///
/// # Arguments
/// * `listen` - The IP address to listen on (e.g., "127.0.0.1")
/// * `port` - The port to listen on (e.g., 8565)
/// * `engine` - The engine whose switches are exposed
/// * `shutdown_rx` - A oneshot receiver that will trigger graceful shutdown
pub async fn serve(
    listen: String,
    port: u16,
    engine: Arc<Engine>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    let state = Arc::new(AppState { version, engine });
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", listen, port).parse()?;
    tracing::info!("Starting HTTP API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::engine::testing::next_event;
    use crate::engine::testing::RecordingIntegration;
    use crate::engine::Event;
    use crate::engine::ToIntegrationMessage;

    async fn started_engine() -> (Arc<Engine>, tokio::task::JoinHandle<()>) {
        let engine = Arc::new(Engine::new());
        let mut events = engine.subscribe();
        let runner = {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine.run().await.ok();
            })
        };

        let (integration, _commands) =
            RecordingIntegration::new("test", &["switch.alarm", "switch.date"]);
        engine.register_integration("test".to_string(), Box::new(integration));
        next_event(&mut events).await;
        next_event(&mut events).await;

        (engine, runner)
    }

    fn router(engine: Arc<Engine>) -> Router {
        create_router(Arc::new(AppState {
            version: "test",
            engine,
        }))
    }

    async fn call(router: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_ping() {
        let (engine, runner) = started_engine().await;
        let (status, body) = call(router(engine), "GET", "/v1/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        runner.abort();
    }

    #[tokio::test]
    async fn test_list_switches() {
        let (engine, runner) = started_engine().await;
        let (status, body) = call(router(engine), "GET", "/v1/switches").await;
        assert_eq!(status, StatusCode::OK);

        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["entity_id"], "switch.alarm");
        assert_eq!(list[0]["name"], "Word alarm");
        assert!(list[0]["on"].is_null());
        assert_eq!(list[1]["entity_id"], "switch.date");
        runner.abort();
    }

    #[tokio::test]
    async fn test_turn_on_then_get() {
        let (engine, runner) = started_engine().await;
        let mut events = engine.subscribe();

        let (status, _) = call(
            router(engine.clone()),
            "POST",
            "/v1/switches/switch.alarm/turn_on",
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        assert!(matches!(
            next_event(&mut events).await,
            Event::SwitchStateChanged { ref entity_id, .. } if entity_id == "switch.alarm"
        ));

        let (status, body) = call(router(engine), "GET", "/v1/switches/switch.alarm").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["on"], true);
        runner.abort();
    }

    #[tokio::test]
    async fn test_unknown_switch_is_not_found() {
        let (engine, runner) = started_engine().await;

        let (status, body) = call(router(engine.clone()), "GET", "/v1/switches/switch.nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("switch.nope"));

        let (status, _) = call(router(engine), "POST", "/v1/switches/switch.nope/update").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        runner.abort();
    }

    #[tokio::test]
    async fn test_update_is_routed() {
        let engine = Arc::new(Engine::new());
        let mut events = engine.subscribe();
        let runner = {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine.run().await.ok();
            })
        };
        let (integration, commands) = RecordingIntegration::new("test", &["switch.date"]);
        engine.register_integration("test".to_string(), Box::new(integration));
        next_event(&mut events).await;

        let (status, _) = call(router(engine), "POST", "/v1/switches/switch.date/update").await;
        assert_eq!(status, StatusCode::ACCEPTED);

        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while commands.lock().unwrap().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(
            commands.lock().unwrap()[0],
            ToIntegrationMessage::UpdateEntity {
                entity_id: "switch.date".to_string()
            }
        );
        runner.abort();
    }
}
