//! Webhook HTTP server
//!
//! The provider expects HTTP 200 on every delivery; failures are carried in
//! the response body and the logs only.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use fleetwatch_pipeline::NotificationPipeline;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared webhook server state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<NotificationPipeline>,
}

/// Create the webhook router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook/fleet", post(fleet_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the webhook server
pub async fn start_server(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let app = create_router(state);

    info!("Starting webhook server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn fleet_webhook(State(state): State<AppState>, Json(payload): Json<Value>) -> impl IntoResponse {
    let outcome = state.pipeline.handle_webhook(&payload).await;
    Json(json!({
        "status": outcome.status,
        "message": outcome.message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use fleetwatch_core::Subscription;
    use fleetwatch_db::Database;
    use fleetwatch_fleet::mock::{MockFleet, MockRoadSpeed};
    use fleetwatch_notify::mock::MockNotifier;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    async fn setup() -> (Router, Arc<MockNotifier>, TempDir) {
        let dir = tempdir().unwrap();
        let db = Arc::new(Database::new(&dir.path().join("test.db")).await.unwrap());
        let company_id = db.companies().insert("Acme", "key").await.unwrap();
        db.trucks().insert("Unit 7", 42, company_id).await.unwrap();
        db.subscriptions()
            .insert(&Subscription::engine_status(100, 42, "deviceMovement"))
            .await
            .unwrap();

        let notifier = Arc::new(MockNotifier::new());
        let pipeline = Arc::new(NotificationPipeline::new(
            db,
            Arc::new(MockFleet::new()),
            Arc::new(MockRoadSpeed::new()),
            notifier.clone(),
        ));

        (create_router(AppState { pipeline }), notifier, dir)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _, _dir) = setup().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_webhook_answers_200_on_good_payload() {
        let (app, notifier, _dir) = setup().await;
        let payload = json!({
            "eventType": "AlertIncident",
            "data": {
                "happenedAtTime": "2024-06-01T12:30:00Z",
                "conditions": [{
                    "description": "Vehicle movement",
                    "details": { "deviceMovement": { "vehicle": { "id": "42" } } }
                }]
            }
        });

        let response = app
            .oneshot(
                Request::post("/webhook/fleet")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(notifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_webhook_answers_200_on_bad_payload() {
        let (app, notifier, _dir) = setup().await;
        let payload = json!({
            "eventType": "AlertIncident",
            "data": { "conditions": [] }
        });

        let response = app
            .oneshot(
                Request::post("/webhook/fleet")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(notifier.call_count(), 0);
    }
}
