//! Axum server for the sensor/actuator HTTP surface.

use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::routes::{control, emo, health, sensor};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::gateway::CommandGateway;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    /// The only path to the board.
    pub gateway: Arc<CommandGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<CommandGateway>) -> Self {
        Self { gateway }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        // Sensors
        .route("/api/sensor/temperature", get(sensor::get_temperature))
        .route("/api/sensor/humidity", get(sensor::get_humidity))
        .route("/api/sensor/temp-humidity", get(sensor::get_temp_humidity))
        .route("/api/sensor/illumination", get(sensor::get_illumination))
        .route("/api/sensor/infrared", get(sensor::get_infrared))
        .route("/api/sensor/all", get(sensor::get_all))
        // Actuators
        .route("/api/control/led/{status}", get(control::control_led))
        .route(
            "/api/control/lcdtext/{content}",
            get(control::control_lcd_text),
        )
        .route("/api/emo/{tag}", get(emo::show_emoticon))
        // Health
        .route("/api/health", get(health::get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Serve until `shutdown` resolves, then return.
///
/// Closing the serial channel is left to the caller, which owns the gateway.
pub async fn start_server<F>(config: &ServerConfig, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP surface listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkError;
    use crate::gateway::GatewayOptions;
    use crate::hardware::{LinkOpener, SerialLink};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    struct AbsentBoard;

    #[async_trait]
    impl LinkOpener for AbsentBoard {
        async fn open(&self, port: &str) -> std::result::Result<Box<dyn SerialLink>, LinkError> {
            Err(LinkError::Open {
                port: port.to_string(),
                reason: "No such file or directory".into(),
            })
        }
    }

    fn router() -> Router {
        let gateway = CommandGateway::new(
            "/dev/ttyUSB0",
            Arc::new(AbsentBoard),
            GatewayOptions::default(),
        );
        build_router(AppState::new(Arc::new(gateway)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unavailable_board_yields_failure_envelope_with_200() {
        for uri in [
            "/api/sensor/temperature",
            "/api/sensor/all",
            "/api/control/led/on",
            "/api/control/lcdtext/hello",
            "/api/emo/happy",
        ] {
            let (status, body) = get_json(router(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body["success"], false, "{uri}");
            assert_eq!(body["message"], "串口连接失败", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_invalid_led_status_rejected_before_open() {
        let (_, body) = get_json(router(), "/api/control/led/maybe").await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "无效的状态参数，使用 'on' 或 'off'");
    }

    #[tokio::test]
    async fn test_health_reports_closed_channel() {
        let (status, body) = get_json(router(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["serial"]["port"], "/dev/ttyUSB0");
        assert_eq!(body["serial"]["open"], false);
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/api/sensor/pressure")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
