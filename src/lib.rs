//! Backend of a food-ordering web application.
//!
//! A CRUD service over MongoDB: user accounts, a per-user shopping cart,
//! a food catalog with image uploads, and order placement with payment
//! confirmation. Routes are grouped under `/user`, `/cart`, `/food` and
//! `/order`; uploaded images are served read-only under `/images`.
//!
//! Protected routes read a JWT from the custom `token` header. Failures of
//! any kind respond with `{"success": false, "message": ...}`.

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use auth::TOKEN_HEADER;
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .nest("/user", routes::user::router(state.clone()))
        .nest("/cart", routes::cart::router(state.clone()))
        .nest("/food", routes::food::router(state.clone()))
        .nest("/order", routes::order::router(state.clone()))
        .nest_service("/images", ServeDir::new(&state.config.upload_dir))
        .layer(cors);

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Extension, Json, Router,
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::post,
    };
    use mongodb::{Client, options::ClientOptions};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{
        auth::{AuthUser, auth_middleware, issue_token},
        config::Config,
        state::AppState,
    };

    // Parsing a plain mongodb:// URI touches no network, so the handle can
    // exist without a running server. The probe handler never queries it.
    async fn test_state() -> Arc<AppState> {
        let options = ClientOptions::parse("mongodb://localhost:27017")
            .await
            .unwrap();
        let db = Client::with_options(options).unwrap().database("test");

        Arc::new(AppState {
            config: Config {
                port: 0,
                mongo_url: String::new(),
                db_name: "test".to_string(),
                upload_dir: "uploads".to_string(),
                frontend_url: "http://localhost:5173".to_string(),
                jwt_secret: "test-secret".to_string(),
            },
            db,
        })
    }

    async fn whoami(Extension(AuthUser(user_id)): Extension<AuthUser>) -> Json<Value> {
        Json(json!({ "success": true, "id": user_id }))
    }

    fn protected_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/whoami", post(whoami))
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_token_never_reaches_the_handler() {
        let app = protected_app(test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn tampered_token_never_reaches_the_handler() {
        let state = test_state().await;
        let token = issue_token("abc123", &state.config.jwt_secret).unwrap();
        let app = protected_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/whoami")
                    .header("token", format!("{token}x"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn valid_token_forwards_the_user_id() {
        let state = test_state().await;
        let token = issue_token("abc123", &state.config.jwt_secret).unwrap();
        let app = protected_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/whoami")
                    .header("token", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["id"], "abc123");
    }
}
