//! API routes module

pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// All API routes, before docs and middleware are layered on
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/users", users::router(state))
        .merge(health::router(state.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    // Nothing listens on port 1; selection fails fast instead of hanging.
    const UNREACHABLE: &str = "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200";

    async fn state() -> AppState {
        let mongo_client = mongodb::Client::with_uri_str(UNREACHABLE).await.unwrap();
        let db = mongo_client.database("users_api_test");
        AppState {
            config: Config {
                app: app_info!(),
                mongodb: MongoConfig::with_database(UNREACHABLE, "users_api_test"),
                server: ServerConfig::default(),
                environment: Environment::Development,
                users_collection: "users".to_string(),
            },
            mongo_client,
            db,
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_uid_is_404_without_database() {
        let app = routes(&state().await);

        let (status, body) = get(app, "/users/short").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "User with that ID does not exist!" }));
    }

    #[tokio::test]
    async fn test_ready_is_503_when_mongodb_is_down() {
        let app = routes(&state().await);

        let (status, body) = get(app, "/ready").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["mongodb"], false);
    }

    #[tokio::test]
    async fn test_store_failure_is_500_with_app_error_body() {
        let app = routes(&state().await);

        let (status, body) = get(app, "/users").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
    }
}
