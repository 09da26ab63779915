use axum::{
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::db::MongoRepository;
use crate::openapi::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<MongoRepository>,
}

impl AppState {
    pub fn new(config: Config, db: Arc<MongoRepository>) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let movie_routes = Router::new()
        .route(
            "/api/movies",
            get(crate::movies::list_movies).post(crate::movies::create_movie),
        )
        .route(
            "/api/movies/:id",
            get(crate::movies::get_movie)
                .put(crate::movies::update_movie)
                .delete(crate::movies::delete_movie),
        )
        // Convenience alias: the bare root lists the catalog.
        .route("/", get(crate::movies::list_movies));

    Router::new()
        .merge(movie_routes)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn(crate::middleware::normalize_path))
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback_handler(req: Request<axum::body::Body>) -> impl IntoResponse {
    // CORS preflight for unmatched paths still gets a 200.
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    // The client connects lazily, so a router can be built without a
    // running store as long as no handler issues a query.
    async fn test_router() -> Router {
        let db = MongoRepository::new("mongodb://localhost:27017", "moviehub-test")
            .await
            .unwrap();
        build_router(AppState::new(Config::default(), Arc::new(db)))
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let router = test_router().await;
        let resp = router
            .oneshot(
                Request::builder()
                    .uri("/api/series")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preflight_on_unknown_path_is_ok() {
        let router = test_router().await;
        let resp = router
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/series")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_movie_id_is_not_found() {
        // Resolved before any store round-trip, so safe without a server.
        let router = test_router().await;
        let resp = router
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/movies/not-an-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"msg":"Movie not found"}"#);
    }

    #[tokio::test]
    async fn test_create_without_title_is_rejected() {
        let router = test_router().await;
        let resp = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/movies")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"year": 2021}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_with_malformed_body_is_rejected() {
        let router = test_router().await;
        let resp = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/movies")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"title": "#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
