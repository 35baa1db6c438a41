use axum::{extract::State, http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    error::{AppError, AppResult},
    middleware::{cors_layer, make_span_with_request_id, request_id_middleware},
    models::MediaKind,
};

pub mod items;
pub mod state;
pub mod tmdb;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health_check))
        .nest("/api", api_routes(&state))
        .fallback(unknown_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors_layer(allowed_origins)),
        )
        .with_state(state)
}

/// API routes under /api
fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest(
            "/movies",
            items::collection_routes(state.store(MediaKind::Movie), MediaKind::Movie),
        )
        .nest(
            "/tvshows",
            items::collection_routes(state.store(MediaKind::Tv), MediaKind::Tv),
        )
        .route("/tmdb/search", get(tmdb::search_movie))
        .route("/tmdb/search/tv", get(tmdb::search_show))
        .route("/tmdb/recommendations", get(tmdb::movie_recommendations))
        .route("/tmdb/tv/recommendations", get(tmdb::show_recommendations))
        .route("/tmdb/tv/:id/trailer", get(tmdb::show_trailer))
        .route("/tmdb/:type/:id/trailer", get(tmdb::trailer))
        .route("/test-db", get(test_db))
}

/// Liveness endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "message": "Watchlist API is running" }))
}

async fn unknown_route() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// Store connectivity check, returning the oldest movie when there is one
async fn test_db(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.movies.ping().await?;
    let first = state.movies.list().await?.into_iter().next();

    let body = match first {
        Some(movie) => json!({
            "message": "Database connection successful",
            "movie": movie,
        }),
        None => json!({ "message": "Database connected, but no movies found" }),
    };

    Ok(Json(body))
}
