//! Catalog-backed handlers: search, recommendations and trailers.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{MediaKind, Recommendation, SearchHit, Trailer},
    routes::AppState,
    services::{find_trailer, title_search},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

impl SearchQuery {
    /// The non-blank `query` value, or a validation error that keeps the
    /// JSON envelope when the query string itself does not decode
    fn required(params: Result<Query<Self>, QueryRejection>) -> AppResult<String> {
        let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
        params
            .query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Query parameter is required".to_string()))
    }
}

pub async fn search_movie(
    State(state): State<AppState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<SearchHit>> {
    let query = SearchQuery::required(params)?;
    let catalog = state.catalog.as_ref();
    let hit = title_search::search_title(catalog, MediaKind::Movie, &query).await?;
    Ok(Json(hit))
}

pub async fn search_show(
    State(state): State<AppState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<SearchHit>> {
    let query = SearchQuery::required(params)?;
    let catalog = state.catalog.as_ref();
    let hit = title_search::search_title(catalog, MediaKind::Tv, &query).await?;
    Ok(Json(hit))
}

pub async fn movie_recommendations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let recommendations = state
        .recommender
        .recommend_movies(state.movies.as_ref())
        .await?;
    Ok(Json(recommendations))
}

pub async fn show_recommendations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let recommendations = state
        .recommender
        .recommend_shows(state.tvshows.as_ref())
        .await?;
    Ok(Json(recommendations))
}

/// `GET /api/tmdb/:type/:id/trailer` where `type` is `movie` or `tv`
pub async fn trailer(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> AppResult<Json<Trailer>> {
    let kind: MediaKind = kind.parse().map_err(AppError::Validation)?;
    lookup_trailer(&state, kind, &id).await
}

/// `GET /api/tmdb/tv/:id/trailer`, routed apart from the generic form
/// because `/tmdb/tv/...` also hosts the show recommendations
pub async fn show_trailer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Trailer>> {
    lookup_trailer(&state, MediaKind::Tv, &id).await
}

async fn lookup_trailer(
    state: &AppState,
    kind: MediaKind,
    id: &str,
) -> AppResult<Json<Trailer>> {
    let catalog_id: i64 = id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid catalog id: {}", id)))?;

    find_trailer(state.catalog.as_ref(), kind, catalog_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No trailer found".to_string()))
}
