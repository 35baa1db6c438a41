//! TMDB (The Movie Database) catalog provider
//!
//! API Flow:
//! 1. Search: /search/{movie|tv}?query= → first result only
//! 2. Recommendations: /{movie|tv}/{id}/recommendations?page=
//! 3. Videos: /movie/{id}/videos, /tv/{id}/videos, /tv/{id}/season/1/videos,
//!    /tv/{id}/season/1/episode/1/videos
//!
//! Authentication is the `api_key` query parameter on every request.

use crate::{
    error::{AppError, AppResult},
    models::{CatalogHit, MediaKind, TmdbPage, TmdbVideo, TmdbVideoList, VideoScope},
    services::providers::Catalog,
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String, image_base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> AppResult<Response> {
        let response = self
            .http_client
            .get(self.url(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Ok(response)
    }

    /// The request URL carries the api key, so it is dropped from the error
    fn transport_error(error: reqwest::Error) -> AppError {
        AppError::HttpClient(error.without_url())
    }

    /// Reads a JSON body, turning error statuses and parse failures into
    /// catalog errors
    async fn parse<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "TMDB API returned an error status");
            return Err(AppError::Catalog(format!(
                "TMDB API returned status {}",
                status.as_u16()
            )));
        }

        let response_text = response.text().await.map_err(Self::transport_error)?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize TMDB response"
            );
            AppError::Catalog(format!("Failed to parse TMDB response: {}", e))
        })
    }

    fn to_hits(&self, page: TmdbPage) -> Vec<CatalogHit> {
        page.results
            .into_iter()
            .map(|result| CatalogHit::from_tmdb(result, &self.image_base_url))
            .collect()
    }
}

#[async_trait::async_trait]
impl Catalog for TmdbCatalog {
    #[instrument(skip(self))]
    async fn search(&self, kind: MediaKind, query: &str) -> AppResult<Option<CatalogHit>> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Query parameter is required".to_string()));
        }

        let path = format!("search/{}", kind.as_str());
        let response = self.get(&path, &[("query", query.to_string())]).await?;
        let page: TmdbPage = Self::parse(response).await?;

        let hit = self.to_hits(page).into_iter().next();

        tracing::info!(
            query = %query,
            found = hit.is_some(),
            provider = "tmdb",
            "Catalog search completed"
        );

        Ok(hit)
    }

    #[instrument(skip(self))]
    async fn recommendations(
        &self,
        kind: MediaKind,
        catalog_id: i64,
        page: u32,
    ) -> AppResult<Vec<CatalogHit>> {
        let path = format!("{}/{}/recommendations", kind.as_str(), catalog_id);
        let response = self.get(&path, &[("page", page.to_string())]).await?;
        let listing: TmdbPage = Self::parse(response).await?;
        let hits = self.to_hits(listing);

        tracing::debug!(
            catalog_id,
            page,
            results = hits.len(),
            provider = "tmdb",
            "Recommendations fetched"
        );

        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn videos(&self, scope: VideoScope) -> AppResult<Vec<TmdbVideo>> {
        let response = self.get(&scope.path(), &[]).await?;

        // Shows without a season 1 or episode 1 answer 404
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(?scope, "No videos listing for scope");
            return Ok(vec![]);
        }

        let listing: TmdbVideoList = Self::parse(response).await?;
        Ok(listing.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
