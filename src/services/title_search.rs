use crate::{
    error::{AppError, AppResult},
    models::{MediaKind, SearchHit},
    services::providers::Catalog,
};

/// Service function for title search
///
/// Delegates to the configured Catalog and turns an empty result into a
/// not-found error for the HTTP layer.
pub async fn search_title(
    catalog: &dyn Catalog,
    kind: MediaKind,
    query: &str,
) -> AppResult<SearchHit> {
    catalog
        .search(kind, query)
        .await?
        .map(SearchHit::from)
        .ok_or_else(|| AppError::NotFound("No results found".to_string()))
}
