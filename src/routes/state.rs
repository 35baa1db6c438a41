use std::sync::Arc;

use crate::{
    db::RecordStore,
    models::MediaKind,
    services::{Catalog, Recommender},
};

/// Shared application state
///
/// Every handle is constructed once at startup and passed in; nothing here
/// is process-global.
#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<dyn RecordStore>,
    pub tvshows: Arc<dyn RecordStore>,
    pub catalog: Arc<dyn Catalog>,
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(
        movies: Arc<dyn RecordStore>,
        tvshows: Arc<dyn RecordStore>,
        catalog: Arc<dyn Catalog>,
        recommender: Recommender,
    ) -> Self {
        Self {
            movies,
            tvshows,
            catalog,
            recommender: Arc::new(recommender),
        }
    }

    /// Collection backing the given media kind
    pub fn store(&self, kind: MediaKind) -> Arc<dyn RecordStore> {
        match kind {
            MediaKind::Movie => self.movies.clone(),
            MediaKind::Tv => self.tvshows.clone(),
        }
    }

    /// Closes both collections; called once after the server stops
    pub async fn shutdown(&self) {
        self.movies.close().await;
        self.tvshows.close().await;
    }
}
