use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::{collections::HashSet, sync::Arc, sync::Mutex};

use crate::{
    db::RecordStore,
    error::{AppError, AppResult},
    models::{MediaKind, Recommendation},
    services::providers::Catalog,
};

/// Watchlist entries used as seeds per request
const MAX_SOURCES: usize = 3;
/// Upper bound on returned recommendations
const MAX_RESULTS: usize = 10;
/// Recommendation pages are drawn from 1..=MAX_PAGE for variety
const MAX_PAGE: u32 = 3;

/// Generates watch recommendations from a random sample of the watchlist
///
/// For each sampled entry the catalog is searched by title, and one random
/// page of the catalog's recommendations for the first hit is collected.
/// Results are de-duplicated by exact title, shuffled and truncated.
pub struct Recommender {
    catalog: Arc<dyn Catalog>,
    rng: Mutex<StdRng>,
}

impl Recommender {
    pub fn new(catalog: Arc<dyn Catalog>, rng: StdRng) -> Self {
        Self {
            catalog,
            rng: Mutex::new(rng),
        }
    }

    /// Seeded when `seed` is given, otherwise from OS entropy
    pub fn with_seed(catalog: Arc<dyn Catalog>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(catalog, rng)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> AppResult<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("Random source poisoned".to_string()))?;
        Ok(f(&mut *rng))
    }

    pub async fn recommend_movies(
        &self,
        movies: &dyn RecordStore,
    ) -> AppResult<Vec<Recommendation>> {
        self.recommend(MediaKind::Movie, movies).await
    }

    pub async fn recommend_shows(
        &self,
        shows: &dyn RecordStore,
    ) -> AppResult<Vec<Recommendation>> {
        self.recommend(MediaKind::Tv, shows).await
    }

    pub async fn recommend(
        &self,
        kind: MediaKind,
        store: &dyn RecordStore,
    ) -> AppResult<Vec<Recommendation>> {
        let items = store.list().await?;
        if items.is_empty() {
            return Err(AppError::NoData(format!(
                "No {} in watchlist to base recommendations on",
                match kind {
                    MediaKind::Movie => "movies",
                    MediaKind::Tv => "TV shows",
                }
            )));
        }

        let sources: Vec<String> = self.with_rng(|rng| {
            items
                .choose_multiple(rng, MAX_SOURCES.min(items.len()))
                .map(|item| item.title.clone())
                .collect()
        })?;

        let mut seen_titles = HashSet::new();
        let mut recommendations = Vec::new();

        for title in &sources {
            let Some(hit) = self.catalog.search(kind, title).await? else {
                tracing::debug!(title = %title, "No catalog match for watchlist entry");
                continue;
            };

            let page = self.with_rng(|rng| rng.gen_range(1..=MAX_PAGE))?;
            let hits = self.catalog.recommendations(kind, hit.id, page).await?;

            for hit in hits {
                if seen_titles.insert(hit.title.clone()) {
                    recommendations.push(Recommendation::from_hit(hit, kind));
                }
            }
        }

        self.with_rng(|rng| recommendations.shuffle(rng))?;
        recommendations.truncate(MAX_RESULTS);

        tracing::info!(
            kind = %kind,
            sources = sources.len(),
            results = recommendations.len(),
            provider = self.catalog.name(),
            "Recommendations generated"
        );

        Ok(recommendations)
    }
}
