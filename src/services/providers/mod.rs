//! Movie/TV metadata catalog abstraction
//!
//! The catalog answers three kinds of questions: title search, per-title
//! recommendations and video listings. Trailer lookup is a policy layered on
//! top of the video listings, so it lives in `find_trailer` rather than in
//! each provider.

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{CatalogHit, MediaKind, TmdbVideo, Trailer, VideoScope},
};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Trait for metadata catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// First search hit for `query`, or `None` when the catalog has no match
    async fn search(&self, kind: MediaKind, query: &str) -> AppResult<Option<CatalogHit>>;

    /// One page of recommendations for the catalog title `catalog_id`
    async fn recommendations(
        &self,
        kind: MediaKind,
        catalog_id: i64,
        page: u32,
    ) -> AppResult<Vec<CatalogHit>>;

    /// Videos attached to a movie, show, season or episode. A scope the
    /// catalog does not know yields an empty list.
    async fn videos(&self, scope: VideoScope) -> AppResult<Vec<TmdbVideo>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Finds the first YouTube trailer for a catalog title
///
/// Movies only consult their own videos. Shows fall through from show-level
/// videos to season 1, then to season 1 episode 1.
#[instrument(skip(catalog), fields(provider = catalog.name()))]
pub async fn find_trailer(
    catalog: &dyn Catalog,
    kind: MediaKind,
    catalog_id: i64,
) -> AppResult<Option<Trailer>> {
    let scopes = match kind {
        MediaKind::Movie => vec![VideoScope::Movie(catalog_id)],
        MediaKind::Tv => vec![
            VideoScope::Show(catalog_id),
            VideoScope::Season {
                show_id: catalog_id,
                season: 1,
            },
            VideoScope::Episode {
                show_id: catalog_id,
                season: 1,
                episode: 1,
            },
        ],
    };

    for scope in scopes {
        let videos = catalog.videos(scope).await?;
        if let Some(video) = videos.into_iter().find(|v| v.is_youtube_trailer()) {
            tracing::debug!(?scope, key = %video.key, "Trailer found");
            return Ok(Some(Trailer::from(video)));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn video(key: &str, site: &str, video_type: &str) -> TmdbVideo {
        TmdbVideo {
            key: key.to_string(),
            site: site.to_string(),
            video_type: video_type.to_string(),
        }
    }

    fn mock_catalog() -> MockCatalog {
        let mut catalog = MockCatalog::new();
        catalog.expect_name().return_const("mock");
        catalog
    }

    #[tokio::test]
    async fn test_movie_trailer_found() {
        let mut catalog = mock_catalog();
        catalog
            .expect_videos()
            .with(eq(VideoScope::Movie(42)))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    video("teaser", "YouTube", "Teaser"),
                    video("vimeo", "Vimeo", "Trailer"),
                    video("main", "YouTube", "Trailer"),
                ])
            });

        let trailer = find_trailer(&catalog, MediaKind::Movie, 42).await.unwrap();
        assert_eq!(
            trailer,
            Some(Trailer {
                key: "main".into(),
                site: "YouTube".into()
            })
        );
    }

    #[tokio::test]
    async fn test_movie_trailer_does_not_fall_through() {
        let mut catalog = mock_catalog();
        catalog
            .expect_videos()
            .times(1)
            .returning(|_| Ok(vec![video("teaser", "YouTube", "Teaser")]));

        let trailer = find_trailer(&catalog, MediaKind::Movie, 42).await.unwrap();
        assert_eq!(trailer, None);
    }

    #[tokio::test]
    async fn test_show_falls_back_to_season_one() {
        let mut catalog = mock_catalog();
        catalog
            .expect_videos()
            .with(eq(VideoScope::Show(7)))
            .times(1)
            .returning(|_| Ok(vec![]));
        catalog
            .expect_videos()
            .with(eq(VideoScope::Season {
                show_id: 7,
                season: 1,
            }))
            .times(1)
            .returning(|_| Ok(vec![video("s1", "YouTube", "Trailer")]));

        let trailer = find_trailer(&catalog, MediaKind::Tv, 7).await.unwrap();
        assert_eq!(trailer.map(|t| t.key), Some("s1".to_string()));
    }

    #[tokio::test]
    async fn test_show_falls_back_to_first_episode() {
        let mut catalog = mock_catalog();
        catalog
            .expect_videos()
            .with(eq(VideoScope::Show(7)))
            .returning(|_| Ok(vec![video("clip", "YouTube", "Clip")]));
        catalog
            .expect_videos()
            .with(eq(VideoScope::Season {
                show_id: 7,
                season: 1,
            }))
            .returning(|_| Ok(vec![video("bts", "YouTube", "Behind the Scenes")]));
        catalog
            .expect_videos()
            .with(eq(VideoScope::Episode {
                show_id: 7,
                season: 1,
                episode: 1,
            }))
            .returning(|_| Ok(vec![video("e1", "YouTube", "Trailer")]));

        let trailer = find_trailer(&catalog, MediaKind::Tv, 7).await.unwrap();
        assert_eq!(trailer.map(|t| t.key), Some("e1".to_string()));
    }

    #[tokio::test]
    async fn test_show_without_any_trailer() {
        let mut catalog = mock_catalog();
        catalog.expect_videos().times(3).returning(|_| Ok(vec![]));

        let trailer = find_trailer(&catalog, MediaKind::Tv, 7).await.unwrap();
        assert_eq!(trailer, None);
    }
}
