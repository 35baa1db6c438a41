use serde::{Deserialize, Serialize};

use super::MediaKind;

// ============================================================================
// TMDB wire types
// ============================================================================

/// One page of a TMDB search or recommendations listing
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbResult>,
}

/// A movie or TV result. TV results use `name`/`first_air_date` where movies
/// use `title`/`release_date`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbResult {
    pub id: i64,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideoList {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

impl TmdbVideo {
    pub fn is_youtube_trailer(&self) -> bool {
        self.video_type == "Trailer" && self.site == "YouTube"
    }
}

/// Which TMDB videos listing to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoScope {
    Movie(i64),
    Show(i64),
    Season { show_id: i64, season: u32 },
    Episode { show_id: i64, season: u32, episode: u32 },
}

impl VideoScope {
    /// Path below the API base, without a leading slash
    pub fn path(&self) -> String {
        match self {
            VideoScope::Movie(id) => format!("movie/{}/videos", id),
            VideoScope::Show(id) => format!("tv/{}/videos", id),
            VideoScope::Season { show_id, season } => {
                format!("tv/{}/season/{}/videos", show_id, season)
            }
            VideoScope::Episode {
                show_id,
                season,
                episode,
            } => format!(
                "tv/{}/season/{}/episode/{}/videos",
                show_id, season, episode
            ),
        }
    }
}

// ============================================================================
// Domain types
// ============================================================================

/// A single search or recommendation result from the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogHit {
    pub id: i64,
    pub title: String,
    pub year: Option<String>,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    /// Upstream vote average on a 0-10 scale
    pub vote_average: f64,
}

impl CatalogHit {
    pub fn from_tmdb(result: TmdbResult, image_base_url: &str) -> Self {
        Self {
            id: result.id,
            year: year_from_date(result.release_date.as_deref()),
            poster_url: poster_url(image_base_url, result.poster_path.as_deref()),
            title: result.title,
            overview: result.overview,
            vote_average: result.vote_average,
        }
    }
}

/// First four characters of a release date, if there is one
fn year_from_date(date: Option<&str>) -> Option<String> {
    date.filter(|d| !d.is_empty())
        .map(|d| d.chars().take(4).collect())
}

fn poster_url(image_base_url: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", image_base_url, p))
}

/// Converts a 0-10 vote average to the 0-5 scale, rounding half to even.
pub fn rescale_rating(vote_average: f64) -> i32 {
    (vote_average / 2.0).round_ties_even().clamp(0.0, 5.0) as i32
}

/// Body of the search endpoints
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub id: i64,
    pub title: String,
    pub year: Option<String>,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    pub tmdb_id: i64,
}

impl From<CatalogHit> for SearchHit {
    fn from(hit: CatalogHit) -> Self {
        Self {
            id: hit.id,
            tmdb_id: hit.id,
            title: hit.title,
            year: hit.year,
            poster_url: hit.poster_url,
            overview: hit.overview,
        }
    }
}

/// An entry of a recommendations response
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    /// Catalog id as text; only TV recommendations carry it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub year: Option<String>,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    pub rating: i32,
}

impl Recommendation {
    pub fn from_hit(hit: CatalogHit, kind: MediaKind) -> Self {
        Self {
            id: match kind {
                MediaKind::Movie => None,
                MediaKind::Tv => Some(hit.id.to_string()),
            },
            rating: rescale_rating(hit.vote_average),
            title: hit.title,
            year: hit.year,
            poster_url: hit.poster_url,
            overview: hit.overview,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trailer {
    pub key: String,
    pub site: String,
}

impl From<TmdbVideo> for Trailer {
    fn from(video: TmdbVideo) -> Self {
        Self {
            key: video.key,
            site: video.site,
        }
    }
}
