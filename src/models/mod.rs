use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

mod catalog;
mod item;

pub use catalog::{
    rescale_rating, CatalogHit, Recommendation, SearchHit, TmdbPage, TmdbResult, TmdbVideo,
    TmdbVideoList, Trailer, VideoScope,
};
pub use item::{strip_legacy_fields, ItemPatch, NewItem, WatchStatus, WatchableItem};

/// The two kinds of watchable media, each with its own collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment TMDB uses for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Name of the backing collection / table
    pub fn collection(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movies",
            MediaKind::Tv => "tvshows",
        }
    }

    /// Human-readable singular, used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "Movie",
            MediaKind::Tv => "TV show",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaKind::Movie),
            "tv" => Ok(MediaKind::Tv),
            _ => Err(r#"Invalid type. Must be "movie" or "tv""#.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_parse() {
        assert_eq!("movie".parse::<MediaKind>(), Ok(MediaKind::Movie));
        assert_eq!("tv".parse::<MediaKind>(), Ok(MediaKind::Tv));
        assert!("anime".parse::<MediaKind>().is_err());
        assert!("Movie".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_media_kind_collections() {
        assert_eq!(MediaKind::Movie.collection(), "movies");
        assert_eq!(MediaKind::Tv.collection(), "tvshows");
    }
}
