use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Keys a client may send but never overwrite
const PROTECTED_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Leftover from the removed multi-profile feature; dropped on every write
const LEGACY_PROFILE_FIELD: &str = "profile_id";

/// Where the user is with a movie or show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchStatus {
    Watched,
    Watching,
    #[default]
    #[serde(rename = "Want to Watch")]
    WantToWatch,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watched => "Watched",
            WatchStatus::Watching => "Watching",
            WatchStatus::WantToWatch => "Want to Watch",
        }
    }
}

impl Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Watched" => Ok(WatchStatus::Watched),
            "Watching" => Ok(WatchStatus::Watching),
            "Want to Watch" => Ok(WatchStatus::WantToWatch),
            other => Err(AppError::Validation(format!("Invalid status: {}", other))),
        }
    }
}

/// A tracked movie or TV show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchableItem {
    pub id: Uuid,
    pub title: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub status: WatchStatus,
    pub recommendation: Option<String>,
    pub tmdb_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload. `title` is optional here so its absence surfaces as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItem {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub overview: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub status: Option<WatchStatus>,
    pub recommendation: Option<String>,
    pub tmdb_id: Option<i64>,
}

impl NewItem {
    /// Validates the payload and builds a fresh record stamped with `now`
    pub fn into_item(self, now: DateTime<Utc>) -> AppResult<WatchableItem> {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Title is required".to_string()))?;

        Ok(WatchableItem {
            id: Uuid::new_v4(),
            title,
            year: self.year,
            poster_url: self.poster_url,
            overview: self.overview,
            rating: self.rating,
            review: self.review,
            status: self.status.unwrap_or_default(),
            recommendation: self.recommendation,
            tmdb_id: self.tmdb_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Outer `None` means the key was absent; `Some(None)` means
/// the client sent `null` and the attribute is cleared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub poster_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub overview: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub rating: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub review: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<WatchStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub recommendation: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub tmdb_id: Option<Option<i64>>,
    /// Every key not listed above, protected ones included
    #[serde(flatten)]
    pub ignored: Map<String, Value>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ItemPatch {
    /// Applies supplied fields to `item` and stamps `updated_at`
    pub fn apply(self, item: &mut WatchableItem, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title cannot be empty".to_string()));
            }
        }

        for key in self.ignored.keys() {
            if PROTECTED_FIELDS.contains(&key.as_str()) {
                tracing::info!(field = %key, id = %item.id, "Skipping protected field");
            } else if key != LEGACY_PROFILE_FIELD {
                tracing::warn!(field = %key, id = %item.id, "Ignoring unknown field");
            }
        }

        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(year) = self.year {
            item.year = year;
        }
        if let Some(poster_url) = self.poster_url {
            item.poster_url = poster_url;
        }
        if let Some(overview) = self.overview {
            item.overview = overview;
        }
        if let Some(rating) = self.rating {
            item.rating = rating;
        }
        if let Some(review) = self.review {
            item.review = review;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(recommendation) = self.recommendation {
            item.recommendation = recommendation;
        }
        if let Some(tmdb_id) = self.tmdb_id {
            item.tmdb_id = tmdb_id;
        }

        // Strictly monotonic so rapid successive writes still advance
        item.updated_at = if now > item.updated_at {
            now
        } else {
            item.updated_at + chrono::Duration::microseconds(1)
        };

        Ok(())
    }
}

/// Removes the dead `profile_id` key from an inbound write body
pub fn strip_legacy_fields(payload: &mut Value) {
    if let Value::Object(map) = payload {
        map.remove(LEGACY_PROFILE_FIELD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> WatchableItem {
        let new: NewItem = serde_json::from_value(json!({
            "title": "Inception",
            "year": 2010,
            "overview": "Dreams within dreams",
            "rating": 5
        }))
        .unwrap();
        new.into_item(Utc::now()).unwrap()
    }

    #[test]
    fn test_new_item_defaults_status() {
        let item = sample_item();
        assert_eq!(item.status, WatchStatus::WantToWatch);
        assert_eq!(item.created_at, item.updated_at);
        assert_eq!(item.year, Some(2010));
    }

    #[test]
    fn test_new_item_requires_title() {
        let missing: NewItem = serde_json::from_value(json!({ "year": 1999 })).unwrap();
        assert!(matches!(
            missing.into_item(Utc::now()),
            Err(AppError::Validation(_))
        ));

        let blank: NewItem = serde_json::from_value(json!({ "title": "  " })).unwrap();
        assert!(blank.into_item(Utc::now()).is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&WatchStatus::WantToWatch).unwrap(),
            "\"Want to Watch\""
        );
        let parsed: WatchStatus = serde_json::from_str("\"Watching\"").unwrap();
        assert_eq!(parsed, WatchStatus::Watching);
        assert!(serde_json::from_str::<WatchStatus>("\"Dropped\"").is_err());
        assert!("Dropped".parse::<WatchStatus>().is_err());
    }

    #[test]
    fn test_patch_only_touches_supplied_fields() {
        let mut item = sample_item();
        let before = item.clone();

        let patch: ItemPatch =
            serde_json::from_value(json!({ "status": "Watched", "review": "Loved it" })).unwrap();
        patch.apply(&mut item, Utc::now()).unwrap();

        assert_eq!(item.status, WatchStatus::Watched);
        assert_eq!(item.review.as_deref(), Some("Loved it"));
        assert_eq!(item.title, before.title);
        assert_eq!(item.year, before.year);
        assert_eq!(item.overview, before.overview);
    }

    #[test]
    fn test_patch_null_clears_field() {
        let mut item = sample_item();
        let patch: ItemPatch = serde_json::from_value(json!({ "overview": null })).unwrap();
        patch.apply(&mut item, Utc::now()).unwrap();
        assert_eq!(item.overview, None);
        assert_eq!(item.year, Some(2010));
    }

    #[test]
    fn test_patch_skips_protected_and_unknown_fields() {
        let mut item = sample_item();
        let before = item.clone();

        let patch: ItemPatch = serde_json::from_value(json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "created_at": "2000-01-01T00:00:00Z",
            "updated_at": "2000-01-01T00:00:00Z",
            "genre": "sci-fi"
        }))
        .unwrap();
        assert_eq!(patch.ignored.len(), 4);
        patch.apply(&mut item, Utc::now()).unwrap();

        assert_eq!(item.id, before.id);
        assert_eq!(item.created_at, before.created_at);
        assert!(item.updated_at > before.updated_at);
        assert_eq!(item.title, before.title);
    }

    #[test]
    fn test_patch_updated_at_advances_with_stale_clock() {
        let mut item = sample_item();
        let before = item.updated_at;
        ItemPatch::default()
            .apply(&mut item, before - chrono::Duration::seconds(5))
            .unwrap();
        assert!(item.updated_at > before);
    }

    #[test]
    fn test_patch_rejects_empty_title() {
        let mut item = sample_item();
        let patch: ItemPatch = serde_json::from_value(json!({ "title": "" })).unwrap();
        assert!(patch.apply(&mut item, Utc::now()).is_err());
        assert_eq!(item.title, "Inception");
    }

    #[test]
    fn test_strip_legacy_fields() {
        let mut payload = json!({ "title": "Heat", "profile_id": 3 });
        strip_legacy_fields(&mut payload);
        assert_eq!(payload, json!({ "title": "Heat" }));
    }
}
