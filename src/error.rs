use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Missing or malformed client input
    #[error("{0}")]
    Validation(String),

    /// No record at the given id, or no catalog hit for a query
    #[error("{0}")]
    NotFound(String),

    /// The collection a recommendation would be sampled from is empty
    #[error("{0}")]
    NoData(String),

    /// Upstream catalog returned an error status or an unreadable body
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) | AppError::NoData(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Catalog(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            // Driver and transport errors can carry connection strings or
            // request URLs, so only the log sees them
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::HttpClient(_)
            | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::NoData("empty".into()), StatusCode::NOT_FOUND),
            (AppError::Catalog("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal("oops".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    async fn error_body(error: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(error.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_server_fault_details_stay_out_of_body() {
        let body = error_body(AppError::Internal(
            "connect to postgres://admin:secret@db/watchlist".into(),
        ))
        .await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_transport_error_body_hides_url() {
        // Nothing listens on port 1, so the send fails before any response
        let error = reqwest::Client::new()
            .get("http://127.0.0.1:1/search/movie?api_key=secret")
            .send()
            .await
            .unwrap_err();

        let body = error_body(AppError::HttpClient(error)).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_catalog_error_keeps_message() {
        let body = error_body(AppError::Catalog("TMDB API returned status 503".into())).await;
        assert_eq!(body["error"], "Catalog error: TMDB API returned status 503");
    }

    #[test]
    fn test_client_errors_keep_message() {
        assert_eq!(
            AppError::NotFound("Movie not found".into()).to_string(),
            "Movie not found"
        );
    }
}
