use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod request_id;

pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId};

/// CORS for the configured front-end origins. Unparseable origins are
/// skipped with a warning.
///
/// Credentials are allowed, so a `*` entry cannot be honoured and is
/// skipped as well.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|origin| {
            let wildcard = origin.trim() == "*";
            if wildcard {
                tracing::warn!("Ignoring wildcard CORS origin, credentials need explicit origins");
            }
            !wildcard
        })
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    async fn preflight_allow_origin(allowed: &[String], origin: &str) -> Option<HeaderValue> {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(cors_layer(allowed));
        let server = TestServer::new(app).unwrap();

        server
            .method(Method::OPTIONS, "/")
            .add_header(header::ORIGIN, origin)
            .add_header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .await
            .maybe_header(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    }

    #[tokio::test]
    async fn test_wildcard_origin_is_skipped() {
        let allowed = vec!["*".to_string(), "http://localhost:3000".to_string()];

        let listed = preflight_allow_origin(&allowed, "http://localhost:3000").await;
        assert_eq!(listed, Some(HeaderValue::from_static("http://localhost:3000")));

        let other = preflight_allow_origin(&allowed, "http://evil.example").await;
        assert_eq!(other, None);
    }

    #[tokio::test]
    async fn test_invalid_origin_is_skipped() {
        let allowed = vec!["bad\norigin".to_string(), "http://localhost:3000".to_string()];
        let listed = preflight_allow_origin(&allowed, "http://localhost:3000").await;
        assert!(listed.is_some());
    }
}
