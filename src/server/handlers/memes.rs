//! Module with the handlers proxying the upstream template listing.

use std::sync::Arc;

use hyper::{Body, Response, StatusCode};

use super::backend::Backend;
use super::util::{error_response, json_response, raw_json_response, with_status};


/// Handle the request for the full template listing.
///
/// Upstream payload is passed through as-is.
pub async fn list_memes(backend: Arc<Backend>) -> Response<Body> {
    match backend.run(|b| b.fetcher().fetch_listing()).await {
        Ok(Ok(listing)) => {
            debug!("Returning listing of {} template(s)", listing.templates.len());
            raw_json_response(listing.raw)
        }
        Ok(Err(e)) => {
            error!("Error fetching memes: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch memes")
        }
        Err(e) => {
            error!("Error fetching memes: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch memes")
        }
    }
}

/// Handle the request for a single random template.
pub async fn random_meme(backend: Arc<Backend>) -> Response<Body> {
    let error = match backend.run(|b| b.fetcher().pick_random_template()).await {
        Ok(Ok(template)) => {
            debug!("Returning random template {}", template);
            return json_response(json!({"success": true, "meme": template}));
        }
        Ok(Err(e)) => e.to_string(),
        Err(e) => e.to_string(),
    };
    error!("Error fetching random meme: {}", error);
    with_status(
        json_response(json!({"success": false, "error": "Failed to fetch random meme"})),
        StatusCode::INTERNAL_SERVER_ERROR)
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hyper::StatusCode;
    use spectral::prelude::*;

    use crate::handlers::tests::{backend, listing, FakeUpstream};
    use crate::handlers::util::tests::json_body;
    use super::{list_memes, random_meme};

    #[tokio::test]
    async fn listing_passed_through() {
        let backend = Arc::new(backend(FakeUpstream::with_memes(listing(3))));
        let response = list_memes(backend).await;
        assert_that!(response.status()).is_equal_to(StatusCode::OK);

        let body = json_body(response).await;
        assert_that!(body["success"].as_bool()).is_equal_to(Some(true));
        assert_that!(body["data"]["memes"].as_array().map(|m| m.len())).is_equal_to(Some(3));
        assert_that!(body["data"]["memes"][1]["box_count"].as_u64()).is_equal_to(Some(2));
    }

    #[tokio::test]
    async fn listing_is_verbatim() {
        let payload = r#"{"success":true,"zzz":1,"aaa":2}"#;
        let backend = Arc::new(backend(FakeUpstream::with_memes(payload.as_bytes().to_vec())));
        let response = list_memes(backend).await;
        assert_that!(response.status()).is_equal_to(StatusCode::OK);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_that!((&body[..])).is_equal_to(payload.as_bytes());
    }

    #[tokio::test]
    async fn listing_without_templates() {
        let backend = Arc::new(backend(FakeUpstream::with_memes(r#"{"success": true}"#)));
        let response = list_memes(backend).await;
        assert_that!(response.status()).is_equal_to(StatusCode::OK);
        assert_that!(json_body(response).await).is_equal_to(json!({"success": true}));
    }

    #[tokio::test]
    async fn unsuccessful_listing() {
        let backend = Arc::new(backend(FakeUpstream::with_memes(r#"{"success": false}"#)));
        let response = list_memes(backend).await;
        assert_that!(response.status()).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
        assert_that!(json_body(response).await)
            .is_equal_to(json!({"error": "Failed to fetch memes"}));
    }

    #[tokio::test]
    async fn upstream_down() {
        let backend = Arc::new(backend(FakeUpstream::default()));
        let response = list_memes(backend).await;
        assert_that!(response.status()).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn random() {
        let backend = Arc::new(backend(FakeUpstream::with_memes(listing(5))));
        let response = random_meme(backend).await;
        assert_that!(response.status()).is_equal_to(StatusCode::OK);

        let body = json_body(response).await;
        assert_that!(body["success"].as_bool()).is_equal_to(Some(true));
        let id = body["meme"]["id"].as_str().unwrap_or("").to_owned();
        assert!(["100", "101", "102", "103", "104"].contains(&id.as_str()), "bad id: {}", id);
    }

    #[tokio::test]
    async fn random_from_empty_listing() {
        let backend = Arc::new(backend(FakeUpstream::with_memes(listing(0))));
        let response = random_meme(backend).await;
        assert_that!(response.status()).is_equal_to(StatusCode::INTERNAL_SERVER_ERROR);
        assert_that!(json_body(response).await)
            .is_equal_to(json!({"success": false, "error": "Failed to fetch random meme"}));
    }
}
