#[cfg(test)]
mod tests {
    use crate::api::{AirQualityProvider, WaqiClient};
    use crate::error::FetchError;
    use crate::models::Coordinates;
    use mockito::{Matcher, Server};
    use serde_json::json; // For creating JSON bodies easily

    const BANGKOK_PATH: &str = "/feed/geo:13.7563;100.5018/";

    fn bangkok_body() -> String {
        json!({
            "status": "ok",
            "data": {
                "aqi": 42,
                "idx": 5773,
                "city": { "name": "Bangkok", "geo": [13.7563, 100.5018] },
                "iaqi": {
                    "pm25": { "v": 42 },
                    "t": { "v": 30 },
                    "h": { "v": 65 }
                },
                "time": { "iso": "2024-01-01T00:00:00Z" }
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_fetch_feed_success() {
        let mut server = Server::new_async().await;
        let client = WaqiClient::new_with_base_url("test_token", &server.url());

        let m = server
            .mock("GET", BANGKOK_PATH)
            .match_query(Matcher::UrlEncoded("token".into(), "test_token".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(bangkok_body())
            .create_async()
            .await;

        let response = client
            .fetch_feed(Coordinates::FALLBACK)
            .await
            .expect("feed should be fetched");
        m.assert_async().await;

        assert_eq!(response.status, "ok");
        let feed = response.into_feed().expect("payload should be valid");
        assert_eq!(feed.idx, Some(5773));
        assert_eq!(feed.city.and_then(|c| c.name).as_deref(), Some("Bangkok"));
        assert!((feed.iaqi.pm25.map(|v| v.v).unwrap_or_default() - 42.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_fetch_feed_bad_status() {
        let mut server = Server::new_async().await;
        let client = WaqiClient::new_with_base_url("test_token", &server.url());

        let _m = server
            .mock("GET", BANGKOK_PATH)
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let result = client.fetch_feed(Coordinates::FALLBACK).await;
        assert!(
            matches!(result, Err(FetchError::BadStatus(503))),
            "non-2xx status should map to BadStatus, got {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_fetch_feed_error_status_is_returned_raw() {
        let mut server = Server::new_async().await;
        let client = WaqiClient::new_with_base_url("bad_token", &server.url());

        let _m = server
            .mock("GET", BANGKOK_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"error","data":"Invalid key"}"#)
            .create_async()
            .await;

        // The envelope is returned as-is; validating `status` is the fetcher's job.
        let response = client
            .fetch_feed(Coordinates::FALLBACK)
            .await
            .expect("a 200 with JSON should not be a transport error");
        assert_eq!(response.status, "error");
        assert!(matches!(
            response.into_feed(),
            Err(FetchError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_feed_non_json_body() {
        let mut server = Server::new_async().await;
        let client = WaqiClient::new_with_base_url("test_token", &server.url());

        let _m = server
            .mock("GET", BANGKOK_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let result = client.fetch_feed(Coordinates::FALLBACK).await;
        assert!(matches!(result, Err(FetchError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn test_fetch_feed_connection_refused() {
        // Nothing listens on port 9 (discard) on a test machine.
        let client = WaqiClient::new_with_base_url("test_token", "http://127.0.0.1:9");

        let result = client.fetch_feed(Coordinates::FALLBACK).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
