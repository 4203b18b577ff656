//! HTTP client for the specialist feed.

use crate::config::{ConfigError, SourceConfig, TlsMode};
use crate::ingest::IngestError;
use crate::source::{RecordSource, RawSourceRecord, SourceDocument};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

const USER_AGENT: &str = concat!("specialist-catalog/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used for source requests.
pub fn build_http_client(tls_mode: TlsMode, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .danger_accept_invalid_certs(tls_mode == TlsMode::Insecure)
        .build()
}

/// Fetches the whole feature collection with a single GET.
pub struct SourceFetcher {
    client: Client,
    url: Url,
}

impl SourceFetcher {
    /// Wrap a prepared client and endpoint.
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Construct a fetcher from validated source settings.
    pub fn from_config(config: &SourceConfig) -> Result<Self, IngestError> {
        let url = Url::parse(&config.specialists_url).map_err(|error| {
            ConfigError::InvalidValue(format!("SCRAPER_SPECIALISTS_URL ({error})"))
        })?;
        let client = build_http_client(config.tls_mode, config.timeout)?;
        tracing::debug!(
            url = %url,
            tls_mode = ?config.tls_mode,
            timeout_secs = config.timeout.as_secs(),
            "Initialized source HTTP client"
        );
        Ok(Self::new(client, url))
    }

    /// Endpoint this fetcher reads from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Retrieve and decode the current feed.
    ///
    /// Anything other than `200 OK` is reported as [`IngestError::SourceUnavailable`]
    /// without attempting to decode the body.
    pub async fn fetch(&self) -> Result<Vec<RawSourceRecord>, IngestError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let error = IngestError::SourceUnavailable { status, body };
            tracing::error!(error = %error, url = %self.url, "Source request rejected");
            return Err(error);
        }

        let body = response.text().await?;
        let document: SourceDocument = serde_json::from_str(&body).map_err(|error| {
            tracing::error!(error = %error, bytes = body.len(), "Source payload is not decodable");
            error
        })?;
        let records = document.into_records();
        tracing::info!(records = records.len(), "Fetched source records");
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for SourceFetcher {
    async fn fetch(&self) -> Result<Vec<RawSourceRecord>, IngestError> {
        SourceFetcher::fetch(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn fetcher(server: &MockServer) -> SourceFetcher {
        let client = build_http_client(TlsMode::Verified, Duration::from_secs(5)).expect("client");
        let url = Url::parse(&server.url("/specialists")).expect("url");
        SourceFetcher::new(client, url)
    }

    #[tokio::test]
    async fn decodes_features_in_feed_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/specialists");
                then.status(200).json_body(json!({
                    "type": "FeatureCollection",
                    "features": [
                        {
                            "type": "Feature",
                            "properties": {
                                "nazov_zariadenia": "Ambulancia B",
                                "druh_zariadenia": "neurológ",
                                "poloha_lat": 48.14,
                                "poloha_lon": 17.1,
                                "union": "áno"
                            }
                        },
                        {
                            "type": "Feature",
                            "properties": {
                                "nazov_zariadenia": "Ambulancia A",
                                "druh_zariadenia": "ortoped",
                                "telefon": null
                            }
                        }
                    ]
                }));
            })
            .await;

        let records = fetcher(&server).fetch().await.expect("records");

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Ambulancia B");
        assert_eq!(records[0].specialization, "neurológ");
        assert_eq!(records[0].longitude, 17.1);
        assert_eq!(records[0].union, "áno");
        assert_eq!(records[1].name, "Ambulancia A");
        assert_eq!(records[1].phone, "");
    }

    #[tokio::test]
    async fn empty_collection_yields_no_records() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/specialists");
                then.status(200).json_body(json!({ "features": [] }));
            })
            .await;

        let records = fetcher(&server).fetch().await.expect("records");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn non_ok_status_is_reported_with_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/specialists");
                then.status(500).body("maintenance");
            })
            .await;

        let error = fetcher(&server).fetch().await.expect_err("unavailable");
        match error {
            IngestError::SourceUnavailable { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_success_codes_are_not_accepted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/specialists");
                then.status(204);
            })
            .await;

        let error = fetcher(&server).fetch().await.expect_err("unavailable");
        assert!(matches!(
            error,
            IngestError::SourceUnavailable { status, .. } if status == StatusCode::NO_CONTENT
        ));
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/specialists");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let error = fetcher(&server).fetch().await.expect_err("decode");
        assert!(matches!(error, IngestError::Decode(_)));
        assert!(!error.is_retryable());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let client = build_http_client(TlsMode::Insecure, Duration::from_secs(2)).expect("client");
        let url = Url::parse("http://127.0.0.1:9/specialists").expect("url");

        let error = SourceFetcher::new(client, url)
            .fetch()
            .await
            .expect_err("transport");
        assert!(matches!(error, IngestError::Transport(_)));
        assert!(error.is_retryable());
    }

    #[test]
    fn from_config_rejects_unparseable_url() {
        let config = SourceConfig {
            specialists_url: "not a url".into(),
            tls_mode: TlsMode::Insecure,
            timeout: Duration::from_secs(30),
        };
        let error = SourceFetcher::from_config(&config)
            .err()
            .expect("invalid url");
        assert!(matches!(error, IngestError::Config(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn from_config_keeps_endpoint() {
        let config = SourceConfig {
            specialists_url: "https://data.example.sk/specialists.json".into(),
            tls_mode: TlsMode::Verified,
            timeout: Duration::from_secs(30),
        };
        let fetcher = SourceFetcher::from_config(&config).expect("fetcher");
        assert_eq!(fetcher.url().as_str(), "https://data.example.sk/specialists.json");
    }
}
