//! Client for the paginated geonames city dataset.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

use wxbuddy_core::config::DirectoryConfig;

use crate::error::DirectoryError;
use crate::types::{CityPage, PageRequest};

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Anything that can serve a page of cities.
#[async_trait]
pub trait CitySource: Send + Sync {
    /// # Errors
    /// Returns an error on transport failure or a non-success response.
    async fn fetch_page(&self, request: &PageRequest) -> Result<CityPage, DirectoryError>;
}

#[derive(Debug, Clone)]
pub struct CityDirectoryClient {
    client: Client,
    base_url: String,
}

impl CityDirectoryClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        Self::new(&config.base_url)
    }

    /// Helper to handle API responses and errors.
    async fn handle_response(response: reqwest::Response) -> Result<CityPage, DirectoryError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| DirectoryError::Parse(e.to_string()))
        } else {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Network response was not ok")
                        .to_string()
                });
            Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl CitySource for CityDirectoryClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch_page(&self, request: &PageRequest) -> Result<CityPage, DirectoryError> {
        let mut params = vec![
            ("limit", request.page_size.to_string()),
            ("offset", request.offset().to_string()),
            ("order_by", request.sort.order_by()),
        ];
        if let Some(filter) = request.where_clause() {
            params.push(("where", filter));
        }

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        let page = Self::handle_response(response).await?;

        tracing::debug!(
            "Fetched {} cities (total {})",
            page.results.len(),
            page.total_count
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SortConfig, SortDirection, SortKey};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(page: u32, search: &str, sort: SortConfig) -> PageRequest {
        PageRequest {
            generation: 1,
            page,
            page_size: 20,
            search: search.into(),
            sort,
        }
    }

    #[tokio::test]
    async fn test_fetch_page_query_parameters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/records"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "40"))
            .and(query_param("order_by", "population DESC"))
            .and(query_param("where", r#"search(name, "Lyon") OR search(cou_name_en, "Lyon")"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_count": 1,
                "results": [{
                    "geoname_id": "2996944",
                    "name": "Lyon",
                    "cou_name_en": "France",
                    "population": 472317,
                    "timezone": "Europe/Paris",
                    "coordinates": {"lon": 4.84671, "lat": 45.74846}
                }]
            })))
            .mount(&mock_server)
            .await;

        let client = CityDirectoryClient::new(&format!("{}/records", mock_server.uri())).unwrap();
        let sort = SortConfig::new(SortKey::Population, SortDirection::Desc);
        let page = client.fetch_page(&request(2, "Lyon", sort)).await.unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.results[0].name, "Lyon");
    }

    #[tokio::test]
    async fn test_empty_search_has_no_filter() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("order_by", "name ASC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_count": 0,
                "results": []
            })))
            .mount(&mock_server)
            .await;

        let client = CityDirectoryClient::new(&mock_server.uri()).unwrap();
        let page = client
            .fetch_page(&request(0, "", SortConfig::default()))
            .await
            .unwrap();
        assert!(page.results.is_empty());

        let received = mock_server.received_requests().await.unwrap();
        assert!(received[0].url.query_pairs().all(|(k, _)| k != "where"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error_code": "ODSQLError",
                "message": "ODSQL query is malformed"
            })))
            .mount(&mock_server)
            .await;

        let client = CityDirectoryClient::new(&mock_server.uri()).unwrap();
        let err = client
            .fetch_page(&request(0, "x", SortConfig::default()))
            .await
            .unwrap_err();

        match err {
            DirectoryError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "ODSQL query is malformed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
