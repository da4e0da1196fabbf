//! Integration tests for paging through the city directory.

use std::sync::Arc;

use chrono::Duration;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxbuddy_core::config::DirectoryConfig;
use wxbuddy_core::ManualClock;
use wxbuddy_directory::{CityDirectoryClient, CitySource, DirectoryBrowser, SortKey};

/// Helper to create a page of city records
fn page_json(offset: u32, count: u32, total: u32) -> serde_json::Value {
    let results: Vec<_> = (offset..offset + count)
        .map(|i| {
            serde_json::json!({
                "geoname_id": format!("{}", 1000 + i),
                "name": format!("Town {i}"),
                "cou_name_en": "Exampleland",
                "population": 5000 + i,
                "timezone": "Europe/Berlin",
                "coordinates": {"lon": 10.0, "lat": 50.0}
            })
        })
        .collect();
    serde_json::json!({"total_count": total, "results": results})
}

fn config(server: &MockServer) -> DirectoryConfig {
    DirectoryConfig {
        base_url: server.uri(),
        page_size: 20,
        debounce_ms: 500,
    }
}

#[tokio::test]
async fn test_scrolls_through_all_pages() {
    let server = MockServer::start().await;
    for (offset, count) in [(0, 20), (20, 20), (40, 5)] {
        Mock::given(method("GET"))
            .and(query_param("offset", offset.to_string()))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(offset, count, 45)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = CityDirectoryClient::from_config(&config(&server)).unwrap();
    let mut browser = DirectoryBrowser::new(&config(&server), Arc::new(ManualClock::at_epoch()));

    let first = browser.start();
    assert!(browser.run(first, &client).await);

    while let Some(request) = browser.on_last_row_visible() {
        browser.run(request, &client).await;
    }

    assert_eq!(browser.rows().count(), 45);
    assert!(!browser.has_next_page());
    assert!(!browser.load_more(&client).await);
    assert!(!browser.is_empty_result());
}

#[tokio::test]
async fn test_search_and_sort_restart_from_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("where", r#"search(name, "Town") OR search(cou_name_en, "Town")"#))
        .and(query_param("order_by", "population DESC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 3, 3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 20, 100)))
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::at_epoch());
    let client = CityDirectoryClient::from_config(&config(&server)).unwrap();
    let mut browser = DirectoryBrowser::new(&config(&server), clock.clone());

    let first = browser.start();
    browser.run(first, &client).await;
    assert_eq!(browser.rows().count(), 20);

    browser.set_search_term("Town");
    clock.advance(Duration::milliseconds(500));
    let searched = browser.tick().unwrap();
    assert_eq!(searched.offset(), 0);
    assert_eq!(browser.rows().count(), 0);
    browser.run(searched, &client).await;
    assert_eq!(browser.rows().count(), 20);

    browser.toggle_sort(SortKey::Population);
    let sorted = browser.toggle_sort(SortKey::Population);
    assert_eq!(sorted.sort.order_by(), "population DESC");
    browser.run(sorted, &client).await;

    assert_eq!(browser.rows().count(), 3);
    assert!(!browser.has_next_page());
}

#[tokio::test]
async fn test_late_response_for_old_query_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 20, 100)))
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::at_epoch());
    let client = CityDirectoryClient::from_config(&config(&server)).unwrap();
    let mut browser = DirectoryBrowser::new(&config(&server), clock.clone());

    let old = browser.start();
    browser.set_search_term("Zzyzx");
    clock.advance(Duration::seconds(1));
    let _current = browser.tick().unwrap();

    let stale = client.fetch_page(&old).await;
    assert!(!browser.complete(&old, stale));
    assert_eq!(browser.rows().count(), 0);
    assert!(browser.is_loading());
}

#[tokio::test]
async fn test_no_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 0, 0)))
        .mount(&server)
        .await;

    let client = CityDirectoryClient::from_config(&config(&server)).unwrap();
    let mut browser = DirectoryBrowser::new(&config(&server), Arc::new(ManualClock::at_epoch()));

    let first = browser.start();
    browser.run(first, &client).await;
    assert!(browser.is_empty_result());
}

#[tokio::test]
async fn test_server_error_surfaces_and_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 2, 2)))
        .mount(&server)
        .await;

    let client = CityDirectoryClient::from_config(&config(&server)).unwrap();
    let mut browser = DirectoryBrowser::new(&config(&server), Arc::new(ManualClock::at_epoch()));

    let first = browser.start();
    browser.run(first, &client).await;
    let error = browser.error().unwrap();
    assert!(error.retryable);
    assert!(!browser.is_empty_result());
    assert_eq!(browser.on_last_row_visible(), None);

    assert!(browser.load_more(&client).await);
    assert!(browser.error().is_none());
    assert_eq!(browser.rows().count(), 2);
}
