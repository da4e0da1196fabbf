//! Searchable, sortable, incrementally loaded city table.

use chrono::Duration;
use serde::Serialize;
use std::sync::Arc;

use wxbuddy_core::config::DirectoryConfig;
use wxbuddy_core::Clock;
use wxbuddy_weather::{Snapshot, WeatherSnapshotCache};

use crate::client::CitySource;
use crate::debounce::Debounced;
use crate::error::DirectoryError;
use crate::pager::{LoadError, Pager};
use crate::types::{City, CityPage, PageRequest, SortConfig, SortKey};

/// A table row with its cached weather preview, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityRow<'a> {
    pub city: &'a City,
    pub snapshot: Option<Snapshot>,
}

/// Composes the debounced search term, the sort order and the pager.
///
/// Every method that starts a new query or page returns the
/// [`PageRequest`] to run; results go back through
/// [`DirectoryBrowser::complete`].
pub struct DirectoryBrowser {
    search: Debounced<String>,
    sort: SortConfig,
    pager: Pager,
    clock: Arc<dyn Clock>,
}

impl DirectoryBrowser {
    pub fn new(config: &DirectoryConfig, clock: Arc<dyn Clock>) -> Self {
        let delay = Duration::milliseconds(i64::try_from(config.debounce_ms).unwrap_or(i64::MAX));
        Self {
            search: Debounced::new(String::new(), delay),
            sort: SortConfig::default(),
            pager: Pager::new(config.page_size),
            clock,
        }
    }

    /// First page of the unfiltered directory.
    pub fn start(&mut self) -> PageRequest {
        self.pager.reset(self.search.committed().clone(), self.sort)
    }

    /// Record a keystroke; the term takes effect after the debounce delay.
    pub fn set_search_term(&mut self, term: &str) {
        self.search.set(term.trim().to_string(), self.clock.now());
    }

    /// Commit a settled search term. A changed term restarts pagination.
    pub fn tick(&mut self) -> Option<PageRequest> {
        let term = self.search.poll(self.clock.now())?;
        tracing::debug!("Search term committed: {:?}", term);
        Some(self.pager.reset(term, self.sort))
    }

    /// Commit the pending search term without waiting.
    pub fn submit_search(&mut self) -> Option<PageRequest> {
        let term = self.search.flush()?;
        Some(self.pager.reset(term, self.sort))
    }

    /// Sort by `key`, flipping direction if it is already the ascending key.
    pub fn toggle_sort(&mut self, key: SortKey) -> PageRequest {
        self.sort = self.sort.toggle(key);
        self.pager.reset(self.search.committed().clone(), self.sort)
    }

    /// The last row scrolled into view.
    ///
    /// Does not retry a failed page; that takes an explicit `load_more`.
    pub fn on_last_row_visible(&mut self) -> Option<PageRequest> {
        if self.pager.error().is_some() {
            return None;
        }
        self.pager.next_request()
    }

    pub fn next_request(&mut self) -> Option<PageRequest> {
        self.pager.next_request()
    }

    /// Feed back the outcome of a request. Returns whether it was applied.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<CityPage, DirectoryError>,
    ) -> bool {
        self.pager.complete(request, result)
    }

    /// Run `request` against `source` and apply the result.
    pub async fn run(&mut self, request: PageRequest, source: &dyn CitySource) -> bool {
        let result = source.fetch_page(&request).await;
        self.complete(&request, result)
    }

    /// Fetch the next page, if any. Returns whether a page was requested.
    pub async fn load_more(&mut self, source: &dyn CitySource) -> bool {
        match self.pager.next_request() {
            Some(request) => {
                self.run(request, source).await;
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &City> + '_ {
        self.pager.rows()
    }

    /// Loaded rows decorated with fresh weather snapshots.
    pub fn rows_with_snapshots<'a>(&'a self, cache: &WeatherSnapshotCache) -> Vec<CityRow<'a>> {
        self.pager
            .rows()
            .map(|city| CityRow {
                city,
                snapshot: cache.get(&city.geoname_id).map(|entry| entry.snapshot),
            })
            .collect()
    }

    /// The query finished loading and matched nothing.
    pub fn is_empty_result(&self) -> bool {
        self.pager.pages_loaded() > 0
            && self.pager.row_count() == 0
            && !self.pager.is_loading()
            && self.pager.error().is_none()
    }

    pub fn has_next_page(&self) -> bool {
        self.pager.has_next_page()
    }

    pub fn is_loading(&self) -> bool {
        self.pager.is_loading()
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.pager.error()
    }

    pub fn search_term(&self) -> &str {
        self.search.committed()
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }
}

impl std::fmt::Debug for DirectoryBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryBrowser")
            .field("search", &self.search)
            .field("sort", &self.sort)
            .field("pager", &self.pager)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, SortDirection};
    use wxbuddy_core::ManualClock;

    fn city(id: &str) -> City {
        City {
            geoname_id: id.into(),
            name: format!("City {id}"),
            ascii_name: None,
            country_code: None,
            cou_name_en: None,
            population: None,
            timezone: None,
            coordinates: Coordinates { lat: 1.0, lon: 2.0 },
        }
    }

    fn browser() -> (Arc<ManualClock>, DirectoryBrowser) {
        let clock = Arc::new(ManualClock::at_epoch());
        let browser = DirectoryBrowser::new(&DirectoryConfig::default(), clock.clone());
        (clock, browser)
    }

    #[test]
    fn test_search_is_debounced() {
        let (clock, mut browser) = browser();
        browser.set_search_term("Par");
        clock.advance(Duration::milliseconds(200));
        browser.set_search_term("Paris");

        clock.advance(Duration::milliseconds(400));
        assert_eq!(browser.tick(), None);

        clock.advance(Duration::milliseconds(100));
        let request = browser.tick().unwrap();
        assert_eq!(request.search, "Paris");
        assert_eq!(request.page, 0);
        assert_eq!(browser.search_term(), "Paris");
    }

    #[test]
    fn test_same_term_does_not_restart() {
        let (clock, mut browser) = browser();
        browser.start();
        browser.set_search_term("  ");
        clock.advance(Duration::seconds(1));
        assert_eq!(browser.tick(), None);
    }

    #[test]
    fn test_toggle_sort_restarts_with_committed_term() {
        let (clock, mut browser) = browser();
        browser.set_search_term("lima");
        clock.advance(Duration::seconds(1));
        let first = browser.tick().unwrap();

        browser.set_search_term("lim");
        let request = browser.toggle_sort(SortKey::Name);
        assert_eq!(request.search, "lima");
        assert_eq!(request.sort.direction, SortDirection::Desc);
        assert!(request.generation > first.generation);
    }

    #[test]
    fn test_visibility_trigger_respects_in_flight_and_errors() {
        let (_clock, mut browser) = browser();
        let first = browser.start();
        assert_eq!(browser.on_last_row_visible(), None);

        browser.complete(
            &first,
            Ok(CityPage {
                total_count: 50,
                results: (0..20).map(|i| city(&i.to_string())).collect(),
            }),
        );
        let second = browser.on_last_row_visible().unwrap();
        assert_eq!(second.offset(), 20);

        browser.complete(
            &second,
            Err(DirectoryError::Parse("bad".into())),
        );
        assert_eq!(browser.on_last_row_visible(), None);
        assert_eq!(browser.next_request().unwrap().page, 1);
    }

    #[test]
    fn test_empty_result() {
        let (_clock, mut browser) = browser();
        assert!(!browser.is_empty_result());

        let first = browser.start();
        assert!(!browser.is_empty_result());

        browser.complete(
            &first,
            Ok(CityPage {
                total_count: 0,
                results: Vec::new(),
            }),
        );
        assert!(browser.is_empty_result());
        assert!(!browser.has_next_page());
    }

    #[test]
    fn test_rows_with_snapshots() {
        let (clock, mut browser) = browser();
        let cache = WeatherSnapshotCache::new(clock.clone());
        cache.put(
            "2",
            Snapshot {
                temp: Some(21.0),
                ..Default::default()
            },
        );

        let first = browser.start();
        browser.complete(
            &first,
            Ok(CityPage {
                total_count: 2,
                results: vec![city("1"), city("2")],
            }),
        );

        let rows = browser.rows_with_snapshots(&cache);
        assert!(rows[0].snapshot.is_none());
        assert_eq!(rows[1].snapshot.as_ref().and_then(|s| s.temp), Some(21.0));

        clock.advance(Duration::minutes(15));
        assert!(browser.rows_with_snapshots(&cache).iter().all(|r| r.snapshot.is_none()));
    }
}
