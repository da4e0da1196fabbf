//! Page-by-page loading state for one directory query.
//!
//! The pager performs no I/O. Callers ask it for the next [`PageRequest`],
//! run it however they like, and hand the outcome back through
//! [`Pager::complete`]. Every [`Pager::reset`] starts a new query generation;
//! completions from an older generation, or for a page that is no longer
//! the next one, are dropped.

use crate::error::DirectoryError;
use crate::types::{City, CityPage, PageRequest, SortConfig};

/// Why the last page failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
    pub retryable: bool,
}

impl From<&DirectoryError> for LoadError {
    fn from(e: &DirectoryError) -> Self {
        Self {
            message: e.user_message(),
            retryable: e.is_retryable(),
        }
    }
}

#[derive(Debug)]
pub struct Pager {
    page_size: u32,
    generation: u64,
    search: String,
    sort: SortConfig,
    pages: Vec<CityPage>,
    in_flight: Option<u32>,
    error: Option<LoadError>,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            generation: 0,
            search: String::new(),
            sort: SortConfig::default(),
            pages: Vec::new(),
            in_flight: None,
            error: None,
        }
    }

    /// Start a new query and return its first-page request.
    pub fn reset(&mut self, search: impl Into<String>, sort: SortConfig) -> PageRequest {
        self.generation += 1;
        self.search = search.into();
        self.sort = sort;
        self.pages.clear();
        self.error = None;
        self.in_flight = Some(0);
        tracing::debug!(
            "Directory query {} reset: search={:?} order_by={}",
            self.generation,
            self.search,
            sort.order_by()
        );
        self.request_for(0)
    }

    /// Request for the next page, unless one is in flight or none remain.
    ///
    /// After a failed page this re-requests the same page.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_next_page() {
            return None;
        }
        let page = self.next_page_index();
        self.in_flight = Some(page);
        self.error = None;
        Some(self.request_for(page))
    }

    /// Apply the outcome of `request`. Returns whether it was applied.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<CityPage, DirectoryError>,
    ) -> bool {
        if request.generation != self.generation || self.in_flight != Some(request.page) {
            tracing::debug!(
                "Dropping stale directory page {} of query {}",
                request.page,
                request.generation
            );
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                tracing::debug!(
                    "Loaded directory page {} ({} rows, total {})",
                    request.page,
                    page.results.len(),
                    page.total_count
                );
                self.pages.push(page);
            }
            Err(e) => {
                tracing::warn!("Failed to load directory page {}: {}", request.page, e);
                self.error = Some(LoadError::from(&e));
            }
        }
        true
    }

    /// More rows remain for the current query. True before the first page.
    pub fn has_next_page(&self) -> bool {
        match self.pages.last() {
            None => true,
            // An empty page means the server has nothing more, whatever it counts.
            Some(last) if last.results.is_empty() => false,
            Some(last) => (self.row_count() as u64) < last.total_count,
        }
    }

    /// All loaded rows, in page order.
    pub fn rows(&self) -> impl Iterator<Item = &City> + '_ {
        self.pages.iter().flat_map(|p| p.results.iter())
    }

    pub fn row_count(&self) -> usize {
        self.pages.iter().map(|p| p.results.len()).sum()
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages.len()
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    fn next_page_index(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    fn request_for(&self, page: u32) -> PageRequest {
        PageRequest {
            generation: self.generation,
            page,
            page_size: self.page_size,
            search: self.search.clone(),
            sort: self.sort,
        }
    }
}
