//! City directory for WxBuddy
//!
//! Paginated, searchable and sortable access to the geonames city dataset,
//! plus the client-side state that drives an incrementally loaded table.

pub mod browser;
pub mod client;
pub mod debounce;
pub mod error;
pub mod pager;
pub mod types;

pub use browser::{CityRow, DirectoryBrowser};
pub use client::{CityDirectoryClient, CitySource};
pub use debounce::Debounced;
pub use error::DirectoryError;
pub use pager::{LoadError, Pager};
pub use types::*;
