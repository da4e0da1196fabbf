//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use wxbuddy_directory::SortKey;

#[derive(Debug, Parser)]
#[command(name = "wxbuddy")]
#[command(author, version, about = "Look up cities and their weather", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Use this config file instead of the default location
    #[arg(short, long, global = true, env = "WXBUDDY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print pages of the city directory
    Search(SearchArgs),

    /// Browse the directory interactively, opening cities to see their weather
    Browse(BrowseArgs),

    /// Show current conditions and the 5-day forecast for a city
    Weather(WeatherArgs),

    /// Show the weather where you are
    Locate(LocateArgs),

    /// List or clear recently viewed locations
    History {
        /// Forget every remembered location
        #[arg(long)]
        clear: bool,
    },
}

/// Sortable directory columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortColumn {
    #[default]
    Name,
    Country,
    Population,
    Timezone,
}

impl From<SortColumn> for SortKey {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => SortKey::Name,
            SortColumn::Country => SortKey::Country,
            SortColumn::Population => SortKey::Population,
            SortColumn::Timezone => SortKey::Timezone,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// City or country name to search for
    pub term: Option<String>,

    /// Column to sort by
    #[arg(short, long, value_enum, default_value = "name")]
    pub sort: SortColumn,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Number of pages to load
    #[arg(short, long, default_value = "1")]
    pub pages: u32,
}

#[derive(Debug, Clone, Args)]
pub struct BrowseArgs {
    /// Start with this search term
    pub term: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct WeatherArgs {
    /// Detail query string, e.g. "name=Paris&lat=48.85&lon=2.35&id=2988507"
    #[arg(short, long, conflicts_with_all = ["lat", "lon", "id", "name"])]
    pub query: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<String>,

    /// Geoname id or provider city id
    #[arg(long)]
    pub id: Option<String>,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct LocateArgs {
    /// Use this latitude instead of the configured position source
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Use this longitude instead of the configured position source
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}
