//! Interactive directory session.
//!
//! Rows opened during the session load their detail view, which fills the
//! snapshot cache, so the table shows their current temperature afterwards.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use wxbuddy_directory::{City, DirectoryBrowser, SortKey};
use wxbuddy_weather::{DetailState, WeatherSnapshotCache};

use super::search::write_table;
use super::weather::write_report;
use crate::app_services::AppServices;
use crate::cli::{BrowseArgs, SortColumn};

const HELP: &str = "\
Commands:
  <number>      open the weather for that row
  <enter>       scroll: load the next page
  more          load the next page, retrying a failed one
  /<term>       search by city or country (empty term clears)
  sort <column> sort by name, country, population or timezone
  retry         reload the last weather view
  help          show this list
  q             quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Scroll,
    More,
    Open(usize),
    Search(String),
    Sort(SortKey),
    Retry,
    Help,
    Quit,
    Unknown(String),
}

impl BrowseCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Some(term) = line.strip_prefix('/') {
            return Self::Search(term.trim().to_string());
        }
        if let Some(column) = line.strip_prefix("sort ") {
            return match SortColumn::from_str(column.trim(), true) {
                Ok(column) => Self::Sort(column.into()),
                Err(_) => Self::Unknown(line.to_string()),
            };
        }
        match line {
            "" => Self::Scroll,
            "more" | "m" => Self::More,
            "retry" | "r" => Self::Retry,
            "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Self::Open(n),
                _ => Self::Unknown(other.to_string()),
            },
        }
    }
}

pub async fn cmd_browse(services: &AppServices, args: BrowseArgs) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run_session(services, args.term.as_deref(), input, &mut io::stdout()).await
}

/// Drive a session from line-oriented `input` until `q` or end of input.
///
/// # Errors
/// Returns an error only when reading input or writing output fails.
pub async fn run_session<R, W>(
    services: &AppServices,
    term: Option<&str>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let source = services.directory();
    let snapshots = services.snapshots();
    let detail = services.detail_service();
    let mut browser = services.directory_browser();

    let first = match term {
        Some(term) => {
            browser.set_search_term(term);
            browser.submit_search().unwrap_or_else(|| browser.start())
        }
        None => browser.start(),
    };
    browser.run(first, source.as_ref()).await;
    render(out, &browser, &snapshots)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match BrowseCommand::parse(&line) {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => writeln!(out, "{}", HELP)?,
            BrowseCommand::Unknown(text) => {
                writeln!(out, "Unknown command: {} (type 'help')", text)?;
            }
            BrowseCommand::Scroll => match browser.on_last_row_visible() {
                Some(request) => {
                    browser.run(request, source.as_ref()).await;
                    render(out, &browser, &snapshots)?;
                }
                None if browser.error().is_some() => {
                    writeln!(out, "The last page failed to load. Type 'more' to retry.")?;
                }
                None => writeln!(out, "No more cities to load.")?,
            },
            BrowseCommand::More => {
                if browser.load_more(source.as_ref()).await {
                    render(out, &browser, &snapshots)?;
                } else {
                    writeln!(out, "No more cities to load.")?;
                }
            }
            BrowseCommand::Search(term) => {
                browser.set_search_term(&term);
                match browser.submit_search() {
                    Some(request) => {
                        browser.run(request, source.as_ref()).await;
                        render(out, &browser, &snapshots)?;
                    }
                    None => writeln!(out, "Already showing results for {:?}.", term)?,
                }
            }
            BrowseCommand::Sort(key) => {
                let request = browser.toggle_sort(key);
                browser.run(request, source.as_ref()).await;
                render(out, &browser, &snapshots)?;
            }
            BrowseCommand::Open(n) => {
                let Some(query) = browser.rows().nth(n - 1).map(City::location_query) else {
                    writeln!(out, "There is no row {}.", n)?;
                    continue;
                };
                let state = detail.load(query).await;
                write_state(out, &state)?;
                render(out, &browser, &snapshots)?;
            }
            BrowseCommand::Retry => {
                let state = detail.retry().await;
                write_state(out, &state)?;
                render(out, &browser, &snapshots)?;
            }
        }
    }

    tracing::debug!("Browse session ended with {} rows loaded", browser.rows().count());
    Ok(())
}

fn render(
    out: &mut impl Write,
    browser: &DirectoryBrowser,
    snapshots: &WeatherSnapshotCache,
) -> io::Result<()> {
    writeln!(out)?;
    write_table(out, browser, &browser.rows_with_snapshots(snapshots))?;
    if let Some(error) = browser.error() {
        writeln!(out, "{}", error.message)?;
        if error.retryable {
            writeln!(out, "Type 'more' to retry.")?;
        }
    }
    Ok(())
}

fn write_state(out: &mut impl Write, state: &DetailState) -> io::Result<()> {
    writeln!(out)?;
    match state {
        DetailState::Ready(report) => write_report(out, report),
        DetailState::MissingLocation { message } => {
            writeln!(out, "Missing City Information")?;
            writeln!(out, "{}", message)
        }
        DetailState::Failed { message, retryable } => {
            writeln!(out, "Error Fetching Weather: {}", message)?;
            if *retryable {
                writeln!(out, "Type 'retry' to try again.")?;
            }
            Ok(())
        }
        DetailState::Loading | DetailState::Superseded => Ok(()),
    }
}
