use std::io::{self, Write};

use anyhow::Result;

use wxbuddy_directory::{CityRow, DirectoryBrowser, SortConfig, SortDirection, SortKey};
use wxbuddy_weather::format::format_temperature;

use crate::app_services::AppServices;
use crate::cli::SearchArgs;

pub async fn cmd_search(services: &AppServices, args: SearchArgs, json: bool) -> Result<()> {
    let browser = load_pages(services, &args).await?;
    let snapshots = services.snapshots();
    let rows = browser.rows_with_snapshots(&snapshots);

    if json {
        return super::print_json(&serde_json::json!({
            "search": browser.search_term(),
            "order_by": browser.sort().order_by(),
            "has_more": browser.has_next_page(),
            "rows": rows,
        }));
    }

    write_table(&mut io::stdout().lock(), &browser, &rows)?;
    Ok(())
}

/// Run the requested query and load `args.pages` pages of it.
///
/// # Errors
/// Returns the directory's message when a page fails to load.
pub async fn load_pages(services: &AppServices, args: &SearchArgs) -> Result<DirectoryBrowser> {
    let source = services.directory();
    let mut browser = services.directory_browser();

    let wanted = SortConfig::new(
        SortKey::from(args.sort),
        if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        },
    );

    let mut request = match args.term.as_deref() {
        Some(term) => {
            browser.set_search_term(term);
            browser.submit_search().unwrap_or_else(|| browser.start())
        }
        None => browser.start(),
    };
    while browser.sort() != wanted {
        request = browser.toggle_sort(wanted.key);
    }

    browser.run(request, source.as_ref()).await;
    for _ in 1..args.pages {
        if browser.error().is_some() || !browser.load_more(source.as_ref()).await {
            break;
        }
    }

    if let Some(error) = browser.error() {
        anyhow::bail!("{}", error.message);
    }
    Ok(browser)
}

/// Write the loaded rows, numbered from 1, with any cached temperature.
pub fn write_table(
    out: &mut impl Write,
    browser: &DirectoryBrowser,
    rows: &[CityRow<'_>],
) -> io::Result<()> {
    if browser.is_empty_result() {
        writeln!(out, "No Cities Found")?;
        writeln!(
            out,
            "No cities match your current search or filters. Try a different search term."
        )?;
        return Ok(());
    }

    writeln!(
        out,
        "{:>4} {:<28} {:<22} {:>12} {:<24} {:>10}  {:<20} {}",
        "#", "Name", "Country", "Population", "Timezone", "Id", "Coordinates", "Weather"
    )?;
    for (index, row) in rows.iter().enumerate() {
        let city = row.city;
        let weather = row
            .snapshot
            .as_ref()
            .and_then(|s| s.temp.map(|t| (t, s.description.as_deref())))
            .map(|(temp, description)| match description {
                Some(d) => format!("{} {}", format_temperature(temp), d),
                None => format_temperature(temp),
            })
            .unwrap_or_default();
        writeln!(
            out,
            "{:>4} {:<28} {:<22} {:>12} {:<24} {:>10}  {:<20} {}",
            index + 1,
            city.name,
            city.cou_name_en.as_deref().unwrap_or("N/A"),
            city.population_display(),
            city.timezone.as_deref().unwrap_or("N/A"),
            city.geoname_id,
            format!("{:.4}, {:.4}", city.coordinates.lat, city.coordinates.lon),
            weather,
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} cities, sorted by {} {}{}",
        rows.len(),
        browser.sort().key.label(),
        browser.sort().direction.as_api(),
        if browser.has_next_page() {
            " (more available)"
        } else {
            ""
        }
    )
}
