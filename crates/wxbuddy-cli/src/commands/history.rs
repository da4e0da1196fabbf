use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::app_services::AppServices;

pub fn cmd_history(services: &AppServices, clear: bool, json: bool) -> Result<()> {
    let history = services.history();

    if clear {
        history.clear();
        if json {
            return super::print_json(&serde_json::json!({ "cleared": true }));
        }
        println!("Location history cleared.");
        return Ok(());
    }

    let entries = history.entries();
    if json {
        return super::print_json(&entries);
    }

    if entries.is_empty() {
        println!("No recently viewed locations.");
        return Ok(());
    }

    let now = services.clock().now();
    println!("Recently viewed:");
    for entry in &entries {
        let viewed = DateTime::<Utc>::from_timestamp_millis(entry.timestamp)
            .map(|t| format_relative_time(now.signed_duration_since(t)))
            .unwrap_or_else(|| "unknown".to_string());
        println!("  {:<28} {}", entry.name, viewed);
        println!(
            "    wxbuddy weather --query \"{}\"",
            entry.location_query().to_query()
        );
    }
    Ok(())
}

fn format_relative_time(duration: chrono::Duration) -> String {
    let seconds = duration.num_seconds().abs();
    let suffix = if duration.num_seconds() >= 0 { "ago" } else { "from now" };
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        format!("{} minute{} {}", minutes, plural(minutes), suffix)
    } else if seconds < 86400 {
        let hours = seconds / 3600;
        format!("{} hour{} {}", hours, plural(hours), suffix)
    } else {
        let days = seconds / 86400;
        format!("{} day{} {}", days, plural(days), suffix)
    }
}
