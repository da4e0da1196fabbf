//! Subcommand handlers.

mod browse;
mod history;
mod locate;
mod search;
mod weather;

#[cfg(test)]
mod test_support;

pub use browse::cmd_browse;
pub use history::cmd_history;
pub use locate::cmd_locate;
pub use search::cmd_search;
pub use weather::{cmd_weather, print_state};

use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
