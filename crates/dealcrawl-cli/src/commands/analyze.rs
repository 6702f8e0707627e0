use std::path::Path;

use chrono::NaiveDate;

use crate::history::{current_deals, load_history};
use crate::report::{self, OutputFormat};

/// Reads the dated CSV dumps in `history_dir` and prints today's deals,
/// best first.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or holds no usable
/// price records.
pub(crate) fn run_analyze(
    history_dir: &Path,
    today: NaiveDate,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let history = load_history(history_dir)?;
    if history.is_empty() {
        anyhow::bail!("no product data found in {}", history_dir.display());
    }
    tracing::info!(products = history.len(), "loaded price history");

    let deals = current_deals(&history, today);
    print!("{}", report::render_deals(&deals, today, format));
    Ok(())
}
