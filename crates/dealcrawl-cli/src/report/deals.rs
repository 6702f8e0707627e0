use chrono::NaiveDate;
use dealcrawl_core::extract_domain;
use rust_decimal::Decimal;

use crate::history::{Deal, DealRating};

use super::{eur, finish, OutputFormat};

const MIN_PRODUCT_WIDTH: usize = 30;
const MAX_PRODUCT_WIDTH: usize = 80;
const NO_DEALS: &str = "No products available";

/// Today's deals from the price history, best first.
///
/// Each row compares the current price with the 30-day average and the
/// lowest price seen, and shows how many days ago it was last cheaper.
pub(crate) fn render_deals(deals: &[Deal], today: NaiveDate, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(deals, today),
        OutputFormat::Markdown => render_markdown(deals, today),
    }
}

struct Row {
    product: String,
    current: String,
    per_100ml: String,
    average: String,
    lowest: String,
    deal: String,
    last: String,
    out_of_stock: String,
    site: String,
}

fn build_row(deal: &Deal, today: NaiveDate) -> Row {
    let stats = &deal.stats;
    let (average, lowest, last) = match stats.comparison() {
        Some(c) => (eur(c.average), eur(c.lowest), days_since(c.last_cheaper, today)),
        None => ("N/A".to_string(), "N/A".to_string(), "-".to_string()),
    };
    let site = if stats.current.url.is_empty() {
        "-".to_string()
    } else {
        extract_domain(&stats.current.url)
    };

    Row {
        product: stats.product.clone(),
        current: stats.current.price.map_or_else(|| "N/A".to_string(), eur),
        per_100ml: stats.current.price_per_100ml.map_or_else(|| "-".to_string(), eur),
        average,
        lowest,
        deal: deal_cell(deal.score),
        last,
        out_of_stock: format!("{}/{}", stats.out_of_stock_days, stats.observed_days),
        site,
    }
}

/// `🔥 -12.5%`
fn deal_cell(score: Decimal) -> String {
    let icon = DealRating::from_score(score).icon();
    format!("{icon} {:>5.1}%", score.round_dp(1))
}

fn days_since(date: Option<NaiveDate>, today: NaiveDate) -> String {
    date.map_or_else(|| "never".to_string(), |d| (today - d).num_days().to_string())
}

fn render_text(deals: &[Deal], today: NaiveDate) -> String {
    let title = "SUMMARY - Best Deals Right Now".to_string();
    if deals.is_empty() {
        return finish(vec![String::new(), title, NO_DEALS.to_string()]);
    }

    let width = deals
        .iter()
        .map(|d| d.stats.product.chars().count() + 2)
        .max()
        .unwrap_or(0)
        .clamp(MIN_PRODUCT_WIDTH, MAX_PRODUCT_WIDTH);

    let header = format!(
        "{:<width$} {:>9} {:>8} {:>9} {:>9} {:^10} {:>5} {:>5}  {}",
        "Product", "Current", "€/100ml", "Avg 30d", "Lowest", "Deal", "Last", "OOS", "Site"
    );
    let rows: Vec<String> = deals
        .iter()
        .map(|deal| {
            let row = build_row(deal, today);
            let product: String = row.product.chars().take(width).collect();
            format!(
                "{product:<width$} {:>9} {:>8} {:>9} {:>9} {:<10} {:>5} {:>5}  {}",
                row.current,
                row.per_100ml,
                row.average,
                row.lowest,
                row.deal,
                row.last,
                row.out_of_stock,
                row.site
            )
        })
        .collect();

    let rule_width = rows
        .iter()
        .chain(std::iter::once(&header))
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![
        String::new(),
        "=".repeat(rule_width),
        title,
        "=".repeat(rule_width),
        header,
        "-".repeat(rule_width),
    ];
    lines.extend(rows);
    finish(lines)
}

fn render_markdown(deals: &[Deal], today: NaiveDate) -> String {
    let mut lines = vec![String::new(), "# 📈 Best Deals Right Now".to_string(), String::new()];
    if deals.is_empty() {
        lines.push(NO_DEALS.to_string());
        return finish(lines);
    }

    lines.extend([
        "| Product | Current | €/100ml | Avg 30d | Lowest | Deal | Days Since Cheaper | Out of Stock | Site |"
            .to_string(),
        "|---------|---------|---------|---------|--------|------|--------------------|--------------|------|"
            .to_string(),
    ]);
    for deal in deals {
        let row = build_row(deal, today);
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            row.product.replace('|', "\\|"),
            row.current,
            row.per_100ml,
            row.average,
            row.lowest,
            row.deal.trim(),
            row.last,
            row.out_of_stock,
            row.site
        ));
    }
    finish(lines)
}
