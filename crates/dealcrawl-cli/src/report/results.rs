use dealcrawl_scraper::PriceResult;

use super::{eur, finish, per_100ml, OutputFormat};

const NO_PRICES: &str = "⚠️  No prices found";
const MIN_RULE_WIDTH: usize = 50;

/// Best price per product.
///
/// The text form sorts priced products cheapest first and lists products
/// without a price last; markdown keeps file order.
pub(crate) fn render_results(results: &[PriceResult], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(results),
        OutputFormat::Markdown => render_markdown(results),
    }
}

fn price_cell(result: &PriceResult) -> Option<String> {
    let best = result.best.as_ref()?;
    Some(match best.price_per_100ml {
        Some(unit) => format!("{} ({})", eur(best.price), per_100ml(unit)),
        None => eur(best.price),
    })
}

fn render_text(results: &[PriceResult]) -> String {
    let mut lines = vec![String::new(), "🛒 Best Prices".to_string()];

    if results.is_empty() {
        let rule = "=".repeat(MIN_RULE_WIDTH);
        lines.extend([rule.clone(), "No products to display".to_string(), rule]);
        return finish(lines);
    }

    let mut sorted: Vec<&PriceResult> = results.iter().filter(|r| r.best.is_some()).collect();
    sorted.sort_by_key(|r| r.best.as_ref().map(|b| b.price));
    sorted.extend(results.iter().filter(|r| r.best.is_none()));

    let cells: Vec<Option<String>> = sorted.iter().map(|r| price_cell(r)).collect();
    let name_width = sorted
        .iter()
        .map(|r| r.product.chars().count())
        .max()
        .unwrap_or(0);
    let price_width = cells
        .iter()
        .map(|cell| cell.as_deref().unwrap_or(NO_PRICES).chars().count())
        .max()
        .unwrap_or(0);

    let rows: Vec<String> = sorted
        .iter()
        .zip(&cells)
        .map(|(result, cell)| match (cell, &result.best) {
            (Some(cell), Some(best)) => format!(
                "{:<name_width$} {cell:>price_width$}  {}",
                result.product, best.url
            ),
            _ => format!("{:<name_width$} {NO_PRICES:>price_width$}", result.product),
        })
        .collect();

    let rule_width = rows
        .iter()
        .map(|row| row.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_RULE_WIDTH);
    let rule = "=".repeat(rule_width);

    lines.push(rule.clone());
    lines.extend(rows);
    lines.push(rule);
    finish(lines)
}

fn render_markdown(results: &[PriceResult]) -> String {
    let mut lines = vec![
        String::new(),
        "# 🛒 Best Prices".to_string(),
        String::new(),
        "| Product | Price | Link |".to_string(),
        "|---------|-------|------|".to_string(),
    ];

    for result in results {
        let product = result.product.replace('|', "\\|");
        lines.push(match &result.best {
            Some(best) => {
                let price = match best.price_per_100ml {
                    Some(unit) => format!("{}<br>_({})_", eur(best.price), per_100ml(unit)),
                    None => eur(best.price),
                };
                format!(
                    "| **{product}** | {price} | [🔗 {}]({}) |",
                    best.store, best.url
                )
            }
            None => format!("| **{product}** | _No prices found_ | - |"),
        });
    }

    lines.extend([String::new(), "---".to_string()]);
    finish(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealcrawl_scraper::PriceObservation;
    use rust_decimal::Decimal;

    fn priced(product: &str, store: &str, price: &str, unit: Option<&str>) -> PriceResult {
        PriceResult {
            product: product.to_string(),
            best: Some(PriceObservation {
                product: product.to_string(),
                url: format!("https://{store}/p"),
                store: store.to_string(),
                price: price.parse::<Decimal>().unwrap(),
                price_per_100ml: unit.map(|u| u.parse::<Decimal>().unwrap()),
            }),
        }
    }

    fn missing(product: &str) -> PriceResult {
        PriceResult {
            product: product.to_string(),
            best: None,
        }
    }

    fn sample() -> Vec<PriceResult> {
        vec![
            missing("Toner (200ml)"),
            priced("Cleanser (473ml)", "notino.pt", "18.92", Some("4.00")),
            priced("Sunscreen", "wells.pt", "9.5", None),
        ]
    }

    #[test]
    fn text_sorts_by_price_with_missing_last() {
        let out = render_results(&sample(), OutputFormat::Text);
        let rows: Vec<&str> = out
            .lines()
            .filter(|l| l.starts_with("Sunscreen") || l.starts_with("Cleanser") || l.starts_with("Toner"))
            .collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("Sunscreen"), "got: {rows:?}");
        assert!(rows[1].starts_with("Cleanser"), "got: {rows:?}");
        assert!(rows[2].starts_with("Toner"), "got: {rows:?}");
        assert!(rows[1].contains("€18.92 (€4.00/100ml)  https://notino.pt/p"));
        assert!(rows[0].contains("€9.50"));
        assert!(rows[2].contains(NO_PRICES));
    }

    #[test]
    fn text_rules_span_at_least_fifty_columns() {
        let out = render_results(&[priced("A", "a.pt", "2", None)], OutputFormat::Text);
        assert!(out.contains(&"=".repeat(MIN_RULE_WIDTH)));
        assert!(out.starts_with("\n🛒 Best Prices\n"));
    }

    #[test]
    fn text_empty_results() {
        let out = render_results(&[], OutputFormat::Text);
        assert!(out.contains("No products to display"));
    }

    #[test]
    fn markdown_keeps_file_order_and_links() {
        let out = render_results(&sample(), OutputFormat::Markdown);
        let toner = out.find("Toner").unwrap();
        let cleanser = out.find("Cleanser").unwrap();
        assert!(toner < cleanser);
        assert!(out.contains("| **Toner (200ml)** | _No prices found_ | - |"));
        assert!(out.contains(
            "| **Cleanser (473ml)** | €18.92<br>_(€4.00/100ml)_ | [🔗 notino.pt](https://notino.pt/p) |"
        ));
        assert!(out.contains("| **Sunscreen** | €9.50 | [🔗 wells.pt](https://wells.pt/p) |"));
    }
}
