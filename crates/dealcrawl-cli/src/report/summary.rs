use dealcrawl_core::extract_domain;
use dealcrawl_scraper::SearchStats;

use super::{finish, pluralize, OutputFormat};

const SHOWN_FAILED_URLS: usize = 3;

/// Collection statistics: success rate, issue counts, out-of-stock products
/// by store, and the first few failed URLs.
pub(crate) fn render_summary(stats: &SearchStats, format: OutputFormat) -> String {
    let markdown = format == OutputFormat::Markdown;
    let mut lines = Vec::new();

    if markdown {
        lines.extend([String::new(), "## 📊 Search Summary".to_string(), String::new()]);
    } else {
        lines.extend([String::new(), "📊 Search Summary".to_string(), "=".repeat(70)]);
    }

    lines.push(success_line(stats, markdown));

    if let Some(issues) = issues_line(stats, markdown) {
        lines.extend([String::new(), issues]);
    }

    if !stats.out_of_stock_items.is_empty() {
        lines.push(String::new());
        lines.push(if markdown { "**Out of Stock:**" } else { "Out of Stock:" }.to_string());
        for (product, urls) in &stats.out_of_stock_items {
            let domains = urls
                .iter()
                .map(|url| extract_domain(url))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(if markdown {
                format!("- **{product}**: {domains}")
            } else {
                format!("  • {product}: {domains}")
            });
        }
    }

    let failed = &stats.failed_urls;
    if !failed.is_empty() {
        lines.push(String::new());
        lines.push(if markdown {
            format!("**Failed URLs** ({}):", failed.len())
        } else {
            format!("Failed URLs ({}):", failed.len())
        });
        for url in failed.iter().take(SHOWN_FAILED_URLS) {
            lines.push(if markdown {
                format!("- `{url}`")
            } else {
                format!("  • {url}")
            });
        }
        if failed.len() > SHOWN_FAILED_URLS {
            let more = failed.len() - SHOWN_FAILED_URLS;
            lines.push(if markdown {
                format!("- _{more} more..._")
            } else {
                format!("  • {more} more...")
            });
        }
    }

    lines.push(String::new());
    finish(lines)
}

/// Rounded success percentage.
fn success_percent(found: usize, checked: usize) -> usize {
    (found * 100 + checked / 2) / checked
}

fn success_emoji(found: usize, checked: usize) -> &'static str {
    if found * 100 >= checked * 80 {
        "✅"
    } else if found * 100 >= checked * 50 {
        "⚠️"
    } else {
        "❌"
    }
}

fn success_line(stats: &SearchStats, markdown: bool) -> String {
    let products = format!(
        "{} {}",
        stats.total_products,
        pluralize(stats.total_products, "product", "products")
    );
    let checked = stats.total_urls_checked;

    if checked == 0 {
        return if markdown {
            format!("**{products}** · No URLs checked")
        } else {
            format!("{products} · No URLs checked")
        };
    }

    let found = stats.prices_found;
    let ratio = format!(
        "{} {found}/{checked} {}",
        success_emoji(found, checked),
        pluralize(checked, "URL", "URLs")
    );
    let percent = success_percent(found, checked);
    if markdown {
        format!("**{ratio}** ({percent}% success) · **{products}**")
    } else {
        format!("{ratio} ({percent}% success) · {products}")
    }
}

fn issues_line(stats: &SearchStats, markdown: bool) -> Option<String> {
    let mut issues = Vec::new();
    if stats.out_of_stock > 0 {
        issues.push(format!("📦 {} out of stock", stats.out_of_stock));
    }
    if stats.fetch_errors > 0 {
        issues.push(format!(
            "🌐 {} {}",
            stats.fetch_errors,
            pluralize(stats.fetch_errors, "fetch error", "fetch errors")
        ));
    }
    if stats.extraction_errors > 0 {
        issues.push(format!(
            "🔍 {} {}",
            stats.extraction_errors,
            pluralize(stats.extraction_errors, "extraction error", "extraction errors")
        ));
    }

    if issues.is_empty() {
        return None;
    }
    let joined = issues.join(" · ");
    Some(if markdown {
        format!("_{joined}_")
    } else {
        format!("Issues: {joined}")
    })
}
