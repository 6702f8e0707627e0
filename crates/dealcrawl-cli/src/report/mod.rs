//! Text and markdown rendering for command output.
//!
//! Every renderer returns the full report as a `String`; the commands decide
//! where it goes.

mod deals;
mod plan;
mod results;
mod summary;

use rust_decimal::Decimal;

pub(crate) use deals::render_deals;
pub(crate) use plan::render_plan;
pub(crate) use results::render_results;
pub(crate) use summary::render_summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Markdown,
}

impl OutputFormat {
    pub(crate) fn from_markdown_flag(markdown: bool) -> Self {
        if markdown {
            Self::Markdown
        } else {
            Self::Text
        }
    }
}

/// `€12.30`
pub(crate) fn eur(amount: Decimal) -> String {
    format!("€{amount:.2}")
}

/// `€4.50/100ml`
fn per_100ml(amount: Decimal) -> String {
    format!("€{amount:.2}/100ml")
}

fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Joins report lines, ending with a newline.
fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
