//! Price history analysis over dated CSV dumps.
//!
//! A history directory holds one `YYYY-MM-DD.csv` file per run, each in the
//! format written by `prices --dump`. Records are grouped per product and
//! compared against the last 30 days to score how good today's price is.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

const DAYS_FOR_AVERAGE: i64 = 30;
const GREAT_DEAL_BELOW: Decimal = Decimal::from_parts(10, 0, 0, true, 0);

/// One observed price for a product on a given day. A missing price means
/// the product was out of stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PriceRecord {
    pub(crate) date: NaiveDate,
    pub(crate) price: Option<Decimal>,
    pub(crate) price_per_100ml: Option<Decimal>,
    pub(crate) url: String,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "Price")]
    price: Option<String>,
    #[serde(rename = "Price per 100ml")]
    price_per_100ml: Option<String>,
    #[serde(rename = "URL", default)]
    url: String,
}

/// Price records per product name, newest first.
pub(crate) type History = BTreeMap<String, Vec<PriceRecord>>;

/// Reads every `YYYY-MM-DD.csv` file in `dir`.
///
/// Files whose name is not a date, or that fail to parse, are skipped with
/// a warning.
///
/// # Errors
///
/// Returns an error if `dir` cannot be listed.
pub(crate) fn load_history(dir: &Path) -> anyhow::Result<History> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read history directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    let mut history = History::new();
    for path in paths {
        let Some(date) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok())
        else {
            tracing::warn!(path = %path.display(), "skipping history file without a date name");
            continue;
        };

        match read_history_file(&path, date) {
            Ok(records) => {
                tracing::debug!(path = %path.display(), rows = records.len(), "read history file");
                for (product, record) in records {
                    history.entry(product).or_default().push(record);
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "skipping unreadable history file");
            }
        }
    }

    for records in history.values_mut() {
        records.sort_by(|a, b| b.date.cmp(&a.date));
    }
    Ok(history)
}

fn read_history_file(path: &Path, date: NaiveDate) -> anyhow::Result<Vec<(String, PriceRecord)>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: HistoryRow = row?;
        if row.product.is_empty() {
            continue;
        }
        let price = parse_amount(row.price.as_deref())?;
        let price_per_100ml = parse_amount(row.price_per_100ml.as_deref())?;
        records.push((
            row.product,
            PriceRecord {
                date,
                price,
                price_per_100ml,
                url: row.url,
            },
        ));
    }
    Ok(records)
}

/// Empty cells are `None`.
fn parse_amount(raw: Option<&str>) -> anyhow::Result<Option<Decimal>> {
    raw.filter(|s| !s.is_empty())
        .map(|s| s.parse::<Decimal>().with_context(|| format!("invalid amount {s:?}")))
        .transpose()
}

/// Summary of one product's history as of `today`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PriceStats {
    pub(crate) product: String,
    pub(crate) current: PriceRecord,
    pub(crate) avg_price_30d: Option<Decimal>,
    pub(crate) avg_per_100ml_30d: Option<Decimal>,
    pub(crate) lowest_price: Option<Decimal>,
    pub(crate) lowest_per_100ml: Option<Decimal>,
    /// Newest day with a lower price than today's.
    pub(crate) last_cheaper: Option<NaiveDate>,
    pub(crate) last_cheaper_per_100ml: Option<NaiveDate>,
    pub(crate) out_of_stock_days: usize,
    pub(crate) observed_days: usize,
}

/// The values a deal is judged on: per-100ml figures when all of them are
/// known, otherwise absolute prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Comparison {
    pub(crate) current: Decimal,
    pub(crate) average: Decimal,
    pub(crate) lowest: Decimal,
    pub(crate) last_cheaper: Option<NaiveDate>,
}

impl PriceStats {
    /// Computes statistics from `records`, which must be newest first.
    /// Returns `None` for an empty history.
    pub(crate) fn compute(product: &str, records: &[PriceRecord], today: NaiveDate) -> Option<Self> {
        let current = records.first()?.clone();
        let cutoff = today - chrono::Duration::days(DAYS_FOR_AVERAGE);

        let priced: Vec<&PriceRecord> = records.iter().filter(|r| r.price.is_some()).collect();
        let recent: Vec<&PriceRecord> = priced.iter().copied().filter(|r| r.date > cutoff).collect();

        let last_cheaper = current.price.and_then(|now| {
            records
                .iter()
                .find(|r| r.price.is_some_and(|p| p < now))
                .map(|r| r.date)
        });
        let last_cheaper_per_100ml = current.price_per_100ml.and_then(|now| {
            records
                .iter()
                .find(|r| r.price_per_100ml.is_some_and(|p| p < now))
                .map(|r| r.date)
        });

        Some(Self {
            product: product.to_string(),
            avg_price_30d: mean(recent.iter().filter_map(|r| r.price)),
            avg_per_100ml_30d: mean(recent.iter().filter_map(|r| r.price_per_100ml)),
            lowest_price: priced.iter().filter_map(|r| r.price).min(),
            lowest_per_100ml: priced.iter().filter_map(|r| r.price_per_100ml).min(),
            last_cheaper,
            last_cheaper_per_100ml,
            out_of_stock_days: records.len() - priced.len(),
            observed_days: records.len(),
            current,
        })
    }

    pub(crate) fn comparison(&self) -> Option<Comparison> {
        let positive = |value: Option<Decimal>| value.filter(|v| *v > Decimal::ZERO);

        if let (Some(current), Some(average), Some(lowest)) = (
            positive(self.current.price_per_100ml),
            positive(self.avg_per_100ml_30d),
            positive(self.lowest_per_100ml),
        ) {
            return Some(Comparison {
                current,
                average,
                lowest,
                last_cheaper: self.last_cheaper_per_100ml,
            });
        }

        let (current, average, lowest) = (
            positive(self.current.price)?,
            positive(self.avg_price_30d)?,
            positive(self.lowest_price)?,
        );
        Some(Comparison {
            current,
            average,
            lowest,
            last_cheaper: self.last_cheaper,
        })
    }

    /// Percentage difference from the 30-day average; negative is cheaper.
    pub(crate) fn deal_score(&self) -> Option<Decimal> {
        let c = self.comparison()?;
        Some((c.current - c.average) / c.average * Decimal::ONE_HUNDRED)
    }
}

fn mean(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values.fold((Decimal::ZERO, 0u32), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / Decimal::from(count))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DealRating {
    Great,
    Good,
    Poor,
}

impl DealRating {
    pub(crate) fn from_score(score: Decimal) -> Self {
        if score < GREAT_DEAL_BELOW {
            Self::Great
        } else if score < Decimal::ZERO {
            Self::Good
        } else {
            Self::Poor
        }
    }

    pub(crate) fn icon(self) -> &'static str {
        match self {
            Self::Great => "🔥",
            Self::Good => "✅",
            Self::Poor => "⚠️",
        }
    }
}

/// A product that is in stock on the latest history day, with its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Deal {
    pub(crate) stats: PriceStats,
    pub(crate) score: Decimal,
}

/// Scores every product that is in stock on the most recent day seen in
/// `history`, best deal first. Products without enough data to compare
/// are left out.
pub(crate) fn current_deals(history: &History, today: NaiveDate) -> Vec<Deal> {
    let in_stock: Vec<PriceStats> = history
        .iter()
        .filter_map(|(product, records)| PriceStats::compute(product, records, today))
        .filter(|stats| stats.current.price.is_some())
        .collect();

    let Some(latest) = in_stock.iter().map(|s| s.current.date).max() else {
        return Vec::new();
    };

    let mut deals: Vec<Deal> = in_stock
        .into_iter()
        .filter(|stats| stats.current.date == latest)
        .filter_map(|stats| stats.deal_score().map(|score| Deal { stats, score }))
        .collect();
    deals.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.stats.product.cmp(&b.stats.product)));
    deals
}
