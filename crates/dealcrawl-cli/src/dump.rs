//! CSV dumps of command results.

use std::path::Path;

use dealcrawl_optimizer::Plan;
use dealcrawl_scraper::PriceResult;
use rust_decimal::Decimal;

fn money(amount: Decimal) -> String {
    format!("{amount:.2}")
}

fn optional_money(amount: Option<Decimal>) -> String {
    amount.map(money).unwrap_or_default()
}

/// One row per product; products without a price get empty cells.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub(crate) fn write_results(path: &Path, results: &[PriceResult]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Product", "Price", "Price per 100ml", "URL"])?;
    for result in results {
        match &result.best {
            Some(best) => {
                let price = money(best.price);
                let per_100ml = optional_money(best.price_per_100ml);
                writer.write_record([
                    result.product.as_str(),
                    price.as_str(),
                    per_100ml.as_str(),
                    best.url.as_str(),
                ])?;
            }
            None => writer.write_record([result.product.as_str(), "", "", ""])?,
        }
    }
    writer.flush()?;
    Ok(())
}

/// One row per chosen offer, grouped by store.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub(crate) fn write_plan(path: &Path, plan: &Plan) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Store", "Product", "Size", "Price", "Price per 100ml", "URL"])?;
    for order in &plan.orders {
        for offer in &order.items {
            let price = money(offer.price);
            let per_100ml = optional_money(offer.price_per_100ml());
            writer.write_record([
                order.store.as_str(),
                offer.product.as_str(),
                offer.size_label.as_str(),
                price.as_str(),
                per_100ml.as_str(),
                offer.url.as_str(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}
