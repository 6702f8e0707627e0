use dealcrawl_core::Offer;
use dealcrawl_optimizer::{OptimizeMode, Plan, StoreOrder};

use super::{eur, finish, per_100ml, pluralize, OutputFormat};

const NAME_WIDTH: usize = 42;

/// The optimized plan, one block per store followed by the plan totals.
pub(crate) fn render_plan(plan: &Plan, format: OutputFormat) -> String {
    if plan.is_empty() {
        return finish(vec![String::new(), "No shopping plan generated.".to_string()]);
    }
    match format {
        OutputFormat::Text => render_text(plan),
        OutputFormat::Markdown => render_markdown(plan),
    }
}

/// Product name as shown in a plan: the family name, plus the chosen size
/// when the product has one.
pub(crate) fn item_name(offer: &Offer) -> String {
    if offer.size_label == offer.product {
        offer.product.clone()
    } else {
        format!("{} [{}]", offer.product, offer.size_label)
    }
}

fn mode_label(mode: OptimizeMode) -> &'static str {
    match mode {
        OptimizeMode::MinimizeCost => "lowest total cost",
        OptimizeMode::MaximizeValue => "best value per 100ml",
    }
}

fn products_line(plan: &Plan) -> String {
    format!(
        "{} {} from {} {}",
        plan.item_count(),
        pluralize(plan.item_count(), "item", "items"),
        plan.store_count(),
        pluralize(plan.store_count(), "store", "stores")
    )
}

fn threshold_note(order: &StoreOrder) -> Option<String> {
    order
        .free_over
        .map(|threshold| format!("Free shipping over {}", eur(threshold)))
}

fn render_text(plan: &Plan) -> String {
    let mut lines = vec![
        String::new(),
        "🛒 Optimized Shopping Plan".to_string(),
        format!("Optimized for: {}", mode_label(plan.mode)),
        String::new(),
    ];

    for order in &plan.orders {
        lines.push(match threshold_note(order) {
            Some(note) => format!("Store: {} ({note})", order.store),
            None => format!("Store: {}", order.store),
        });
        lines.push("─".repeat(60));

        for offer in &order.items {
            let name = item_name(offer);
            let price = eur(offer.price);
            lines.push(match offer.price_per_100ml() {
                Some(unit) => format!("  {name:<NAME_WIDTH$} {price:>8} ({})", per_100ml(unit)),
                None => format!("  {name:<NAME_WIDTH$} {price:>8}"),
            });
        }

        if order.shipping_fee.is_zero() {
            lines.push(format!("  {:<NAME_WIDTH$} {:>8}", "Shipping", "FREE"));
        } else {
            lines.push(format!(
                "  {:<NAME_WIDTH$} €{:>7.2}",
                "Shipping", order.shipping_fee
            ));
        }
        lines.push(format!("  {}", "─".repeat(58)));
        lines.push(format!("  {:<NAME_WIDTH$} €{:>7.2}", "Store Total", order.total));
        lines.push(String::new());
    }

    lines.extend([
        "═".repeat(60),
        format!("Grand Total: {}", eur(plan.grand_total())),
        format!("Total Shipping: {}", eur(plan.total_shipping())),
        format!("Products: {}", products_line(plan)),
        "═".repeat(60),
        String::new(),
    ]);
    finish(lines)
}

fn render_markdown(plan: &Plan) -> String {
    let mut lines = vec![
        String::new(),
        "# 🛒 Optimized Shopping Plan".to_string(),
        String::new(),
        format!("_Optimized for {}_", mode_label(plan.mode)),
        String::new(),
    ];

    for order in &plan.orders {
        lines.push(match threshold_note(order) {
            Some(note) => format!("## Store: {} *({note})*", order.store),
            None => format!("## Store: {}", order.store),
        });
        lines.extend([
            String::new(),
            "| Product | Price | Value |".to_string(),
            "|---------|-------|-------|".to_string(),
        ]);
        for offer in &order.items {
            let value = offer
                .price_per_100ml()
                .map_or_else(|| "-".to_string(), per_100ml);
            lines.push(format!(
                "| {} | {} | {value} |",
                item_name(offer).replace('|', "\\|"),
                eur(offer.price)
            ));
        }
        lines.push(String::new());
        if order.shipping_fee.is_zero() {
            lines.push("**Shipping:** FREE  ".to_string());
        } else {
            lines.push(format!("**Shipping:** {}  ", eur(order.shipping_fee)));
        }
        lines.extend([
            format!("**Store Total:** {}", eur(order.total)),
            String::new(),
        ]);
    }

    lines.extend([
        "---".to_string(),
        String::new(),
        format!("**Grand Total:** {}  ", eur(plan.grand_total())),
        format!("**Total Shipping:** {}  ", eur(plan.total_shipping())),
        format!("**Products:** {}", products_line(plan)),
        String::new(),
    ]);
    finish(lines)
}
