//! End-to-end collection against a mocked store: fetch, stock check,
//! extraction, statistics and the offer table built from the result.

use std::time::Duration;

use rust_decimal::Decimal;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dealcrawl_core::{PriceBounds, ProductEntry, ProductsFile};
use dealcrawl_scraper::{
    build_offers, cheapest_per_product, collect_prices, requested_products, ClientOptions,
    HttpCache, PageClient,
};

fn dec(raw: &str) -> Decimal {
    raw.parse().unwrap()
}

fn quiet_options() -> ClientOptions {
    ClientOptions {
        timeout: Duration::from_secs(5),
        user_agent: "dealcrawl-test/0.1".to_string(),
        max_retries: 0,
        backoff_base_secs: 0,
        delay_min_ms: 0,
        delay_max_ms: 0,
    }
}

async fn page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn classifies_every_url_and_counts_outcomes() {
    let server = MockServer::start().await;
    page(
        &server,
        "/cleanser-236",
        200,
        r#"<meta property="product:price:amount" content="11.80">"#,
    )
    .await;
    page(
        &server,
        "/cleanser-236-b",
        200,
        r#"<meta property="product:price:amount" content="10.62">"#,
    )
    .await;
    page(
        &server,
        "/cleanser-473",
        200,
        "<html><body><p>Esgotado</p><p>18,90 €</p></body></html>",
    )
    .await;
    page(&server, "/toner", 200, "<html><body>No price here</body></html>").await;
    page(&server, "/gone", 404, "").await;

    let base = server.uri();
    let products = ProductsFile {
        products: vec![
            ProductEntry {
                name: "Cleanser (236ml)".to_string(),
                urls: vec![format!("{base}/cleanser-236"), format!("{base}/cleanser-236-b")],
            },
            ProductEntry {
                name: "Cleanser (473ml)".to_string(),
                urls: vec![format!("{base}/cleanser-473")],
            },
            ProductEntry {
                name: "Toner (200ml)".to_string(),
                urls: vec![format!("{base}/toner"), format!("{base}/gone")],
            },
        ],
    };

    let dir = tempfile::tempdir().unwrap();
    let cache = HttpCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));
    let client = PageClient::new(quiet_options(), Some(cache)).unwrap();

    let collection = collect_prices(&products, &client, PriceBounds::default()).await;
    let stats = &collection.stats;

    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.total_urls_checked, 5);
    assert_eq!(stats.prices_found, 2);
    assert_eq!(stats.out_of_stock, 1);
    assert_eq!(stats.extraction_errors, 1);
    assert_eq!(stats.fetch_errors, 1);
    assert_eq!(
        stats.out_of_stock_items["Cleanser (473ml)"],
        vec![format!("{base}/cleanser-473")]
    );
    assert_eq!(
        stats.failed_urls,
        vec![format!("{base}/toner"), format!("{base}/gone")]
    );

    // The page without a price was dropped from the cache; good pages stay.
    let cache = HttpCache::new(dir.path().join("cache.json"), Duration::from_secs(3600));
    assert!(cache.get(&format!("{base}/toner")).is_none());
    assert!(cache.get(&format!("{base}/cleanser-236")).is_some());

    let cheapest = cheapest_per_product(&collection);
    let best = cheapest[0].best.as_ref().unwrap();
    assert_eq!(best.price, dec("10.62"));
    assert_eq!(best.price_per_100ml, Some(dec("4.5")));
    assert!(cheapest[1].best.is_none());

    let offers = build_offers(&collection, PriceBounds::default());
    assert_eq!(offers.len(), 2);
    assert!(offers.iter().all(|o| o.product == "Cleanser" && o.size_label == "236ml"));
    assert_eq!(requested_products(&collection), vec!["Cleanser", "Toner"]);
}
