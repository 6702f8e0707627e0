use super::*;

use dealcrawl_core::PriceBounds;

fn sample_config() -> AppConfig {
    AppConfig {
        log_level: "warn".to_string(),
        price_bounds: PriceBounds::default(),
        products_path: "products.yml".into(),
        shipping_path: "shipping.yaml".into(),
        cache_path: ".http_cache.json".into(),
        cache_duration_secs: 3600,
        request_timeout_secs: 15,
        user_agent: "dealcrawl-test/0.1".to_string(),
        max_retries: 2,
        retry_backoff_base_secs: 5,
        delay_min_ms: 1000,
        delay_max_ms: 2000,
        solver_time_limit_secs: 30,
    }
}

#[test]
fn parses_prices_with_defaults() {
    let cli = Cli::try_parse_from(["dealcrawl", "prices"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Prices {
            all_sizes: false,
            markdown: false,
            dump: None,
            ..
        }
    ));
    assert!(!cli.global.no_cache);
    assert!(!cli.global.verbose);
}

#[test]
fn prices_filters_split_on_commas() {
    let cli = Cli::try_parse_from([
        "dealcrawl",
        "prices",
        "--sites",
        "notino.pt,wells.pt",
        "--products",
        "cerave",
        "--all-sizes",
    ])
    .expect("expected valid cli args");

    let Commands::Prices {
        sites,
        products,
        all_sizes,
        ..
    } = cli.command
    else {
        panic!("expected prices command");
    };
    assert_eq!(sites, vec!["notino.pt", "wells.pt"]);
    assert_eq!(products, vec!["cerave"]);
    assert!(all_sizes);
}

#[test]
fn plan_requires_products() {
    let result = Cli::try_parse_from(["dealcrawl", "plan"]);
    assert!(result.is_err(), "expected missing --products error, got: {result:?}");
}

#[test]
fn parses_plan_command() {
    let cli = Cli::try_parse_from([
        "dealcrawl",
        "plan",
        "--products",
        "cleanser,sunscreen",
        "--optimize-for-value",
        "--markdown",
        "--dump",
        "plan.csv",
    ])
    .expect("expected valid cli args");

    let Commands::Plan {
        products,
        optimize_for_value,
        markdown,
        dump,
        ..
    } = cli.command
    else {
        panic!("expected plan command");
    };
    assert_eq!(products, vec!["cleanser", "sunscreen"]);
    assert!(optimize_for_value);
    assert!(markdown);
    assert_eq!(dump, Some(PathBuf::from("plan.csv")));
}

#[test]
fn global_flags_work_after_subcommand() {
    let cli = Cli::try_parse_from([
        "dealcrawl",
        "prices",
        "--no-cache",
        "--cache-duration",
        "60",
        "--request-timeout",
        "5",
        "--products-file",
        "my-products.yml",
        "--verbose",
    ])
    .expect("expected valid cli args");

    assert!(cli.global.no_cache);
    assert!(cli.global.verbose);
    assert_eq!(cli.global.cache_duration, Some(60));
    assert_eq!(cli.global.request_timeout, Some(5));
    assert_eq!(
        cli.global.products_file,
        Some(PathBuf::from("my-products.yml"))
    );
}

#[test]
fn global_flags_override_config() {
    let cli = Cli::try_parse_from([
        "dealcrawl",
        "--shipping-file",
        "rules.yaml",
        "--cache-duration",
        "120",
        "--verbose",
        "prices",
    ])
    .expect("expected valid cli args");

    let mut config = sample_config();
    cli.global.apply(&mut config);

    assert_eq!(config.shipping_path, PathBuf::from("rules.yaml"));
    assert_eq!(config.cache_duration_secs, 120);
    assert_eq!(config.log_level, "debug");
}

#[test]
fn unset_global_flags_keep_config() {
    let cli = Cli::try_parse_from(["dealcrawl", "prices"]).expect("expected valid cli args");
    let mut config = sample_config();
    cli.global.apply(&mut config);
    assert_eq!(config.products_path, PathBuf::from("products.yml"));
    assert_eq!(config.shipping_path, PathBuf::from("shipping.yaml"));
    assert_eq!(config.cache_duration_secs, 3600);
    assert_eq!(config.request_timeout_secs, 15);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn unknown_subcommand_is_rejected() {
    let result = Cli::try_parse_from(["dealcrawl", "collect"]);
    assert!(result.is_err(), "expected unknown subcommand error, got: {result:?}");
}

#[test]
fn analyze_defaults_to_history_dir() {
    let cli = Cli::try_parse_from(["dealcrawl", "analyze"]).expect("expected valid cli args");

    let Commands::Analyze {
        history_dir,
        markdown,
    } = cli.command
    else {
        panic!("expected analyze command");
    };
    assert_eq!(history_dir, PathBuf::from("history"));
    assert!(!markdown);
}

#[test]
fn analyze_accepts_history_dir() {
    let cli = Cli::try_parse_from([
        "dealcrawl",
        "analyze",
        "--history-dir",
        "/tmp/prices",
        "--markdown",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Analyze { ref history_dir, markdown: true } if history_dir == &PathBuf::from("/tmp/prices")
    ));
}
