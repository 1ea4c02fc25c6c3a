use super::*;

#[test]
fn parses_extract_command() {
    let cli = Cli::try_parse_from(["pricescout", "extract", "https://www.amazon.com/dp/B0C1"])
        .expect("expected valid cli args");

    assert!(!cli.json_logs);
    assert!(matches!(
        cli.command,
        Commands::Extract { ref urls, no_retry: false } if urls == &["https://www.amazon.com/dp/B0C1"]
    ));
}

#[test]
fn parses_extract_no_retry_and_global_json_logs() {
    let cli = Cli::try_parse_from([
        "pricescout",
        "extract",
        "https://shop.example/p/1",
        "--no-retry",
        "--json-logs",
    ])
    .expect("expected valid cli args");

    assert!(cli.json_logs);
    assert!(matches!(cli.command, Commands::Extract { no_retry: true, .. }));
}

#[test]
fn parses_multiple_extract_urls() {
    let cli = Cli::try_parse_from([
        "pricescout",
        "extract",
        "https://shop.example/p/1",
        "https://shop.example/p/2",
    ])
    .expect("expected valid cli args");

    assert!(matches!(cli.command, Commands::Extract { ref urls, .. } if urls.len() == 2));
}

#[test]
fn parses_supported_command() {
    let cli = Cli::try_parse_from(["pricescout", "supported", "https://target.com/p/1"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Supported { .. }));
}

#[test]
fn parses_stores_command() {
    let cli = Cli::try_parse_from(["pricescout", "stores"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Stores));
}

#[test]
fn extract_requires_url() {
    assert!(Cli::try_parse_from(["pricescout", "extract"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["pricescout"]).is_err());
}
