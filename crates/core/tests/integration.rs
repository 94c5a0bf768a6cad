use std::path::PathBuf;

use autosales_core::model::Growth;
use autosales_core::query::{answer_locally, classify, QueryKind};
use autosales_core::{load_csv_file, summarize, FormatError, LoadError};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn loads_fixture_and_summarizes() {
    let records = load_csv_file(&fixtures_dir().join("car_sales.csv")).unwrap();
    assert_eq!(records.len(), 12);

    let summary = summarize(&records);
    assert_eq!(summary.total_quantity, 123_500);
    assert_eq!(summary.by_year[&2022].quantity, 34_000);
    assert_eq!(summary.by_year[&2023].quantity, 39_500);
    assert_eq!(summary.by_year[&2024].quantity, 50_000);
    assert_eq!(summary.top_region.as_deref(), Some("North"));
    assert_eq!(summary.top_make_model.as_deref(), Some("Toyota Camry"));
    assert_eq!(summary.unique_models, 5);
    assert_eq!(summary.years_covered, Some((2022, 2024)));
}

#[test]
fn region_totals_sum_to_overall_total() {
    let records = load_csv_file(&fixtures_dir().join("car_sales.csv")).unwrap();
    let summary = summarize(&records);

    let qty: u64 = summary.by_region.values().map(|t| t.quantity).sum();
    let rev: u64 = summary.by_region.values().map(|t| t.revenue_cents).sum();
    assert_eq!(qty, summary.total_quantity);
    assert_eq!(rev, summary.total_revenue_cents);
}

#[test]
fn region_growth_from_fixture() {
    let records = load_csv_file(&fixtures_dir().join("car_sales.csv")).unwrap();
    let summary = summarize(&records);

    let north = summary.growth_for("North", 2024).unwrap();
    assert_eq!(north.growth.to_string(), "20.0%");

    // East first appears in 2024.
    let east = summary.growth_for("East", 2024).unwrap();
    assert_eq!(east.growth, Growth::NotApplicable);

    // 2022 has no predecessor, so no entry.
    assert!(summary.growth_for("North", 2022).is_none());
}

#[test]
fn missing_price_column_fails_with_format_error() {
    let err = load_csv_file(&fixtures_dir().join("missing_price.csv")).unwrap_err();
    match err {
        LoadError::Format(FormatError::MissingColumn { column }) => assert_eq!(column, "Price"),
        other => panic!("expected missing Price column, got {other}"),
    }
}

#[test]
fn summary_serializes_growth_as_number_or_na() {
    let records = load_csv_file(&fixtures_dir().join("car_sales.csv")).unwrap();
    let summary = summarize(&records);
    let json = serde_json::to_value(&summary).unwrap();

    let east = json["region_growth"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["region"] == "East" && g["year"] == 2024)
        .unwrap();
    assert_eq!(east["growth"], "n/a");

    let north = json["region_growth"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["region"] == "North" && g["year"] == 2024)
        .unwrap();
    assert!((north["growth"].as_f64().unwrap() - 0.2).abs() < 1e-12);
    assert_eq!(json["by_year"]["2024"]["quantity"], 50_000);
}

#[test]
fn comparison_against_fixture() {
    let records = load_csv_file(&fixtures_dir().join("car_sales.csv")).unwrap();
    let summary = summarize(&records);
    let kind = classify("compare Ford versus Tesla", &summary);
    assert_eq!(kind, QueryKind::Comparison(vec!["Ford".into(), "Tesla".into()]));
    let answer = answer_locally(&kind, &records, &summary).unwrap();
    assert!(answer.contains("- Ford: 28,500 units sold"));
    assert!(answer.contains("- Tesla: 7,500 units sold, $40,500.00 avg price"));
}
