use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Growth, GrowthEntry, SalesRecord, SalesSummary, Totals};

/// Compute the summary for a set of records. Pure; empty input gives an
/// all-zero summary with no price statistics.
pub fn summarize(records: &[SalesRecord]) -> SalesSummary {
    let mut total = Totals::default();
    let mut by_region: BTreeMap<String, Totals> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, Totals> = BTreeMap::new();
    let mut by_make: BTreeMap<String, BTreeMap<i32, u64>> = BTreeMap::new();
    let mut by_region_year: BTreeMap<String, BTreeMap<i32, u64>> = BTreeMap::new();
    let mut by_make_model: BTreeMap<(String, String), u64> = BTreeMap::new();
    let mut models: BTreeSet<&str> = BTreeSet::new();

    for record in records {
        total.add(record);
        by_region.entry(record.region.clone()).or_default().add(record);
        by_year.entry(record.year).or_default().add(record);
        bump(
            by_make.entry(record.make.clone()).or_default().entry(record.year).or_default(),
            record.quantity,
        );
        bump(
            by_region_year.entry(record.region.clone()).or_default().entry(record.year).or_default(),
            record.quantity,
        );
        bump(
            by_make_model.entry((record.make.clone(), record.model.clone())).or_default(),
            record.quantity,
        );
        models.insert(record.model.as_str());
    }

    let mut prices: Vec<u64> = records.iter().map(|r| r.price_cents).collect();
    prices.sort_unstable();

    let years: Vec<i32> = by_year.keys().copied().collect();

    let yearly_growth: Vec<GrowthEntry> = years
        .windows(2)
        .map(|w| {
            let prior_quantity = by_year[&w[0]].quantity;
            let quantity = by_year[&w[1]].quantity;
            GrowthEntry {
                region: None,
                prior_year: w[0],
                year: w[1],
                prior_quantity,
                quantity,
                growth: Growth::between(prior_quantity, quantity),
            }
        })
        .collect();

    let mut region_growth = Vec::new();
    for (region, per_year) in &by_region_year {
        for w in years.windows(2) {
            let prior_quantity = per_year.get(&w[0]).copied().unwrap_or(0);
            let quantity = per_year.get(&w[1]).copied().unwrap_or(0);
            region_growth.push(GrowthEntry {
                region: Some(region.clone()),
                prior_year: w[0],
                year: w[1],
                prior_quantity,
                quantity,
                growth: Growth::between(prior_quantity, quantity),
            });
        }
    }

    let defined: Vec<f64> = yearly_growth.iter().filter_map(|g| g.growth.rate()).collect();
    let average_growth = if defined.is_empty() {
        Growth::NotApplicable
    } else {
        Growth::Rate(defined.iter().sum::<f64>() / defined.len() as f64)
    };

    SalesSummary {
        record_count: records.len(),
        total_quantity: total.quantity,
        total_revenue_cents: total.revenue_cents,
        average_price_cents: mean(&prices),
        min_price_cents: prices.first().copied(),
        max_price_cents: prices.last().copied(),
        median_price_cents: median(&prices),
        top_make_model: top_key(by_make_model.iter().map(|((make, model), q)| (format!("{make} {model}"), *q))),
        top_region: top_key(by_region.iter().map(|(region, t)| (region.clone(), t.quantity))),
        years_covered: years.first().zip(years.last()).map(|(a, b)| (*a, *b)),
        unique_models: models.len(),
        by_region,
        by_year,
        by_make,
        by_region_year,
        yearly_growth,
        region_growth,
        average_growth,
    }
}

/// Baseline projection of total units for the `years` following the last
/// year in the data, compounding the average yearly growth. Flat when growth
/// is undefined.
pub fn project_totals(summary: &SalesSummary, years: u32) -> Vec<(i32, u64)> {
    let Some((last_year, last_quantity)) = summary.last_year() else {
        return Vec::new();
    };
    let rate = summary.average_growth.rate().unwrap_or(0.0);

    (1..=years)
        .map(|k| {
            let projected = last_quantity as f64 * (1.0 + rate).powi(k as i32);
            (last_year + k as i32, projected.max(0.0).round() as u64)
        })
        .collect()
}

/// Saturating so hand-built records cannot panic; loaded files never reach the cap.
fn bump(slot: &mut u64, quantity: u64) {
    *slot = slot.saturating_add(quantity);
}

fn mean(sorted: &[u64]) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    let sum: u128 = sorted.iter().map(|&p| p as u128).sum();
    Some((sum / sorted.len() as u128) as u64)
}

fn median(sorted: &[u64]) -> Option<u64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        let (a, b) = (sorted[n / 2 - 1], sorted[n / 2]);
        Some(a / 2 + b / 2 + (a % 2 + b % 2) / 2)
    }
}

/// Largest value wins; ties keep the first key seen (inputs iterate in key order).
fn top_key(entries: impl Iterator<Item = (String, u64)>) -> Option<String> {
    let mut best: Option<(String, u64)> = None;
    for (key, value) in entries {
        let better = match &best {
            Some((_, best_value)) => value > *best_value,
            None => true,
        };
        if better {
            best = Some((key, value));
        }
    }
    best.map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, make: &str, model: &str, quantity: u64, region: &str, price: u64) -> SalesRecord {
        SalesRecord {
            year,
            make: make.into(),
            model: model.into(),
            quantity,
            region: region.into(),
            price_cents: price * 100,
        }
    }

    #[test]
    fn north_growth_example() {
        let records = vec![
            rec(2023, "Toyota", "Camry", 15000, "North", 25000),
            rec(2024, "Toyota", "Camry", 18000, "North", 25000),
        ];
        let summary = summarize(&records);
        let entry = summary.growth_for("North", 2024).unwrap();
        assert_eq!(entry.prior_year, 2023);
        assert_eq!(entry.prior_quantity, 15000);
        assert_eq!(entry.quantity, 18000);
        let rate = entry.growth.rate().unwrap();
        assert!((rate - 0.2).abs() < 1e-12);
        assert_eq!(entry.growth.to_string(), "20.0%");
    }

    #[test]
    fn region_totals_sum_to_overall_total() {
        let records = vec![
            rec(2022, "Ford", "F-150", 700, "West", 30000),
            rec(2022, "Honda", "Civic", 1200, "South", 22000),
            rec(2023, "Ford", "F-150", 650, "West", 31000),
            rec(2023, "Toyota", "Camry", 900, "North", 25000),
            rec(2024, "Toyota", "RAV4", 1100, "East", 28000),
        ];
        let summary = summarize(&records);
        let region_qty: u64 = summary.by_region.values().map(|t| t.quantity).sum();
        let region_rev: u64 = summary.by_region.values().map(|t| t.revenue_cents).sum();
        assert_eq!(region_qty, summary.total_quantity);
        assert_eq!(region_rev, summary.total_revenue_cents);
        assert_eq!(summary.total_quantity, 4550);
        let year_qty: u64 = summary.by_year.values().map(|t| t.quantity).sum();
        assert_eq!(year_qty, summary.total_quantity);
    }

    #[test]
    fn zero_prior_total_is_not_applicable() {
        let records = vec![
            rec(2023, "Toyota", "Camry", 100, "North", 25000),
            rec(2024, "Toyota", "Camry", 120, "North", 25000),
            rec(2024, "Honda", "Civic", 80, "South", 22000),
        ];
        let summary = summarize(&records);
        let south = summary.growth_for("South", 2024).unwrap();
        assert_eq!(south.prior_quantity, 0);
        assert_eq!(south.growth, Growth::NotApplicable);
        assert_eq!(south.growth.to_string(), "n/a");
    }

    #[test]
    fn region_disappearing_is_minus_one_hundred_percent() {
        let records = vec![
            rec(2023, "Honda", "Civic", 80, "South", 22000),
            rec(2024, "Toyota", "Camry", 120, "North", 25000),
        ];
        let summary = summarize(&records);
        let south = summary.growth_for("South", 2024).unwrap();
        assert_eq!(south.growth, Growth::Rate(-1.0));
    }

    #[test]
    fn prior_year_is_previous_year_in_data() {
        let records = vec![
            rec(2020, "Ford", "Focus", 100, "West", 18000),
            rec(2022, "Ford", "Focus", 150, "West", 18000),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.yearly_growth.len(), 1);
        assert_eq!(summary.yearly_growth[0].prior_year, 2020);
        assert_eq!(summary.yearly_growth[0].growth, Growth::Rate(0.5));
    }

    #[test]
    fn average_growth_is_mean_of_yearly_rates() {
        let records = vec![
            rec(2021, "Ford", "Focus", 100, "West", 18000),
            rec(2022, "Ford", "Focus", 150, "West", 18000),
            rec(2023, "Ford", "Focus", 120, "West", 18000),
        ];
        let summary = summarize(&records);
        // (+50% + -20%) / 2
        let avg = summary.average_growth.rate().unwrap();
        assert!((avg - 0.15).abs() < 1e-12);
    }

    #[test]
    fn price_statistics() {
        let records = vec![
            rec(2023, "A", "x", 1, "N", 10000),
            rec(2023, "B", "y", 1, "N", 30000),
            rec(2023, "C", "z", 1, "N", 20000),
            rec(2023, "D", "w", 1, "N", 40000),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.min_price_cents, Some(1_000_000));
        assert_eq!(summary.max_price_cents, Some(4_000_000));
        assert_eq!(summary.median_price_cents, Some(2_500_000));
        assert_eq!(summary.average_price_cents, Some(2_500_000));
    }

    #[test]
    fn top_entries_and_metadata() {
        let records = vec![
            rec(2022, "Ford", "F-150", 700, "West", 30000),
            rec(2023, "Ford", "F-150", 650, "West", 31000),
            rec(2023, "Toyota", "Camry", 900, "North", 25000),
            rec(2024, "Toyota", "Camry", 100, "North", 25000),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.top_make_model.as_deref(), Some("Ford F-150"));
        assert_eq!(summary.top_region.as_deref(), Some("West"));
        assert_eq!(summary.years_covered, Some((2022, 2024)));
        assert_eq!(summary.unique_models, 2);
        assert_eq!(summary.by_make["Toyota"][&2023], 900);
        assert_eq!(summary.by_region_year["West"][&2022], 700);
    }

    #[test]
    fn ties_resolve_to_smallest_key() {
        let records = vec![
            rec(2023, "Toyota", "Camry", 100, "North", 25000),
            rec(2023, "Honda", "Civic", 100, "East", 22000),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.top_make_model.as_deref(), Some("Honda Civic"));
        assert_eq!(summary.top_region.as_deref(), Some("East"));
    }

    #[test]
    fn empty_input() {
        let summary = summarize(&[]);
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.total_quantity, 0);
        assert!(summary.average_price_cents.is_none());
        assert!(summary.median_price_cents.is_none());
        assert!(summary.top_region.is_none());
        assert!(summary.years_covered.is_none());
        assert_eq!(summary.average_growth, Growth::NotApplicable);
        assert!(project_totals(&summary, 3).is_empty());
    }

    #[test]
    fn huge_quantities_do_not_overflow() {
        let big = 10_000_000_000_000_000_000;
        let records = vec![
            rec(2023, "Toyota", "Camry", big, "North", 0),
            rec(2024, "Toyota", "Camry", big, "North", 0),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_quantity, u64::MAX);
        assert_eq!(summary.by_region["North"].quantity, u64::MAX);
        assert_eq!(summary.top_make_model.as_deref(), Some("Toyota Camry"));
    }

    #[test]
    fn median_of_large_prices_does_not_overflow() {
        let high = u64::MAX - 1;
        assert_eq!(median(&[high, u64::MAX]), Some(u64::MAX - 1));
        assert_eq!(median(&[3, 5]), Some(4));
        assert_eq!(median(&[3, 4]), Some(3));
    }

    #[test]
    fn projection_compounds_average_growth() {
        let records = vec![
            rec(2023, "Toyota", "Camry", 1000, "North", 25000),
            rec(2024, "Toyota", "Camry", 1100, "North", 25000),
        ];
        let summary = summarize(&records);
        let projection = project_totals(&summary, 3);
        assert_eq!(projection, vec![(2025, 1210), (2026, 1331), (2027, 1464)]);
    }

    #[test]
    fn projection_is_flat_without_growth() {
        let records = vec![rec(2024, "Toyota", "Camry", 500, "North", 25000)];
        let summary = summarize(&records);
        assert_eq!(project_totals(&summary, 2), vec![(2025, 500), (2026, 500)]);
    }
}
