//! Question routing.
//!
//! Structured questions (rankings, make comparisons, growth) are answered
//! straight from the data. Projections and anything else go to the LLM.

use std::collections::BTreeMap;

use crate::format::{money, thousands, units};
use crate::model::{SalesRecord, SalesSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    Quantity,
    Price,
    Revenue,
}

impl RankMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankMetric::Quantity => "quantity",
            RankMetric::Price => "price",
            RankMetric::Revenue => "revenue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranking {
    pub n: usize,
    pub metric: RankMetric,
    pub worst: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    Projection,
    /// Makes named in the question, in order of appearance.
    Comparison(Vec<String>),
    Ranking(Ranking),
    Growth,
    General,
}

impl QueryKind {
    pub fn needs_llm(&self) -> bool {
        matches!(self, QueryKind::Projection | QueryKind::General)
    }
}

const DEFAULT_RANK_COUNT: usize = 3;

/// Classify a question. Rules are tried in order: projection, comparison,
/// ranking, growth, general.
pub fn classify(question: &str, summary: &SalesSummary) -> QueryKind {
    let lower = question.to_lowercase();
    let words = tokens(&lower);
    let has = |candidates: &[&str]| words.iter().any(|w| candidates.contains(w));

    if has(&["projection", "projections", "project", "forecast", "forecasts", "predict", "prediction"]) {
        return QueryKind::Projection;
    }

    if has(&["compare", "comparison", "vs", "versus"]) {
        let mut found: Vec<(usize, String)> = summary
            .by_make
            .keys()
            .filter_map(|make| {
                let make_lower = make.to_lowercase();
                let needle = tokens(&make_lower);
                if needle.is_empty() {
                    return None;
                }
                words
                    .windows(needle.len())
                    .position(|w| w == needle.as_slice())
                    .map(|pos| (pos, make.clone()))
            })
            .collect();
        found.sort();
        return QueryKind::Comparison(found.into_iter().map(|(_, make)| make).collect());
    }

    if has(&["top", "best", "worst", "ranking", "rank"]) {
        let n = words
            .iter()
            .position(|w| *w == "top")
            .and_then(|i| words.get(i + 1))
            .and_then(|w| w.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_RANK_COUNT);
        let metric = if has(&["expensive", "price", "priced", "prices"]) {
            RankMetric::Price
        } else if has(&["revenue"]) {
            RankMetric::Revenue
        } else {
            RankMetric::Quantity
        };
        return QueryKind::Ranking(Ranking { n, metric, worst: has(&["worst"]) });
    }

    if has(&["growth", "grow", "growing"]) {
        return QueryKind::Growth;
    }

    QueryKind::General
}

fn tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect()
}

/// Answer a structured question from the data. `None` means the question
/// needs the LLM.
pub fn answer_locally(kind: &QueryKind, records: &[SalesRecord], summary: &SalesSummary) -> Option<String> {
    match kind {
        QueryKind::Comparison(makes) => Some(compare_makes(makes, records)),
        QueryKind::Ranking(ranking) => Some(rank(ranking, records)),
        QueryKind::Growth => Some(format!("Average yearly growth: {}", summary.average_growth)),
        QueryKind::Projection | QueryKind::General => None,
    }
}

fn compare_makes(makes: &[String], records: &[SalesRecord]) -> String {
    if makes.len() < 2 {
        return "Could not identify two makes to compare".to_string();
    }

    let mut lines = vec![format!("Comparison: {}", makes.join(" vs "))];
    for make in makes {
        let rows: Vec<&SalesRecord> = records
            .iter()
            .filter(|r| r.make.eq_ignore_ascii_case(make))
            .collect();
        let total = rows.iter().fold(0u64, |acc, r| acc.saturating_add(r.quantity));
        let avg_price = if rows.is_empty() {
            0
        } else {
            rows.iter().fold(0u64, |acc, r| acc.saturating_add(r.price_cents)) / rows.len() as u64
        };
        lines.push(format!(
            "- {make}: {} sold, {} avg price",
            units(total),
            money(avg_price)
        ));
    }
    lines.join("\n")
}

#[derive(Default)]
struct ModelStats {
    quantity: u64,
    revenue_cents: u64,
    price_sum_cents: u64,
    rows: u64,
}

impl ModelStats {
    fn value(&self, metric: RankMetric) -> u64 {
        match metric {
            RankMetric::Quantity => self.quantity,
            RankMetric::Revenue => self.revenue_cents,
            RankMetric::Price => self.price_sum_cents / self.rows.max(1),
        }
    }
}

fn rank(ranking: &Ranking, records: &[SalesRecord]) -> String {
    let mut groups: BTreeMap<String, ModelStats> = BTreeMap::new();
    for record in records {
        let stats = groups.entry(record.label()).or_default();
        stats.quantity = stats.quantity.saturating_add(record.quantity);
        stats.revenue_cents = stats.revenue_cents.saturating_add(record.revenue_cents());
        stats.price_sum_cents = stats.price_sum_cents.saturating_add(record.price_cents);
        stats.rows += 1;
    }

    let mut ranked: Vec<(String, u64)> = groups
        .into_iter()
        .map(|(label, stats)| {
            let value = stats.value(ranking.metric);
            (label, value)
        })
        .collect();
    // Stable sort keeps label order among equal values.
    if ranking.worst {
        ranked.sort_by(|a, b| a.1.cmp(&b.1));
    } else {
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
    }
    ranked.truncate(ranking.n);

    let title = if ranking.worst { "Worst" } else { "Top" };
    let mut lines = vec![format!("{title} {} by {}:", ranking.n, ranking.metric.as_str())];
    for (label, value) in ranked {
        let shown = match ranking.metric {
            RankMetric::Quantity => format!("{} units", thousands(value)),
            RankMetric::Price | RankMetric::Revenue => money(value),
        };
        lines.push(format!("- {label}: {shown}"));
    }
    lines.join("\n")
}
