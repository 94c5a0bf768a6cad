// Human-readable and JSON rendering for summary, trends and audit output

use std::fmt::Write as _;

use autosales_core::format::{money, money_opt, thousands, units};
use autosales_core::prompt::PROJECTION_YEARS;
use autosales_core::{project_totals, SalesSummary};
use autosales_llm::{Outcome, VerificationRecord};
use serde_json::json;

use crate::util::{column_width, pad_left, pad_right};

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));
}

pub(crate) fn summary_text(summary: &SalesSummary) -> String {
    let mut out = String::new();
    heading(&mut out, "Sales Summary");

    let years = match summary.years_covered {
        Some((first, last)) if first == last => first.to_string(),
        Some((first, last)) => format!("{first}-{last}"),
        None => "n/a".to_string(),
    };
    let rows = [
        ("Records", thousands(summary.record_count as u64)),
        ("Years covered", years),
        ("Total units sold", units(summary.total_quantity)),
        ("Total revenue", money(summary.total_revenue_cents)),
        ("Average price", money_opt(summary.average_price_cents)),
        ("Median price", money_opt(summary.median_price_cents)),
        ("Price range", match (summary.min_price_cents, summary.max_price_cents) {
            (Some(min), Some(max)) => format!("{} - {}", money(min), money(max)),
            _ => "n/a".to_string(),
        }),
        ("Top make/model", summary.top_make_model.clone().unwrap_or_else(|| "n/a".into())),
        ("Top region", summary.top_region.clone().unwrap_or_else(|| "n/a".into())),
        ("Unique models", summary.unique_models.to_string()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {} {value}", pad_right(&format!("{label}:"), 18));
    }

    if !summary.by_region.is_empty() {
        out.push_str("\n  By region:\n");
        let name_w = column_width(summary.by_region.keys().map(String::as_str), 6);
        let qty: Vec<String> = summary.by_region.values().map(|t| thousands(t.quantity)).collect();
        let qty_w = column_width(qty.iter().map(String::as_str), 5);
        for ((region, totals), qty) in summary.by_region.iter().zip(&qty) {
            let _ = writeln!(
                out,
                "    {}  {} units  {}",
                pad_right(region, name_w),
                pad_left(qty, qty_w),
                money(totals.revenue_cents)
            );
        }
    }
    out
}

pub(crate) fn trends_text(summary: &SalesSummary) -> String {
    let mut out = String::new();
    heading(&mut out, "Yearly Trends");

    if summary.by_year.is_empty() {
        out.push_str("  No sales data.\n");
        return out;
    }

    let qty: Vec<String> = summary.by_year.values().map(|t| thousands(t.quantity)).collect();
    let qty_w = column_width(qty.iter().map(String::as_str), "Units Sold".len());
    let _ = writeln!(out, "  Year │ {} │ Growth", pad_left("Units Sold", qty_w));
    let _ = writeln!(out, "  ─────┼─{}─┼───────", "─".repeat(qty_w));
    for ((year, _), qty) in summary.by_year.iter().zip(&qty) {
        let growth = summary
            .yearly_growth
            .iter()
            .find(|g| g.year == *year)
            .map(|g| g.growth.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "  {year} │ {} │ {growth}", pad_left(qty, qty_w));
    }
    let _ = writeln!(out, "\n  Average yearly growth: {}", summary.average_growth);

    let baseline = project_totals(summary, PROJECTION_YEARS);
    if !baseline.is_empty() {
        let listed: Vec<String> = baseline
            .iter()
            .map(|(year, n)| format!("{year}: {}", thousands(*n)))
            .collect();
        let _ = writeln!(out, "  Baseline projection:   {}", listed.join(", "));
    }

    out.push_str("\n  Breakdown by make:\n");
    for (make, years) in &summary.by_make {
        let _ = writeln!(out, "  - {make}:");
        for (year, n) in years {
            let _ = writeln!(out, "      {year}: {}", thousands(*n));
        }
    }

    if !summary.region_growth.is_empty() {
        out.push_str("\n  Regional growth:\n");
        let name_w = column_width(
            summary.region_growth.iter().filter_map(|g| g.region.as_deref()),
            6,
        );
        for g in &summary.region_growth {
            let region = g.region.as_deref().unwrap_or("-");
            let _ = writeln!(
                out,
                "    {}  {}→{}  {}",
                pad_right(region, name_w),
                g.prior_year,
                g.year,
                g.growth
            );
        }
    }
    out
}

pub(crate) fn trends_json(summary: &SalesSummary) -> serde_json::Value {
    let baseline: Vec<_> = project_totals(summary, PROJECTION_YEARS)
        .into_iter()
        .map(|(year, quantity)| json!({ "year": year, "quantity": quantity }))
        .collect();
    json!({
        "by_year": summary.by_year,
        "by_make": summary.by_make,
        "yearly_growth": summary.yearly_growth,
        "average_growth": summary.average_growth,
        "region_growth": summary.region_growth,
        "baseline_projection": baseline,
    })
}

pub(crate) struct OutcomeCounts {
    pub success: usize,
    pub failure: usize,
}

pub(crate) fn count_outcomes(records: &[VerificationRecord]) -> OutcomeCounts {
    let success = records.iter().filter(|r| r.outcome() == Outcome::Success).count();
    OutcomeCounts { success, failure: records.len() - success }
}

fn short_hash(hash: &str) -> String {
    match hash.strip_prefix("sha256:") {
        Some(hex) => format!("sha256:{}", &hex[..hex.len().min(12)]),
        None if hash.is_empty() => "-".to_string(),
        None => hash.to_string(),
    }
}

/// `shown` is the tail being listed; `counts` covers the whole log.
pub(crate) fn audit_text(shown: &[VerificationRecord], counts: &OutcomeCounts) -> String {
    let mut out = String::new();
    let total = counts.success + counts.failure;
    let _ = writeln!(
        out,
        "{total} record(s): {} success, {} failure",
        counts.success, counts.failure
    );
    if shown.is_empty() {
        return out;
    }

    let model_w = column_width(shown.iter().map(|r| r.model_id()), 5);
    out.push('\n');
    let _ = writeln!(
        out,
        "{}  {}  {}  {}  {}  {}  {}",
        pad_right("TIME (UTC)", 20),
        pad_right("CALL", 6),
        pad_right("OUTCOME", 7),
        pad_right("MODEL", model_w),
        pad_left("MS", 6),
        pad_right("REQUEST", 19),
        "RESPONSE"
    );
    for r in shown {
        let _ = writeln!(
            out,
            "{}  {}  {}  {}  {}  {}  {}",
            pad_right(&r.timestamp().format("%Y-%m-%d %H:%M:%S").to_string(), 20),
            pad_right(&r.call_id().to_string(), 6),
            pad_right(r.outcome().as_str(), 7),
            pad_right(r.model_id(), model_w),
            pad_left(&r.latency_ms().to_string(), 6),
            pad_right(&short_hash(r.request_hash()), 19),
            short_hash(r.response_hash())
        );
        if let Some(err) = r.error() {
            let _ = writeln!(out, "    error: {err}");
        }
    }
    out
}

pub(crate) fn audit_json(shown: &[VerificationRecord], counts: &OutcomeCounts) -> serde_json::Value {
    json!({
        "total": counts.success + counts.failure,
        "success": counts.success,
        "failure": counts.failure,
        "records": shown,
    })
}
