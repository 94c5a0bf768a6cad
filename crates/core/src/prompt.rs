//! Prompt text for the LLM.
//!
//! Prompts carry a bounded view of the summary: top makes and regions only,
//! at most three sample rows.

use std::fmt::Write as _;

use crate::aggregate::project_totals;
use crate::format::{money, money_opt, thousands};
use crate::model::{SalesRecord, SalesSummary};

const MAX_LISTED: usize = 10;
const MAX_SAMPLE_ROWS: usize = 3;
pub const PROJECTION_YEARS: u32 = 3;

/// Prompt asking for a multi-year sales projection.
pub fn projection_prompt(summary: &SalesSummary) -> String {
    let mut p = String::new();
    let _ = writeln!(p, "Generate a detailed {PROJECTION_YEARS}-year car sales projection based on:");
    let _ = writeln!(p, "- Historical average yearly growth rate: {}", summary.average_growth);
    let _ = writeln!(p, "- Units sold by year: {}", years_line(summary));

    let baseline = project_totals(summary, PROJECTION_YEARS);
    if !baseline.is_empty() {
        let listed: Vec<String> = baseline
            .iter()
            .map(|(year, units)| format!("{year}: {}", thousands(*units)))
            .collect();
        let _ = writeln!(p, "- Baseline compounded projection: {}", listed.join(", "));
    }

    p.push('\n');
    write_context(&mut p, summary);

    p.push_str(
        "\nInclude:\n\
         1. Total projected sales by year\n\
         2. Breakdown by make/model\n\
         3. Regional projections\n\n\
         Format the response as:\n\
         3-Year Projection\n\
         ------------------------\n\
         [content]\n",
    );
    p
}

/// Prompt answering a free-form question with summary context.
pub fn question_prompt(question: &str, summary: &SalesSummary, records: &[SalesRecord]) -> String {
    let mut p = String::new();
    let _ = writeln!(p, "Answer this car sales question: {}", question.trim());
    p.push('\n');
    write_context(&mut p, summary);

    if !records.is_empty() {
        p.push_str("\nSample records (Year,Make,Model,Quantity,Region,Price):\n");
        for r in records.iter().take(MAX_SAMPLE_ROWS) {
            let _ = writeln!(
                p,
                "{},{},{},{},{},{}",
                r.year,
                r.make,
                r.model,
                r.quantity,
                r.region,
                money(r.price_cents)
            );
        }
    }

    p.push_str("\nBe accurate and concise. Base the answer on the data above.\n");
    p
}

fn years_line(summary: &SalesSummary) -> String {
    if summary.by_year.is_empty() {
        return "none".to_string();
    }
    summary
        .by_year
        .iter()
        .map(|(year, t)| format!("{year}: {}", thousands(t.quantity)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_context(p: &mut String, summary: &SalesSummary) {
    p.push_str("Context:\n");
    let _ = writeln!(p, "- Total units sold: {}", thousands(summary.total_quantity));
    let _ = writeln!(p, "- Total revenue: {}", money(summary.total_revenue_cents));
    let _ = writeln!(p, "- Average price: {}", money_opt(summary.average_price_cents));
    if let Some(top) = &summary.top_make_model {
        let _ = writeln!(p, "- Top make/model: {top}");
    }
    if let Some((first, last)) = summary.years_covered {
        let _ = writeln!(p, "- Years covered: {first} to {last}");
    }
    let _ = writeln!(p, "- Units sold by year: {}", years_line(summary));

    let mut makes: Vec<(&String, u64)> = summary
        .by_make
        .iter()
        .map(|(make, years)| (make, years.values().sum()))
        .collect();
    makes.sort_by(|a, b| b.1.cmp(&a.1));
    if !makes.is_empty() {
        let listed: Vec<String> = makes
            .iter()
            .take(MAX_LISTED)
            .map(|(make, q)| format!("{make} {}", thousands(*q)))
            .collect();
        let _ = writeln!(p, "- Units by make: {}", listed.join(", "));
    }

    let mut regions: Vec<(&String, u64)> = summary
        .by_region
        .iter()
        .map(|(region, t)| (region, t.quantity))
        .collect();
    regions.sort_by(|a, b| b.1.cmp(&a.1));
    if !regions.is_empty() {
        let listed: Vec<String> = regions
            .iter()
            .take(MAX_LISTED)
            .map(|(region, q)| format!("{region} {}", thousands(*q)))
            .collect();
        let _ = writeln!(p, "- Units by region: {}", listed.join(", "));
    }
}
