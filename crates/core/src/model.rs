use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of the sales CSV. Prices are held in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRecord {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub quantity: u64,
    pub region: String,
    pub price_cents: u64,
}

impl SalesRecord {
    pub fn revenue_cents(&self) -> u64 {
        self.quantity.saturating_mul(self.price_cents)
    }

    /// "Make Model" label used for rankings and top-seller reporting.
    pub fn label(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

/// Year-over-year growth ratio. Undefined when the prior total is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Growth {
    Rate(f64),
    NotApplicable,
}

impl Growth {
    pub fn between(prior: u64, current: u64) -> Self {
        if prior == 0 {
            return Growth::NotApplicable;
        }
        Growth::Rate((current as f64 - prior as f64) / prior as f64)
    }

    pub fn rate(&self) -> Option<f64> {
        match self {
            Growth::Rate(r) => Some(*r),
            Growth::NotApplicable => None,
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::Rate(r) => write!(f, "{:.1}%", r * 100.0),
            Growth::NotApplicable => write!(f, "n/a"),
        }
    }
}

impl Serialize for Growth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Growth::Rate(r) => serializer.serialize_f64(*r),
            Growth::NotApplicable => serializer.serialize_str("n/a"),
        }
    }
}

/// Growth of one year against the previous year present in the data.
/// `region` is `None` for dataset-wide entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub prior_year: i32,
    pub year: i32,
    pub prior_quantity: u64,
    pub quantity: u64,
    pub growth: Growth,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub quantity: u64,
    pub revenue_cents: u64,
}

impl Totals {
    pub(crate) fn add(&mut self, record: &SalesRecord) {
        self.quantity = self.quantity.saturating_add(record.quantity);
        self.revenue_cents = self.revenue_cents.saturating_add(record.revenue_cents());
    }
}

/// Aggregate statistics over a set of records. Recomputed each run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub record_count: usize,
    pub total_quantity: u64,
    pub total_revenue_cents: u64,
    pub average_price_cents: Option<u64>,
    pub min_price_cents: Option<u64>,
    pub max_price_cents: Option<u64>,
    pub median_price_cents: Option<u64>,
    pub top_make_model: Option<String>,
    pub top_region: Option<String>,
    pub years_covered: Option<(i32, i32)>,
    pub unique_models: usize,
    pub by_region: BTreeMap<String, Totals>,
    pub by_year: BTreeMap<i32, Totals>,
    pub by_make: BTreeMap<String, BTreeMap<i32, u64>>,
    pub by_region_year: BTreeMap<String, BTreeMap<i32, u64>>,
    pub yearly_growth: Vec<GrowthEntry>,
    pub region_growth: Vec<GrowthEntry>,
    pub average_growth: Growth,
}

impl SalesSummary {
    /// Growth entry for `region` in `year`, if `year` has a predecessor.
    pub fn growth_for(&self, region: &str, year: i32) -> Option<&GrowthEntry> {
        self.region_growth
            .iter()
            .find(|g| g.year == year && g.region.as_deref() == Some(region))
    }

    pub fn last_year(&self) -> Option<(i32, u64)> {
        self.by_year
            .iter()
            .next_back()
            .map(|(year, totals)| (*year, totals.quantity))
    }
}
