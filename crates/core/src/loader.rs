//! Sales CSV loading.
//!
//! Expected header: `Year,Make,Model,Quantity,Region,Price`. Column order is
//! free and extra columns are ignored. Records come back in file order.
//!
//! A file is rejected when its total quantity, total price or total revenue
//! would not fit in a `u64`, so every aggregate over its records fits too.

use std::path::Path;

use log::{debug, warn};

use crate::error::{FormatError, LoadError};
use crate::model::SalesRecord;

pub const REQUIRED_COLUMNS: [&str; 6] = ["Year", "Make", "Model", "Quantity", "Region", "Price"];

/// Read and parse a sales CSV from disk.
pub fn load_csv_file(path: &Path) -> Result<Vec<SalesRecord>, LoadError> {
    if path.extension().and_then(|e| e.to_str()) != Some("csv") {
        warn!("{} does not have a .csv extension; parsing as CSV anyway", path.display());
    }

    let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_csv(&data)?;
    debug!("loaded {} sales records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse sales CSV text.
pub fn parse_csv(csv_data: &str) -> Result<Vec<SalesRecord>, FormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| FormatError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, FormatError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FormatError::MissingColumn { column: name.into() })
    };

    let year_idx = idx("Year")?;
    let make_idx = idx("Make")?;
    let model_idx = idx("Model")?;
    let quantity_idx = idx("Quantity")?;
    let region_idx = idx("Region")?;
    let price_idx = idx("Price")?;

    let mut rows = Vec::new();
    let mut totals = FileTotals::default();

    for record in reader.records() {
        let record = record.map_err(|e| FormatError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| record.get(i).unwrap_or("");

        let year_str = field(year_idx);
        let year: i32 = year_str.parse().map_err(|_| FormatError::InvalidNumber {
            line,
            column: "Year".into(),
            value: year_str.into(),
        })?;

        let quantity = parse_quantity(field(quantity_idx), line)?;
        let price_cents = parse_price_cents(field(price_idx), line)?;
        totals.add(quantity, price_cents).map_err(|column| {
            let raw = if column == "Quantity" { field(quantity_idx) } else { field(price_idx) };
            FormatError::OutOfRange {
                line,
                column: column.into(),
                value: raw.into(),
            }
        })?;

        rows.push(SalesRecord {
            year,
            make: field(make_idx).to_string(),
            model: field(model_idx).to_string(),
            quantity,
            region: field(region_idx).to_string(),
            price_cents,
        });
    }

    Ok(rows)
}

#[derive(Default)]
struct FileTotals {
    quantity: u64,
    price_cents: u64,
    revenue_cents: u64,
}

impl FileTotals {
    /// Err names the column whose value overflowed.
    fn add(&mut self, quantity: u64, price_cents: u64) -> Result<(), &'static str> {
        self.quantity = self.quantity.checked_add(quantity).ok_or("Quantity")?;
        self.price_cents = self.price_cents.checked_add(price_cents).ok_or("Price")?;
        self.revenue_cents = quantity
            .checked_mul(price_cents)
            .and_then(|revenue| self.revenue_cents.checked_add(revenue))
            .ok_or("Quantity")?;
        Ok(())
    }
}

fn parse_quantity(raw: &str, line: u64) -> Result<u64, FormatError> {
    let cleaned = raw.replace(',', "");
    if let Some(magnitude) = cleaned.strip_prefix('-') {
        if magnitude.parse::<u64>().is_ok() {
            return Err(FormatError::Negative {
                line,
                column: "Quantity".into(),
                value: raw.into(),
            });
        }
    }
    cleaned.parse().map_err(|_| FormatError::InvalidNumber {
        line,
        column: "Quantity".into(),
        value: raw.into(),
    })
}

/// Parse a price such as `25000`, `"25,000.50"` or `$19999.9` into cents.
fn parse_price_cents(raw: &str, line: u64) -> Result<u64, FormatError> {
    let invalid = || FormatError::InvalidNumber {
        line,
        column: "Price".into(),
        value: raw.into(),
    };

    let cleaned = raw.replace(',', "");
    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let s = unsigned.strip_prefix('$').unwrap_or(unsigned);

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
        || frac.len() > 2
    {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let frac_cents: u64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };
    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac_cents))
        .ok_or_else(invalid)?;

    if negative && cents > 0 {
        return Err(FormatError::Negative {
            line,
            column: "Price".into(),
            value: raw.into(),
        });
    }
    Ok(cents)
}
