//! Vehicle sales data model and aggregation.
//!
//! Pure crate: loads CSV records, computes summaries, routes questions and
//! renders prompt text. No network or audit dependencies.

pub mod aggregate;
pub mod error;
pub mod format;
pub mod loader;
pub mod model;
pub mod prompt;
pub mod query;

pub use aggregate::{project_totals, summarize};
pub use error::{FormatError, LoadError};
pub use loader::{load_csv_file, parse_csv, REQUIRED_COLUMNS};
pub use model::{Growth, GrowthEntry, SalesRecord, SalesSummary};
pub use query::{answer_locally, classify, QueryKind};
