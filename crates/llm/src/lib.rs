//! Verified LLM calls.
//!
//! Every call is hashed on the way out and on the way back, and produces
//! exactly one `VerificationRecord` appended to the audit log. Blocking
//! reqwest client (no Tokio runtime required). Single attempt, no retries.

mod audit;
mod client;
mod digest;
mod record;
mod verified;

pub use audit::{read_records, AuditError, AuditLog, AuditSink};
pub use client::{ChatBackend, GroqClient, LlmError};
pub use digest::{digest, is_digest, DIGEST_PREFIX};
pub use record::{Outcome, VerificationRecord};
pub use verified::{ConnectivityReport, Exchange, VerifiedClient};
