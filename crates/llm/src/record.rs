use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Audit entry for one LLM call. Built once, never modified.
///
/// On failure `response_hash` is the empty string and `error` carries the
/// failure message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    timestamp: DateTime<Utc>,
    call_id: u32,
    model_id: String,
    request_hash: String,
    response_hash: String,
    outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    latency_ms: u64,
}

impl VerificationRecord {
    pub(crate) fn success(
        call_id: u32,
        model_id: &str,
        request_hash: String,
        response_hash: String,
        latency: Duration,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            call_id,
            model_id: model_id.to_string(),
            request_hash,
            response_hash,
            outcome: Outcome::Success,
            error: None,
            latency_ms: latency.as_millis() as u64,
        }
    }

    pub(crate) fn failure(
        call_id: u32,
        model_id: &str,
        request_hash: String,
        error: &LlmError,
        latency: Duration,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            call_id,
            model_id: model_id.to_string(),
            request_hash,
            response_hash: String::new(),
            outcome: Outcome::Failure,
            error: Some(error.to_string()),
            latency_ms: latency.as_millis() as u64,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn call_id(&self) -> u32 {
        self.call_id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn request_hash(&self) -> &str {
        &self.request_hash
    }

    pub fn response_hash(&self) -> &str {
        &self.response_hash
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
