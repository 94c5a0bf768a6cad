// Verified LLM calls: digest the prompt, call the backend, digest the
// response, append exactly one record to the audit sink.

use std::time::Instant;

use rand::Rng;

use crate::audit::{AuditError, AuditSink};
use crate::client::{ChatBackend, LlmError};
use crate::digest::digest;
use crate::record::VerificationRecord;

/// Result of one completed call. The LLM outcome and the audit outcome are
/// reported independently; a failed append never discards the response.
#[derive(Debug)]
pub struct Exchange {
    record: VerificationRecord,
    response: Result<String, LlmError>,
    audit: Result<(), AuditError>,
}

impl Exchange {
    pub fn record(&self) -> &VerificationRecord {
        &self.record
    }

    pub fn response(&self) -> Result<&str, &LlmError> {
        self.response.as_deref()
    }

    pub fn audit_error(&self) -> Option<&AuditError> {
        self.audit.as_ref().err()
    }

    pub fn into_parts(self) -> (VerificationRecord, Result<String, LlmError>, Result<(), AuditError>) {
        (self.record, self.response, self.audit)
    }
}

#[derive(Debug)]
pub struct ConnectivityReport {
    pub token: String,
    pub passed: bool,
    pub exchange: Exchange,
}

pub struct VerifiedClient<B> {
    backend: B,
    max_prompt_chars: usize,
}

impl<B: ChatBackend> VerifiedClient<B> {
    pub fn new(backend: B, max_prompt_chars: usize) -> Self {
        Self { backend, max_prompt_chars }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run one verified call.
    ///
    /// `Err` only for a rejected prompt (empty or over the limit), in which
    /// case nothing was sent and nothing was recorded. Every other outcome,
    /// including provider and transport failures, is an `Exchange` whose
    /// record has already been handed to `sink`.
    pub fn call<S: AuditSink>(&self, prompt: &str, sink: &mut S) -> Result<Exchange, LlmError> {
        self.check_prompt(prompt)?;

        let call_id = new_call_id();
        let model_id = self.backend.model_id().to_string();
        let request_hash = digest(prompt.as_bytes());

        let started = Instant::now();
        let response = self.backend.complete(prompt);
        let latency = started.elapsed();

        let record = match &response {
            Ok(text) => {
                let response_hash = digest(text.as_bytes());
                log::info!(
                    "llm call {call_id} ok: model={model_id} latency={}ms request={request_hash} response={response_hash}",
                    latency.as_millis()
                );
                log::debug!("llm call {call_id} response starts: {:?}", preview(text));
                VerificationRecord::success(call_id, &model_id, request_hash, response_hash, latency)
            }
            Err(err) => {
                log::warn!("llm call {call_id} failed after {}ms: {err}", latency.as_millis());
                VerificationRecord::failure(call_id, &model_id, request_hash, err, latency)
            }
        };

        let audit = sink.append(&record);
        if let Err(e) = &audit {
            log::error!("llm call {call_id} could not be audited: {e}");
        }

        Ok(Exchange { record, response, audit })
    }

    /// Ask the model to echo a random token. Audited like any other call.
    pub fn check_connectivity<S: AuditSink>(&self, sink: &mut S) -> Result<ConnectivityReport, LlmError> {
        let token = format!("TEST_OK_{}", rand::thread_rng().gen_range(100_000..=999_999));
        let prompt = format!("Respond ONLY with: {token}");
        let exchange = self.call(&prompt, sink)?;
        let passed = matches!(exchange.response(), Ok(text) if text.contains(&token));
        Ok(ConnectivityReport { token, passed, exchange })
    }

    fn check_prompt(&self, prompt: &str) -> Result<(), LlmError> {
        if prompt.trim().is_empty() {
            return Err(LlmError::EmptyPrompt);
        }
        let len = prompt.chars().count();
        if len > self.max_prompt_chars {
            return Err(LlmError::PromptTooLong { len, max: self.max_prompt_chars });
        }
        Ok(())
    }
}

fn new_call_id() -> u32 {
    rand::thread_rng().gen_range(100_000..=999_999)
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::is_digest;
    use crate::record::{Outcome, VerificationRecord};
    use std::cell::Cell;

    struct Stub {
        reply: fn(&str) -> Result<String, LlmError>,
        calls: Cell<usize>,
    }

    impl Stub {
        fn new(reply: fn(&str) -> Result<String, LlmError>) -> Self {
            Self { reply, calls: Cell::new(0) }
        }
    }

    impl ChatBackend for Stub {
        fn model_id(&self) -> &str {
            "stub-model"
        }

        fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.set(self.calls.get() + 1);
            (self.reply)(prompt)
        }
    }

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn append(&mut self, _: &VerificationRecord) -> Result<(), AuditError> {
            Err(AuditError::Io {
                path: "/readonly/llm_audit.jsonl".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn success_records_both_digests() {
        let client = VerifiedClient::new(Stub::new(|_| Ok("Projected 2025: 55,000 units".into())), 1000);
        let mut sink = Vec::new();

        let exchange = client.call("Project sales", &mut sink).unwrap();

        assert_eq!(exchange.response().unwrap(), "Projected 2025: 55,000 units");
        assert_eq!(sink.len(), 1);
        let record = &sink[0];
        assert_eq!(record, exchange.record());
        assert_eq!(record.outcome(), Outcome::Success);
        assert_eq!(record.model_id(), "stub-model");
        assert_eq!(record.request_hash(), digest(b"Project sales"));
        assert_eq!(record.response_hash(), digest(b"Projected 2025: 55,000 units"));
        assert!(is_digest(record.response_hash()));
        assert!((100_000..=999_999).contains(&record.call_id()));
    }

    #[test]
    fn failure_records_empty_response_hash() {
        let client = VerifiedClient::new(
            Stub::new(|_| Err(LlmError::Provider { status: 500, message: "boom".into() })),
            1000,
        );
        let mut sink = Vec::new();

        let exchange = client.call("Project sales", &mut sink).unwrap();

        assert!(matches!(exchange.response(), Err(LlmError::Provider { status: 500, .. })));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].outcome(), Outcome::Failure);
        assert_eq!(sink[0].response_hash(), "");
        assert!(is_digest(sink[0].request_hash()));
        assert!(sink[0].error().unwrap().contains("boom"));
    }

    #[test]
    fn rejected_prompts_make_no_call_and_no_record() {
        let client = VerifiedClient::new(Stub::new(|_| Ok("x".into())), 10);
        let mut sink = Vec::new();

        assert!(matches!(client.call("   \n", &mut sink), Err(LlmError::EmptyPrompt)));
        assert!(matches!(
            client.call("this prompt is too long", &mut sink),
            Err(LlmError::PromptTooLong { len: 23, max: 10 })
        ));
        assert!(sink.is_empty());
        assert_eq!(client.backend().calls.get(), 0);
    }

    #[test]
    fn prompt_limit_counts_characters() {
        let client = VerifiedClient::new(Stub::new(|_| Ok("ok".into())), 3);
        let mut sink = Vec::new();
        assert!(client.call("€€€", &mut sink).is_ok());
    }

    #[test]
    fn audit_failure_keeps_response() {
        let client = VerifiedClient::new(Stub::new(|_| Ok("kept".into())), 1000);

        let exchange = client.call("Project sales", &mut BrokenSink).unwrap();

        assert_eq!(exchange.response().unwrap(), "kept");
        assert!(matches!(exchange.audit_error(), Some(AuditError::Io { .. })));
    }

    #[test]
    fn connectivity_passes_when_token_echoed() {
        let client = VerifiedClient::new(
            Stub::new(|prompt| Ok(prompt.trim_start_matches("Respond ONLY with: ").to_string())),
            1000,
        );
        let mut sink = Vec::new();

        let report = client.check_connectivity(&mut sink).unwrap();

        assert!(report.passed);
        assert!(report.token.starts_with("TEST_OK_"));
        assert_eq!(report.token.len(), "TEST_OK_".len() + 6);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn connectivity_fails_on_wrong_token() {
        let client = VerifiedClient::new(Stub::new(|_| Ok("TEST_OK_000000".into())), 1000);
        let mut sink = Vec::new();

        let report = client.check_connectivity(&mut sink).unwrap();

        assert!(!report.passed);
        assert_eq!(report.exchange.record().outcome(), Outcome::Success);
    }
}
