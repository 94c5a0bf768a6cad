// Verified LLM session: one client, one audit log, for the life of a command

use std::path::Path;

use autosales_config::LlmConfig;
use autosales_llm::{AuditError, AuditLog, ConnectivityReport, GroqClient, VerificationRecord, VerifiedClient};

use crate::CliError;

pub(crate) struct LlmSession {
    client: VerifiedClient<GroqClient>,
    log: AuditLog,
}

/// A response that arrived. `audit` is set when the record could not be
/// written; the response is still delivered.
pub(crate) struct Verified {
    pub text: String,
    audit: Option<AuditError>,
}

impl Verified {
    /// Surface a failed audit append after the response has been shown.
    pub fn finish(self) -> Result<(), CliError> {
        match self.audit {
            Some(err) => Err(CliError::audit(err)
                .with_hint("the LLM response above was received but is not in the audit log")),
            None => Ok(()),
        }
    }
}

impl LlmSession {
    pub fn open(config: LlmConfig, audit_path: &Path) -> Result<Self, CliError> {
        let max_prompt_chars = config.max_prompt_chars;
        let backend = GroqClient::new(config).map_err(CliError::llm)?;
        Ok(Self {
            client: VerifiedClient::new(backend, max_prompt_chars),
            log: AuditLog::new(audit_path),
        })
    }

    pub fn complete(&mut self, prompt: &str) -> Result<Verified, CliError> {
        let exchange = self.client.call(prompt, &mut self.log).map_err(CliError::llm)?;
        let (record, response, audit) = exchange.into_parts();
        print_verification(&record, self.log.path(), audit.is_ok());

        match response {
            Ok(text) => Ok(Verified { text, audit: audit.err() }),
            Err(err) => Err(CliError::llm(err)),
        }
    }

    pub fn check_connectivity(&mut self) -> Result<ConnectivityReport, CliError> {
        let report = self.client.check_connectivity(&mut self.log).map_err(CliError::llm)?;
        print_verification(report.exchange.record(), self.log.path(), report.exchange.audit_error().is_none());
        Ok(report)
    }

    pub fn config(&self) -> &LlmConfig {
        self.client.backend().config()
    }
}

/// One line on stderr per call so stdout stays the answer alone.
fn print_verification(record: &VerificationRecord, log_path: &Path, audited: bool) {
    let response = if record.response_hash().is_empty() { "-" } else { record.response_hash() };
    eprintln!(
        "verified: call {} {} request={} response={} ({} ms)",
        record.call_id(),
        record.outcome().as_str(),
        record.request_hash(),
        response,
        record.latency_ms()
    );
    if audited {
        log::debug!("audit record written to {}", log_path.display());
    } else {
        eprintln!("warning: audit record for call {} was not written to {}", record.call_id(), log_path.display());
    }
}
