// autosales - car sales analysis with verified LLM projections

mod exit_codes;
mod report;
mod session;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use autosales_config::{ConfigError, LlmConfig, Settings};
use autosales_core::prompt::{projection_prompt, question_prompt};
use autosales_core::{answer_locally, classify, load_csv_file, summarize, LoadError, QueryKind, SalesRecord, SalesSummary};
use autosales_llm::{read_records, AuditError, LlmError};

use exit_codes::{
    audit_exit_code, config_exit_code, llm_exit_code, load_exit_code, EXIT_CONNECTIVITY_MISMATCH,
    EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE,
};
use session::LlmSession;

#[derive(Parser)]
#[command(name = "autosales")]
#[command(about = "Car sales analysis with verified LLM projections")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
#[command(after_help = "\
With no command, runs the full pipeline: summary, trends and an LLM projection.

Examples:
  autosales summary --json
  autosales --data sales.csv trends
  autosales ask 'compare Ford vs Tesla'
  autosales --test-llm")]
struct Cli {
    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    /// Run the LLM connectivity check and exit
    #[arg(long)]
    test_llm: bool,

    /// Sales CSV (default: settings data_path, else data/car_sales.csv)
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Verification audit log (JSON lines)
    #[arg(long, global = true, value_name = "PATH")]
    audit_log: Option<PathBuf>,

    /// Model identifier sent to the provider
    #[arg(long, global = true, value_name = "ID")]
    model: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print aggregate statistics (no LLM call)
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print yearly totals, growth and per-make breakdown (no LLM call)
    Trends {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a question locally when possible, else through a verified LLM call
    #[command(after_help = "\
Examples:
  autosales ask 'compare Toyota vs Honda'
  autosales ask 'top 5 most expensive models'
  autosales ask 'what is the growth trend?'
  autosales ask 'forecast sales for the next three years'")]
    Ask {
        /// The question (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// List verification records from the audit log
    Audit {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show only the last N records
        #[arg(long, value_name = "N")]
        tail: Option<usize>,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
        )
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    // Variables already set in the environment win over `.env`.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.debug);
    log::debug!("autosales {} starting", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => log::warn!("ignoring .env: {}", err),
    }

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::new(&cli)?;

    if cli.test_llm {
        return cmd_test_llm(&ctx);
    }

    match cli.command {
        None => cmd_run(&ctx),
        Some(Commands::Summary { json }) => cmd_summary(&ctx, json),
        Some(Commands::Trends { json }) => cmd_trends(&ctx, json),
        Some(Commands::Ask { question }) => cmd_ask(&ctx, &question.join(" ")),
        Some(Commands::Audit { json, tail }) => cmd_audit(&ctx, json, tail),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn load(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::Io { .. } => Some("pass --data PATH or set data_path in settings.json".to_string()),
            LoadError::Format(_) => Some(format!(
                "expected header: {}",
                autosales_core::REQUIRED_COLUMNS.join(",")
            )),
        };
        Self { code: load_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::MissingKey { var } => Some(format!("export {var}=<your Groq API key> or add it to .env")),
            ConfigError::Parse { .. } | ConfigError::Invalid { .. } => {
                Some(format!("fix or remove {}", Settings::config_path().display()))
            }
            ConfigError::Read { .. } => None,
        };
        Self { code: config_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn llm(err: LlmError) -> Self {
        let hint = match &err {
            LlmError::Provider { status: 401 | 403, .. } => Some("check GROQ_API_KEY in the environment or .env".to_string()),
            LlmError::Provider { status: 404, .. } => Some("check the model id (--model) and endpoint".to_string()),
            LlmError::Network(_) => Some("check network connectivity to the endpoint".to_string()),
            LlmError::Timeout(_) => Some("raise llm.timeout_secs in settings.json".to_string()),
            LlmError::PromptTooLong { .. } => Some("raise llm.max_prompt_chars or shorten the question".to_string()),
            _ => None,
        };
        Self { code: llm_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn audit(err: AuditError) -> Self {
        Self::new(audit_exit_code(&err), err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Context
// ============================================================================

/// Settings file merged with command-line overrides.
struct Context {
    settings: Settings,
    data_path: PathBuf,
    audit_path: PathBuf,
    model: Option<String>,
    endpoint: Option<String>,
}

impl Context {
    fn new(cli: &Cli) -> Result<Self, CliError> {
        let settings = Settings::load().map_err(CliError::config)?;
        let data_path = cli.data.clone().unwrap_or_else(|| settings.effective_data_path());
        let audit_path = cli.audit_log.clone().unwrap_or_else(|| settings.effective_audit_log_path());
        Ok(Self {
            settings,
            data_path,
            audit_path,
            model: cli.model.clone(),
            endpoint: cli.endpoint.clone(),
        })
    }

    fn load(&self) -> Result<(Vec<SalesRecord>, SalesSummary), CliError> {
        let records = load_csv_file(&self.data_path).map_err(CliError::load)?;
        let summary = summarize(&records);
        log::debug!(
            "summarized {} records: {} units across {} regions",
            summary.record_count,
            summary.total_quantity,
            summary.by_region.len()
        );
        Ok((records, summary))
    }

    /// Resolves the credential; fails with exit 10 when it is absent.
    fn llm_session(&self) -> Result<LlmSession, CliError> {
        let mut config = LlmConfig::resolve(&self.settings.llm).map_err(CliError::config)?;
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        log::debug!("llm config: {config:?}");
        LlmSession::open(config, &self.audit_path)
    }
}

// ============================================================================
// Commands
// ============================================================================

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot encode JSON: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Full pipeline: summary, trends, verified projection.
fn cmd_run(ctx: &Context) -> Result<(), CliError> {
    let mut session = ctx.llm_session()?;
    let (_, summary) = ctx.load()?;

    println!("{}", report::summary_text(&summary));
    println!("{}", report::trends_text(&summary));

    let verified = session.complete(&projection_prompt(&summary))?;
    println!("{}", verified.text.trim_end());
    verified.finish()
}

fn cmd_summary(ctx: &Context, json: bool) -> Result<(), CliError> {
    let (_, summary) = ctx.load()?;
    if json {
        return print_json(&summary);
    }
    print!("{}", report::summary_text(&summary));
    Ok(())
}

fn cmd_trends(ctx: &Context, json: bool) -> Result<(), CliError> {
    let (_, summary) = ctx.load()?;
    if json {
        return print_json(&report::trends_json(&summary));
    }
    print!("{}", report::trends_text(&summary));
    Ok(())
}

fn cmd_ask(ctx: &Context, question: &str) -> Result<(), CliError> {
    if question.trim().is_empty() {
        return Err(CliError::usage("question is empty")
            .with_hint("autosales ask 'compare Toyota vs Honda'"));
    }

    let (records, summary) = ctx.load()?;
    let kind = classify(question, &summary);
    log::debug!("question routed as {kind:?}");

    if let Some(answer) = answer_locally(&kind, &records, &summary) {
        println!("{answer}");
        return Ok(());
    }

    let prompt = match kind {
        QueryKind::Projection => projection_prompt(&summary),
        _ => question_prompt(question, &summary, &records),
    };
    let verified = ctx.llm_session()?.complete(&prompt)?;
    println!("{}", verified.text.trim_end());
    verified.finish()
}

fn cmd_test_llm(ctx: &Context) -> Result<(), CliError> {
    let mut session = ctx.llm_session()?;
    println!("LLM connectivity check");
    println!("  model:     {}", session.config().model);
    println!("  endpoint:  {}", session.config().endpoint);

    let report = session.check_connectivity()?;
    println!("  token:     {}", report.token);
    let latency = report.exchange.record().latency_ms();
    let (_, response, audit) = report.exchange.into_parts();
    // A failed call or a token mismatch decides the exit code; an audit write
    // failure alongside it is reported only by the stderr warning.
    let text = response.map_err(CliError::llm)?;

    println!("  response:  {}", text.trim());
    println!("  latency:   {latency} ms");
    if !report.passed {
        println!("  result:    FAILED");
        return Err(CliError::new(
            EXIT_CONNECTIVITY_MISMATCH,
            format!("response did not contain {}", report.token),
        )
        .with_hint("the endpoint answered but the model did not follow the instruction; try another --model"));
    }
    println!("  result:    ok");
    audit.map_err(CliError::audit)
}

fn cmd_audit(ctx: &Context, json: bool, tail: Option<usize>) -> Result<(), CliError> {
    let records = read_records(&ctx.audit_path).map_err(CliError::audit)?;
    let counts = report::count_outcomes(&records);
    let start = tail.map_or(0, |n| records.len().saturating_sub(n));
    let shown = &records[start..];

    if json {
        return print_json(&report::audit_json(shown, &counts));
    }
    log::debug!("audit log: {}", ctx.audit_path.display());
    print!("{}", report::audit_text(shown, &counts));
    Ok(())
}
