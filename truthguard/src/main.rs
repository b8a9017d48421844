//! truthguard - score content for misinformation across several Cortex models

mod analysis_log;
mod config;
mod engine;

use analysis_log::{AnalysisLog, ExportFormat, LogLevel, StatementSink};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::TruthGuardConfig;
use cortex_client::{CortexConfig, ProgrammaticAccessToken, get_provider};
use engine::{CategoryTable, VerificationEngine, VerificationResult, normalize_category};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "truthguard",
    about = "Score content for misinformation with multiple LLMs and a consensus verdict",
    long_about = "Sends content to every Snowflake Cortex model configured for its category, then asks one model to reconcile their answers"
)]
#[command(version)]
struct Args {
    /// Enable debug output
    #[arg(short, long, default_value_t = false, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze content (reads stdin when neither --text nor --file is given)
    Verify {
        /// Content category (news, deepfake, election, climate, viral, mental health)
        category: String,

        /// Content to analyze
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the content from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List categories and the models consulted for each
    Categories,
    /// Inspect the analysis log
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum LogsAction {
    /// Show recent entries
    List {
        /// Only entries for this category
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number of entries
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },
    /// Counts by category and level
    Stats,
    /// Print recent entries as JSON or CSV
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Only entries for this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete the log file
    Clear,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print the configuration file paths
    Path,
    /// Set the Snowflake account identifier
    SetAccount { account: String },
    /// Set the Snowflake user
    SetUser { user: String },
    /// Store a programmatic access token
    SetToken { token: String },
    /// Set the model that writes the consensus verdict
    SetConsensusModel { model: String },
    /// Set the pause between model calls in milliseconds
    SetDelay { millis: u64 },
    /// Enable or disable mirroring the analysis log to Snowflake
    SetRemoteLogging {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

/// Handle config subcommands
fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut cortex = CortexConfig::load()?;
            if cortex.token.is_some() {
                cortex.token = Some("<set>".to_string());
            }
            let config = TruthGuardConfig::load()?;
            println!("{:#?}", cortex);
            println!();
            println!("{:#?}", config);
            println!();
            println!("Analysis log: {}", config.log_path()?.display());
        }
        ConfigAction::Path => {
            println!("{}", CortexConfig::config_path()?.display());
            println!("{}", TruthGuardConfig::config_path()?.display());
        }
        ConfigAction::SetAccount { account } => {
            let mut cortex = CortexConfig::load_file()?;
            cortex.account = account.trim().to_lowercase();
            cortex.save()?;
            println!("Account set to: {}", cortex.account);
        }
        ConfigAction::SetUser { user } => {
            let mut cortex = CortexConfig::load_file()?;
            cortex.user = user.clone();
            cortex.save()?;
            println!("User set to: {}", user);
        }
        ConfigAction::SetToken { token } => {
            let mut cortex = CortexConfig::load_file()?;
            cortex.token = Some(token.clone());
            cortex.save()?;
            println!("Token saved to {}", CortexConfig::config_path()?.display());
        }
        ConfigAction::SetConsensusModel { model } => {
            let mut config = TruthGuardConfig::load()?;
            config.consensus_model = model.clone();
            config.save()?;
            println!("Consensus model set to: {}", model);
        }
        ConfigAction::SetDelay { millis } => {
            let mut config = TruthGuardConfig::load()?;
            config.call_delay_ms = *millis;
            config.save()?;
            println!("Delay between model calls set to: {} ms", millis);
        }
        ConfigAction::SetRemoteLogging { enabled } => {
            let mut config = TruthGuardConfig::load()?;
            config.remote_logging = *enabled;
            config.save()?;
            println!("Remote logging {}", if *enabled { "enabled" } else { "disabled" });
        }
    }
    Ok(())
}

fn handle_logs_command(action: &LogsAction) -> Result<()> {
    let config = TruthGuardConfig::load()?;
    let log = AnalysisLog::new(config.log_path()?);

    match action {
        LogsAction::List { category, limit } => {
            let category = category.as_deref().map(normalize_category);
            let entries = log.entries(category.as_deref(), *limit)?;
            if entries.is_empty() {
                println!("No log entries in {}", log.path().display());
            }
            for entry in entries {
                println!(
                    "{} [{}] {}: {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.level,
                    entry.category,
                    entry.message
                );
            }
        }
        LogsAction::Stats => {
            let stats = log.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        LogsAction::Export { format, category } => {
            let category = category.as_deref().map(normalize_category);
            print!("{}", log.export(*format, category.as_deref())?);
        }
        LogsAction::Clear => {
            if log.clear()? {
                println!("Cleared {}", log.path().display());
            } else {
                println!("Nothing to clear");
            }
        }
    }
    Ok(())
}

fn print_categories(engine_config: &TruthGuardConfig) -> Result<()> {
    let table = engine_config.category_table()?;
    println!("Available categories:");
    for spec in table.iter() {
        println!("  {} - {}", spec.name, spec.models.join(", "));
    }
    Ok(())
}

/// Resolve the content to analyze from --text, --file, or stdin
fn read_content(text: Option<&str>, file: Option<&PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read content from stdin")?;
    Ok(content)
}

fn build_log(config: &TruthGuardConfig, cortex: &CortexConfig) -> Result<AnalysisLog> {
    let log = AnalysisLog::new(config.log_path()?);
    if !config.remote_logging {
        return Ok(log);
    }

    match ProgrammaticAccessToken::from_config(cortex)
        .map_err(anyhow::Error::from)
        .and_then(|auth| StatementSink::new(cortex, Arc::new(auth)))
    {
        Ok(sink) => Ok(log.with_remote(sink)),
        Err(e) => {
            log::warn!("Remote logging disabled: {:#}", e);
            Ok(log)
        }
    }
}

async fn record(
    log: &AnalysisLog,
    category: &str,
    message: &str,
    level: LogLevel,
    metadata: serde_json::Value,
) {
    let metadata = match metadata {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    if let Err(e) = log.record(category, message, level, metadata).await {
        log::warn!("Could not write analysis log: {:#}", e);
    }
}

fn print_result(result: &VerificationResult) {
    println!("### Consensus Analysis");
    println!("{}", result.consensus);
    println!();
    println!("### Individual Model Responses");
    for response in &result.responses {
        println!();
        match response.outcome.error_kind() {
            Some(kind) => println!("[{}] (failed: {:?})", response.model, kind),
            None => println!("[{}]", response.model),
        }
        println!("{}", response.outcome);
    }
    println!();
    println!("Models consulted: {}", result.responses.len());
}

/// Validate the category, then read the content to analyze.
fn verify_input(
    table: &CategoryTable,
    category: &str,
    text: Option<&str>,
    file: Option<&PathBuf>,
) -> Result<(String, usize, String)> {
    let (category, models) = table.models_for(category)?;

    let content = read_content(text, file)?;
    if content.trim().is_empty() {
        anyhow::bail!("No content to analyze. Pass --text, --file, or pipe it on stdin.");
    }

    Ok((category.to_string(), models.len(), content))
}

async fn run_verify(
    category: &str,
    text: Option<&str>,
    file: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let config = TruthGuardConfig::load().context("Failed to load truthguard configuration")?;
    let cortex = CortexConfig::load().context("Failed to load Cortex configuration")?;

    let table = config.category_table()?;
    let (category, model_count, content) = verify_input(&table, category, text, file)?;

    let provider = get_provider(&cortex).context("Failed to initialize Cortex provider")?;
    log::debug!("Using provider: {}", provider.name());
    let log = build_log(&config, &cortex)?;
    let engine = VerificationEngine::new(provider, table, config.engine_settings());

    record(
        &log,
        &category,
        &format!("Started {} analysis", category),
        LogLevel::Info,
        serde_json::json!({ "content_length": content.len(), "models": model_count }),
    )
    .await;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message(format!(
        "Analyzing {} content with Snowflake Cortex AI...",
        category
    ));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = engine.verify(&category, &content).await;
    spinner.finish_and_clear();
    let result = result?;

    let failed = result.failed_models();
    let failed_calls = failed.len() + usize::from(!result.consensus.is_success());
    let (level, message) = if failed_calls == 0 {
        (LogLevel::Success, "Analysis completed successfully".to_string())
    } else {
        (
            LogLevel::Warning,
            format!("Analysis completed with {} failed call(s)", failed_calls),
        )
    };
    record(
        &log,
        &category,
        &message,
        level,
        serde_json::json!({
            "models": result.models(),
            "failed_models": failed,
            "consensus_ok": result.consensus.is_success(),
        }),
    )
    .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    match &args.command {
        Commands::Verify {
            category,
            text,
            file,
            json,
        } => run_verify(category, text.as_deref(), file.as_ref(), *json).await,
        Commands::Categories => print_categories(&TruthGuardConfig::load()?),
        Commands::Logs { action } => handle_logs_command(action),
        Commands::Config { action } => handle_config_command(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_verify() {
        let args = Args::try_parse_from([
            "truthguard",
            "verify",
            "mental health",
            "--text",
            "Sunlight cures anxiety.",
            "--json",
        ])
        .unwrap();
        match args.command {
            Commands::Verify {
                category,
                text,
                file,
                json,
            } => {
                assert_eq!(category, "mental health");
                assert_eq!(text.as_deref(), Some("Sunlight cures anxiety."));
                assert!(file.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_text_and_file_together() {
        let result = Args::try_parse_from([
            "truthguard", "verify", "news", "--text", "a", "--file", "b.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_logs_export() {
        let args =
            Args::try_parse_from(["truthguard", "logs", "export", "--format", "csv"]).unwrap();
        match args.command {
            Commands::Logs {
                action: LogsAction::Export { format, category },
            } => {
                assert_eq!(format, ExportFormat::Csv);
                assert!(category.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_read_content_prefers_text() {
        let content = read_content(Some("inline"), None).unwrap();
        assert_eq!(content, "inline");
    }

    #[test]
    fn test_read_content_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("claim.txt");
        std::fs::write(&path, "from file").unwrap();
        assert_eq!(read_content(None, Some(&path)).unwrap(), "from file");
    }

    #[test]
    fn test_unknown_category_fails_before_reading_content() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.txt");

        let err = verify_input(&CategoryTable::default(), "sports", None, Some(&missing))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown category: sports"));
    }

    #[test]
    fn test_verify_input() {
        let (category, models, content) =
            verify_input(&CategoryTable::default(), "Mental-Health", Some("claim"), None).unwrap();
        assert_eq!(category, "mental health");
        assert_eq!(models, 2);
        assert_eq!(content, "claim");

        let err = verify_input(&CategoryTable::default(), "news", Some("  "), None).unwrap_err();
        assert!(err.to_string().contains("No content to analyze"));
    }
}
