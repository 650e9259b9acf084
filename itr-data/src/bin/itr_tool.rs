use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use itr_core::calculations::RegimeComparator;
use itr_core::db::RepositoryRegistry;
use itr_core::returns::{ReturnAssembler, diff_documents, diff_schedule};
use itr_core::user_input::{MergePolicy, apply_user_edits};
use itr_core::{Regime, ReturnRepository, TaxRules, UserInputKey};
use itr_data::{AppConfig, TaxSlabLoader, logging, read_income_record, rules_from_repository};
use itr_db_sqlite::SqliteRepositoryFactory;
use serde_json::{Value, json};
use tracing::{debug, error, info};

/// Compute, assemble, edit and compare salaried income-tax returns.
///
/// Every command prints one JSON object on stdout:
/// `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.
#[derive(Parser, Debug)]
#[command(name = "itr-tool")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (e.g. "debug" or "itr_core=trace"); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Do not write log output to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute both regimes and recommend the cheaper one
    Compare {
        /// Normalized income record (JSON)
        #[arg(short, long)]
        income: PathBuf,

        /// Use slab tables stored in the database for the income's assessment year
        #[arg(long, default_value_t = false)]
        stored_slabs: bool,
    },

    /// Build the ITR-2 return document for one regime
    Assemble {
        /// Normalized income record (JSON)
        #[arg(short, long)]
        income: PathBuf,

        #[arg(short, long, value_enum, default_value_t = RegimeChoice::Recommended)]
        regime: RegimeChoice,

        /// Creation date written into the document (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = false)]
        stored_slabs: bool,

        /// Write the document here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge a partial user-input document into the stored one
    Merge {
        /// Partial document (JSON object keyed by section)
        #[arg(short, long)]
        edits: PathBuf,

        /// Owner id; defaults to [filing].owner_id
        #[arg(long)]
        owner: Option<String>,

        /// Assessment period; defaults to [filing].assessment_year
        #[arg(long)]
        period: Option<String>,
    },

    /// List the differences between two return documents
    Diff {
        before: PathBuf,
        after: PathBuf,

        /// Restrict the diff to one schedule under ITR.ITR2 (e.g. ScheduleS)
        #[arg(short, long)]
        schedule: Option<String>,
    },

    /// Load slab tables from CSV (assessment_year,regime,up_to,rate)
    LoadSlabs {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RegimeChoice {
    Old,
    New,
    Recommended,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());
    if cli.quiet {
        let _ = logging::set_console_enabled(false);
    }

    let (envelope, code) = match run(cli).await {
        Ok(data) => (json!({"success": true, "data": data}), ExitCode::SUCCESS),
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "command failed");
            (json!({"success": false, "error": message}), ExitCode::FAILURE)
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| envelope.to_string())
    );
    code
}

async fn run(cli: Cli) -> Result<Value> {
    let config = AppConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if cli.log_level.is_none() {
        if let Some(level) = &config.logging.level {
            logging::set_log_level(level)?;
        }
    }
    if let Some(path) = cli.log_file.as_ref().or(config.logging.file.as_ref()) {
        logging::enable_file_logging(path)?;
    }
    debug!(backend = %config.database.backend, "configuration loaded");

    match cli.command {
        Command::Compare {
            income,
            stored_slabs,
        } => compare(&config, &income, stored_slabs).await,
        Command::Assemble {
            income,
            regime,
            date,
            stored_slabs,
            output,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            assemble(&config, &income, regime, date, stored_slabs, output.as_deref()).await
        }
        Command::Merge {
            edits,
            owner,
            period,
        } => {
            let key = UserInputKey::new(
                owner.unwrap_or_else(|| config.filing.owner_id.clone()),
                period.unwrap_or_else(|| config.filing.assessment_year.clone()),
            );
            merge(&config, &key, &edits).await
        }
        Command::Diff {
            before,
            after,
            schedule,
        } => diff(&before, &after, schedule.as_deref()),
        Command::LoadSlabs { file } => load_slabs(&config, &file).await,
    }
}

async fn open_repository(config: &AppConfig) -> Result<Box<dyn ReturnRepository>> {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
        .create(&config.database)
        .await
        .with_context(|| format!("Failed to open {} database", config.database.backend))
}

async fn effective_rules(
    config: &AppConfig,
    assessment_year: &str,
    stored_slabs: bool,
) -> Result<TaxRules> {
    if !stored_slabs {
        return Ok(config.rules.clone());
    }
    let repo = open_repository(config).await?;
    rules_from_repository(&*repo, assessment_year, config.rules.clone())
        .await
        .with_context(|| format!("Failed to read stored slabs for {}", assessment_year))
}

async fn compare(
    config: &AppConfig,
    income_path: &Path,
    stored_slabs: bool,
) -> Result<Value> {
    let income = read_income_record(income_path)?;
    let rules = effective_rules(config, &income.assessment_year, stored_slabs).await?;
    let outcome = RegimeComparator::from_rules(&rules)?.compare(&income)?;
    Ok(serde_json::to_value(&outcome)?)
}

async fn assemble(
    config: &AppConfig,
    income_path: &Path,
    choice: RegimeChoice,
    date: NaiveDate,
    stored_slabs: bool,
    output: Option<&Path>,
) -> Result<Value> {
    let income = read_income_record(income_path)?;
    let rules = effective_rules(config, &income.assessment_year, stored_slabs).await?;
    let comparator = RegimeComparator::from_rules(&rules)?;

    let result = match choice {
        RegimeChoice::Old => comparator.calculator(Regime::Old).calculate(&income)?,
        RegimeChoice::New => comparator.calculator(Regime::New).calculate(&income)?,
        RegimeChoice::Recommended => comparator.compare(&income)?.recommended().clone(),
    };

    let document = ReturnAssembler::new(config.creation.clone())
        .assemble(&income, &result, date)
        .context("Failed to assemble return")?;

    match output {
        Some(path) => {
            std::fs::write(path, document.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), regime = %result.regime, "return written");
            Ok(json!({"path": path.display().to_string(), "regime": result.regime}))
        }
        None => Ok(document.to_value()?),
    }
}

async fn merge(
    config: &AppConfig,
    key: &UserInputKey,
    edits_path: &Path,
) -> Result<Value> {
    let partial = read_json(edits_path)?;
    let repo = open_repository(config).await?;
    let saved = apply_user_edits(&*repo, key, &partial, &MergePolicy::standard())
        .await
        .with_context(|| {
            format!(
                "Failed to merge edits for {} {}",
                key.owner_id, key.assessment_period
            )
        })?;
    Ok(serde_json::to_value(&saved)?)
}

fn diff(
    before_path: &Path,
    after_path: &Path,
    schedule: Option<&str>,
) -> Result<Value> {
    let before = read_json(before_path)?;
    let after = read_json(after_path)?;

    let entries = match schedule {
        Some(name) => diff_schedule(&before, &after, name)?,
        None => diff_documents(&before, &after)?,
    };
    info!(changes = entries.len(), "documents compared");
    Ok(serde_json::to_value(&entries)?)
}

async fn load_slabs(
    config: &AppConfig,
    csv_path: &Path,
) -> Result<Value> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open: {}", csv_path.display()))?;
    let records = TaxSlabLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", csv_path.display()))?;

    let repo = open_repository(config).await?;
    let inserted = TaxSlabLoader::load(&*repo, &records)
        .await
        .context("Failed to load slab tables into database")?;

    Ok(json!({"parsed": records.len(), "inserted": inserted}))
}

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "itr-tool",
            "assemble",
            "--income",
            "income.json",
            "--regime",
            "old",
            "--date",
            "2024-07-31",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Assemble { regime, date, .. } => {
                assert_eq!(regime, RegimeChoice::Old);
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 7, 31));
            }
            other => panic!("expected assemble, got {other:?}"),
        }
    }
}
