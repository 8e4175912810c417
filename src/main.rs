//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `domain_insight` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::SqlitePool;

use domain_insight::config::{CACHE_DIR, HTTP_TIMEOUT_SECS};
use domain_insight::export::{
    bulk_results_to_csv, comparison_to_csv, comparison_to_json, scan_to_csv, scan_to_json,
    write_output,
};
use domain_insight::initialization::init_logger_with;
use domain_insight::storage::{list_scans, load_scan, save_scan, BulkJob};
use domain_insight::{
    clean_domain, init_cache, init_db_pool_with_path, run_migrations, BulkOptions,
    BulkScanManager, CacheKind, CompetitiveAnalyzer, ComparisonReport, Config, LiveCollectors,
    LogFormat, LogLevel, ScanOrchestrator, ScanResult, ScanType,
};

#[derive(Debug, Parser)]
#[command(
    name = "domain_insight",
    version,
    about = "Scored domain reports: DNS, WHOIS, SSL, SEO, security, technology and business signals"
)]
struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// Log format: plain (colored) or json (one object per line)
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    log_format: LogFormat,

    /// SQLite database for bulk jobs and scan history
    /// [default: $DOMAIN_INSIGHT_DB_PATH or ./domain_insight.db]
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Cache backend for collector results
    #[arg(long, value_enum, default_value_t = CacheKind::File, global = true)]
    cache: CacheKind,

    /// Directory for the file cache
    #[arg(long, default_value = CACHE_DIR, global = true)]
    cache_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS, global = true)]
    timeout_seconds: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a complete scan of one domain
    Scan(ScanArgs),
    /// Compare two or more domains head to head
    Compare(CompareArgs),
    /// Create, run and inspect bulk scan jobs
    #[command(subcommand)]
    Bulk(BulkCommand),
    /// List saved scans
    History(HistoryArgs),
    /// Export a saved scan
    Export(ExportArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Summary,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, clap::Args)]
struct ScanArgs {
    /// Domain or URL to scan
    domain: String,

    /// Competitor domains to benchmark against (comma separated)
    #[arg(long, value_delimiter = ',')]
    competitors: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Save the scan to the history database
    #[arg(long)]
    save: bool,

    /// Drop cached collector results for the domain first
    #[arg(long)]
    refresh: bool,
}

#[derive(Debug, clap::Args)]
struct CompareArgs {
    /// Domains to compare (at least two)
    #[arg(required = true, num_args = 2..)]
    domains: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum BulkCommand {
    /// Create a bulk job from domains given inline and/or in a file
    Create(BulkCreateArgs),
    /// Process the unfinished tasks of a job
    Process { job_id: String },
    /// Show a job's progress
    Status { job_id: String },
    /// Show every task of a job
    Results {
        job_id: String,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Cancel a pending or processing job
    Cancel { job_id: String },
    /// List jobs, newest first
    List {
        #[arg(long)]
        user_id: Option<String>,
    },
}

#[derive(Debug, clap::Args)]
struct BulkCreateArgs {
    /// Domains to scan
    domains: Vec<String>,

    /// File with one domain per line (`#` starts a comment)
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ScanType::Complete)]
    scan_type: ScanType,

    #[arg(long)]
    user_id: Option<String>,

    /// Notify when the job completes
    #[arg(long)]
    notify: bool,

    #[arg(long)]
    label: Option<String>,

    /// Process the job right after creating it
    #[arg(long)]
    process: bool,
}

#[derive(Debug, clap::Args)]
struct HistoryArgs {
    #[arg(long)]
    domain: Option<String>,

    #[arg(long, default_value_t = 20)]
    limit: i64,
}

#[derive(Debug, clap::Args)]
struct ExportArgs {
    /// Scan id as shown by `history`
    scan_id: String,

    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            db_path: self
                .db_path
                .clone()
                .unwrap_or_else(Config::default_db_path),
            cache: self.cache,
            cache_dir: self.cache_dir.clone(),
            timeout_seconds: self.timeout_seconds,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let config = cli.to_config();

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("domain_insight error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Scan(args) => run_scan(args, config).await,
        Command::Compare(args) => run_compare(args, config).await,
        Command::Bulk(command) => run_bulk(command, config).await,
        Command::History(args) => run_history(args, config).await,
        Command::Export(args) => run_export(args, config).await,
    }
}

fn build_orchestrator(config: &Config) -> Result<Arc<ScanOrchestrator>> {
    let collectors =
        LiveCollectors::new(config).context("Failed to initialize network collectors")?;
    let cache = init_cache(config).context("Failed to initialize cache")?;
    Ok(Arc::new(ScanOrchestrator::new(Arc::new(collectors), cache)))
}

async fn open_database(config: &Config) -> Result<Arc<SqlitePool>> {
    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(pool)
}

async fn run_scan(args: ScanArgs, config: &Config) -> Result<()> {
    let domain = clean_domain(&args.domain)
        .with_context(|| format!("Invalid domain: {}", args.domain))?;
    let orchestrator = build_orchestrator(config)?;

    if args.refresh {
        orchestrator.invalidate(&domain).await;
    }

    let result = if args.competitors.is_empty() {
        orchestrator.scan(&domain).await
    } else {
        orchestrator
            .scan_with_competitors(&domain, &args.competitors)
            .await
    };

    if args.save {
        let pool = open_database(config).await?;
        save_scan(&pool, &result)
            .await
            .context("Failed to save scan")?;
        log::info!("Saved scan {} to {}", result.scan_id, config.db_path.display());
    }

    let output = args.output.as_deref();
    match args.format {
        OutputFormat::Summary => write_output(output, &scan_summary(&result)),
        OutputFormat::Json => write_output(output, &scan_to_json(&result)?),
        OutputFormat::Csv => write_output(output, &scan_to_csv(&result)?),
    }
}

async fn run_compare(args: CompareArgs, config: &Config) -> Result<()> {
    let analyzer = CompetitiveAnalyzer::new(build_orchestrator(config)?);
    let report = analyzer.compare(&args.domains).await?;

    let output = args.output.as_deref();
    match args.format {
        OutputFormat::Summary => write_output(output, &comparison_summary(&report)),
        OutputFormat::Json => write_output(output, &comparison_to_json(&report)?),
        OutputFormat::Csv => write_output(output, &comparison_to_csv(&report)?),
    }
}

async fn run_bulk(command: BulkCommand, config: &Config) -> Result<()> {
    let pool = open_database(config).await?;
    let manager = BulkScanManager::new(pool, build_orchestrator(config)?)
        .with_max_batch_size(config.max_bulk_domains);

    match command {
        BulkCommand::Create(args) => {
            let mut domains = args.domains.clone();
            if let Some(file) = &args.file {
                domains.extend(read_domain_file(file)?);
            }
            let options = BulkOptions {
                notify: args.notify,
                label: args.label.clone(),
                ..Default::default()
            };
            let job_id = manager
                .create_job(args.user_id.as_deref(), &domains, args.scan_type, options)
                .await?;
            println!("Created bulk job {}", job_id);
            if args.process {
                let job = manager.process_job(&job_id).await?;
                println!("{}", job_line(&job));
            }
        }
        BulkCommand::Process { job_id } => {
            let job = manager.process_job(&job_id).await?;
            println!("{}", job_line(&job));
        }
        BulkCommand::Status { job_id } => {
            let job = manager.get_job_status(&job_id).await?;
            println!("{}", job_line(&job));
        }
        BulkCommand::Results {
            job_id,
            format,
            output,
        } => {
            let results = manager.get_job_results(&job_id).await?;
            let content = match format {
                ExportFormat::Json => serde_json::to_string_pretty(&results)?,
                ExportFormat::Csv => bulk_results_to_csv(&results)?,
            };
            write_output(output.as_deref(), &content)?;
        }
        BulkCommand::Cancel { job_id } => {
            if manager.cancel_job(&job_id).await? {
                println!("Cancelled bulk job {}", job_id);
            } else {
                println!("Bulk job {} is not pending or processing; nothing to cancel", job_id);
            }
        }
        BulkCommand::List { user_id } => {
            let jobs = manager.list_jobs(user_id.as_deref()).await?;
            if jobs.is_empty() {
                println!("No bulk jobs");
            }
            for job in &jobs {
                println!("{}", job_line(job));
            }
        }
    }
    Ok(())
}

async fn run_history(args: HistoryArgs, config: &Config) -> Result<()> {
    let pool = open_database(config).await?;
    let domain = match &args.domain {
        Some(raw) => Some(clean_domain(raw).with_context(|| format!("Invalid domain: {}", raw))?),
        None => None,
    };
    let scans = list_scans(&pool, domain.as_deref(), args.limit)
        .await
        .context("Failed to read scan history")?;
    if scans.is_empty() {
        println!("No saved scans");
    }
    for scan in &scans {
        let when = chrono::DateTime::from_timestamp_millis(scan.scanned_at_ms)
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{}  {}  {:<30} {:>6} {}",
            scan.scan_id, when, scan.domain, scan.overall_score, scan.grade
        );
    }
    Ok(())
}

async fn run_export(args: ExportArgs, config: &Config) -> Result<()> {
    let pool = open_database(config).await?;
    let Some(result) = load_scan(&pool, &args.scan_id)
        .await
        .context("Failed to read scan history")?
    else {
        bail!("No saved scan with id {}", args.scan_id);
    };
    let content = match args.format {
        ExportFormat::Json => scan_to_json(&result)?,
        ExportFormat::Csv => scan_to_csv(&result)?,
    };
    write_output(args.output.as_deref(), &content)
}

fn read_domain_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read domain file: {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn job_line(job: &BulkJob) -> String {
    format!(
        "{}  {:<10} {:<8} {}/{} done ({} failed, {}%)",
        job.id,
        job.status,
        job.scan_type,
        job.completed + job.failed,
        job.total_domains,
        job.failed,
        job.progress_percent()
    )
}

fn scan_summary(result: &ScanResult) -> String {
    let score = &result.overall_score;
    let mut lines = vec![
        format!(
            "{}: {} ({}) in {}s",
            result.domain, score.score, score.grade, result.execution_time
        ),
        format!("  {}", score.interpretation),
    ];

    let breakdown = score
        .breakdown
        .weighted()
        .iter()
        .map(|(category, value, _)| format!("{} {}", category, value))
        .collect::<Vec<_>>()
        .join(" | ");
    lines.push(format!("  {}", breakdown));

    for (category, error) in result.failed_categories() {
        lines.push(format!("  {} unavailable: {}", category, error));
    }

    let recommendations = &result.recommendations;
    lines.push(format!(
        "  {} recommendations ({} critical, {} important, {} suggested)",
        recommendations.total_recommendations,
        recommendations.critical.len(),
        recommendations.important.len(),
        recommendations.suggested.len()
    ));
    for (priority, list) in [
        ("critical", &recommendations.critical),
        ("important", &recommendations.important),
        ("suggested", &recommendations.suggested),
    ] {
        for rec in list {
            lines.push(format!(
                "    [{}] {}: {} -> {}",
                priority, rec.category, rec.issue, rec.recommendation
            ));
        }
    }

    for competitor in &result.competitors {
        lines.push(format!(
            "  vs {}: {} ({})",
            competitor.domain, competitor.score, competitor.grade
        ));
    }
    lines.join("\n")
}

fn comparison_summary(report: &ComparisonReport) -> String {
    let mut lines = Vec::new();
    for (rank, entry) in report.overall_scores.iter().enumerate() {
        lines.push(format!(
            "{}. {} {} ({})",
            rank + 1,
            entry.domain,
            entry.score,
            entry.grade
        ));
    }
    let winner = &report.winner;
    for (category, domain) in [
        ("overall", &winner.overall),
        ("seo", &winner.seo),
        ("security", &winner.security),
        ("technology", &winner.technology),
    ] {
        if let Some(domain) = domain {
            lines.push(format!("Best {}: {}", category, domain));
        }
    }
    for (domain, error) in &report.failures {
        lines.push(format!("{} failed: {}", domain, error));
    }
    for domain in &report.domains {
        let opportunities = report
            .insights
            .opportunities
            .get(domain)
            .map(|o| o.as_slice())
            .unwrap_or_default();
        for opportunity in opportunities {
            lines.push(format!("{}: {}", domain, opportunity));
        }
    }
    lines.join("\n")
}
