//! newsreport — newsletter campaign performance reports from the command
//! line: generate against the Mailchimp API, then list, filter, export,
//! and delete the persisted artifacts.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use newsreport_core::config::{AppConfig, ConfigHandle};
use newsreport_core::progress::{ProgressEvent, ProgressSink};
use newsreport_core::types::{DateRange, MetricSelection, NewsletterType, ReportRequest};
use newsreport_core::CancelToken;
use newsreport_engine::{ReportGenerator, ReportOutcome};
use newsreport_mailchimp::MailchimpClient;
use newsreport_store::{export_csv, export_json, ReportStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "newsreport")]
#[command(about = "Newsletter campaign performance reporting")]
#[command(version)]
struct Cli {
    /// Mailchimp audience id (overrides config)
    #[arg(long, env = "NEWSREPORT__MAILCHIMP__AUDIENCE_ID", global = true)]
    audience_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a report and persist it on success
    Generate {
        /// Newsletter edition: am, pm, energy, health_care, breaking_news
        #[arg(long, value_parser = parse_newsletter_type)]
        newsletter_type: NewsletterType,
        #[arg(long)]
        advertiser: String,
        /// Tracking URL fragments or keywords; repeat for multiple terms
        #[arg(long = "term", required = true)]
        terms: Vec<String>,
        /// Start date (YYYY-MM-DD), inclusive
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD), inclusive
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        unique_opens: bool,
        #[arg(long)]
        total_opens: bool,
        #[arg(long)]
        total_recipients: bool,
        #[arg(long)]
        total_clicks: bool,
        #[arg(long)]
        ctr: bool,
        /// Display name for the artifact (derived when omitted)
        #[arg(long)]
        name: Option<String>,
    },
    /// List persisted reports, newest first
    List {
        #[arg(long)]
        advertiser: Option<String>,
        #[arg(long, value_parser = parse_newsletter_type)]
        newsletter_type: Option<NewsletterType>,
    },
    /// Delete a persisted report by id
    Delete { id: Uuid },
    /// Export a persisted report to a file
    Export {
        id: Uuid,
        /// Output format: csv or json
        #[arg(long, default_value = "csv")]
        format: String,
        /// Output path (defaults into the configured download directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_newsletter_type(s: &str) -> Result<NewsletterType, String> {
    match s.to_lowercase().as_str() {
        "am" => Ok(NewsletterType::Am),
        "pm" => Ok(NewsletterType::Pm),
        "energy" => Ok(NewsletterType::Energy),
        "health_care" | "healthcare" | "hc" => Ok(NewsletterType::HealthCare),
        "breaking_news" | "breaking" => Ok(NewsletterType::BreakingNews),
        other => Err(format!("unknown newsletter type '{}'", other)),
    }
}

/// Progress sink that renders generation progress as log lines.
struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: ProgressEvent) {
        info!(
            stage = ?event.stage,
            percent = event.percent,
            completed = event.completed_count,
            total = event.total_count,
            eta_seconds = event.eta_seconds,
            "{}",
            event.message
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsreport=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    // The CLI is the settings collaborator here: it publishes once and the
    // generation reads the current snapshot at submission time.
    let (_publisher, config_handle) = ConfigHandle::new(config);
    let config = config_handle.current();

    let store = Arc::new(ReportStore::new(&config.store.reports_path));

    match cli.command {
        Command::Generate {
            newsletter_type,
            advertiser,
            terms,
            start,
            end,
            unique_opens,
            total_opens,
            total_recipients,
            total_clicks,
            ctr,
            name,
        } => {
            let audience_id = cli
                .audience_id
                .clone()
                .unwrap_or_else(|| config.mailchimp.audience_id.clone());
            if audience_id.is_empty() {
                bail!("no Mailchimp audience id configured");
            }
            let request = ReportRequest {
                newsletter_type,
                advertiser,
                tracking_terms: terms,
                date_range: DateRange::new(start, end),
                metrics: MetricSelection {
                    unique_opens,
                    total_opens,
                    total_recipients,
                    total_clicks,
                    ctr,
                },
                name,
            };

            let client = Arc::new(MailchimpClient::new(&config.mailchimp)?);
            let generator = ReportGenerator::new(
                client,
                store,
                Arc::new(TracingSink),
                audience_id,
                config.mailchimp.stat_fetch_concurrency,
            );

            let cancel = CancelToken::new();
            let signal_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Cancellation requested");
                    signal_cancel.cancel();
                }
            });

            match generator.generate(request, cancel).await {
                ReportOutcome::Succeeded(artifact) => {
                    info!(artifact_id = %artifact.id, name = %artifact.name, "Report ready");
                    for note in &artifact.diagnostics {
                        warn!("{}", note);
                    }
                }
                ReportOutcome::EmptyResult(reason) => {
                    println!("{}", reason.message);
                    for hint in &reason.hints {
                        println!("  - {}", hint);
                    }
                }
                ReportOutcome::Failed(e) => bail!("report generation failed: {}", e),
                ReportOutcome::Cancelled => println!("Report generation cancelled."),
            }
        }
        Command::List {
            advertiser,
            newsletter_type,
        } => {
            let mut artifacts = store.filter(advertiser.as_deref(), newsletter_type)?;
            artifacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if artifacts.is_empty() {
                println!("No reports saved.");
            }
            for artifact in artifacts {
                println!(
                    "{}  {}  {}  {}  {} to {}",
                    artifact.id,
                    artifact.created_at.format("%Y-%m-%d %H:%M"),
                    artifact.newsletter_type,
                    artifact.name,
                    artifact.date_range.start,
                    artifact.date_range.end
                );
            }
        }
        Command::Delete { id } => {
            store.delete(id)?;
            println!("Deleted report {}.", id);
        }
        Command::Export { id, format, out } => {
            let artifacts = store.list()?;
            let artifact = artifacts
                .iter()
                .find(|a| a.id == id)
                .with_context(|| format!("no report with id {}", id))?;

            let (bytes, extension) = match format.as_str() {
                "csv" => (export_csv(artifact), "csv"),
                "json" => (export_json(artifact)?, "json"),
                other => bail!("unknown export format '{}'", other),
            };
            let path = out.unwrap_or_else(|| {
                PathBuf::from(&config.store.download_dir)
                    .join(format!("{}.{}", artifact.name, extension))
            });
            std::fs::write(&path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Exported report to {}.", path.display());
        }
    }

    Ok(())
}
