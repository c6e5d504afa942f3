use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use backoffice::{Config, ingestion, lint, normalize_to_plaintext};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use storage::Database;
use storage::dto::audit::AuditFilter;
use storage::dto::common::PaginationParams;
use storage::models::{
    AbusePolicy, Actor, ModerationAction, RatingConfig, StatementFormat, SubmissionStatus,
    TargetKind, TargetRef,
};
use storage::repository::config::ConfigRepository;
use storage::services::{audit, rating_runs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(about = "Contest archive backoffice: ratings, moderation ledger and problem intake", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a statement file for disallowed or malformed TeX
    Lint {
        file: PathBuf,

        #[arg(long, default_value = "latex")]
        format: StatementFormat,
    },
    /// Print the searchable plaintext of a statement file
    Plaintext {
        file: PathBuf,

        #[arg(long, default_value = "latex")]
        format: StatementFormat,
    },
    #[command(subcommand)]
    Rating(RatingCommand),
    #[command(subcommand)]
    Config(ConfigCommand),
    #[command(subcommand)]
    Submissions(SubmissionCommand),
    /// Query the moderation ledger, newest first
    Audit {
        #[arg(long)]
        actor: Option<i64>,

        #[arg(long, requires = "target_id")]
        target_kind: Option<TargetKind>,

        #[arg(long, requires = "target_kind")]
        target_id: Option<i64>,

        #[arg(long)]
        user: Option<i64>,

        #[arg(long)]
        report: Option<i64>,

        #[arg(long)]
        action: Option<ModerationAction>,

        #[arg(long)]
        since: Option<DateTime<Utc>>,

        #[arg(long)]
        until: Option<DateTime<Utc>>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 50)]
        page_size: u32,
    },
}

#[derive(Subcommand)]
enum RatingCommand {
    /// Apply a rating run to a contest using the stored configuration
    Apply {
        contest_id: i64,

        #[arg(long)]
        k_override: Option<f64>,
    },
    Rollback { run_id: i64 },
    Runs { contest_id: i64 },
    Show { run_id: i64 },
    History { user_id: i64 },
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    /// Replace the rating configuration with the JSON in FILE
    SetRating { file: PathBuf },
    /// Replace the abuse policy with the JSON in FILE
    SetAbuse { file: PathBuf },
}

#[derive(Subcommand)]
enum SubmissionCommand {
    List {
        #[arg(long, default_value = "new")]
        status: SubmissionStatus,
    },
    Accept {
        submission_id: i64,

        #[arg(long, default_value = "")]
        note: String,
    },
    Reject {
        submission_id: i64,

        #[arg(long, default_value = "")]
        note: String,
    },
    Duplicate {
        submission_id: i64,

        #[arg(long)]
        of: Option<i64>,

        #[arg(long, default_value = "")]
        note: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("backoffice={},storage={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Lint { file, format } => handle_lint(&file, format).await,
        Commands::Plaintext { file, format } => {
            let source = read_statement(&file).await?;
            println!("{}", normalize_to_plaintext(&source, format));
            Ok(())
        }
        Commands::Rating(command) => {
            let (db, config) = connect().await?;
            handle_rating(&db, &config, command).await
        }
        Commands::Config(command) => {
            let (db, _) = connect().await?;
            handle_config(&db, command).await
        }
        Commands::Submissions(command) => {
            let (db, config) = connect().await?;
            handle_submissions(&db, &config, command).await
        }
        Commands::Audit {
            actor,
            target_kind,
            target_id,
            user,
            report,
            action,
            since,
            until,
            page,
            page_size,
        } => {
            let (db, _) = connect().await?;
            let filter = AuditFilter {
                actor_id: actor,
                target: target_kind
                    .zip(target_id)
                    .map(|(kind, id)| TargetRef::new(kind, id)),
                target_user_id: user,
                report_id: report,
                action,
                since,
                until,
            };
            let logs =
                audit::query_logs(db.pool(), &filter, &PaginationParams::new(page, page_size))
                    .await?;
            print_json(&logs)
        }
    }
}

async fn connect() -> Result<(Database, Config)> {
    let config = Config::from_env()?;

    tracing::debug!("Connecting to database...");
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to open database")?;
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    Ok((db, config))
}

async fn read_statement(file: &Path) -> Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Cannot read statement from {}", file.display()))
}

async fn handle_lint(file: &Path, format: StatementFormat) -> Result<()> {
    let source = read_statement(file).await?;
    let issues = lint(&source, format);

    if issues.is_empty() {
        tracing::info!("✓ {} is clean", file.display());
        return Ok(());
    }

    for issue in &issues {
        tracing::warn!("  {}", issue);
    }
    bail!("{} lint issue(s) in {}", issues.len(), file.display())
}

async fn handle_rating(db: &Database, config: &Config, command: RatingCommand) -> Result<()> {
    let pool = db.pool();

    match command {
        RatingCommand::Apply {
            contest_id,
            k_override,
        } => {
            let mut conn = pool.acquire().await?;
            let rating_config = ConfigRepository::new(&mut conn).load_rating_config().await?;
            drop(conn);

            match rating_runs::apply_rating_run(
                pool,
                contest_id,
                &rating_config,
                config.operator_id,
                k_override,
            )
            .await?
            {
                Some(detail) => print_json(&detail),
                None => {
                    tracing::warn!("Contest {} has fewer than two results, nothing applied", contest_id);
                    Ok(())
                }
            }
        }
        RatingCommand::Rollback { run_id } => {
            match rating_runs::rollback_rating_run(pool, run_id, config.operator_id).await? {
                Some(detail) => print_json(&detail),
                None => bail!("Run {} cannot be rolled back", run_id),
            }
        }
        RatingCommand::Runs { contest_id } => {
            print_json(&rating_runs::list_runs(pool, contest_id).await?)
        }
        RatingCommand::Show { run_id } => {
            print_json(&rating_runs::get_run_detail(pool, run_id).await?)
        }
        RatingCommand::History { user_id } => {
            print_json(&rating_runs::rating_history(pool, user_id).await?)
        }
    }
}

async fn handle_config(db: &Database, command: ConfigCommand) -> Result<()> {
    let mut conn = db.pool().acquire().await?;
    let mut configs = ConfigRepository::new(&mut conn);

    match command {
        ConfigCommand::Show => {
            let rating = configs.load_rating_config().await?;
            let abuse = configs.load_abuse_policy().await?;
            print_json(&serde_json::json!({ "rating": rating, "abuse_policy": abuse }))
        }
        ConfigCommand::SetRating { file } => {
            let rating: RatingConfig = read_json(&file).await?;
            configs.save_rating_config(&rating).await?;
            tracing::info!("✓ Rating configuration updated");
            Ok(())
        }
        ConfigCommand::SetAbuse { file } => {
            let policy: AbusePolicy = read_json(&file).await?;
            configs.save_abuse_policy(&policy).await?;
            tracing::info!("✓ Abuse policy updated");
            Ok(())
        }
    }
}

async fn handle_submissions(
    db: &Database,
    config: &Config,
    command: SubmissionCommand,
) -> Result<()> {
    let pool = db.pool();

    if let SubmissionCommand::List { status } = command {
        return print_json(&ingestion::list_submissions(pool, status).await?);
    }

    let reviewer = config
        .operator_id
        .context("BACKOFFICE_OPERATOR_ID is required for review decisions")?;
    let actor = Actor::admin(reviewer);

    let decided = match command {
        SubmissionCommand::Accept {
            submission_id,
            note,
        } => ingestion::accept_submission(pool, &actor, submission_id, &note).await?,
        SubmissionCommand::Reject {
            submission_id,
            note,
        } => ingestion::reject_submission(pool, &actor, submission_id, &note).await?,
        SubmissionCommand::Duplicate {
            submission_id,
            of,
            note,
        } => ingestion::mark_duplicate(pool, &actor, submission_id, &note, of).await?,
        SubmissionCommand::List { .. } => return Ok(()),
    };

    print_json(&decided)
}

async fn read_json<T: serde::de::DeserializeOwned>(file: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Cannot read {}", file.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", file.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
