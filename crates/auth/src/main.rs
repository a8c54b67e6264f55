use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use learnhub_auth::{
    settings::WatchConfig, task::ScheduledTask, EmailConfig, ExpiryReminderTask,
    PostgresConfigStore, PostgresIssuerRegistry, PostgresUserDirectory, StringCatalog,
    TaskScheduler,
};
use learnhub_core::{
    init_logging, load_dotenv, ConfigLoader, DatabaseConfig, DatabasePool, LogConfig, SiteConfig,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "expiry-reminder")]
#[command(about = "Emails admins on the day an OAuth2 client secret expires", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the expiry check once and print the report")]
    RunOnce {
        #[arg(long, help = "Date to check instead of today (YYYY-MM-DD)")]
        date: Option<NaiveDate>,
    },

    #[command(about = "Run the expiry check on a fixed cadence until interrupted")]
    Serve,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    let site = SiteConfig::from_env().context("Failed to load site configuration")?;
    site.validate()?;

    init_logging(&LogConfig {
        service_name: "expiry-reminder".to_string(),
        default_filter: "info".to_string(),
        format: site.log_format,
    })?;

    let watch = WatchConfig::from_env().context("Failed to load expiry watch configuration")?;
    watch.validate()?;
    let email = EmailConfig::from_env().context("Failed to load email configuration")?;
    email.validate()?;
    let db_config = DatabaseConfig::from_env().context("Failed to load database configuration")?;
    db_config.validate()?;

    let db = DatabasePool::new(&db_config)
        .await
        .context("Failed to create database connection pool")?;
    let pool = db.pool().clone();

    let mut catalog = StringCatalog::new();
    if let Some(dir) = &watch.lang_dir {
        catalog = catalog
            .load_dir(dir)
            .with_context(|| format!("Failed to load language packs from {}", dir.display()))?;
    }

    let transport = email.build_transport();
    tracing::info!(transport = transport.name(), "Mail transport configured");

    let interval = watch.interval;
    let task = Arc::new(ExpiryReminderTask::new(
        Arc::new(PostgresIssuerRegistry::new(pool.clone())),
        Arc::new(PostgresConfigStore::new(pool.clone())),
        Arc::new(PostgresUserDirectory::new(pool)),
        transport,
        Arc::new(catalog),
        site.clone(),
        watch,
    ));

    match cli.command {
        Commands::RunOnce { date } => {
            let today = date.unwrap_or_else(|| site.today());
            tracing::info!(task = %task.name(), date = %today, "Running once");

            let report = task.run(today).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Serve => {
            TaskScheduler::new(interval)
                .with_task(task)
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "Failed to listen for shutdown signal");
                        std::future::pending::<()>().await;
                    }
                })
                .await;
        }
    }

    Ok(())
}
