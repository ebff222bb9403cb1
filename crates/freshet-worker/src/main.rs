//! Freshet worker binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use freshet_jobs::{JobRuntime, RefreshScheduler};
use freshet_store::build_store;
use freshet_wiki::{InMemoryWiki, WikiJobs};
use freshet_worker::{Command, Settings, init_metrics, init_tracing, run_command};

/// Serves and warms cached wiki jobs.
#[derive(Parser)]
#[command(name = "freshet-worker", version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "FRESHET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing and metrics
    init_tracing();
    let metrics = init_metrics().context("failed to install metrics recorder")?;

    let settings = Settings::load(cli.config.as_deref()).context("failed loading settings")?;
    let fixture = settings
        .wiki
        .fixture
        .as_deref()
        .context("wiki.fixture is not configured")?;

    tracing::info!("Starting Freshet worker v{}", env!("CARGO_PKG_VERSION"));

    let wiki = Arc::new(InMemoryWiki::load(fixture)?);
    let (scheduler, handle) = RefreshScheduler::start(settings.scheduler.clone());
    let runtime = JobRuntime::new(build_store(&settings.store))
        .with_scheduler(scheduler.clone())
        .with_maintenance_mode(settings.maintenance_mode);
    let jobs = WikiJobs::with_overrides(wiki.clone(), runtime, &settings.jobs);

    let output = run_command(&cli.command, &jobs, wiki.as_ref(), &scheduler).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    handle.stop();

    if cli.metrics {
        print!("{}", metrics.render());
    }

    Ok(())
}
