//! Worker commands.

use clap::Subcommand;
use freshet_jobs::RefreshScheduler;
use freshet_wiki::{DocumentId, WikiJobs, WikiSource};
use serde_json::{Value, json};
use tracing::info;

/// What the worker does with the wiki jobs.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the nearest zone of a document
    Zone { document: u64 },

    /// Print the zone URL remaps of a locale
    Remaps { locale: String },

    /// Print the recent contributors of a document
    Contributors { document: u64 },

    /// Print the code sample of a document section
    CodeSample { document: u64, name: String },

    /// Print the tags of a document
    Tags { document: u64 },

    /// Refresh the contributors of every document in the background
    Warm,
}

/// Runs `command` and returns its result as JSON.
pub async fn run_command(
    command: &Command,
    jobs: &WikiJobs,
    source: &dyn WikiSource,
    scheduler: &RefreshScheduler,
) -> anyhow::Result<Value> {
    let output = match command {
        Command::Zone { document } => {
            json!(jobs.nearest_zone.get(&DocumentId(*document)).await?)
        },
        Command::Remaps { locale } => json!(jobs.zone_url_remaps.get(locale).await?),
        Command::Contributors { document } => {
            let id = DocumentId(*document);
            let mut contributors = jobs.contributors.get(&id).await?;
            if contributors.is_empty() {
                // Computed in the background on a miss.
                scheduler.idle().await;
                contributors = jobs.contributors.get(&id).await?;
            }
            json!(contributors)
        },
        Command::CodeSample { document, name } => {
            let args = (DocumentId(*document), name.clone());
            json!(jobs.code_sample.get(&args).await?)
        },
        Command::Tags { document } => json!(jobs.tags.get(&DocumentId(*document)).await?),
        Command::Warm => warm(jobs, source, scheduler).await?,
    };

    Ok(output)
}

async fn warm(
    jobs: &WikiJobs,
    source: &dyn WikiSource,
    scheduler: &RefreshScheduler,
) -> anyhow::Result<Value> {
    let ids = source.document_ids().await?;
    let scheduled = ids
        .iter()
        .filter(|id| jobs.contributors.schedule_refresh(**id))
        .count();

    info!(documents = ids.len(), scheduled, "Warming contributors");
    scheduler.idle().await;

    let stats = scheduler.stats();
    Ok(json!({
        "documents": ids.len(),
        "scheduled": scheduled,
        "completed": stats.completed,
        "failed": stats.failed,
        "dropped": stats.dropped,
    }))
}
