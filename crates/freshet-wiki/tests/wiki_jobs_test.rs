use std::sync::Arc;

use freshet_jobs::{JobError, JobRuntime, RefreshScheduler, SchedulerConfig};
use freshet_store::MemoryStore;
use freshet_wiki::{
    CodeBlock, DocumentId, InMemoryWiki, Section, WikiError, WikiJobs, avatar_url,
};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/wiki.yaml");

fn load_wiki() -> Arc<InMemoryWiki> {
    Arc::new(InMemoryWiki::load(FIXTURE).expect("fixture should load"))
}

fn runtime() -> JobRuntime {
    JobRuntime::new(Arc::new(MemoryStore::default()))
}

#[tokio::test]
async fn nearest_zone_walks_topic_parents() {
    let jobs = WikiJobs::new(load_wiki(), runtime());

    let zone = jobs.nearest_zone.get(&DocumentId(3)).await.unwrap();
    assert_eq!(zone.map(|z| z.document), Some(DocumentId(1)));

    assert_eq!(jobs.nearest_zone.get(&DocumentId(5)).await.unwrap(), None);
}

#[tokio::test]
async fn nearest_zone_is_cached() {
    let wiki = load_wiki();
    let jobs = WikiJobs::new(wiki.clone(), runtime());

    assert!(jobs.nearest_zone.get(&DocumentId(5)).await.unwrap().is_none());

    // A zone added later is not seen until the cached value expires.
    wiki.insert_zone(freshet_wiki::DocumentZone {
        document: DocumentId(5),
        url_root: Some("web".to_string()),
        styles: None,
    });
    assert!(jobs.nearest_zone.get(&DocumentId(5)).await.unwrap().is_none());
    assert_eq!(jobs.nearest_zone.metrics().fetches(), 1);
}

#[tokio::test]
async fn zone_url_remaps_per_locale() {
    let jobs = WikiJobs::new(load_wiki(), runtime());

    let remaps = jobs.zone_url_remaps.get(&"en-US".to_string()).await.unwrap();
    assert_eq!(
        remaps,
        vec![("/docs/Mozilla".to_string(), "/mozilla".to_string())]
    );

    let remaps = jobs.zone_url_remaps.get(&"de".to_string()).await.unwrap();
    assert!(remaps.is_empty());
}

#[tokio::test]
async fn contributors_are_refreshed_in_background() {
    let (scheduler, handle) = RefreshScheduler::start(SchedulerConfig::default());
    let runtime = runtime().with_scheduler(scheduler.clone());
    let jobs = WikiJobs::new(load_wiki(), runtime);

    // Cold: empty at once, computed by the scheduler.
    assert!(jobs.contributors.get(&DocumentId(3)).await.unwrap().is_empty());
    scheduler.idle().await;

    let contributors = jobs.contributors.get(&DocumentId(3)).await.unwrap();
    let ids: Vec<u64> = contributors.iter().map(|c| c.id.0).collect();
    assert_eq!(ids, vec![7, 3, 9]);
    assert_eq!(contributors[0].avatar_url, avatar_url("kuma@example.com", 34));

    assert_eq!(scheduler.stats().completed, 1);
    handle.stop();
}

#[tokio::test]
async fn contributors_without_revisions_are_empty() {
    let (scheduler, _handle) = RefreshScheduler::start(SchedulerConfig::default());
    let jobs = WikiJobs::new(load_wiki(), runtime().with_scheduler(scheduler.clone()));

    assert!(jobs.contributors.get(&DocumentId(5)).await.unwrap().is_empty());
    scheduler.idle().await;

    // Cached as empty, so no further refresh is scheduled.
    assert!(jobs.contributors.get(&DocumentId(5)).await.unwrap().is_empty());
    assert!(jobs.contributors.peek(&DocumentId(5)).await.unwrap().is_some());
    assert_eq!(scheduler.stats().enqueued, 1);
}

#[tokio::test]
async fn contributors_skipped_in_maintenance_mode() {
    let (scheduler, _handle) = RefreshScheduler::start(SchedulerConfig::default());
    let runtime = runtime()
        .with_scheduler(scheduler.clone())
        .with_maintenance_mode(true);
    let jobs = WikiJobs::new(load_wiki(), runtime);

    assert!(jobs.contributors.get(&DocumentId(3)).await.unwrap().is_empty());
    assert_eq!(scheduler.stats().enqueued, 0);

    // Jobs that do not opt out keep working.
    assert_eq!(
        jobs.tags.get(&DocumentId(3)).await.unwrap(),
        vec!["Firefox", "Releases"]
    );
}

#[tokio::test]
async fn code_sample_follows_document_generation() {
    let wiki = load_wiki();
    let jobs = WikiJobs::new(wiki.clone(), runtime());
    let args = (DocumentId(3), "Example".to_string());

    let sample = jobs.code_sample.get(&args).await.unwrap();
    assert_eq!(sample.keys().collect::<Vec<_>>(), vec!["html", "js"]);

    let mut document = wiki_document(&wiki, 3).await;
    document.sections = vec![Section {
        id: "Example".to_string(),
        code_blocks: vec![CodeBlock {
            language: "css".to_string(),
            source: "p { color: red }".to_string(),
        }],
    }];
    wiki.insert_document(document);

    // Still the cached sample until the document's generation changes.
    assert!(jobs.code_sample.get(&args).await.unwrap().contains_key("html"));

    let generation = jobs
        .code_sample
        .invalidate_generation(&DocumentId(3))
        .await
        .unwrap();
    assert!(generation.is_some());

    let sample = jobs.code_sample.get(&args).await.unwrap();
    assert_eq!(sample.keys().collect::<Vec<_>>(), vec!["css"]);
}

#[tokio::test]
async fn unavailable_source_surfaces_fetch_error() {
    let wiki = load_wiki();
    let jobs = WikiJobs::new(wiki.clone(), runtime());
    wiki.set_offline(true);

    let err = jobs.tags.get(&DocumentId(3)).await.unwrap_err();
    assert!(matches!(err, JobError::Fetch { .. }));
    assert!(matches!(
        err.fetch_error::<WikiError>(),
        Some(WikiError::SourceUnavailable { .. })
    ));

    // Nothing was cached; the next call fetches again.
    wiki.set_offline(false);
    assert_eq!(jobs.tags.get(&DocumentId(3)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn missing_document_is_not_cached() {
    let jobs = WikiJobs::new(load_wiki(), runtime());

    let err = jobs
        .code_sample
        .get(&(DocumentId(404), "Example".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err.fetch_error::<WikiError>(),
        Some(WikiError::DocumentNotFound(DocumentId(404)))
    ));
}

async fn wiki_document(wiki: &InMemoryWiki, id: u64) -> freshet_wiki::Document {
    use freshet_wiki::WikiSource;

    wiki.document(DocumentId(id))
        .await
        .unwrap()
        .expect("document exists in fixture")
}
