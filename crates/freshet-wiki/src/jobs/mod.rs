//! Cached wiki jobs.
//!
//! Each job pairs a fetcher over a [`WikiSource`] with the policy it is
//! cached under. [`WikiJobs`] wires all of them to one runtime.

pub mod code_sample;
pub mod contributors;
pub mod remaps;
pub mod tags;
pub mod zone;

use std::collections::HashMap;
use std::sync::Arc;

use freshet_jobs::{Job, JobOverrides, JobPolicy, JobRuntime};
use tracing::debug;

use crate::error::{WikiError, WikiResult};
use crate::model::{Document, DocumentId};
use crate::source::WikiSource;

// Re-exports
pub use code_sample::{CodeSample, DocumentCodeSample, SAMPLE_LANGUAGES};
pub use contributors::DocumentContributors;
pub use remaps::ZoneUrlRemaps;
pub use tags::DocumentTags;
pub use zone::NearestZone;

/// Loads a document, treating deleted documents as missing.
pub(crate) async fn live_document(source: &dyn WikiSource, id: DocumentId) -> WikiResult<Document> {
    source
        .document(id)
        .await?
        .filter(|document| !document.deleted)
        .ok_or(WikiError::DocumentNotFound(id))
}

/// Every wiki job, built over one source and runtime.
#[derive(Clone)]
pub struct WikiJobs {
    pub nearest_zone: Job<NearestZone>,
    pub zone_url_remaps: Job<ZoneUrlRemaps>,
    pub contributors: Job<DocumentContributors>,
    pub code_sample: Job<DocumentCodeSample>,
    pub tags: Job<DocumentTags>,
}

impl WikiJobs {
    /// Builds the jobs with their default policies.
    pub fn new(source: Arc<dyn WikiSource>, runtime: JobRuntime) -> Self {
        Self::with_overrides(source, runtime, &HashMap::new())
    }

    /// Builds the jobs, applying `overrides` keyed by job namespace.
    pub fn with_overrides(
        source: Arc<dyn WikiSource>,
        runtime: JobRuntime,
        overrides: &HashMap<String, JobOverrides>,
    ) -> Self {
        Self {
            nearest_zone: Job::new(
                NearestZone::new(source.clone()),
                tuned(NearestZone::policy(), overrides),
                runtime.clone(),
            ),
            zone_url_remaps: Job::new(
                ZoneUrlRemaps::new(source.clone()),
                tuned(ZoneUrlRemaps::policy(), overrides),
                runtime.clone(),
            ),
            contributors: Job::new(
                DocumentContributors::new(source.clone()),
                tuned(DocumentContributors::policy(), overrides),
                runtime.clone(),
            ),
            code_sample: Job::new(
                DocumentCodeSample::new(source.clone()),
                tuned(DocumentCodeSample::policy(), overrides),
                runtime.clone(),
            ),
            tags: Job::new(
                DocumentTags::new(source),
                tuned(DocumentTags::policy(), overrides),
                runtime,
            ),
        }
    }

    /// Namespaces of every job, in declaration order.
    pub fn namespaces() -> [&'static str; 5] {
        [
            zone::NAMESPACE,
            remaps::NAMESPACE,
            contributors::NAMESPACE,
            code_sample::NAMESPACE,
            tags::NAMESPACE,
        ]
    }
}

fn tuned<T>(policy: JobPolicy<T>, overrides: &HashMap<String, JobOverrides>) -> JobPolicy<T> {
    match overrides.get(policy.namespace()) {
        Some(job_overrides) => {
            debug!(namespace = policy.namespace(), overrides = ?job_overrides, "Applying job overrides");
            policy.apply_overrides(job_overrides)
        },
        None => policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryWiki;
    use freshet_store::NoopStore;
    use std::time::Duration;

    #[test]
    fn test_overrides_apply_by_namespace() {
        let mut overrides = HashMap::new();
        overrides.insert(
            tags::NAMESPACE.to_string(),
            JobOverrides {
                refresh_timeout: Some(Duration::from_secs(5)),
                ..JobOverrides::default()
            },
        );
        overrides.insert("wiki.unknown".to_string(), JobOverrides::default());

        let runtime = JobRuntime::new(Arc::new(NoopStore::new()));
        let jobs = WikiJobs::with_overrides(Arc::new(InMemoryWiki::new()), runtime, &overrides);

        assert_eq!(jobs.tags.policy().refresh_timeout(), Duration::from_secs(5));
        assert_eq!(
            jobs.nearest_zone.policy().refresh_timeout(),
            Duration::from_secs(180)
        );
    }

    #[test]
    fn test_namespaces_are_unique() {
        let mut namespaces = WikiJobs::namespaces().to_vec();
        namespaces.sort();
        namespaces.dedup();
        assert_eq!(namespaces.len(), 5);
    }
}
