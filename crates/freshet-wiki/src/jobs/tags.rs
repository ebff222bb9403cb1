//! Tags of a document.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use freshet_jobs::{Fetch, JobPolicy, Lifetime};

use crate::error::{WikiError, WikiResult};
use crate::model::DocumentId;
use crate::source::WikiSource;

pub const NAMESPACE: &str = "wiki.document_tags";

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Lists the tag names of a document, sorted.
///
/// Tags change rarely, so values live one to ten days. A missing or deleted
/// document has no tags.
pub struct DocumentTags {
    source: Arc<dyn WikiSource>,
}

impl DocumentTags {
    pub fn new(source: Arc<dyn WikiSource>) -> Self {
        Self { source }
    }

    pub fn policy() -> JobPolicy<Vec<String>> {
        JobPolicy::new(NAMESPACE)
            .with_refresh_timeout(Duration::from_secs(180))
            .with_lifetime(Lifetime::jittered(DAY, 10 * DAY))
    }
}

#[async_trait]
impl Fetch for DocumentTags {
    type Args = DocumentId;
    type Output = Vec<String>;
    type Error = WikiError;

    async fn fetch(&self, id: &DocumentId) -> WikiResult<Option<Vec<String>>> {
        let Some(document) = self.source.document(*id).await?.filter(|d| !d.deleted) else {
            return Ok(Some(Vec::new()));
        };

        let mut tags: Vec<String> = document
            .tags
            .into_iter()
            .filter(|tag| !tag.is_empty())
            .collect();
        tags.sort();
        tags.dedup();

        Ok(Some(tags))
    }
}
