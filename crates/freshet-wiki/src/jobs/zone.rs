//! Nearest document zone.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use freshet_jobs::{Fetch, JobPolicy};
use tracing::warn;

use crate::error::{WikiError, WikiResult};
use crate::model::{DocumentId, DocumentZone};
use crate::source::WikiSource;

pub const NAMESPACE: &str = "wiki.document_nearest_zone";

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Finds the zone a document belongs to, walking up its topic parents.
///
/// Deleted documents are walked through like live ones. A chain that loops
/// back on itself has no zone.
pub struct NearestZone {
    source: Arc<dyn WikiSource>,
}

impl NearestZone {
    pub fn new(source: Arc<dyn WikiSource>) -> Self {
        Self { source }
    }

    /// Three minutes to refresh; values expire after one to ten days.
    pub fn policy() -> JobPolicy<Option<DocumentZone>> {
        JobPolicy::new(NAMESPACE)
            .with_refresh_timeout(Duration::from_secs(180))
            .jittered_expiry(DAY, 10 * DAY)
    }
}

#[async_trait]
impl Fetch for NearestZone {
    type Args = DocumentId;
    type Output = Option<DocumentZone>;
    type Error = WikiError;

    async fn fetch(&self, start: &DocumentId) -> WikiResult<Option<Option<DocumentZone>>> {
        let mut visited = HashSet::new();
        let mut current = Some(*start);

        while let Some(id) = current {
            if !visited.insert(id) {
                warn!(document = %start, repeated = %id, "Cyclic topic parents, no zone");
                return Ok(None);
            }

            if let Some(zone) = self.source.zone(id).await? {
                return Ok(Some(Some(zone)));
            }

            current = self
                .source
                .document(id)
                .await?
                .ok_or(WikiError::DocumentNotFound(id))?
                .parent_topic;
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryWiki;
    use crate::test_support::doc;

    fn wiki_with_chain() -> Arc<InMemoryWiki> {
        // 1 <- 2 <- 3, zone on 1
        let wiki = InMemoryWiki::new();
        wiki.insert_document(doc(1, "en-US", "Mozilla", None));
        wiki.insert_document(doc(2, "en-US", "Mozilla/Firefox", Some(1)));
        wiki.insert_document(doc(3, "en-US", "Mozilla/Firefox/Releases", Some(2)));
        wiki.insert_zone(DocumentZone {
            document: DocumentId(1),
            url_root: Some("mozilla".to_string()),
            styles: None,
        });
        Arc::new(wiki)
    }

    #[tokio::test]
    async fn test_zone_on_document_itself() {
        let fetcher = NearestZone::new(wiki_with_chain());
        let zone = fetcher.fetch(&DocumentId(1)).await.unwrap().flatten();
        assert_eq!(zone.map(|z| z.document), Some(DocumentId(1)));
    }

    #[tokio::test]
    async fn test_zone_found_through_parents() {
        let fetcher = NearestZone::new(wiki_with_chain());
        let zone = fetcher.fetch(&DocumentId(3)).await.unwrap().flatten();
        assert_eq!(zone.map(|z| z.document), Some(DocumentId(1)));
    }

    #[tokio::test]
    async fn test_walks_through_deleted_parents() {
        let wiki = wiki_with_chain();
        let mut parent = doc(2, "en-US", "Mozilla/Firefox", Some(1));
        parent.deleted = true;
        wiki.insert_document(parent);

        let fetcher = NearestZone::new(wiki);
        assert!(fetcher.fetch(&DocumentId(3)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cycle_has_no_zone() {
        let wiki = InMemoryWiki::new();
        wiki.insert_document(doc(1, "en-US", "A", Some(2)));
        wiki.insert_document(doc(2, "en-US", "B", Some(1)));

        let fetcher = NearestZone::new(Arc::new(wiki));
        assert_eq!(fetcher.fetch(&DocumentId(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_document_is_an_error() {
        let fetcher = NearestZone::new(Arc::new(InMemoryWiki::new()));
        let err = fetcher.fetch(&DocumentId(5)).await.unwrap_err();
        assert!(matches!(err, WikiError::DocumentNotFound(DocumentId(5))));
    }

    #[test]
    fn test_policy() {
        let policy = NearestZone::policy();
        assert_eq!(policy.namespace(), NAMESPACE);
        assert_eq!(policy.refresh_timeout(), Duration::from_secs(180));
        assert_eq!(policy.empty(), None);
    }
}
