//! URL remaps of zones with a custom root.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use freshet_jobs::{Fetch, JobPolicy, Lifetime};

use crate::error::{WikiError, WikiResult};
use crate::model::UrlRemap;
use crate::source::WikiSource;

pub const NAMESPACE: &str = "wiki.document_zone_url_remaps";

/// Lists `(/docs/{slug}, /{url_root})` rewrites for the zones of a locale.
///
/// Zones without a URL root, or with an empty one, are skipped.
pub struct ZoneUrlRemaps {
    source: Arc<dyn WikiSource>,
}

impl ZoneUrlRemaps {
    pub fn new(source: Arc<dyn WikiSource>) -> Self {
        Self { source }
    }

    pub fn policy() -> JobPolicy<Vec<UrlRemap>> {
        JobPolicy::new(NAMESPACE)
            .with_lifetime(Lifetime::Fixed(Duration::from_secs(3 * 60 * 60)))
            .with_refresh_timeout(Duration::from_secs(60))
    }
}

#[async_trait]
impl Fetch for ZoneUrlRemaps {
    type Args = String;
    type Output = Vec<UrlRemap>;
    type Error = WikiError;

    async fn fetch(&self, locale: &String) -> WikiResult<Option<Vec<UrlRemap>>> {
        let remaps = self
            .source
            .zones_in_locale(locale)
            .await?
            .into_iter()
            .filter_map(|(document, zone)| {
                zone.effective_url_root()
                    .map(|root| (format!("/docs/{}", document.slug), format!("/{}", root)))
            })
            .collect();

        Ok(Some(remaps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentId, DocumentZone};
    use crate::source::InMemoryWiki;
    use crate::test_support::doc;

    #[tokio::test]
    async fn test_remaps_for_locale() {
        let wiki = InMemoryWiki::new();
        wiki.insert_document(doc(1, "en-US", "Mozilla", None));
        wiki.insert_document(doc(2, "en-US", "Mozilla/Marketplace", None));
        wiki.insert_document(doc(3, "en-US", "Mozilla/Persona", None));
        wiki.insert_document(doc(4, "de", "Mozilla", None));
        for (id, root) in [(1, Some("mozilla")), (2, Some("")), (3, None), (4, Some("mozilla"))] {
            wiki.insert_zone(DocumentZone {
                document: DocumentId(id),
                url_root: root.map(str::to_string),
                styles: None,
            });
        }

        let fetcher = ZoneUrlRemaps::new(Arc::new(wiki));
        let remaps = fetcher.fetch(&"en-US".to_string()).await.unwrap().unwrap();

        assert_eq!(
            remaps,
            vec![("/docs/Mozilla".to_string(), "/mozilla".to_string())]
        );
    }

    #[tokio::test]
    async fn test_locale_without_zones() {
        let fetcher = ZoneUrlRemaps::new(Arc::new(InMemoryWiki::new()));
        let remaps = fetcher.fetch(&"fr".to_string()).await.unwrap();
        assert_eq!(remaps, Some(vec![]));
    }

    #[test]
    fn test_policy() {
        let policy = ZoneUrlRemaps::policy();
        assert_eq!(
            policy.lifetime(),
            Lifetime::Fixed(Duration::from_secs(3 * 60 * 60))
        );
        assert_eq!(policy.refresh_timeout(), Duration::from_secs(60));
        assert!(policy.empty().is_empty());
    }
}
