//! In-memory wiki source.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::info;

use super::{WikiData, WikiSource};
use crate::error::{WikiError, WikiResult};
use crate::model::{Document, DocumentId, DocumentZone, Revision, User, UserId};

#[derive(Debug, Default)]
struct Tables {
    documents: IndexMap<DocumentId, Document>,
    zones: IndexMap<DocumentId, DocumentZone>,
    revisions: Vec<Revision>,
    users: IndexMap<UserId, User>,
}

/// A wiki held in memory.
///
/// Thread-safe; writes are visible to subsequent reads. Can be taken
/// offline to simulate an unavailable backend.
#[derive(Debug, Default)]
pub struct InMemoryWiki {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl InMemoryWiki {
    /// Creates an empty wiki.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a wiki holding `data`. Later records win on duplicate ids.
    pub fn from_data(data: WikiData) -> Self {
        let wiki = Self::new();
        {
            let mut tables = wiki.tables.write();
            for document in data.documents {
                tables.documents.insert(document.id, document);
            }
            for zone in data.zones {
                tables.zones.insert(zone.document, zone);
            }
            for user in data.users {
                tables.users.insert(user.id, user);
            }
            tables.revisions = data.revisions;
        }
        wiki
    }

    /// Loads a wiki from a JSON or YAML fixture file.
    pub fn load(path: impl AsRef<Path>) -> WikiResult<Self> {
        let path = path.as_ref();
        let wiki = Self::from_data(WikiData::load(path)?);

        info!(
            path = %path.display(),
            documents = wiki.tables.read().documents.len(),
            "Loaded wiki fixture"
        );
        Ok(wiki)
    }

    /// Inserts or replaces a document.
    pub fn insert_document(&self, document: Document) {
        self.tables.write().documents.insert(document.id, document);
    }

    /// Inserts or replaces the zone rooted at `zone.document`.
    pub fn insert_zone(&self, zone: DocumentZone) {
        self.tables.write().zones.insert(zone.document, zone);
    }

    /// Adds a revision.
    pub fn add_revision(&self, revision: Revision) {
        self.tables.write().revisions.push(revision);
    }

    /// Inserts or replaces a user.
    pub fn insert_user(&self, user: User) {
        self.tables.write().users.insert(user.id, user);
    }

    /// Makes every read fail with `SourceUnavailable` while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> WikiResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(WikiError::unavailable("in-memory wiki is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl WikiSource for InMemoryWiki {
    async fn document(&self, id: DocumentId) -> WikiResult<Option<Document>> {
        self.check_online()?;
        Ok(self.tables.read().documents.get(&id).cloned())
    }

    async fn document_ids(&self) -> WikiResult<Vec<DocumentId>> {
        self.check_online()?;
        Ok(self
            .tables
            .read()
            .documents
            .values()
            .filter(|document| !document.deleted)
            .map(|document| document.id)
            .collect())
    }

    async fn zone(&self, document: DocumentId) -> WikiResult<Option<DocumentZone>> {
        self.check_online()?;
        Ok(self.tables.read().zones.get(&document).cloned())
    }

    async fn zones_in_locale(&self, locale: &str) -> WikiResult<Vec<(Document, DocumentZone)>> {
        self.check_online()?;
        let tables = self.tables.read();

        Ok(tables
            .zones
            .values()
            .filter_map(|zone| {
                tables
                    .documents
                    .get(&zone.document)
                    .filter(|document| document.locale == locale)
                    .map(|document| (document.clone(), zone.clone()))
            })
            .collect())
    }

    async fn revisions(&self, document: DocumentId) -> WikiResult<Vec<Revision>> {
        self.check_online()?;
        let tables = self.tables.read();

        if !tables.documents.contains_key(&document) {
            return Err(WikiError::DocumentNotFound(document));
        }

        Ok(tables
            .revisions
            .iter()
            .filter(|revision| revision.document == document)
            .cloned()
            .collect())
    }

    async fn users(&self, ids: &[UserId]) -> WikiResult<Vec<User>> {
        self.check_online()?;
        let tables = self.tables.read();

        Ok(tables
            .users
            .values()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn document(id: u64, locale: &str, slug: &str) -> Document {
        Document {
            id: DocumentId(id),
            locale: locale.to_string(),
            slug: slug.to_string(),
            title: String::new(),
            parent_topic: None,
            deleted: false,
            tags: vec![],
            sections: vec![],
        }
    }

    #[tokio::test]
    async fn test_documents_include_deleted() {
        let wiki = InMemoryWiki::new();
        let mut gone = document(2, "en-US", "Gone");
        gone.deleted = true;
        wiki.insert_document(document(1, "en-US", "Live"));
        wiki.insert_document(gone);

        assert!(wiki.document(DocumentId(2)).await.unwrap().is_some());
        assert_eq!(wiki.document_ids().await.unwrap(), vec![DocumentId(1)]);
    }

    #[tokio::test]
    async fn test_zones_in_locale() {
        let wiki = InMemoryWiki::new();
        wiki.insert_document(document(1, "en-US", "Mozilla"));
        wiki.insert_document(document(2, "fr", "Mozilla"));
        for id in [1, 2] {
            wiki.insert_zone(DocumentZone {
                document: DocumentId(id),
                url_root: Some("mozilla".to_string()),
                styles: None,
            });
        }

        let zones = wiki.zones_in_locale("fr").await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].0.id, DocumentId(2));
    }

    #[tokio::test]
    async fn test_revisions_of_missing_document() {
        let wiki = InMemoryWiki::new();

        let err = wiki.revisions(DocumentId(9)).await.unwrap_err();
        assert!(matches!(err, WikiError::DocumentNotFound(DocumentId(9))));
    }

    #[tokio::test]
    async fn test_revisions_are_filtered_by_document() {
        let wiki = InMemoryWiki::new();
        wiki.insert_document(document(1, "en-US", "A"));
        wiki.insert_document(document(2, "en-US", "B"));
        for (id, doc) in [(10, 1), (11, 2), (12, 1)] {
            wiki.add_revision(Revision {
                id,
                document: DocumentId(doc),
                creator: UserId(7),
                created: SystemTime::UNIX_EPOCH + Duration::from_secs(id),
            });
        }

        let ids: Vec<u64> = wiki
            .revisions(DocumentId(1))
            .await
            .unwrap()
            .iter()
            .map(|revision| revision.id)
            .collect();
        assert_eq!(ids, vec![10, 12]);
    }

    #[tokio::test]
    async fn test_users_lookup_skips_unknown_ids() {
        let wiki = InMemoryWiki::new();
        wiki.insert_user(User {
            id: UserId(3),
            username: "kuma".to_string(),
            email: "kuma@example.com".to_string(),
            is_active: true,
        });

        let users = wiki.users(&[UserId(3), UserId(4)]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "kuma");
    }

    #[tokio::test]
    async fn test_offline_source_is_unavailable() {
        let wiki = InMemoryWiki::new();
        wiki.set_offline(true);

        let err = wiki.document(DocumentId(1)).await.unwrap_err();
        assert!(err.is_transient());

        wiki.set_offline(false);
        assert!(wiki.document(DocumentId(1)).await.unwrap().is_none());
    }

    #[test]
    fn test_from_data_later_records_win() {
        let data = WikiData {
            documents: vec![document(1, "en-US", "Old"), document(1, "en-US", "New")],
            ..WikiData::default()
        };

        let wiki = InMemoryWiki::from_data(data);
        assert_eq!(wiki.tables.read().documents[&DocumentId(1)].slug, "New");
    }
}
