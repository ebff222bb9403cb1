//! Wiki source trait definition.

use async_trait::async_trait;

use crate::error::WikiResult;
use crate::model::{Document, DocumentId, DocumentZone, Revision, User, UserId};

/// Read access to wiki documents and accounts.
///
/// # Implementors
///
/// - `InMemoryWiki` - Holds the data in memory, loadable from fixtures
///
/// # Example
///
/// ```ignore
/// use freshet_wiki::WikiSource;
///
/// struct DatabaseWiki { /* ... */ }
///
/// #[async_trait]
/// impl WikiSource for DatabaseWiki {
///     async fn document(&self, id: DocumentId) -> WikiResult<Option<Document>> {
///         // Implementation here
///     }
///
///     // ...
/// }
/// ```
#[async_trait]
pub trait WikiSource: Send + Sync {
    /// Returns the document with the given id, deleted documents included.
    async fn document(&self, id: DocumentId) -> WikiResult<Option<Document>>;

    /// Returns the ids of all live documents.
    async fn document_ids(&self) -> WikiResult<Vec<DocumentId>>;

    /// Returns the zone rooted at the given document, if any.
    async fn zone(&self, document: DocumentId) -> WikiResult<Option<DocumentZone>>;

    /// Returns every zone whose document is in `locale`, with that document.
    async fn zones_in_locale(&self, locale: &str) -> WikiResult<Vec<(Document, DocumentZone)>>;

    /// Returns the revisions of a document, in no particular order.
    ///
    /// # Errors
    ///
    /// - `WikiError::DocumentNotFound` if the document doesn't exist
    async fn revisions(&self, document: DocumentId) -> WikiResult<Vec<Revision>>;

    /// Returns the accounts among `ids` that exist, in no particular order.
    async fn users(&self, ids: &[UserId]) -> WikiResult<Vec<User>>;

    /// Returns the name of this source, for logging.
    fn name(&self) -> &str;
}
