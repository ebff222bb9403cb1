//! Recent contributors of a document.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use freshet_jobs::{Fetch, JobPolicy, Lifetime};
use indexmap::IndexSet;

use super::live_document;
use crate::avatar::{CONTRIBUTOR_AVATAR_SIZE, avatar_url};
use crate::error::{WikiError, WikiResult};
use crate::model::{Contributor, DocumentId, UserId};
use crate::source::WikiSource;

pub const NAMESPACE: &str = "wiki.document_contributors";

/// Lists the active authors of a document's revisions, most recent first.
///
/// Each author appears once, at the position of their latest revision.
/// Account changes are not tracked; a stale entry lives until it expires.
pub struct DocumentContributors {
    source: Arc<dyn WikiSource>,
}

impl DocumentContributors {
    pub fn new(source: Arc<dyn WikiSource>) -> Self {
        Self { source }
    }

    /// Version 2; refreshed in the background and skipped in maintenance
    /// mode.
    pub fn policy() -> JobPolicy<Vec<Contributor>> {
        JobPolicy::new(NAMESPACE)
            .with_version(2)
            .with_lifetime(Lifetime::Fixed(Duration::from_secs(12 * 60 * 60)))
            .with_refresh_timeout(Duration::from_secs(30))
            .with_fetch_on_miss(false)
            .skip_in_maintenance()
    }
}

#[async_trait]
impl Fetch for DocumentContributors {
    type Args = DocumentId;
    type Output = Vec<Contributor>;
    type Error = WikiError;

    async fn fetch(&self, id: &DocumentId) -> WikiResult<Option<Vec<Contributor>>> {
        live_document(self.source.as_ref(), *id).await?;

        let mut revisions = self.source.revisions(*id).await?;
        if revisions.is_empty() {
            return Ok(None);
        }
        revisions.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));

        let creators: IndexSet<UserId> = revisions.iter().map(|revision| revision.creator).collect();
        let ids: Vec<UserId> = creators.iter().copied().collect();

        let mut active: HashMap<UserId, _> = self
            .source
            .users(&ids)
            .await?
            .into_iter()
            .filter(|user| user.is_active)
            .map(|user| (user.id, user))
            .collect();

        let contributors = ids
            .iter()
            .filter_map(|id| active.remove(id))
            .map(|user| Contributor {
                avatar_url: avatar_url(&user.email, CONTRIBUTOR_AVATAR_SIZE),
                id: user.id,
                username: user.username,
                email: user.email,
            })
            .collect();

        Ok(Some(contributors))
    }
}
