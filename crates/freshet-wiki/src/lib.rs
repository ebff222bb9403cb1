//! # Freshet Wiki
//!
//! Cached computations over a documentation wiki, built on
//! [`freshet_jobs`]:
//!
//! | Job | Args | Value |
//! |-----|------|-------|
//! | [`NearestZone`] | document | zone of the closest ancestor, if any |
//! | [`ZoneUrlRemaps`] | locale | `(/docs/{slug}, /{url_root})` rewrites |
//! | [`DocumentContributors`] | document | active authors, most recent first |
//! | [`DocumentCodeSample`] | document, section | first html/css/js blocks |
//! | [`DocumentTags`] | document | sorted tag names |
//!
//! Wiki data comes from a [`WikiSource`]. [`InMemoryWiki`] serves it from
//! memory or from a YAML/JSON fixture file.
//!
//! ## Example
//!
//! ```ignore
//! let wiki = Arc::new(InMemoryWiki::load("wiki.yaml")?);
//! let jobs = WikiJobs::new(wiki, JobRuntime::new(Arc::new(MemoryStore::default())));
//!
//! let zone = jobs.nearest_zone.get(&DocumentId(42)).await?;
//! ```

pub mod avatar;
pub mod error;
pub mod jobs;
pub mod model;
pub mod source;

#[cfg(test)]
mod test_support;

// Re-exports
pub use avatar::{CONTRIBUTOR_AVATAR_SIZE, avatar_url};
pub use error::{WikiError, WikiResult};
pub use jobs::{
    CodeSample, DocumentCodeSample, DocumentContributors, DocumentTags, NearestZone, WikiJobs,
    ZoneUrlRemaps,
};
pub use model::{
    CodeBlock, Contributor, Document, DocumentId, DocumentZone, Revision, Section, User, UserId,
    UrlRemap,
};
pub use source::{FixtureFormat, InMemoryWiki, WikiData, WikiSource};
