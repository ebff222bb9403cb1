//! Live code samples embedded in documents.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use freshet_jobs::{Fetch, JobPolicy, Lifetime};
use indexmap::IndexMap;

use super::live_document;
use crate::error::{WikiError, WikiResult};
use crate::model::DocumentId;
use crate::source::WikiSource;

pub const NAMESPACE: &str = "wiki.document_code_sample";

/// Languages a code sample is assembled from, in output order.
pub const SAMPLE_LANGUAGES: [&str; 3] = ["html", "css", "js"];

/// A code sample: language to source.
pub type CodeSample = IndexMap<String, String>;

/// Extracts the code sample of a named document section.
///
/// The first block of each sample language is used; other languages are
/// ignored. Cached per document generation, so saving a document can drop
/// all of its samples at once.
pub struct DocumentCodeSample {
    source: Arc<dyn WikiSource>,
}

impl DocumentCodeSample {
    pub fn new(source: Arc<dyn WikiSource>) -> Self {
        Self { source }
    }

    pub fn policy() -> JobPolicy<CodeSample> {
        JobPolicy::new(NAMESPACE)
            .with_lifetime(Lifetime::Fixed(Duration::from_secs(12 * 60 * 60)))
            .with_refresh_timeout(Duration::from_secs(60))
            .generational(1)
    }
}

#[async_trait]
impl Fetch for DocumentCodeSample {
    type Args = (DocumentId, String);
    type Output = CodeSample;
    type Error = WikiError;

    async fn fetch(&self, args: &(DocumentId, String)) -> WikiResult<Option<CodeSample>> {
        let (id, name) = args;
        let document = live_document(self.source.as_ref(), *id).await?;

        let Some(section) = document.section(name) else {
            return Ok(None);
        };

        let sample: CodeSample = SAMPLE_LANGUAGES
            .iter()
            .filter_map(|language| {
                section
                    .code_blocks
                    .iter()
                    .find(|block| block.language.eq_ignore_ascii_case(language))
                    .map(|block| (language.to_string(), block.source.clone()))
            })
            .collect();

        Ok((!sample.is_empty()).then_some(sample))
    }
}
