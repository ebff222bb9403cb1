use crate::model::{Document, DocumentId};

pub(crate) fn doc(id: u64, locale: &str, slug: &str, parent: Option<u64>) -> Document {
    Document {
        id: DocumentId(id),
        locale: locale.to_string(),
        slug: slug.to_string(),
        title: slug.rsplit('/').next().unwrap_or(slug).to_string(),
        parent_topic: parent.map(DocumentId),
        deleted: false,
        tags: vec![],
        sections: vec![],
    }
}
