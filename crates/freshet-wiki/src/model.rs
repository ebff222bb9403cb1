//! Wiki domain types.

use std::fmt;
use std::time::SystemTime;

use freshet_core::{KeyArg, KeyArgs};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for KeyArg {
            fn from(id: $name) -> Self {
                KeyArg::UInt(id.0)
            }
        }

        impl KeyArgs for $name {
            fn key_args(&self) -> Vec<KeyArg> {
                vec![KeyArg::from(*self)]
            }
        }
    };
}

id_type!(
    /// Primary key of a document.
    DocumentId
);

id_type!(
    /// Primary key of a user account.
    UserId
);

/// A wiki document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub locale: String,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    /// Parent in the topic hierarchy.
    #[serde(default)]
    pub parent_topic: Option<DocumentId>,
    /// Deleted documents stay readable through the data source.
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Document {
    /// Returns the section with the given id.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }
}

/// A named part of a document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub code_blocks: Vec<CodeBlock>,
}

/// A code listing inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Syntax brush, e.g. `html`, `css` or `js`.
    pub language: String,
    pub source: String,
}

/// A document that roots a zone: a subtree with its own URL and styles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentZone {
    pub document: DocumentId,
    /// Custom URL root, without the leading slash.
    #[serde(default)]
    pub url_root: Option<String>,
    #[serde(default)]
    pub styles: Option<String>,
}

impl DocumentZone {
    /// Returns the URL root if it is set and non-empty.
    pub fn effective_url_root(&self) -> Option<&str> {
        self.url_root.as_deref().filter(|root| !root.is_empty())
    }
}

/// One saved revision of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: u64,
    pub document: DocumentId,
    pub creator: UserId,
    #[serde(with = "humantime_serde")]
    pub created: SystemTime,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A recent author of a document, as shown in the contributor bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
}

/// A `(from, to)` URL path rewrite.
pub type UrlRemap = (String, String);
