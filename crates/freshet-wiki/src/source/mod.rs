//! Wiki data source abstraction.
//!
//! Jobs read documents, zones, revisions and users only through
//! [`WikiSource`]; how they are stored is up to the implementation.

mod fixture;
mod memory;
mod traits;

pub use fixture::{FixtureFormat, WikiData};
pub use memory::InMemoryWiki;
pub use traits::WikiSource;
