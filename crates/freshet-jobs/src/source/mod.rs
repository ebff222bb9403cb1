//! Fetch callback abstraction.
//!
//! A job's fetch callback computes the value for one set of arguments. It is
//! the only place where a job touches its backing data.

mod func;
mod traits;

pub use func::{FnFetch, fetch_fn};
pub use traits::Fetch;
