//! Closure adapter for [`Fetch`].

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use freshet_core::KeyArgs;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::Fetch;

/// A [`Fetch`] backed by an async closure. Built with [`fetch_fn`].
pub struct FnFetch<Func, A, T, E> {
    func: Func,
    _types: PhantomData<fn(A) -> (T, E)>,
}

/// Wraps an async closure as a fetch callback.
///
/// The closure receives an owned clone of the arguments.
///
/// # Examples
///
/// ```
/// use freshet_jobs::{Fetch, fetch_fn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let double = fetch_fn(|n: u64| async move { Ok::<_, std::io::Error>(Some(n * 2)) });
/// assert_eq!(double.fetch(&21).await.unwrap(), Some(42));
/// # }
/// ```
pub fn fetch_fn<Func, Fut, A, T, E>(func: Func) -> FnFetch<Func, A, T, E>
where
    Func: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
{
    FnFetch {
        func,
        _types: PhantomData,
    }
}

#[async_trait]
impl<Func, Fut, A, T, E> Fetch for FnFetch<Func, A, T, E>
where
    Func: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
    A: KeyArgs + Clone + Send + Sync + 'static,
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Args = A;
    type Output = T;
    type Error = E;

    async fn fetch(&self, args: &A) -> Result<Option<T>, E> {
        (self.func)(args.clone()).await
    }
}
