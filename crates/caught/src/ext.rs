//! Method-chaining combinators over [`Caught`] values.

use std::{
    future::Future,
    panic::{self, AssertUnwindSafe},
};

use futures_util::FutureExt as _;

use crate::{
    catching::{Caught, map_result, map_result_async},
    error::CaughtError,
};

/// Combinators that keep a chain of fallible steps under capture.
///
/// Std `Result` already covers the non-capturing operations (`map`,
/// `unwrap_or`, `ok` and friends); this trait adds the forms where a raising
/// step is captured instead of propagated. The async forms suspend only on
/// the success branch.
#[allow(async_fn_in_trait)]
pub trait CaughtExt<T>: Sized {
    /// Method form of [`map_result`].
    fn map_catching<U, E, F>(self, transform: F) -> Caught<U>
    where
        F: FnOnce(T) -> Result<U, E>,
        E: std::error::Error + Send + Sync + 'static;

    /// Chains a step that itself returns a [`Caught`]; a step that raises is
    /// captured, and a captured failure skips the step entirely.
    fn and_then_catching<U, F>(self, next: F) -> Caught<U>
    where
        F: FnOnce(T) -> Caught<U>;

    /// Rewrites a captured failure through `map`; a mapper that raises is
    /// captured in its place. A success payload passes through untouched and
    /// the mapper is never invoked for it.
    fn map_err_catching<E, F>(self, map: F) -> Caught<T>
    where
        F: FnOnce(CaughtError) -> E,
        E: std::error::Error + Send + Sync + 'static;

    /// Method form of [`map_result_async`].
    async fn map_catching_async<U, E, F, Fut>(self, transform: F) -> Caught<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
        E: std::error::Error + Send + Sync + 'static;

    /// Asynchronous [`and_then_catching`].
    async fn and_then_catching_async<U, F, Fut>(self, next: F) -> Caught<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Caught<U>>;
}

impl<T> CaughtExt<T> for Caught<T> {
    fn map_catching<U, E, F>(self, transform: F) -> Caught<U>
    where
        F: FnOnce(T) -> Result<U, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        map_result(self, transform)
    }

    // Not expressible via `run_catching`: the step already returns a
    // `Caught`, so only the panic channel needs intercepting here.
    fn and_then_catching<U, F>(self, next: F) -> Caught<U>
    where
        F: FnOnce(T) -> Caught<U>,
    {
        match self {
            Ok(value) => match panic::catch_unwind(AssertUnwindSafe(|| next(value))) {
                Ok(result) => result,
                Err(payload) => Err(CaughtError::from_panic(payload)),
            },
            Err(caught) => Err(caught),
        }
    }

    fn map_err_catching<E, F>(self, map: F) -> Caught<T>
    where
        F: FnOnce(CaughtError) -> E,
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            Ok(value) => Ok(value),
            Err(caught) => match panic::catch_unwind(AssertUnwindSafe(|| map(caught))) {
                Ok(mapped) => Err(CaughtError::new(mapped)),
                Err(payload) => Err(CaughtError::from_panic(payload)),
            },
        }
    }

    async fn map_catching_async<U, E, F, Fut>(self, transform: F) -> Caught<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        map_result_async(self, transform).await
    }

    async fn and_then_catching_async<U, F, Fut>(self, next: F) -> Caught<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Caught<U>>,
    {
        match self {
            Ok(value) => {
                match AssertUnwindSafe(async move { next(value).await })
                    .catch_unwind()
                    .await
                {
                    Ok(result) => result,
                    Err(payload) => Err(CaughtError::from_panic(payload)),
                }
            }
            Err(caught) => Err(caught),
        }
    }
}
