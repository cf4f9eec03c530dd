//! Free functions that wrap calls and consume captured results.
//!
//! [`run_catching`] and [`async_run_catching`] turn a raised failure into a
//! value; the `get_or_*` accessors consume that value exactly once; the
//! `map_result*` transforms rewrite the success payload while passing a
//! captured failure through untouched.

use std::{
    future::Future,
    panic::{self, AssertUnwindSafe},
};

use futures_util::FutureExt as _;
use tracing::debug;

use crate::error::CaughtError;

/// Either a success payload or a captured failure.
pub type Caught<T> = Result<T, CaughtError>;

/// Invokes `op` and captures whatever it raises.
///
/// A normal return passes through as `Ok`. An `Err` return and a panic are
/// both captured as a [`CaughtError`] instead of propagating. Side effects of
/// `op` itself are not suppressed, only the unwinding is intercepted.
///
/// The call site is wrapped in `AssertUnwindSafe`: the outcome is returned
/// immediately and nothing `op` touched is observed after a capture.
///
/// ```
/// use caught::run_catching;
///
/// let doubled = run_catching(|| "10".parse::<i32>().map(|n| n * 2));
/// assert_eq!(doubled.unwrap(), 20);
///
/// let failed = run_catching(|| "".parse::<i32>().map(|n| n * 2));
/// assert!(failed.is_err());
/// ```
pub fn run_catching<T, E, F>(op: F) -> Caught<T>
where
    F: FnOnce() -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            debug!(%error, "captured error from wrapped call");
            Err(CaughtError::new(error))
        }
        Err(payload) => {
            let caught = CaughtError::from_panic(payload);
            debug!(error = %caught, "captured panic from wrapped call");
            Err(caught)
        }
    }
}

/// Awaits `fut` and captures whatever it raises, like [`run_catching`] for an
/// asynchronous call. Panics raised while the future is polled are captured
/// as well.
pub async fn async_run_catching<T, E, Fut>(fut: Fut) -> Caught<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            debug!(%error, "captured error from wrapped future");
            Err(CaughtError::new(error))
        }
        Err(payload) => {
            let caught = CaughtError::from_panic(payload);
            debug!(error = %caught, "captured panic from wrapped future");
            Err(caught)
        }
    }
}

/// Returns the success payload, or raises the captured failure again.
///
/// This is the single point that converts a captured failure back into
/// control flow; see [`CaughtError::rethrow`] for how identity is preserved.
pub fn get_or_throw<T>(result: Caught<T>) -> T {
    match result {
        Ok(value) => value,
        Err(caught) => caught.rethrow(),
    }
}

/// Returns the success payload, or `None` for a captured failure.
pub fn get_or_none<T>(result: Caught<T>) -> Option<T> {
    result.ok()
}

/// Returns the success payload, or `default` for a captured failure. The
/// default is evaluated eagerly by the caller.
pub fn get_or_default<T>(result: Caught<T>, default: T) -> T {
    result.unwrap_or(default)
}

/// Returns the success payload, or invokes `fallback` with the captured
/// failure. The fallback is never invoked on success.
pub fn get_or_else<T, F>(result: Caught<T>, fallback: F) -> T
where
    F: FnOnce(CaughtError) -> T,
{
    result.unwrap_or_else(fallback)
}

/// Asynchronous [`get_or_else`]: suspends only on the failure branch, a
/// success payload is returned without awaiting anything.
pub async fn get_or_else_async<T, F, Fut>(result: Caught<T>, fallback: F) -> T
where
    F: FnOnce(CaughtError) -> Fut,
    Fut: Future<Output = T>,
{
    match result {
        Ok(value) => value,
        Err(caught) => fallback(caught).await,
    }
}

/// Transforms the success payload under capture: a `transform` that raises is
/// captured rather than propagated. A captured failure is passed through
/// untouched and `transform` is never invoked for it.
pub fn map_result<T, U, E, F>(result: Caught<T>, transform: F) -> Caught<U>
where
    F: FnOnce(T) -> Result<U, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    match result {
        Ok(value) => run_catching(|| transform(value)),
        Err(caught) => Err(caught),
    }
}

/// Asynchronous [`map_result`]: suspends only on the success branch, a
/// captured failure is returned immediately.
pub async fn map_result_async<T, U, E, F, Fut>(result: Caught<T>, transform: F) -> Caught<U>
where
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<U, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    match result {
        Ok(value) => async_run_catching(async move { transform(value).await }).await,
        Err(caught) => Err(caught),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{convert::Infallible, num::ParseIntError};
    use test_case::test_case;

    fn parse_doubled(input: &str) -> Result<i32, ParseIntError> {
        input.parse::<i32>().map(|n| n * 2)
    }

    async fn parse_doubled_async(input: &str) -> Result<i32, ParseIntError> {
        parse_doubled(input)
    }

    #[test]
    fn run_catching_passes_a_return_through() {
        assert_eq!(run_catching(|| parse_doubled("10")).unwrap(), 20);
    }

    #[test]
    fn run_catching_captures_an_err_return() {
        let caught = run_catching(|| parse_doubled("")).unwrap_err();
        assert!(!caught.is_panic());
        assert!(caught.downcast_ref::<ParseIntError>().is_some());
    }

    #[test]
    fn run_catching_captures_a_panic() {
        let caught =
            run_catching(|| -> Result<i32, Infallible> { panic!("boom") }).unwrap_err();
        assert!(caught.is_panic());
        assert_eq!(caught.panic_message(), Some("boom"));
    }

    #[test]
    fn run_catching_does_not_suppress_side_effects() {
        let mut calls = 0;
        let caught = run_catching(|| {
            calls += 1;
            parse_doubled("")
        });
        assert!(caught.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn get_or_throw_returns_the_payload() {
        assert_eq!(get_or_throw(run_catching(|| parse_doubled("21"))), 42);
    }

    #[test]
    fn get_or_throw_rethrows_with_identity_preserved() {
        let result = run_catching(|| parse_doubled(""));
        let payload =
            panic::catch_unwind(AssertUnwindSafe(|| get_or_throw(result))).unwrap_err();
        let rethrown = payload.downcast::<crate::BoxError>().unwrap();
        assert!(rethrown.downcast_ref::<ParseIntError>().is_some());
    }

    #[test]
    fn get_or_throw_resumes_a_captured_panic() {
        let result = run_catching(|| -> Result<i32, Infallible> { panic!("kept intact") });
        let payload =
            panic::catch_unwind(AssertUnwindSafe(|| get_or_throw(result))).unwrap_err();
        assert_eq!(*payload.downcast_ref::<&str>().unwrap(), "kept intact");
    }

    #[test_case("10", Some(20); "success payload")]
    #[test_case("", None; "captured failure")]
    fn get_or_none_cases(input: &str, expected: Option<i32>) {
        assert_eq!(get_or_none(run_catching(|| parse_doubled(input))), expected);
    }

    #[test_case("10", 20; "success payload")]
    #[test_case("", -1; "captured failure")]
    fn get_or_default_cases(input: &str, expected: i32) {
        assert_eq!(
            get_or_default(run_catching(|| parse_doubled(input)), -1),
            expected,
        );
    }

    #[test]
    fn get_or_else_hands_the_failure_to_the_fallback() {
        let value = get_or_else(run_catching(|| parse_doubled("")), |caught| {
            assert!(caught.downcast_ref::<ParseIntError>().is_some());
            -1
        });
        assert_eq!(value, -1);
    }

    #[test]
    fn get_or_else_never_invokes_the_fallback_on_success() {
        let mut invoked = false;
        let value = get_or_else(run_catching(|| parse_doubled("5")), |_| {
            invoked = true;
            -1
        });
        assert_eq!(value, 10);
        assert!(!invoked);
    }

    #[test]
    fn map_result_transforms_the_payload() {
        let mapped = map_result(run_catching(|| parse_doubled("10")), |n| {
            Ok::<_, Infallible>(n.to_string())
        });
        assert_eq!(mapped.unwrap(), "20");
    }

    #[test]
    fn map_result_captures_a_raising_transform() {
        let mapped = map_result(run_catching(|| parse_doubled("10")), |_| {
            "again".parse::<i32>()
        });
        assert!(mapped.unwrap_err().downcast_ref::<ParseIntError>().is_some());

        let mapped = map_result(
            run_catching(|| parse_doubled("10")),
            |_| -> Result<i32, Infallible> { panic!("transform boom") },
        );
        assert!(mapped.unwrap_err().is_panic());
    }

    #[test]
    fn map_result_passes_a_failure_through_untouched() {
        let message = run_catching(|| parse_doubled("")).unwrap_err().to_string();
        let mut invoked = false;
        let mapped = map_result(run_catching(|| parse_doubled("")), |n| {
            invoked = true;
            Ok::<_, Infallible>(n + 1)
        });
        let caught = mapped.unwrap_err();
        assert!(!invoked);
        assert_eq!(caught.to_string(), message);
        assert!(caught.downcast_ref::<ParseIntError>().is_some());
    }

    #[tokio::test]
    async fn async_run_catching_mirrors_the_sync_semantics() {
        assert_eq!(
            async_run_catching(parse_doubled_async("10")).await.unwrap(),
            20,
        );

        let caught = async_run_catching(parse_doubled_async("")).await.unwrap_err();
        assert!(caught.downcast_ref::<ParseIntError>().is_some());

        async fn async_boom() -> Result<i32, Infallible> {
            panic!("async boom")
        }
        let caught = async_run_catching(async_boom()).await.unwrap_err();
        assert!(caught.is_panic());
        assert_eq!(caught.panic_message(), Some("async boom"));
    }

    #[tokio::test]
    async fn get_or_else_async_suspends_only_on_failure() {
        let value = get_or_else_async(run_catching(|| parse_doubled("10")), |_| async {
            unreachable!("fallback must not run on success")
        })
        .await;
        assert_eq!(value, 20);

        let value = get_or_else_async(run_catching(|| parse_doubled("")), |caught| async move {
            assert!(caught.downcast_ref::<ParseIntError>().is_some());
            -1
        })
        .await;
        assert_eq!(value, -1);
    }

    #[tokio::test]
    async fn map_result_async_suspends_only_on_success() {
        let mapped = map_result_async(run_catching(|| parse_doubled("10")), |n| async move {
            parse_doubled_async(&n.to_string()).await
        })
        .await;
        assert_eq!(mapped.unwrap(), 40);

        let mut invoked = false;
        let mapped = map_result_async(run_catching(|| parse_doubled("")), |n| {
            invoked = true;
            async move { Ok::<_, Infallible>(n + 1) }
        })
        .await;
        assert!(mapped.unwrap_err().downcast_ref::<ParseIntError>().is_some());
        assert!(!invoked);
    }

    #[tokio::test]
    async fn map_result_async_captures_a_panicking_transform() {
        let mapped = map_result_async(
            run_catching(|| parse_doubled("10")),
            |_| -> std::future::Ready<Result<i32, Infallible>> { panic!("transform boom") },
        )
        .await;
        assert!(mapped.unwrap_err().is_panic());
    }
}
