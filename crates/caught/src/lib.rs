//! Capture raised failures as values.
//!
//! A thin adapter over Rust's two failure channels: a call that returns
//! `Err` and a call that panics are both captured into a [`Caught<T>`]
//! instead of propagating, and a small set of accessors consume that value —
//! extract it, substitute a default, or transform it while keeping a captured
//! failure untouched.
//!
//! ```
//! use caught::{get_or_default, run_catching};
//!
//! let doubled = run_catching(|| "10".parse::<i32>().map(|n| n * 2));
//! assert_eq!(get_or_default(doubled, -1), 20);
//!
//! let failed = run_catching(|| "".parse::<i32>().map(|n| n * 2));
//! assert_eq!(get_or_default(failed, -1), -1);
//! ```
//!
//! The async surface mirrors the sync one and suspends only where the
//! wrapped work does: inside [`async_run_catching`], on the failure branch of
//! [`get_or_else_async`], and on the success branch of [`map_result_async`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod catching;
pub mod error;
pub mod ext;

pub use catching::{
    Caught, async_run_catching, get_or_default, get_or_else, get_or_else_async, get_or_none,
    get_or_throw, map_result, map_result_async, run_catching,
};
pub use error::{BoxError, CaughtError};
pub use ext::CaughtExt;
