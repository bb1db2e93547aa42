//! Client side of the read-only run API.

pub mod client;
pub mod error;

pub use client::{ApiClient, RowWindow, RunSource};
pub use error::{FetchError, FetchResult};
