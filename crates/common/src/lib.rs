//! Shared error definitions and helpers used across the parley crates.

pub mod error;

pub use error::{Error, FromMessage, Result};
