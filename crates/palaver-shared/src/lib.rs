//! # palaver-shared
//!
//! Identifiers, closed enumerations and formatting helpers used by both the
//! conversation store and whatever renders it.

pub mod constants;
pub mod error;
pub mod format;
pub mod types;

pub use error::SharedError;
pub use types::*;
