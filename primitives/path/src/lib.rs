// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Source path utilities for location tags.
//!
//! This module resolves the file paths the compiler records for a call site,
//! shortens them relative to the working directory, and pairs them with a
//! line number as a [`LocationTag`].

pub mod location;
pub mod path_utils;

// Re-export for convenience
pub use location::LocationTag;
pub use path_utils::*;
