// SPDX-License-Identifier: CC0-1.0

//! The `path[line]` tag printed in front of debug output.

use std::fmt;
use std::panic::Location;
use std::path::PathBuf;

use crate::path_utils::resolve_source_path;

/// Where a debug call happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTag {
    /// Display path of the source file.
    pub path: PathBuf,
    /// Line number.
    pub line: u32,
}

impl LocationTag {
    /// Tag with an already resolved path.
    pub fn new(path: impl Into<PathBuf>, line: u32) -> Self { Self { path: path.into(), line } }

    /// Tag for a compiler-recorded `file` and `line`, shortened against the
    /// current working directory.
    pub fn resolve(file: &str, line: u32) -> Self {
        let cwd = std::env::current_dir().ok();
        Self { path: resolve_source_path(file, cwd.as_deref()), line }
    }

    /// Tag for a caller location.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self::resolve(location.file(), location.line())
    }
}

impl fmt::Display for LocationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.path.display(), self.line)
    }
}
