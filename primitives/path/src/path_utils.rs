// SPDX-License-Identifier: CC0-1.0

//! Path utility functions for locating and shortening source files.
//!
//! `file!()` and [`std::panic::Location::file`] report paths relative to the
//! directory the compiler ran in, which for a workspace member is the
//! workspace root rather than the member's own directory. Resolving such a
//! path at run time therefore means searching upward from the working
//! directory.

use std::path::{Path, PathBuf};

/// Find the directory that `file` is relative to.
///
/// This function walks up the directory tree from `start` until it finds a
/// directory containing `file`.
///
/// # Returns
///
/// Returns the first ancestor of `start` (including `start` itself) for which
/// `ancestor.join(file)` is an existing file, or `None` if there is none.
pub fn find_source_root(file: &Path, start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(file).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Express `path` relative to `base` when it lies under it.
///
/// Both paths are compared component-wise as given; canonicalize them first
/// if symlinks may be involved.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().filter(|rest| !rest.as_os_str().is_empty()).map(Path::to_path_buf)
}

/// Resolve a compiler-recorded source path for display.
///
/// # Arguments
///
/// * `file` - Path as recorded by the compiler (relative or absolute)
/// * `cwd` - Working directory to resolve against, usually
///   [`std::env::current_dir`]
///
/// # Returns
///
/// The canonical path relative to `cwd` when the file lies under it, the
/// canonical absolute path when it lies elsewhere, and `file` unchanged when
/// it cannot be found on disk (or no working directory is available).
pub fn resolve_source_path(file: &str, cwd: Option<&Path>) -> PathBuf {
    let file_path = Path::new(file);
    let Some(cwd) = cwd.and_then(|dir| dir.canonicalize().ok()) else {
        return file_path.to_path_buf();
    };

    // Resolve relative paths against the first ancestor that contains them
    let absolute = if file_path.is_absolute() {
        file_path.to_path_buf()
    } else {
        match find_source_root(file_path, &cwd) {
            Some(root) => root.join(file_path),
            None => return file_path.to_path_buf(),
        }
    };

    let absolute = match absolute.canonicalize() {
        Ok(canonical) => canonical,
        Err(_) => return file_path.to_path_buf(),
    };
    relative_to(&absolute, &cwd).unwrap_or(absolute)
}
