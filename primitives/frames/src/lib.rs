// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `callchain-frames` — Explicit Call Stack
//!
//! Rust offers no way to read a caller's activation record or its local
//! variables at run time, so this crate keeps a small **frame stack** per
//! thread instead. Functions that want to show up in a call chain register a
//! frame when they are entered and pop it when the returned [`FrameGuard`]
//! is dropped.
//!
//! ## Core Concepts
//!
//! ### [`FrameRef`]
//! An opaque, copyable handle to one live frame. It resolves to a
//! [`FrameInfo`] snapshot while the frame is still on the stack of the thread
//! that created it, and to nothing afterwards.
//!
//! ### [`CallChain`]
//! The display names of a frame and its callers, outermost first, cut off at
//! module scope (the bottom of the stack) or at a maximum depth.
//!
//! ### Bindings
//! Closures have no name of their own. A closure that announces its name
//! with [`name_next_frame`] before entering its frame is rendered as
//! `<name>`; this is what `bind!` does for closure literals. Otherwise
//! [`bind`] associates a variable name with a closure's type name, looked up
//! in the caller frame's locals, then the thread's module scope, then the
//! process-wide builtin scope.
//!
//! ## Example
//! ```
//! let _outer = frames::enter("app::outer", "app");
//! let _inner = frames::enter("app::inner", "app");
//!
//! let chain = frames::call_chain(frames::current(), None);
//! assert_eq!(chain.names(), ["outer", "inner"]);
//! ```

use std::borrow::Cow;

pub mod bindings;
pub mod chain;
pub mod stack;

pub use bindings::{
    bind, bind_builtin_closure, bind_closure, name_next_frame, register_builtin, Binding,
    NamedFrame,
};
pub use chain::{call_chain, CallChain};
pub use stack::{current, depth, enter, walk_back, FrameGuard, FrameInfo, FrameRef, Walk};

/// Label the compiler gives to closures in type and item paths.
pub const CLOSURE_LABEL: &str = "{{closure}}";

/// Returns `true` when `path` names a closure rather than a named function.
pub fn is_closure(path: &str) -> bool { path.ends_with(CLOSURE_LABEL) }

/// Removes generic argument lists from a type or item path.
///
/// `app::outer<u8>::{{closure}}` and `app::Wrapper<_>::show` become
/// `app::outer::{{closure}}` and `app::Wrapper::show`. The brackets of a
/// qualified path such as `<app::T as app::Tr>::act` are kept.
pub fn strip_generics(path: &str) -> Cow<'_, str> {
    if !path.contains('<') {
        return Cow::Borrowed(path);
    }

    let mut out = String::with_capacity(path.len());
    let mut skipping = 0usize;
    let mut prev = '\0';
    for c in path.chars() {
        if skipping > 0 {
            match c {
                '<' => skipping += 1,
                '>' if prev != '-' => skipping -= 1,
                _ => {}
            }
        } else if c == '<' && (prev.is_alphanumeric() || prev == '_') {
            skipping = 1;
        } else {
            out.push(c);
        }
        prev = c;
    }
    Cow::Owned(out)
}

/// Strips the module prefix from a function path.
///
/// `app::net::connect` in module `app::net` becomes `connect`; paths outside
/// the module, or equal to it, are returned unchanged. Trait methods keep
/// their qualified form with both sides shortened:
/// `<app::Actor as app::Act>::act` becomes `<Actor as Act>::act`.
pub fn qualified_name<'a>(function: &'a str, module: &str) -> Cow<'a, str> {
    if !function.starts_with('<') {
        return Cow::Borrowed(strip_module(function, module));
    }
    let Some(end) = closing_angle(function) else {
        return Cow::Borrowed(function);
    };

    let inner = &function[1..end];
    let inner = match split_as(inner) {
        Some((self_ty, as_trait)) => {
            format!("{} as {}", qualified_name(self_ty, module), qualified_name(as_trait, module))
        }
        None => qualified_name(inner, module).into_owned(),
    };
    Cow::Owned(format!("<{}>{}", inner, &function[end + 1..]))
}

/// The name a frame is shown under when no binding applies.
pub fn display_label(function: &str, module: &str) -> String {
    qualified_name(&strip_generics(function), module).into_owned()
}

fn strip_module<'a>(path: &'a str, module: &str) -> &'a str {
    path.strip_prefix(module)
        .and_then(|rest| rest.strip_prefix("::"))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(path)
}

/// Byte index of the `>` matching the `<` that opens `path`.
fn closing_angle(path: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut prev = '\0';
    for (i, c) in path.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        prev = c;
    }
    None
}

/// Splits `Type as Trait` at the outermost ` as `.
fn split_as(qualified: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut prev = '\0';
    for (i, c) in qualified.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if prev != '-' => depth = depth.saturating_sub(1),
            ' ' if depth == 0 && qualified[i..].starts_with(" as ") => {
                return Some((&qualified[..i], &qualified[i + 4..]));
            }
            _ => {}
        }
        prev = c;
    }
    None
}
