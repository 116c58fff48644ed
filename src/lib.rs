// SPDX-License-Identifier: CC0-1.0

//! Print-style debugging with a location and call-chain prefix.
//!
//! ```text
//! src/main.rs[14]: outer(): inner(): in inner
//! ```
//!
//! Functions opt into the call chain with [`frame!`]; closures can be given
//! a readable name with [`bind!`]. [`debug!`] prints through the shared
//! default printer and evaluates to its arguments, so it can wrap an
//! expression in place. [`debug_with!`] does the same with any
//! [`Printer`].
//!
//! ```
//! use callchain::{debug, frame};
//!
//! fn inner() -> u32 {
//!     frame!();
//!     let (_, n) = debug!("in inner", 40);
//!     n + 2
//! }
//!
//! fn outer() -> u32 {
//!     frame!();
//!     inner()
//! }
//!
//! assert_eq!(outer(), 42);
//! ```
//!
//! All functional code lives in the workspace member crates, re-exported
//! here under their short names.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(deprecated_in_future)]
#![doc(test(attr(warn(unused))))]

pub use config;
pub use frames;
pub use path;
pub use printer;

pub use frames::{CallChain, FrameGuard, FrameInfo, FrameRef};
pub use path::LocationTag;
pub use printer::{Caller, MemorySink, PrintError, Printer};

/// Miscellaneous metadata about the callchain workspace.
pub mod callchain_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[doc(hidden)]
pub mod __private {
    pub fn type_name_of<T>(_: &T) -> &'static str { ::core::any::type_name::<T>() }
}

/// Fully qualified path of the enclosing function.
///
/// Inside a closure the path ends in `{{closure}}`.
///
/// ```
/// fn locate() -> &'static str { callchain::function_name!() }
///
/// assert!(locate().ends_with("::locate"));
/// ```
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __callchain_here() {}
        let name = $crate::__private::type_name_of(&__callchain_here);
        name.strip_suffix("::__callchain_here").unwrap_or(name)
    }};
}

/// Registers the enclosing function as a frame until the end of the block.
///
/// `frame!()` names the frame after the enclosing function; `frame!(name)`
/// uses an explicit `&'static str`.
#[macro_export]
macro_rules! frame {
    () => {
        let _callchain_frame =
            $crate::frames::enter($crate::function_name!(), ::core::module_path!());
    };
    ($name:expr) => {
        let _callchain_frame = $crate::frames::enter($name, ::core::module_path!());
    };
}

/// Binds a closure to a variable and records the name for call chains.
///
/// A closure literal (`bind!(let f = |x: u32| ...)`) announces `f` each time
/// it runs, so a frame entered in its body renders as `<f>`. Patterns in the
/// parameter list must be single tokens (`x`, `_`, `(a, b)`), optionally
/// typed. Any other expression is registered by its type: `bind!(let f = ..)`
/// in the current frame, or in module scope outside any frame, and
/// `bind!(builtin f = ..)` for every thread.
#[macro_export]
macro_rules! bind {
    (let mut $name:ident = $($closure:tt)+) => {
        let mut $name = $crate::__bind_closure!(local $name; $($closure)+);
    };
    (let $name:ident = $($closure:tt)+) => {
        let $name = $crate::__bind_closure!(local $name; $($closure)+);
    };
    (builtin $name:ident = $($closure:tt)+) => {
        let $name = $crate::__bind_closure!(builtin $name; $($closure)+);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __bind_closure {
    ($scope:ident $name:ident; move || -> $ret:ty $body:block) => {
        move || -> $ret { $crate::__named_body!($name; $body) }
    };
    ($scope:ident $name:ident; move || $body:expr) => {
        move || $crate::__named_body!($name; $body)
    };
    ($scope:ident $name:ident; || -> $ret:ty $body:block) => {
        || -> $ret { $crate::__named_body!($name; $body) }
    };
    ($scope:ident $name:ident; || $body:expr) => {
        || $crate::__named_body!($name; $body)
    };
    ($scope:ident $name:ident; move |$($arg:tt $(: $ty:ty)?),+| -> $ret:ty $body:block) => {
        move |$($arg $(: $ty)?),+| -> $ret { $crate::__named_body!($name; $body) }
    };
    ($scope:ident $name:ident; move |$($arg:tt $(: $ty:ty)?),+| $body:expr) => {
        move |$($arg $(: $ty)?),+| $crate::__named_body!($name; $body)
    };
    ($scope:ident $name:ident; |$($arg:tt $(: $ty:ty)?),+| -> $ret:ty $body:block) => {
        |$($arg $(: $ty)?),+| -> $ret { $crate::__named_body!($name; $body) }
    };
    ($scope:ident $name:ident; |$($arg:tt $(: $ty:ty)?),+| $body:expr) => {
        |$($arg $(: $ty)?),+| $crate::__named_body!($name; $body)
    };
    (local $name:ident; $closure:expr) => {
        $crate::frames::bind_closure(::core::stringify!($name), $closure)
    };
    (builtin $name:ident; $closure:expr) => {
        $crate::frames::bind_builtin_closure(::core::stringify!($name), $closure)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __named_body {
    ($name:ident; $body:expr) => {{
        let _callchain_name =
            $crate::frames::name_next_frame(::core::stringify!($name), $crate::function_name!());
        $body
    }};
}

/// Prints its arguments through the default printer and evaluates to them.
///
/// Arguments render with `Display`; prefix one with `?` to render it with
/// `Debug`. No arguments evaluate to `()`, one to the value itself, several
/// to a tuple.
#[macro_export]
macro_rules! debug {
    () => {
        $crate::printer::global().echo(())
    };
    ($($args:tt)+) => {
        $crate::printer::global().echo($crate::__pack!([] $($args)+))
    };
}

/// Like [`debug!`], with an explicit [`Printer`] as the first argument.
#[macro_export]
macro_rules! debug_with {
    ($printer:expr $(,)?) => {
        $printer.echo(())
    };
    ($printer:expr, $($args:tt)+) => {
        $printer.echo($crate::__pack!([] $($args)+))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __pack {
    ([$($done:expr),*] ? $value:expr, $($rest:tt)*) => {
        $crate::__pack!([$($done,)* $crate::printer::Debugged($value)] $($rest)*)
    };
    ([$($done:expr),*] ? $value:expr) => {
        ($($done,)* $crate::printer::Debugged($value),)
    };
    ([$($done:expr),*] $value:expr, $($rest:tt)*) => {
        $crate::__pack!([$($done,)* $crate::printer::Shown($value)] $($rest)*)
    };
    ([$($done:expr),*] $value:expr) => {
        ($($done,)* $crate::printer::Shown($value),)
    };
    ([$($done:expr),*]) => {
        ($($done,)*)
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_function_name() {
        fn named() -> &'static str { function_name!() }
        assert!(named().ends_with("::named"), "{}", named());

        let in_closure = || function_name!();
        assert!(in_closure().ends_with("{{closure}}"), "{}", in_closure());
    }

    #[test]
    fn test_frame_display_name_strips_module() {
        frame!();
        let info = frames::current().and_then(|frame| frame.info()).expect("frame");
        assert_eq!(info.module, module_path!());
        assert_eq!(info.display_name(), "test_frame_display_name_strips_module");
    }

    #[test]
    fn test_frame_with_explicit_name() {
        frame!("renamed");
        let chain = frames::call_chain(frames::current(), None);
        assert_eq!(chain.names(), ["renamed"]);
    }

    #[test]
    fn test_bind_mut_closure() {
        frame!();
        let mut calls = 0;
        bind!(let mut count = || calls += 1);
        count();
        count();
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_bind_forms() {
        bind!(let add = |(a, b): (u32, u32), _: ()| a + b);
        assert_eq!(add((1, 2), ()), 3);

        let offset = 1;
        bind!(let shifted = move |x: u32| -> u32 { x + offset });
        assert_eq!(shifted(1), 2);

        // Not a closure literal: registered by type
        fn make() -> impl Fn() -> u32 { || 5 }
        bind!(let made = make());
        assert_eq!(made(), 5);
    }

    #[test]
    fn test_bound_literal_names_its_frame() {
        frame!();
        bind!(let named = || {
            frame!();
            frames::call_chain(frames::current(), None)
        });
        let chain = named();
        assert_eq!(chain.names(), ["test_bound_literal_names_its_frame", "<named>"]);
    }

    #[test]
    fn test_pack_trailing_comma() {
        let sink = Arc::new(MemorySink::new());
        let printer = Printer::new().sink(sink.clone()).caller_depth(9);
        assert_eq!(debug_with!(&printer, 1,), 1);
        assert_eq!(debug_with!(&printer, ?"q",), "q");
        assert_eq!(sink.take(), "1\n\"q\"\n");
    }

    #[test]
    fn test_version() {
        assert!(!callchain_meta::VERSION.is_empty());
    }
}
