// SPDX-License-Identifier: CC0-1.0

//! Argument packs: values that are printed and then handed back.
//!
//! The macros wrap each argument in [`Shown`] (rendered with `Display`) or
//! [`Debugged`] (rendered with `Debug`, written `?value`) and collect them in
//! a tuple. [`ArgPack`] turns that tuple into the list of things to render
//! and, afterwards, into the unwrapped values:
//!
//! | arguments | output |
//! |---|---|
//! | none | `()` |
//! | one | the value itself |
//! | several | a tuple of the values |

use std::fmt;

/// One printable argument.
pub trait Arg {
    /// The wrapped value.
    type Inner;

    /// How the value is rendered.
    fn as_display(&self) -> &dyn fmt::Display;

    /// Unwraps the value.
    fn into_inner(self) -> Self::Inner;
}

/// Renders its value with [`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shown<T>(pub T);

impl<T: fmt::Display> Arg for Shown<T> {
    type Inner = T;

    fn as_display(&self) -> &dyn fmt::Display { &self.0 }

    fn into_inner(self) -> T { self.0 }
}

/// Renders its value with [`fmt::Debug`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debugged<T>(pub T);

impl<T: fmt::Debug> fmt::Display for Debugged<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(&self.0, f) }
}

impl<T: fmt::Debug> Arg for Debugged<T> {
    type Inner = T;

    fn as_display(&self) -> &dyn fmt::Display { self }

    fn into_inner(self) -> T { self.0 }
}

/// A tuple of [`Arg`]s.
pub trait ArgPack {
    /// What the printing call evaluates to.
    type Output;

    /// The values to render, in order.
    fn fields(&self) -> Vec<&dyn fmt::Display>;

    /// Unwraps the values.
    fn into_output(self) -> Self::Output;
}

impl ArgPack for () {
    type Output = ();

    fn fields(&self) -> Vec<&dyn fmt::Display> { Vec::new() }

    fn into_output(self) -> Self::Output {}
}

impl<A: Arg> ArgPack for (A,) {
    type Output = A::Inner;

    fn fields(&self) -> Vec<&dyn fmt::Display> { vec![self.0.as_display()] }

    fn into_output(self) -> Self::Output { self.0.into_inner() }
}

macro_rules! impl_arg_pack {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Arg),+> ArgPack for ($($name,)+) {
            type Output = ($(<$name as Arg>::Inner,)+);

            fn fields(&self) -> Vec<&dyn fmt::Display> { vec![$(self.$idx.as_display()),+] }

            fn into_output(self) -> Self::Output { ($(self.$idx.into_inner(),)+) }
        }
    };
}

impl_arg_pack!(A.0, B.1);
impl_arg_pack!(A.0, B.1, C.2);
impl_arg_pack!(A.0, B.1, C.2, D.3);
impl_arg_pack!(A.0, B.1, C.2, D.3, E.4);
impl_arg_pack!(A.0, B.1, C.2, D.3, E.4, F.5);
impl_arg_pack!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_arg_pack!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
impl_arg_pack!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8);
impl_arg_pack!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9);
impl_arg_pack!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10);
impl_arg_pack!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10, L.11);
