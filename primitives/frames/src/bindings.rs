// SPDX-License-Identifier: CC0-1.0

//! Name bindings for closures.
//!
//! There are two ways a closure frame gets a name.
//!
//! **Named frames.** A closure can call [`name_next_frame`] as the first
//! thing in its body. The next frame entered for that same closure, at the
//! same stack depth, records the name directly. Each closure literal carries
//! its own name this way, so two closures bound in one function never
//! borrow each other's names.
//!
//! **Bindings by type.** [`bind`] maps a variable name to a closure's
//! *code*: the compiler's type name for that closure with generic arguments
//! removed (`app::main::{{closure}}`). Three scopes are searched, in order:
//!
//! 1. the locals of the calling frame,
//! 2. the module scope of the current thread (bindings made while no frame
//!    was registered),
//! 3. the builtin scope shared by the whole process.
//!
//! Closures defined in the same function share a type name. When one scope
//! holds different names for the same code the lookup is ambiguous and the
//! frame keeps its generic label.
//!
//! Module scope is per thread: a closure bound at module scope on one
//! thread and called on another is not found there. Use the builtin scope
//! for bindings that must be visible everywhere.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::stack::{depth, with_stack_mut};
use crate::strip_generics;

/// A variable name bound to a closure's code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Variable name, rendered as `<name>`.
    pub name: &'static str,
    /// Type name of the bound closure, without generic arguments.
    pub code: String,
}

impl Binding {
    fn new(name: &'static str, code: &str) -> Self {
        Self { name, code: strip_generics(code).into_owned() }
    }
}

thread_local! {
    static MODULE_SCOPE: RefCell<Vec<Binding>> = const { RefCell::new(Vec::new()) };
    static PENDING: RefCell<Vec<PendingName>> = const { RefCell::new(Vec::new()) };
}

static BUILTINS: RwLock<Vec<Binding>> = RwLock::new(Vec::new());

static NEXT_PENDING_ID: AtomicU64 = AtomicU64::new(1);

fn push_unique(scope: &mut Vec<Binding>, binding: Binding) {
    if !scope.contains(&binding) {
        scope.push(binding);
    }
}

/// Binds `name` to `code` in the innermost frame, or in module scope when no
/// frame is registered on this thread.
pub fn bind(name: &'static str, code: &str) {
    let binding = Binding::new(name, code);
    let leftover = with_stack_mut(|stack| match stack.last_mut() {
        Some(top) => {
            push_unique(&mut top.locals, binding);
            None
        }
        None => Some(binding),
    });
    if let Some(binding) = leftover {
        MODULE_SCOPE.with(|scope| push_unique(&mut scope.borrow_mut(), binding));
    }
}

/// Binds `name` to `code` in the process-wide builtin scope.
pub fn register_builtin(name: &'static str, code: &str) {
    let mut builtins = BUILTINS.write().unwrap_or_else(PoisonError::into_inner);
    push_unique(&mut builtins, Binding::new(name, code));
}

/// Binds `name` to the type of `closure` and hands the closure back.
pub fn bind_closure<F>(name: &'static str, closure: F) -> F {
    bind(name, std::any::type_name::<F>());
    closure
}

/// Like [`bind_closure`], but registers the name in the builtin scope.
pub fn bind_builtin_closure<F>(name: &'static str, closure: F) -> F {
    register_builtin(name, std::any::type_name::<F>());
    closure
}

#[derive(Debug)]
struct PendingName {
    id: u64,
    name: &'static str,
    code: &'static str,
    depth: usize,
}

/// Announces the name of the closure currently running.
///
/// `code` is the closure's own path as `function_name!()` reports it from
/// inside the closure body. The next frame entered with that path while the
/// stack is at its current depth is rendered as `<name>`. The announcement
/// is withdrawn when the guard drops.
pub fn name_next_frame(name: &'static str, code: &'static str) -> NamedFrame {
    let id = NEXT_PENDING_ID.fetch_add(1, Ordering::Relaxed);
    let pending = PendingName { id, name, code, depth: depth() };
    PENDING.with(|names| names.borrow_mut().push(pending));
    NamedFrame { id, _not_send: PhantomData }
}

/// Keeps a [`name_next_frame`] announcement alive.
#[must_use = "the name is withdrawn as soon as the guard is dropped"]
#[derive(Debug)]
pub struct NamedFrame {
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl Drop for NamedFrame {
    fn drop(&mut self) {
        let id = self.id;
        let _ = PENDING.try_with(|names| {
            if let Ok(mut names) = names.try_borrow_mut() {
                names.retain(|pending| pending.id != id);
            }
        });
    }
}

/// Claims the announced name for a frame about to be pushed at `depth`.
pub(crate) fn claim_name(function: &str, depth: usize) -> Option<&'static str> {
    PENDING.with(|names| {
        let mut names = names.borrow_mut();
        let index = names
            .iter()
            .rposition(|pending| pending.depth == depth && pending.code == function)?;
        Some(names.remove(index).name)
    })
}

enum Lookup {
    Found(&'static str),
    Ambiguous,
    Missing,
}

fn find(scope: &[Binding], code: &str) -> Lookup {
    let mut names = scope.iter().filter(|binding| binding.code == code).map(|binding| binding.name);
    let Some(first) = names.next() else {
        return Lookup::Missing;
    };
    if names.all(|name| name == first) {
        Lookup::Found(first)
    } else {
        Lookup::Ambiguous
    }
}

/// Looks `code` up in `caller_locals`, then module scope, then builtins.
///
/// The first scope that knows `code` decides; `None` when no scope does or
/// when that scope binds it to more than one name.
pub(crate) fn resolve(code: &str, caller_locals: &[Binding]) -> Option<&'static str> {
    let code = strip_generics(code);
    let lookups = [
        find(caller_locals, &code),
        MODULE_SCOPE.with(|scope| find(&scope.borrow(), &code)),
        find(&BUILTINS.read().unwrap_or_else(PoisonError::into_inner), &code),
    ];
    for lookup in lookups {
        match lookup {
            Lookup::Found(name) => return Some(name),
            Lookup::Ambiguous => {
                tracing::debug!(code = %code, "closure bound under several names");
                return None;
            }
            Lookup::Missing => {}
        }
    }
    None
}
