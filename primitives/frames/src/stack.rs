// SPDX-License-Identifier: CC0-1.0

//! Per-thread frame stack and handles into it.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bindings::{claim_name, Binding};
use crate::{display_label, is_closure};

/// Frame ids are unique for the lifetime of the process, so a stale
/// [`FrameRef`] can never resolve to a frame pushed after it was taken.
static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// One registered activation record.
#[derive(Debug)]
pub(crate) struct FrameRecord {
    pub(crate) id: u64,
    pub(crate) function: &'static str,
    pub(crate) module: &'static str,
    pub(crate) location: &'static Location<'static>,
    /// Name announced by the closure this frame belongs to.
    pub(crate) binding: Option<&'static str>,
    /// Closure bindings made while this frame was innermost.
    pub(crate) locals: Vec<Binding>,
}

thread_local! {
    static STACK: RefCell<Vec<FrameRecord>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn with_stack<R>(f: impl FnOnce(&[FrameRecord]) -> R) -> R {
    STACK.with(|stack| f(&stack.borrow()))
}

pub(crate) fn with_stack_mut<R>(f: impl FnOnce(&mut Vec<FrameRecord>) -> R) -> R {
    STACK.with(|stack| f(&mut stack.borrow_mut()))
}

/// Pushes a frame for `function` onto the current thread's stack.
///
/// `function` is the fully qualified path of the function being entered
/// (usually produced by `function_name!()`), `module` the module path it
/// lives in. The caller location is recorded as the frame's location; inside
/// a `#[track_caller]` function that is the location of the call into it.
///
/// The frame stays registered until the returned guard is dropped.
#[track_caller]
pub fn enter(function: &'static str, module: &'static str) -> FrameGuard {
    let id = NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed);
    let location = Location::caller();
    let binding = if is_closure(function) { claim_name(function, depth()) } else { None };
    with_stack_mut(|stack| {
        stack.push(FrameRecord { id, function, module, location, binding, locals: Vec::new() })
    });
    FrameGuard { id, _not_send: PhantomData }
}

/// Keeps a frame registered; pops it on drop.
///
/// Guards are tied to the thread that created them.
#[must_use = "the frame is popped as soon as the guard is dropped"]
#[derive(Debug)]
pub struct FrameGuard {
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl FrameGuard {
    /// Handle to the frame this guard keeps alive.
    pub fn frame(&self) -> Option<FrameRef> {
        with_stack(|stack| {
            stack
                .iter()
                .rposition(|record| record.id == self.id)
                .map(|index| FrameRef { index, id: self.id })
        })
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let id = self.id;
        // The thread-local may already be gone during thread teardown.
        let _ = STACK.try_with(|stack| {
            let Ok(mut stack) = stack.try_borrow_mut() else {
                tracing::debug!(frame = id, "frame stack busy while popping frame");
                return;
            };
            match stack.iter().rposition(|record| record.id == id) {
                Some(index) => {
                    let above = stack.len() - index - 1;
                    if above > 0 {
                        tracing::debug!(frame = id, above, "frame guard dropped out of order");
                    }
                    stack.truncate(index);
                }
                None => tracing::debug!(frame = id, "frame already popped"),
            }
        });
    }
}

/// Opaque handle to one live frame.
///
/// A handle only resolves on the thread that created it and only while the
/// frame it names is still registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRef {
    index: usize,
    id: u64,
}

impl FrameRef {
    /// Process-unique id of the frame.
    pub fn id(&self) -> u64 { self.id }

    /// Whether the frame is still registered on this thread.
    pub fn is_live(&self) -> bool { with_stack(|stack| self.record(stack).is_some()) }

    /// Snapshot of the frame, or `None` once it has been popped.
    pub fn info(&self) -> Option<FrameInfo> {
        with_stack(|stack| self.record(stack).map(FrameInfo::from_record))
    }

    /// The frame that was innermost when this one was entered.
    ///
    /// `None` for the outermost frame (its caller is module scope) and for
    /// frames that are no longer live.
    pub fn caller(&self) -> Option<FrameRef> {
        with_stack(|stack| {
            self.record(stack)?;
            let index = self.index.checked_sub(1)?;
            Some(FrameRef { index, id: stack[index].id })
        })
    }

    pub(crate) fn index(&self) -> usize { self.index }

    pub(crate) fn record<'s>(&self, stack: &'s [FrameRecord]) -> Option<&'s FrameRecord> {
        stack.get(self.index).filter(|record| record.id == self.id)
    }
}

/// Snapshot of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// Fully qualified path of the function, e.g. `app::net::connect`.
    pub function: &'static str,
    /// Module the frame was entered from, e.g. `app::net`.
    pub module: &'static str,
    /// Source file of the location where the frame was entered.
    pub file: &'static str,
    /// Line of that location.
    pub line: u32,
    /// Column of that location.
    pub column: u32,
    /// Name announced by the closure the frame belongs to, if any.
    pub binding: Option<&'static str>,
}

impl FrameInfo {
    fn from_record(record: &FrameRecord) -> Self {
        Self {
            function: record.function,
            module: record.module,
            file: record.location.file(),
            line: record.location.line(),
            column: record.location.column(),
            binding: record.binding,
        }
    }

    /// Function path without its module prefix or generic arguments, e.g.
    /// `connect`, `Client::send` or `<Client as Transport>::send`.
    pub fn display_name(&self) -> String { display_label(self.function, self.module) }

    /// Whether the frame belongs to a closure.
    pub fn is_anonymous(&self) -> bool { is_closure(self.function) }
}

/// Innermost live frame on this thread.
pub fn current() -> Option<FrameRef> {
    with_stack(|stack| {
        let index = stack.len().checked_sub(1)?;
        Some(FrameRef { index, id: stack[index].id })
    })
}

/// Number of live frames on this thread.
pub fn depth() -> usize { with_stack(|stack| stack.len()) }

/// Outcome of walking outward from the innermost frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Landed on a registered frame.
    Frame(FrameRef),
    /// Landed exactly on module scope, below the outermost frame.
    Module,
    /// Walked past module scope.
    PastTop,
}

/// Walks `levels` frames outward from the innermost frame.
///
/// Zero levels yields the innermost frame, or [`Walk::Module`] when no frame
/// is registered.
pub fn walk_back(levels: usize) -> Walk {
    with_stack(|stack| match levels.cmp(&stack.len()) {
        std::cmp::Ordering::Less => {
            let index = stack.len() - 1 - levels;
            Walk::Frame(FrameRef { index, id: stack[index].id })
        }
        std::cmp::Ordering::Equal => Walk::Module,
        std::cmp::Ordering::Greater => Walk::PastTop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_drop() {
        assert_eq!(depth(), 0);
        assert_eq!(current(), None);
        {
            let _outer = enter("app::outer", "app");
            assert_eq!(depth(), 1);
            {
                let _inner = enter("app::inner", "app");
                assert_eq!(depth(), 2);
                let info = current().and_then(|frame| frame.info()).expect("inner frame");
                assert_eq!(info.function, "app::inner");
                assert_eq!(info.display_name(), "inner");
            }
            assert_eq!(depth(), 1);
        }
        assert_eq!(depth(), 0);
    }

    #[test]
    fn test_frame_location_is_call_site() {
        let line = line!() + 1;
        let _frame = enter("app::located", "app");
        let info = current().and_then(|frame| frame.info()).expect("frame");
        assert_eq!(info.file, file!());
        assert_eq!(info.line, line);
    }

    #[test]
    fn test_caller_links() {
        let _a = enter("app::a", "app");
        let _b = enter("app::b", "app");
        let b = current().expect("b");
        let a = b.caller().expect("a");
        assert_eq!(a.info().expect("a info").function, "app::a");
        assert_eq!(a.caller(), None);
    }

    #[test]
    fn test_stale_reference() {
        let stale = {
            let _gone = enter("app::gone", "app");
            current().expect("frame")
        };
        assert!(!stale.is_live());
        assert_eq!(stale.info(), None);
        assert_eq!(stale.caller(), None);

        // A new frame at the same index must not revive the old handle
        let _fresh = enter("app::fresh", "app");
        assert!(!stale.is_live());
        assert!(current().expect("fresh").is_live());
    }

    #[test]
    fn test_out_of_order_drop() {
        let outer = enter("app::outer", "app");
        let inner = enter("app::inner", "app");
        drop(outer);
        assert_eq!(depth(), 0);
        drop(inner);
        assert_eq!(depth(), 0);
    }

    #[test]
    fn test_guard_frame_handle() {
        let guard = enter("app::guarded", "app");
        let frame = guard.frame().expect("live frame");
        assert_eq!(Some(frame), current());
        drop(guard);
        assert!(!frame.is_live());
    }

    #[test]
    fn test_walk_back() {
        assert_eq!(walk_back(0), Walk::Module);
        assert_eq!(walk_back(1), Walk::PastTop);

        let _a = enter("app::a", "app");
        let _b = enter("app::b", "app");
        let b = current().expect("b");
        assert_eq!(walk_back(0), Walk::Frame(b));
        assert_eq!(walk_back(1), Walk::Frame(b.caller().expect("a")));
        assert_eq!(walk_back(2), Walk::Module);
        assert_eq!(walk_back(3), Walk::PastTop);
    }

    #[test]
    fn test_frames_are_per_thread() {
        let _main = enter("app::main_thread", "app");
        let here = current().expect("frame");
        let seen = std::thread::spawn(move || (depth(), here.is_live()))
            .join()
            .expect("thread panicked");
        assert_eq!(seen, (0, false));
    }

    #[test]
    fn test_closure_frame_claims_announced_name() {
        let _outer = enter("app::outer", "app");
        let _named = crate::name_next_frame("f", "app::outer::{{closure}}");
        let _closure = enter("app::outer::{{closure}}", "app");
        let info = current().and_then(|frame| frame.info()).expect("closure frame");
        assert_eq!(info.binding, Some("f"));

        // Named functions never claim a name
        let _named = crate::name_next_frame("g", "app::helper");
        let _helper = enter("app::helper", "app");
        assert_eq!(current().and_then(|frame| frame.info()).expect("helper").binding, None);
    }
}
