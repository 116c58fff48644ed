// SPDX-License-Identifier: CC0-1.0

//! Call chain construction.

use std::fmt;

use crate::bindings::resolve;
use crate::stack::{with_stack, FrameRecord, FrameRef};
use crate::{display_label, is_closure};

/// Display names of a frame and its callers, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallChain {
    names: Vec<String>,
}

impl CallChain {
    /// Names in call order: the outermost caller first, the starting frame last.
    pub fn names(&self) -> &[String] { &self.names }

    /// Number of entries.
    pub fn len(&self) -> usize { self.names.len() }

    /// Whether the chain has no entries.
    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    /// Iterates over the names, outermost first.
    pub fn iter(&self) -> std::slice::Iter<'_, String> { self.names.iter() }

    /// Consumes the chain, returning the names outermost first.
    pub fn into_names(self) -> Vec<String> { self.names }
}

impl<'a> IntoIterator for &'a CallChain {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter { self.names.iter() }
}

/// Renders as `outer(): inner()`.
impl fmt::Display for CallChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                f.write_str(": ")?;
            }
            write!(f, "{}()", name)?;
        }
        Ok(())
    }
}

/// Collects the call chain starting at `start` and walking outward.
///
/// Walking stops at module scope or once `max_depth` names have been
/// collected; `None` means no limit. A `start` of `None` stands for module
/// scope itself and, like a frame that is no longer live, yields an empty
/// chain.
pub fn call_chain(start: Option<FrameRef>, max_depth: Option<usize>) -> CallChain {
    let Some(start) = start else {
        return CallChain::default();
    };
    let limit = max_depth.unwrap_or(usize::MAX);

    with_stack(|stack| {
        if start.record(stack).is_none() {
            tracing::debug!(frame = start.id(), "call chain requested for a frame that is gone");
            return CallChain::default();
        }

        let mut names = Vec::new();
        let mut index = Some(start.index());
        while let Some(i) = index {
            if names.len() >= limit {
                break;
            }
            names.push(display_name(stack, i));
            index = i.checked_sub(1);
        }
        names.reverse();
        CallChain { names }
    })
}

/// Named functions render by their qualified name; closures by the variable
/// they were bound to, falling back to the compiler's closure label.
fn display_name(stack: &[FrameRecord], index: usize) -> String {
    let record = &stack[index];
    if let Some(name) = record.binding {
        return format!("<{}>", name);
    }
    let label = display_label(record.function, record.module);
    if !is_closure(record.function) {
        return label;
    }

    let caller_locals = index.checked_sub(1).map(|caller| stack[caller].locals.as_slice());
    match resolve(record.function, caller_locals.unwrap_or(&[])) {
        Some(name) => format!("<{}>", name),
        None => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{bind, name_next_frame, register_builtin};
    use crate::stack::{current, enter};

    #[test]
    fn test_nested_chain_is_outer_to_inner() {
        let _a = enter("app::outer", "app");
        let _b = enter("app::middle", "app");
        let _c = enter("app::inner", "app");

        let chain = call_chain(current(), None);
        assert_eq!(chain.names(), ["outer", "middle", "inner"]);
        assert_eq!(chain.to_string(), "outer(): middle(): inner()");
    }

    #[test]
    fn test_max_depth() {
        let _a = enter("app::outer", "app");
        let _b = enter("app::middle", "app");
        let _c = enter("app::inner", "app");

        assert!(call_chain(current(), Some(0)).is_empty());
        assert_eq!(call_chain(current(), Some(1)).names(), ["inner"]);
        assert_eq!(call_chain(current(), Some(2)).names(), ["middle", "inner"]);
        assert_eq!(call_chain(current(), Some(10)).len(), 3);
    }

    #[test]
    fn test_chain_from_caller() {
        let _a = enter("app::outer", "app");
        let _b = enter("app::inner", "app");
        let caller = current().and_then(|frame| frame.caller());
        assert_eq!(call_chain(caller, None).names(), ["outer"]);
    }

    #[test]
    fn test_module_scope_is_empty() {
        assert!(call_chain(None, None).is_empty());
        assert_eq!(call_chain(current(), None), CallChain::default());
    }

    #[test]
    fn test_stale_start_is_empty() {
        let stale = {
            let _gone = enter("app::gone", "app");
            current()
        };
        assert!(call_chain(stale, None).is_empty());
    }

    #[test]
    fn test_closure_bound_in_caller_locals() {
        let _outer = enter("chain_test::outer_lambda", "chain_test");
        bind("inner_fn", "chain_test::outer_lambda::{{closure}}");
        let _closure = enter("chain_test::outer_lambda::{{closure}}", "chain_test");

        let chain = call_chain(current(), None);
        assert_eq!(chain.names(), ["outer_lambda", "<inner_fn>"]);
    }

    #[test]
    fn test_closure_bound_in_module_scope() {
        bind("lambda", "chain_test::main::{{closure}}");
        let _closure = enter("chain_test::main::{{closure}}", "chain_test");
        assert_eq!(call_chain(current(), None).names(), ["<lambda>"]);
    }

    #[test]
    fn test_closure_bound_as_builtin() {
        register_builtin("shared", "chain_test::shared::{{closure}}");
        let _caller = enter("chain_test::caller", "chain_test");
        let _closure = enter("chain_test::shared::{{closure}}", "chain_test");
        assert_eq!(call_chain(current(), None).names(), ["caller", "<shared>"]);
    }

    #[test]
    fn test_unbound_closure_uses_generic_label() {
        let _outer = enter("chain_test::unbound", "chain_test");
        let _closure = enter("chain_test::unbound::{{closure}}", "chain_test");
        assert_eq!(call_chain(current(), None).names(), ["unbound", "unbound::{{closure}}"]);
    }

    #[test]
    fn test_binding_in_unrelated_frame_is_not_visible() {
        let _owner = enter("chain_test::owner", "chain_test");
        bind("hidden", "chain_test::elsewhere::{{closure}}");
        let _callee = enter("chain_test::callee", "chain_test");
        let _closure = enter("chain_test::elsewhere::{{closure}}", "chain_test");

        // Only the direct caller's locals are searched
        let chain = call_chain(current(), None);
        assert_eq!(chain.names(), ["owner", "callee", "elsewhere::{{closure}}"]);
    }

    #[test]
    fn test_sibling_closures_keep_their_own_names() {
        let _outer = enter("chain_test::two", "chain_test");
        {
            let _named = name_next_frame("second", "chain_test::two::{{closure}}");
            let _closure = enter("chain_test::two::{{closure}}", "chain_test");
            assert_eq!(call_chain(current(), None).names(), ["two", "<second>"]);
        }
        {
            let _named = name_next_frame("first", "chain_test::two::{{closure}}");
            let _closure = enter("chain_test::two::{{closure}}", "chain_test");
            assert_eq!(call_chain(current(), None).names(), ["two", "<first>"]);
        }
        // A sibling that announced nothing keeps the generic label
        let _plain = enter("chain_test::two::{{closure}}", "chain_test");
        assert_eq!(call_chain(current(), None).names(), ["two", "two::{{closure}}"]);
    }

    #[test]
    fn test_ambiguous_binding_uses_generic_label() {
        let _outer = enter("chain_test::pair", "chain_test");
        bind("left", "chain_test::pair::{{closure}}");
        bind("right", "chain_test::pair::{{closure}}");
        let _closure = enter("chain_test::pair::{{closure}}", "chain_test");
        assert_eq!(call_chain(current(), None).names(), ["pair", "pair::{{closure}}"]);
    }

    #[test]
    fn test_generic_frames() {
        let _outer = enter("chain_test::generic_outer", "chain_test");
        bind("g", "chain_test::generic_outer<u8>::{{closure}}");
        let _closure = enter("chain_test::generic_outer::{{closure}}", "chain_test");
        assert_eq!(call_chain(current(), None).names(), ["generic_outer", "<g>"]);

        let _method = enter("chain_test::W<_>::method", "chain_test");
        let _trait_method = enter("<chain_test::W<_> as chain_test::Act>::act", "chain_test");
        assert_eq!(
            call_chain(current(), Some(2)).names(),
            ["W::method", "<W as Act>::act"]
        );
    }
}
