//! Transitive caller and direct callee resolution.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::db::CodeIndex;
use crate::error::Result;
use crate::models::CallSite;
use crate::operations::validate_depth;

/// Result of a transitive caller search.
#[derive(Debug, Clone, Serialize)]
pub struct CallersResult {
    /// The symbol being analyzed.
    pub symbol: String,
    /// Traversal depth used.
    pub depth: u32,
    /// Discovered call sites, in discovery order.
    pub callers: Vec<CallSite>,
}

/// Result of a callee lookup.
#[derive(Debug, Clone, Serialize)]
pub struct CalleesResult {
    /// The symbol being analyzed.
    pub symbol: String,
    /// Call sites made from inside this symbol.
    pub callees: Vec<CallSite>,
}

/// Find who calls a symbol, transitively up to `depth` hops.
///
/// Breadth-first search treating callee-to-caller as a directed edge. The
/// visited set is keyed on `(caller_function, caller_file, caller_line)`,
/// so recursive and mutually-recursive call chains terminate and no call
/// site is reported twice. Depth bounds the traversal; results are one
/// flat list in discovery order.
pub fn get_callers(index: &CodeIndex, symbol: &str, depth: u32) -> Result<CallersResult> {
    validate_depth(depth)?;

    let mut callers: Vec<CallSite> = Vec::new();
    let mut visited: HashSet<(Option<String>, String, u32)> = HashSet::new();
    let mut queue: VecDeque<(String, u32)> = VecDeque::new();
    queue.push_back((symbol.to_string(), 0));

    while let Some((current, current_depth)) = queue.pop_front() {
        if current_depth >= depth {
            continue;
        }
        for site in index.call_sites_to(&current)? {
            if !visited.insert(site.visit_key()) {
                continue;
            }
            if current_depth + 1 < depth {
                if let Some(caller) = &site.caller_function {
                    queue.push_back((caller.clone(), current_depth + 1));
                }
            }
            callers.push(site);
        }
    }

    Ok(CallersResult {
        symbol: symbol.to_string(),
        depth,
        callers,
    })
}

/// Find what a symbol calls.
///
/// Matches `caller_function` by substring: extractors may record qualified
/// names like `Class.method` as one token.
pub fn get_callees(index: &CodeIndex, symbol: &str) -> Result<CalleesResult> {
    let callees = index.call_sites_from(symbol)?;
    Ok(CalleesResult {
        symbol: symbol.to_string(),
        callees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_fixtures as fx;
    use crate::error::QueryError;

    /// Index from the reference scenario: bar calls foo at a:20, baz calls
    /// bar at a:30.
    fn scenario_index() -> CodeIndex {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::symbol(&idx, "a", "foo", "function", 10, 15);
        fx::call(&idx, "a", 20, Some("bar"), "foo", &[]);
        fx::call(&idx, "a", 30, Some("baz"), "bar", &[]);
        idx
    }

    #[test]
    fn callers_depth_one_is_direct_only() {
        let idx = scenario_index();
        let result = get_callers(&idx, "foo", 1).unwrap();
        assert_eq!(result.callers.len(), 1);
        assert_eq!(result.callers[0].caller_function.as_deref(), Some("bar"));
        assert_eq!(result.callers[0].caller_line, 20);
    }

    #[test]
    fn callers_depth_two_is_transitive() {
        let idx = scenario_index();
        let result = get_callers(&idx, "foo", 2).unwrap();
        let names: Vec<_> = result
            .callers
            .iter()
            .map(|c| (c.caller_function.clone().unwrap(), c.caller_line))
            .collect();
        assert_eq!(names, vec![("bar".to_string(), 20), ("baz".to_string(), 30)]);
    }

    #[test]
    fn callers_deeper_depth_is_superset() {
        let idx = scenario_index();
        let mut previous = 0;
        for depth in 1..=5 {
            let result = get_callers(&idx, "foo", depth).unwrap();
            assert!(result.callers.len() >= previous);
            previous = result.callers.len();
        }
    }

    #[test]
    fn callers_terminate_on_cycle() {
        let idx = CodeIndex::open_in_memory().unwrap();
        // a calls b, b calls a
        fx::call(&idx, "m", 5, Some("a"), "b", &[]);
        fx::call(&idx, "m", 15, Some("b"), "a", &[]);

        let result = get_callers(&idx, "a", 5).unwrap();
        assert_eq!(result.callers.len(), 2);

        let mut keys: Vec<_> = result.callers.iter().map(CallSite::visit_key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 2, "no duplicate (function, file, line) triples");
    }

    #[test]
    fn callers_validate_depth_before_storage() {
        let idx = CodeIndex::open_in_memory().unwrap();
        // Even against a gutted index, validation fires first.
        idx.index()
            .execute_batch("DROP TABLE function_call_args")
            .unwrap();
        for bad in [0, 6] {
            let err = get_callers(&idx, "foo", bad).unwrap_err();
            assert!(matches!(err, QueryError::InvalidDepth { depth } if depth == bad));
        }
    }

    #[test]
    fn callers_unknown_symbol_is_empty() {
        let idx = scenario_index();
        let result = get_callers(&idx, "nonexistent", 3).unwrap();
        assert!(result.callers.is_empty());
    }

    #[test]
    fn callers_stop_at_module_scope() {
        let idx = CodeIndex::open_in_memory().unwrap();
        // Module-scope call into foo: no enclosing function to recurse on.
        fx::call(&idx, "m", 1, None, "foo", &[]);

        let result = get_callers(&idx, "foo", 5).unwrap();
        assert_eq!(result.callers.len(), 1);
        assert!(result.callers[0].caller_function.is_none());
    }

    #[test]
    fn callees_substring_match() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::call(&idx, "src/user.py", 8, Some("UserController.create"), "validate", &["req"]);
        fx::call(&idx, "src/user.py", 9, Some("UserController.create"), "save", &[]);
        fx::call(&idx, "src/other.py", 3, Some("unrelated"), "validate", &[]);

        let result = get_callees(&idx, "UserController.create").unwrap();
        assert_eq!(result.callees.len(), 2);

        // Bare method name still matches the qualified token.
        let result = get_callees(&idx, "create").unwrap();
        assert_eq!(result.callees.len(), 2);
    }

    #[test]
    fn callees_unknown_symbol_is_empty() {
        let idx = CodeIndex::open_in_memory().unwrap();
        let result = get_callees(&idx, "ghost").unwrap();
        assert!(result.callees.is_empty());
    }
}
