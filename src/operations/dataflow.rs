//! Data-flow tracing: reads/writes, def-use chains, cross-function taint.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::db::CodeIndex;
use crate::error::{QueryError, Result};
use crate::operations::validate_depth;

/// One variable binding written by a function.
#[derive(Debug, Clone, Serialize)]
pub struct WriteSite {
    pub variable: String,
    pub expression: String,
    pub file: String,
    pub line: u32,
}

/// Reads and writes of one function.
#[derive(Debug, Clone, Serialize)]
pub struct DataDependencies {
    pub function: String,
    /// Distinct variables the function's assignments consume, sorted.
    pub reads: Vec<String>,
    /// Bindings the function creates, in line order.
    pub writes: Vec<WriteSite>,
}

/// One hop of a def-use chain.
#[derive(Debug, Clone, Serialize)]
pub struct FlowStep {
    pub from_var: String,
    pub to_var: String,
    pub expression: String,
    pub file: String,
    pub line: u32,
    /// Enclosing function, or "global" for module scope.
    pub function: String,
    pub depth: u32,
}

/// One cross-function propagation: a variable returned by one function,
/// assigned inside another.
#[derive(Debug, Clone, Serialize)]
pub struct TaintFlow {
    pub return_var: String,
    pub return_file: String,
    pub return_line: u32,
    pub assigned_var: String,
    pub assignment_file: String,
    pub assignment_line: u32,
    /// Consuming function, or "global" for module scope.
    pub assigned_in_function: String,
}

/// Get the variables a function reads and writes.
///
/// Writes come straight from the assignment table; reads come from one join
/// against the assignment-sources junction, never from parsing a serialized
/// list.
pub fn get_data_dependencies(index: &CodeIndex, function: &str) -> Result<DataDependencies> {
    if function.is_empty() {
        return Err(QueryError::EmptyTarget {
            what: "function name",
        });
    }

    let writes = index
        .assignments_in_function(function)?
        .into_iter()
        .map(|a| WriteSite {
            variable: a.target_var,
            expression: a.source_expr,
            file: a.file,
            line: a.line,
        })
        .collect();
    let reads = index.reads_in_function(function)?;

    Ok(DataDependencies {
        function: function.to_string(),
        reads,
        writes,
    })
}

/// Trace a variable through assignment def-use chains.
///
/// Breadth-first over data edges, symmetric to the caller search: each step
/// finds assignments whose sources name the current variable, emits a
/// from-to step with provenance, and enqueues the assignment target for the
/// next level. The visited set is keyed on `(file, line, target_var)`, so
/// circular assignment chains terminate with no duplicate steps.
pub fn trace_variable_flow(
    index: &CodeIndex,
    variable: &str,
    scope_file: &str,
    depth: u32,
) -> Result<Vec<FlowStep>> {
    if variable.is_empty() {
        return Err(QueryError::EmptyTarget {
            what: "variable name",
        });
    }
    validate_depth(depth)?;

    let mut flows = Vec::new();
    let mut visited: HashSet<(String, u32, String)> = HashSet::new();
    let mut queue: VecDeque<(String, String, u32)> = VecDeque::new();
    queue.push_back((variable.to_string(), scope_file.to_string(), 0));

    while let Some((current_var, current_file, current_depth)) = queue.pop_front() {
        if current_depth >= depth {
            continue;
        }
        for row in index.assignments_reading(&current_var, &current_file)? {
            let key = (row.file.clone(), row.line, row.target_var.clone());
            if !visited.insert(key) {
                continue;
            }
            if current_depth + 1 < depth {
                queue.push_back((row.target_var.clone(), row.file.clone(), current_depth + 1));
            }
            flows.push(FlowStep {
                from_var: current_var.clone(),
                to_var: row.target_var,
                expression: row.source_expr,
                file: row.file,
                line: row.line,
                function: row.in_function.unwrap_or_else(|| "global".to_string()),
                depth: current_depth + 1,
            });
        }
    }

    Ok(flows)
}

/// Track variables returned from a function into assignments elsewhere.
///
/// A fixed two-hop join, deliberately not a traversal: beyond one hop the
/// index lacks the call-site-to-assignment correspondence needed to avoid
/// false joins.
pub fn get_cross_function_taint(index: &CodeIndex, function: &str) -> Result<Vec<TaintFlow>> {
    if function.is_empty() {
        return Err(QueryError::EmptyTarget {
            what: "function name",
        });
    }

    let flows = index
        .return_flows(function)?
        .into_iter()
        .map(|r| TaintFlow {
            return_var: r.return_var,
            return_file: r.return_file,
            return_line: r.return_line,
            assigned_var: r.assigned_var,
            assignment_file: r.assignment_file,
            assignment_line: r.assignment_line,
            assigned_in_function: r
                .assigned_in_function
                .unwrap_or_else(|| "global".to_string()),
        })
        .collect();
    Ok(flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_fixtures as fx;

    #[test]
    fn data_dependencies_reads_and_writes() {
        let idx = CodeIndex::open_in_memory().unwrap();
        // fn f: x = a + b; y = x
        fx::assignment(&idx, "src/f.py", 2, "x", "a + b", "f");
        fx::assignment_source(&idx, "src/f.py", 2, "x", "a");
        fx::assignment_source(&idx, "src/f.py", 2, "x", "b");
        fx::assignment(&idx, "src/f.py", 3, "y", "x", "f");
        fx::assignment_source(&idx, "src/f.py", 3, "y", "x");

        let deps = get_data_dependencies(&idx, "f").unwrap();
        assert_eq!(deps.reads, vec!["a", "b", "x"]);
        assert_eq!(deps.writes.len(), 2);
        assert_eq!(deps.writes[0].variable, "x");
        assert_eq!(deps.writes[0].expression, "a + b");
        assert_eq!(deps.writes[0].line, 2);
        assert_eq!(deps.writes[1].variable, "y");
        assert_eq!(deps.writes[1].line, 3);
    }

    #[test]
    fn data_dependencies_empty_function_name_rejected() {
        let idx = CodeIndex::open_in_memory().unwrap();
        let err = get_data_dependencies(&idx, "").unwrap_err();
        assert!(matches!(err, QueryError::EmptyTarget { .. }));
    }

    #[test]
    fn data_dependencies_unknown_function_is_empty() {
        let idx = CodeIndex::open_in_memory().unwrap();
        let deps = get_data_dependencies(&idx, "ghost").unwrap();
        assert!(deps.reads.is_empty());
        assert!(deps.writes.is_empty());
    }

    #[test]
    fn trace_follows_chain_in_order() {
        let idx = CodeIndex::open_in_memory().unwrap();
        // token -> header (line 5) -> request (line 9)
        fx::assignment(&idx, "src/auth.py", 5, "header", "wrap(token)", "build");
        fx::assignment_source(&idx, "src/auth.py", 5, "header", "token");
        fx::assignment(&idx, "src/auth.py", 9, "request", "send(header)", "build");
        fx::assignment_source(&idx, "src/auth.py", 9, "request", "header");

        let flow = trace_variable_flow(&idx, "token", "auth.py", 3).unwrap();
        assert_eq!(flow.len(), 2);
        assert_eq!(flow[0].from_var, "token");
        assert_eq!(flow[0].to_var, "header");
        assert_eq!(flow[0].depth, 1);
        assert_eq!(flow[1].from_var, "header");
        assert_eq!(flow[1].to_var, "request");
        assert_eq!(flow[1].depth, 2);
        assert_eq!(flow[1].function, "build");
    }

    #[test]
    fn trace_depth_limits_hops() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::assignment(&idx, "src/a.py", 1, "b", "a", "f");
        fx::assignment_source(&idx, "src/a.py", 1, "b", "a");
        fx::assignment(&idx, "src/a.py", 2, "c", "b", "f");
        fx::assignment_source(&idx, "src/a.py", 2, "c", "b");

        let flow = trace_variable_flow(&idx, "a", "a.py", 1).unwrap();
        assert_eq!(flow.len(), 1);
        assert_eq!(flow[0].to_var, "b");
    }

    #[test]
    fn trace_terminates_on_circular_assignments() {
        let idx = CodeIndex::open_in_memory().unwrap();
        // a feeds b, b feeds a
        fx::assignment(&idx, "src/loop.py", 1, "b", "a", "f");
        fx::assignment_source(&idx, "src/loop.py", 1, "b", "a");
        fx::assignment(&idx, "src/loop.py", 2, "a", "b", "f");
        fx::assignment_source(&idx, "src/loop.py", 2, "a", "b");

        let flow = trace_variable_flow(&idx, "a", "loop.py", 5).unwrap();
        assert_eq!(flow.len(), 2, "each assignment row steps exactly once");
    }

    #[test]
    fn trace_validates_inputs_before_storage() {
        let idx = CodeIndex::open_in_memory().unwrap();
        assert!(matches!(
            trace_variable_flow(&idx, "", "f.py", 3).unwrap_err(),
            QueryError::EmptyTarget { .. }
        ));
        assert!(matches!(
            trace_variable_flow(&idx, "x", "f.py", 0).unwrap_err(),
            QueryError::InvalidDepth { depth: 0 }
        ));
        assert!(matches!(
            trace_variable_flow(&idx, "x", "f.py", 6).unwrap_err(),
            QueryError::InvalidDepth { depth: 6 }
        ));
    }

    #[test]
    fn taint_two_hop_join() {
        let idx = CodeIndex::open_in_memory().unwrap();
        // validate_user returns token; caller assigns session = token
        fx::return_source(&idx, "src/auth.py", 20, "validate_user", "token");
        fx::assignment(&idx, "src/session.py", 8, "session", "token", "login");
        fx::assignment_source(&idx, "src/session.py", 8, "session", "token");

        let flows = get_cross_function_taint(&idx, "validate_user").unwrap();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].return_var, "token");
        assert_eq!(flows[0].assigned_var, "session");
        assert_eq!(flows[0].assigned_in_function, "login");
        assert_eq!(flows[0].assignment_line, 8);
    }

    #[test]
    fn taint_unrelated_functions_do_not_join() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::return_source(&idx, "src/auth.py", 20, "validate_user", "token");
        fx::assignment(&idx, "src/other.py", 3, "x", "unrelated", "g");
        fx::assignment_source(&idx, "src/other.py", 3, "x", "unrelated");

        let flows = get_cross_function_taint(&idx, "validate_user").unwrap();
        assert!(flows.is_empty());
    }

    #[test]
    fn taint_empty_function_name_rejected() {
        let idx = CodeIndex::open_in_memory().unwrap();
        assert!(matches!(
            get_cross_function_taint(&idx, "").unwrap_err(),
            QueryError::EmptyTarget { .. }
        ));
    }
}
