//! Row-insertion helpers for tests. The engine itself never writes to the
//! index; these stand in for the extraction pipeline.

use rusqlite::params;

use super::CodeIndex;

pub(crate) fn symbol(idx: &CodeIndex, path: &str, name: &str, kind: &str, line: u32, end_line: u32) {
    idx.index()
        .execute(
            "INSERT INTO symbols (path, name, type, line, col, end_line) VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![path, name, kind, line, end_line],
        )
        .unwrap();
}

pub(crate) fn jsx_symbol(
    idx: &CodeIndex,
    path: &str,
    name: &str,
    kind: &str,
    line: u32,
    end_line: u32,
) {
    idx.index()
        .execute(
            "INSERT INTO symbols_jsx (path, name, type, line, col, end_line) VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![path, name, kind, line, end_line],
        )
        .unwrap();
}

pub(crate) fn call(
    idx: &CodeIndex,
    file: &str,
    line: u32,
    caller: Option<&str>,
    callee: &str,
    args: &[&str],
) {
    if args.is_empty() {
        idx.index()
            .execute(
                "INSERT INTO function_call_args (file, line, caller_function, callee_function)
                 VALUES (?1, ?2, ?3, ?4)",
                params![file, line, caller, callee],
            )
            .unwrap();
        return;
    }
    for (i, arg) in args.iter().enumerate() {
        idx.index()
            .execute(
                "INSERT INTO function_call_args
                     (file, line, caller_function, callee_function, argument_index, argument_expr)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![file, line, caller, callee, i as i64, arg],
            )
            .unwrap();
    }
}

pub(crate) fn assignment(
    idx: &CodeIndex,
    file: &str,
    line: u32,
    target: &str,
    expr: &str,
    function: &str,
) {
    idx.index()
        .execute(
            "INSERT INTO assignments (file, line, target_var, source_expr, in_function)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![file, line, target, expr, function],
        )
        .unwrap();
}

pub(crate) fn assignment_source(
    idx: &CodeIndex,
    file: &str,
    line: u32,
    target: &str,
    source_var: &str,
) {
    idx.index()
        .execute(
            "INSERT INTO assignment_sources
                 (assignment_file, assignment_line, assignment_target, source_var_name)
             VALUES (?1, ?2, ?3, ?4)",
            params![file, line, target, source_var],
        )
        .unwrap();
}

pub(crate) fn return_source(idx: &CodeIndex, file: &str, line: u32, function: &str, var: &str) {
    idx.index()
        .execute(
            "INSERT INTO function_return_sources
                 (return_file, return_line, return_function, return_var_name)
             VALUES (?1, ?2, ?3, ?4)",
            params![file, line, function, var],
        )
        .unwrap();
}

pub(crate) fn endpoint(
    idx: &CodeIndex,
    file: &str,
    line: u32,
    method: &str,
    pattern: &str,
    path: &str,
    handler: &str,
) {
    idx.index()
        .execute(
            "INSERT INTO api_endpoints (file, line, method, pattern, path, handler_function)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![file, line, method, pattern, path, handler],
        )
        .unwrap();
}

pub(crate) fn control(idx: &CodeIndex, file: &str, line: u32, name: &str) {
    idx.index()
        .execute(
            "INSERT INTO api_endpoint_controls (endpoint_file, endpoint_line, control_name)
             VALUES (?1, ?2, ?3)",
            params![file, line, name],
        )
        .unwrap();
}

pub(crate) fn import_edge(idx: &CodeIndex, source: &str, target: &str) {
    idx.graph()
        .unwrap()
        .execute(
            "INSERT INTO edges (source, target, type, graph_type) VALUES (?1, ?2, 'import', 'import')",
            params![source, target],
        )
        .unwrap();
}

pub(crate) fn call_edge(idx: &CodeIndex, source: &str, target: &str) {
    idx.graph()
        .unwrap()
        .execute(
            "INSERT INTO edges (source, target, type, graph_type) VALUES (?1, ?2, 'call', 'call')",
            params![source, target],
        )
        .unwrap();
}
