//! Schema contract for the audit databases.
//!
//! The extraction pipeline populates these tables once per run; this crate
//! only ever reads them. Column names and join keys are load-bearing: any
//! change here is a breaking change for producer and consumer together.

/// DDL for the primary relational index (`repo_index.db`).
pub const CREATE_INDEX_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS symbols (
    path TEXT NOT NULL,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    line INTEGER NOT NULL,
    col INTEGER NOT NULL DEFAULT 0,
    end_line INTEGER,
    type_annotation TEXT,
    is_typed BOOLEAN DEFAULT 0,
    PRIMARY KEY (path, name, line, type, col)
);

CREATE TABLE IF NOT EXISTS symbols_jsx (
    path TEXT NOT NULL,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    line INTEGER NOT NULL,
    col INTEGER NOT NULL DEFAULT 0,
    end_line INTEGER,
    type_annotation TEXT,
    is_typed BOOLEAN DEFAULT 0,
    PRIMARY KEY (path, name, line, type, col)
);

CREATE TABLE IF NOT EXISTS function_call_args (
    file TEXT NOT NULL,
    line INTEGER NOT NULL,
    caller_function TEXT,
    callee_function TEXT NOT NULL CHECK (callee_function != ''),
    argument_index INTEGER,
    argument_expr TEXT,
    param_name TEXT,
    callee_file_path TEXT
);

CREATE TABLE IF NOT EXISTS function_call_args_jsx (
    file TEXT NOT NULL,
    line INTEGER NOT NULL,
    caller_function TEXT,
    callee_function TEXT NOT NULL CHECK (callee_function != ''),
    argument_index INTEGER,
    argument_expr TEXT,
    param_name TEXT,
    callee_file_path TEXT
);

CREATE TABLE IF NOT EXISTS assignments (
    file TEXT NOT NULL,
    line INTEGER NOT NULL,
    target_var TEXT NOT NULL,
    source_expr TEXT NOT NULL,
    in_function TEXT NOT NULL,
    PRIMARY KEY (file, line, target_var)
);

CREATE TABLE IF NOT EXISTS assignment_sources (
    id INTEGER PRIMARY KEY,
    assignment_file TEXT NOT NULL,
    assignment_line INTEGER NOT NULL,
    assignment_target TEXT NOT NULL,
    source_var_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS function_return_sources (
    id INTEGER PRIMARY KEY,
    return_file TEXT NOT NULL,
    return_line INTEGER NOT NULL,
    return_function TEXT NOT NULL,
    return_var_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS api_endpoints (
    file TEXT NOT NULL,
    line INTEGER,
    method TEXT NOT NULL,
    pattern TEXT NOT NULL,
    path TEXT,
    has_auth BOOLEAN DEFAULT 0,
    handler_function TEXT
);

CREATE TABLE IF NOT EXISTS api_endpoint_controls (
    id INTEGER PRIMARY KEY,
    endpoint_file TEXT NOT NULL,
    endpoint_line INTEGER NOT NULL,
    control_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(name);
CREATE INDEX IF NOT EXISTS idx_symbols_path ON symbols(path);
CREATE INDEX IF NOT EXISTS idx_symbols_type ON symbols(type);
CREATE INDEX IF NOT EXISTS idx_call_args_caller ON function_call_args(caller_function);
CREATE INDEX IF NOT EXISTS idx_call_args_callee ON function_call_args(callee_function);
CREATE INDEX IF NOT EXISTS idx_assignments_function ON assignments(in_function);
CREATE INDEX IF NOT EXISTS idx_assignment_sources_assignment
    ON assignment_sources(assignment_file, assignment_line, assignment_target);
CREATE INDEX IF NOT EXISTS idx_assignment_sources_var ON assignment_sources(source_var_name);
CREATE INDEX IF NOT EXISTS idx_return_sources_function ON function_return_sources(return_function);
CREATE INDEX IF NOT EXISTS idx_return_sources_var ON function_return_sources(return_var_name);
CREATE INDEX IF NOT EXISTS idx_endpoint_controls_endpoint
    ON api_endpoint_controls(endpoint_file, endpoint_line);
";

/// DDL for the secondary graph store (`graphs.db`).
///
/// Node identity is a file path for import edges and `file:symbol` for call
/// edges; `graph_type` distinguishes the two graphs stored in one table.
pub const CREATE_GRAPH_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY,
    file TEXT NOT NULL,
    lang TEXT,
    loc INTEGER DEFAULT 0,
    type TEXT DEFAULT 'module',
    graph_type TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY,
    source TEXT NOT NULL,
    target TEXT NOT NULL,
    type TEXT DEFAULT 'import',
    file TEXT,
    line INTEGER,
    graph_type TEXT NOT NULL,
    UNIQUE(source, target, type, graph_type)
);

CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target);
CREATE INDEX IF NOT EXISTS idx_nodes_file ON nodes(file);
";

/// Tables the primary index must contain for the engine to open at all.
pub const REQUIRED_INDEX_TABLES: &[&str] = &["symbols", "function_call_args"];

/// Load-bearing columns checked on the required index tables.
pub const REQUIRED_SYMBOL_COLUMNS: &[&str] = &["path", "name", "type", "line"];
pub const REQUIRED_CALL_COLUMNS: &[&str] =
    &["file", "line", "caller_function", "callee_function"];

/// Tables the graph store must contain for the dead-code detector to run.
pub const REQUIRED_GRAPH_TABLES: &[&str] = &["edges", "nodes"];

/// Load-bearing columns checked on the edges table.
pub const REQUIRED_EDGE_COLUMNS: &[&str] = &["source", "target", "type", "graph_type"];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn index_schema_creates_without_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_INDEX_SCHEMA).unwrap();
    }

    #[test]
    fn graph_schema_creates_without_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_GRAPH_SCHEMA).unwrap();
    }

    #[test]
    fn schemas_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_INDEX_SCHEMA).unwrap();
        conn.execute_batch(CREATE_INDEX_SCHEMA).unwrap();
        conn.execute_batch(CREATE_GRAPH_SCHEMA).unwrap();
        conn.execute_batch(CREATE_GRAPH_SCHEMA).unwrap();
    }
}
