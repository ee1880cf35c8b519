//! Parameterized row queries over the audit databases.
//!
//! Every statement binds values; nothing is interpolated. Table names come
//! from fixed lists only. The call-site tables store one row per argument,
//! so call-site readers fold argument rows back into one [`CallSite`] per
//! call expression.

use rusqlite::{params, Connection};

use crate::error::{QueryError, Result};
use crate::models::{CallSite, Dependency, Symbol};

use super::CodeIndex;

/// Symbol tables queried in union: the main table plus the
/// framework-flavored twin. The twin may be absent (e.g. no JSX in a
/// Python-only project) and is skipped silently.
const SYMBOL_TABLES: &[&str] = &["symbols", "symbols_jsx"];

/// Call-site tables queried in union, same twin rule as `SYMBOL_TABLES`.
const CALL_TABLES: &[&str] = &["function_call_args", "function_call_args_jsx"];

/// A raw data-flow row: an assignment consuming some source variable.
#[derive(Debug, Clone)]
pub struct AssignmentRow {
    pub target_var: String,
    pub source_expr: String,
    pub file: String,
    pub line: u32,
    pub in_function: Option<String>,
}

impl CodeIndex {
    fn require_index_table(&self, table: &str) -> Result<()> {
        if Self::table_exists(self.index(), table)? {
            Ok(())
        } else {
            Err(QueryError::TableMissing {
                table: table.to_string(),
            })
        }
    }

    // ─── Symbol lookups ───

    /// Exact-name symbol lookup across the main and twin tables.
    pub fn symbols_by_name(&self, name: &str, kind: Option<&str>) -> Result<Vec<Symbol>> {
        let mut results = Vec::new();
        for table in SYMBOL_TABLES {
            if !Self::table_exists(self.index(), table)? {
                continue;
            }
            let sql = format!(
                "SELECT path, name, type, line, end_line, type_annotation, is_typed
                 FROM {table}
                 WHERE name = ?1 AND (?2 IS NULL OR type = ?2)
                 ORDER BY path, line"
            );
            let mut stmt = self.index().prepare(&sql)?;
            let rows = stmt.query_map(params![name, kind], Self::map_symbol)?;
            for r in rows {
                results.push(r?);
            }
        }
        Ok(results)
    }

    /// Distinct files declaring symbols of the given kinds.
    pub fn files_with_symbol_kinds(&self, kinds: &[&str]) -> Result<Vec<String>> {
        if kinds.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; kinds.len()].join(", ");
        let sql = format!("SELECT DISTINCT path FROM symbols WHERE type IN ({placeholders})");
        let mut stmt = self.index().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(kinds), |row| {
            row.get::<_, String>(0)
        })?;
        let mut files = Vec::new();
        for r in rows {
            files.push(r?);
        }
        Ok(files)
    }

    /// Distinct files declaring framework symbols of the given kinds,
    /// from the twin table. Empty when the twin is absent.
    pub fn files_with_framework_kinds(&self, kinds: &[&str]) -> Result<Vec<String>> {
        if kinds.is_empty() || !Self::table_exists(self.index(), "symbols_jsx")? {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; kinds.len()].join(", ");
        let sql = format!("SELECT DISTINCT path FROM symbols_jsx WHERE type IN ({placeholders})");
        let mut stmt = self.index().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(kinds), |row| {
            row.get::<_, String>(0)
        })?;
        let mut files = Vec::new();
        for r in rows {
            files.push(r?);
        }
        Ok(files)
    }

    /// Symbols of the given kinds declared within a set of files.
    pub fn symbols_in_files(&self, files: &[String], kinds: &[&str]) -> Result<Vec<Symbol>> {
        if files.is_empty() || kinds.is_empty() {
            return Ok(Vec::new());
        }
        let file_ph = vec!["?"; files.len()].join(", ");
        let kind_ph = vec!["?"; kinds.len()].join(", ");
        let sql = format!(
            "SELECT path, name, type, line, end_line, type_annotation, is_typed
             FROM symbols
             WHERE path IN ({file_ph}) AND type IN ({kind_ph})
             ORDER BY path, line"
        );
        let mut stmt = self.index().prepare(&sql)?;
        let bound = files
            .iter()
            .map(String::as_str)
            .chain(kinds.iter().copied());
        let rows = stmt.query_map(rusqlite::params_from_iter(bound), Self::map_symbol)?;
        let mut symbols = Vec::new();
        for r in rows {
            symbols.push(r?);
        }
        Ok(symbols)
    }

    /// Number of symbols declared in one file.
    pub fn symbol_count_for_file(&self, path: &str) -> Result<u64> {
        let count: i64 = self.index().query_row(
            "SELECT COUNT(*) FROM symbols WHERE path = ?1",
            params![path],
            |r| r.get(0),
        )?;
        Ok(count as u64)
    }

    fn map_symbol(row: &rusqlite::Row<'_>) -> rusqlite::Result<Symbol> {
        let line: u32 = row.get(3)?;
        Ok(Symbol {
            file: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            line,
            end_line: row.get::<_, Option<u32>>(4)?.unwrap_or(line),
            signature: row.get(5)?,
            is_exported: row.get::<_, Option<bool>>(6)?.unwrap_or(false),
        })
    }

    // ─── Call-site lookups ───

    /// Call sites whose callee matches `callee` exactly.
    pub fn call_sites_to(&self, callee: &str) -> Result<Vec<CallSite>> {
        self.fold_call_rows(
            "WHERE callee_function = ?1
             ORDER BY file, line, argument_index",
            params![callee],
        )
    }

    /// Call sites made from inside a function whose recorded name contains
    /// `caller`. Substring match: qualified names like `Class.method` may be
    /// recorded as larger tokens.
    pub fn call_sites_from(&self, caller: &str) -> Result<Vec<CallSite>> {
        let pattern = format!("%{caller}%");
        self.fold_call_rows(
            "WHERE caller_function LIKE ?1
             ORDER BY file, line, argument_index",
            params![pattern],
        )
    }

    /// Run a call-site query against both call tables and fold the
    /// one-row-per-argument storage back into one `CallSite` per call.
    fn fold_call_rows(&self, clause: &str, bind: impl rusqlite::Params + Copy) -> Result<Vec<CallSite>> {
        let mut sites: Vec<CallSite> = Vec::new();
        for table in CALL_TABLES {
            if !Self::table_exists(self.index(), table)? {
                continue;
            }
            let sql = format!(
                "SELECT file, line, caller_function, callee_function, argument_expr
                 FROM {table} {clause}"
            );
            let mut stmt = self.index().prepare(&sql)?;
            let rows = stmt.query_map(bind, |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?;
            for r in rows {
                let (file, line, caller_function, callee, argument) = r?;
                let same_call = sites.last().is_some_and(|s: &CallSite| {
                    s.caller_file == file
                        && s.caller_line == line
                        && s.caller_function == caller_function
                        && s.callee == callee
                });
                if same_call {
                    if let (Some(last), Some(arg)) = (sites.last_mut(), argument) {
                        last.arguments.push(arg);
                    }
                } else {
                    sites.push(CallSite {
                        caller_file: file,
                        caller_line: line,
                        caller_function,
                        callee,
                        arguments: argument.into_iter().collect(),
                    });
                }
            }
        }
        Ok(sites)
    }

    // ─── Data-flow lookups ───

    /// Assignments written inside one function, in line order.
    pub fn assignments_in_function(&self, function: &str) -> Result<Vec<AssignmentRow>> {
        self.require_index_table("assignments")?;
        let mut stmt = self.index().prepare(
            "SELECT target_var, source_expr, file, line, in_function
             FROM assignments
             WHERE in_function = ?1
             ORDER BY line",
        )?;
        let rows = stmt.query_map(params![function], Self::map_assignment)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Distinct source variables consumed by one function's assignments,
    /// via the junction table. One join, no list parsing.
    pub fn reads_in_function(&self, function: &str) -> Result<Vec<String>> {
        self.require_index_table("assignments")?;
        self.require_index_table("assignment_sources")?;
        let mut stmt = self.index().prepare(
            "SELECT DISTINCT asrc.source_var_name
             FROM assignments a
             JOIN assignment_sources asrc
                 ON a.file = asrc.assignment_file
                 AND a.line = asrc.assignment_line
                 AND a.target_var = asrc.assignment_target
             WHERE a.in_function = ?1
             ORDER BY asrc.source_var_name",
        )?;
        let rows = stmt.query_map(params![function], |row| row.get::<_, String>(0))?;
        let mut reads = Vec::new();
        for r in rows {
            reads.push(r?);
        }
        Ok(reads)
    }

    /// Assignments that consume `variable` in files matching `scope_file`
    /// (substring). One BFS expansion step of the def-use chain.
    pub fn assignments_reading(&self, variable: &str, scope_file: &str) -> Result<Vec<AssignmentRow>> {
        self.require_index_table("assignments")?;
        self.require_index_table("assignment_sources")?;
        let pattern = format!("%{scope_file}%");
        let mut stmt = self.index().prepare(
            "SELECT a.target_var, a.source_expr, a.file, a.line, a.in_function
             FROM assignments a
             JOIN assignment_sources asrc
                 ON a.file = asrc.assignment_file
                 AND a.line = asrc.assignment_line
                 AND a.target_var = asrc.assignment_target
             WHERE asrc.source_var_name = ?1 AND a.file LIKE ?2
             ORDER BY a.file, a.line",
        )?;
        let rows = stmt.query_map(params![variable, pattern], Self::map_assignment)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn map_assignment(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssignmentRow> {
        Ok(AssignmentRow {
            target_var: row.get(0)?,
            source_expr: row.get(1)?,
            file: row.get(2)?,
            line: row.get(3)?,
            in_function: row.get(4)?,
        })
    }

    /// Two-hop cross-function join: variables returned by `function`,
    /// matched against assignments that consume a variable of the same name.
    pub fn return_flows(&self, function: &str) -> Result<Vec<ReturnFlowRow>> {
        self.require_index_table("function_return_sources")?;
        self.require_index_table("assignments")?;
        self.require_index_table("assignment_sources")?;
        let mut stmt = self.index().prepare(
            "SELECT
                 frs.return_var_name,
                 frs.return_file,
                 frs.return_line,
                 a.target_var,
                 a.file,
                 a.line,
                 a.in_function
             FROM function_return_sources frs
             JOIN assignment_sources asrc
                 ON frs.return_var_name = asrc.source_var_name
             JOIN assignments a
                 ON asrc.assignment_file = a.file
                 AND asrc.assignment_line = a.line
                 AND asrc.assignment_target = a.target_var
             WHERE frs.return_function = ?1
             ORDER BY frs.return_line, a.line",
        )?;
        let rows = stmt.query_map(params![function], |row| {
            Ok(ReturnFlowRow {
                return_var: row.get(0)?,
                return_file: row.get(1)?,
                return_line: row.get(2)?,
                assigned_var: row.get(3)?,
                assignment_file: row.get(4)?,
                assignment_line: row.get(5)?,
                assigned_in_function: row.get(6)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // ─── Endpoint coverage ───

    /// Left-outer aggregation of endpoints against their controls. Endpoints
    /// with zero controls produce a row with an empty control list.
    pub fn endpoint_coverage(&self, route_filter: Option<&str>) -> Result<Vec<CoverageJoinRow>> {
        self.require_index_table("api_endpoints")?;
        self.require_index_table("api_endpoint_controls")?;
        let pattern = route_filter.map(|f| format!("%{f}%"));
        let mut stmt = self.index().prepare(
            "SELECT
                 ae.file,
                 ae.line,
                 ae.method,
                 ae.pattern,
                 ae.path,
                 ae.handler_function,
                 GROUP_CONCAT(aec.control_name, ', ')
             FROM api_endpoints ae
             LEFT JOIN api_endpoint_controls aec
                 ON ae.file = aec.endpoint_file
                 AND ae.line = aec.endpoint_line
             WHERE ?1 IS NULL OR ae.pattern LIKE ?1 OR ae.path LIKE ?1
             GROUP BY ae.file, ae.line, ae.method, ae.path
             ORDER BY ae.path, ae.method",
        )?;
        let rows = stmt.query_map(params![pattern], |row| {
            Ok(CoverageJoinRow {
                file: row.get(0)?,
                line: row.get::<_, Option<u32>>(1)?.unwrap_or(0),
                method: row.get(2)?,
                pattern: row.get(3)?,
                path: row.get(4)?,
                handler_function: row.get(5)?,
                controls_concat: row.get(6)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Distinct files registering API endpoints.
    pub fn endpoint_files(&self) -> Result<Vec<String>> {
        self.require_index_table("api_endpoints")?;
        let mut stmt = self
            .index()
            .prepare("SELECT DISTINCT file FROM api_endpoints")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut files = Vec::new();
        for r in rows {
            files.push(r?);
        }
        Ok(files)
    }

    // ─── Graph-store lookups ───

    /// Import edges, optionally restricted to sources matching a filter.
    pub fn import_edges(&self, path_filter: Option<&str>) -> Result<Vec<EdgeRow>> {
        let conn = self.graph()?;
        let pattern = path_filter.map(|f| format!("%{f}%"));
        Self::edge_rows(
            conn,
            "SELECT source, target, type, line
             FROM edges
             WHERE graph_type = 'import'
               AND type IN ('import', 'from', 'require')
               AND (?1 IS NULL OR source LIKE ?1)",
            params![pattern],
        )
    }

    /// Call edges (`file:symbol` node identity), optionally filtered.
    pub fn call_edges(&self, path_filter: Option<&str>) -> Result<Vec<EdgeRow>> {
        let conn = self.graph()?;
        let pattern = path_filter.map(|f| format!("%{f}%"));
        Self::edge_rows(
            conn,
            "SELECT source, target, type, line
             FROM edges
             WHERE graph_type = 'call' AND type = 'call'
               AND (?1 IS NULL OR source LIKE ?1)",
            params![pattern],
        )
    }

    /// Import edges whose target matches `file` (who imports it).
    pub fn edges_into_file(&self, file: &str) -> Result<Vec<Dependency>> {
        let conn = self.graph()?;
        let pattern = format!("%{file}%");
        let rows = Self::edge_rows(
            conn,
            "SELECT source, target, type, line
             FROM edges
             WHERE graph_type = 'import' AND target LIKE ?1
             ORDER BY source",
            params![pattern],
        )?;
        Ok(rows.into_iter().map(EdgeRow::into_dependency).collect())
    }

    /// Import edges whose source matches `file` (what it imports).
    pub fn edges_out_of_file(&self, file: &str) -> Result<Vec<Dependency>> {
        let conn = self.graph()?;
        let pattern = format!("%{file}%");
        let rows = Self::edge_rows(
            conn,
            "SELECT source, target, type, line
             FROM edges
             WHERE graph_type = 'import' AND source LIKE ?1
             ORDER BY target",
            params![pattern],
        )?;
        Ok(rows.into_iter().map(EdgeRow::into_dependency).collect())
    }

    fn edge_rows(
        conn: &Connection,
        sql: &str,
        bind: impl rusqlite::Params,
    ) -> Result<Vec<EdgeRow>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(bind, |row| {
            Ok(EdgeRow {
                source: row.get(0)?,
                target: row.get(1)?,
                kind: row.get(2)?,
                line: row.get::<_, Option<u32>>(3)?.unwrap_or(0),
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    // ─── Statistics ───

    /// Row counts across the index, plus graph-store counts when present.
    pub fn stats(&self) -> Result<IndexStats> {
        let count = |table: &str| -> Result<u64> {
            if !Self::table_exists(self.index(), table)? {
                return Ok(0);
            }
            let n: i64 =
                self.index()
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            Ok(n as u64)
        };

        let (graph_nodes, graph_edges) = if let Ok(conn) = self.graph() {
            let nodes: i64 = conn.query_row("SELECT COUNT(*) FROM nodes", [], |r| r.get(0))?;
            let edges: i64 = conn.query_row("SELECT COUNT(*) FROM edges", [], |r| r.get(0))?;
            (Some(nodes as u64), Some(edges as u64))
        } else {
            (None, None)
        };

        Ok(IndexStats {
            symbols: count("symbols")? + count("symbols_jsx")?,
            call_sites: count("function_call_args")? + count("function_call_args_jsx")?,
            assignments: count("assignments")?,
            endpoints: count("api_endpoints")?,
            graph_nodes,
            graph_edges,
        })
    }
}

/// One raw edge from the graph store.
#[derive(Debug, Clone)]
pub struct EdgeRow {
    pub source: String,
    pub target: String,
    pub kind: String,
    pub line: u32,
}

impl EdgeRow {
    fn into_dependency(self) -> Dependency {
        Dependency {
            source_file: self.source,
            target_file: self.target,
            import_kind: self.kind,
            line: self.line,
        }
    }
}

/// One row of the two-hop return-to-assignment join.
#[derive(Debug, Clone)]
pub struct ReturnFlowRow {
    pub return_var: String,
    pub return_file: String,
    pub return_line: u32,
    pub assigned_var: String,
    pub assignment_file: String,
    pub assignment_line: u32,
    pub assigned_in_function: Option<String>,
}

/// One aggregated endpoint row before control-list splitting.
#[derive(Debug, Clone)]
pub struct CoverageJoinRow {
    pub file: String,
    pub line: u32,
    pub method: String,
    pub pattern: String,
    pub path: Option<String>,
    pub handler_function: Option<String>,
    pub controls_concat: Option<String>,
}

/// Index statistics.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndexStats {
    pub symbols: u64,
    pub call_sites: u64,
    pub assignments: u64,
    pub endpoints: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_nodes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_edges: Option<u64>,
}

#[cfg(test)]
mod tests {
    use crate::db::test_fixtures as fx;
    use crate::db::CodeIndex;
    use crate::error::QueryError;

    #[test]
    fn symbols_by_name_unions_twin_table() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::symbol(&idx, "src/auth.py", "validate", "function", 10, 20);
        fx::jsx_symbol(&idx, "src/Login.tsx", "validate", "function", 5, 15);

        let symbols = idx.symbols_by_name("validate", None).unwrap();
        assert_eq!(symbols.len(), 2);

        let typed = idx.symbols_by_name("validate", Some("function")).unwrap();
        assert_eq!(typed.len(), 2);
        let none = idx.symbols_by_name("validate", Some("class")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn symbols_by_name_tolerates_missing_twin() {
        let idx = CodeIndex::open_in_memory().unwrap();
        idx.index().execute_batch("DROP TABLE symbols_jsx").unwrap();
        fx::symbol(&idx, "src/auth.py", "validate", "function", 10, 20);

        let symbols = idx.symbols_by_name("validate", None).unwrap();
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn call_sites_fold_argument_rows() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::call(
            &idx,
            "src/app.py",
            30,
            Some("handler"),
            "sanitize",
            &["req.body", "opts"],
        );

        let sites = idx.call_sites_to("sanitize").unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].arguments, vec!["req.body", "opts"]);
        assert_eq!(sites[0].caller_function.as_deref(), Some("handler"));
    }

    #[test]
    fn call_sites_keep_distinct_lines_separate() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::call(&idx, "src/app.py", 30, Some("handler"), "sanitize", &["x"]);
        fx::call(&idx, "src/app.py", 42, Some("handler"), "sanitize", &["y"]);

        let sites = idx.call_sites_to("sanitize").unwrap();
        assert_eq!(sites.len(), 2);
    }

    #[test]
    fn missing_assignments_table_is_reported() {
        let idx = CodeIndex::open_in_memory().unwrap();
        idx.index().execute_batch("DROP TABLE assignments").unwrap();
        let err = idx.assignments_in_function("f").unwrap_err();
        match err {
            QueryError::TableMissing { table } => assert_eq!(table, "assignments"),
            other => panic!("expected TableMissing, got {other}"),
        }
    }

    #[test]
    fn import_edges_require_graph_store() {
        let idx = CodeIndex::open_in_memory_without_graph().unwrap();
        assert!(matches!(
            idx.import_edges(None).unwrap_err(),
            QueryError::GraphUnavailable
        ));
    }

    #[test]
    fn stats_counts_rows() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::symbol(&idx, "src/a.py", "f", "function", 1, 2);
        fx::call(&idx, "src/a.py", 5, None, "f", &[]);
        fx::import_edge(&idx, "src/a.py", "src/b.py");

        let stats = idx.stats().unwrap();
        assert_eq!(stats.symbols, 1);
        assert_eq!(stats.call_sites, 1);
        assert_eq!(stats.graph_edges, Some(1));
    }
}
