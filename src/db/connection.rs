use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::config::Config;
use crate::db::schema::{
    CREATE_GRAPH_SCHEMA, CREATE_INDEX_SCHEMA, REQUIRED_CALL_COLUMNS, REQUIRED_EDGE_COLUMNS,
    REQUIRED_GRAPH_TABLES, REQUIRED_INDEX_TABLES, REQUIRED_SYMBOL_COLUMNS,
};
use crate::error::{QueryError, Result};

/// Read-only accessor over the audit databases.
///
/// Owns both storage connections for the lifetime of one engine instance:
/// the primary relational index (required) and the secondary graph store
/// (optional, recorded at open time and surfaced per-query). Connections are
/// released on drop, on every exit path.
pub struct CodeIndex {
    index: Connection,
    graph: Option<Connection>,
}

impl CodeIndex {
    /// Open the index for a project.
    ///
    /// Fails fast if the primary index is absent or its schema does not
    /// match the extractor contract. A missing graph store is not fatal
    /// here; queries that need it report it unavailable individually.
    pub fn open(config: &Config) -> Result<Self> {
        if !config.index_exists() {
            return Err(QueryError::IndexNotFound {
                path: config.index_db_path.display().to_string(),
            });
        }

        let index = Self::open_read_only(&config.index_db_path)?;
        Self::validate_index_schema(&index)?;

        let graph = if config.graph_store_exists() {
            Some(Self::open_read_only(&config.graph_db_path)?)
        } else {
            tracing::debug!("graph store absent; dependency and dead-code queries degraded");
            None
        };

        Ok(Self { index, graph })
    }

    fn open_read_only(path: &Path) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Create an in-memory index with both schemas applied (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let index = Connection::open_in_memory()?;
        index.execute_batch(CREATE_INDEX_SCHEMA)?;
        let graph = Connection::open_in_memory()?;
        graph.execute_batch(CREATE_GRAPH_SCHEMA)?;
        Ok(Self {
            index,
            graph: Some(graph),
        })
    }

    /// Create an in-memory index with no graph store (for testing the
    /// degraded path).
    pub fn open_in_memory_without_graph() -> Result<Self> {
        let index = Connection::open_in_memory()?;
        index.execute_batch(CREATE_INDEX_SCHEMA)?;
        Ok(Self { index, graph: None })
    }

    /// Access the primary index connection.
    pub fn index(&self) -> &Connection {
        &self.index
    }

    /// Access the graph store connection, or report it unavailable.
    pub fn graph(&self) -> Result<&Connection> {
        self.graph.as_ref().ok_or(QueryError::GraphUnavailable)
    }

    /// Whether the secondary graph store was present at open time.
    #[must_use]
    pub fn has_graph_store(&self) -> bool {
        self.graph.is_some()
    }

    /// Check whether a table exists on a connection.
    pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
        let mut cols = Vec::new();
        for r in rows {
            cols.push(r?);
        }
        Ok(cols)
    }

    fn require_columns(
        conn: &Connection,
        table: &str,
        required: &[&str],
    ) -> Result<()> {
        let cols = Self::table_columns(conn, table)?;
        let missing: Vec<&str> = required
            .iter()
            .filter(|c| !cols.iter().any(|have| have == *c))
            .copied()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(QueryError::SchemaMismatch {
                table: table.to_string(),
                detail: format!("missing columns: {}", missing.join(", ")),
            })
        }
    }

    fn validate_index_schema(conn: &Connection) -> Result<()> {
        for table in REQUIRED_INDEX_TABLES {
            if !Self::table_exists(conn, table)? {
                return Err(QueryError::SchemaMismatch {
                    table: (*table).to_string(),
                    detail: "table not found".to_string(),
                });
            }
        }
        Self::require_columns(conn, "symbols", REQUIRED_SYMBOL_COLUMNS)?;
        Self::require_columns(conn, "function_call_args", REQUIRED_CALL_COLUMNS)?;
        Ok(())
    }

    /// Validate the graph-store schema.
    ///
    /// Hard precondition for the dead-code detector: reachability without
    /// edges is meaningless, so a missing store or mismatched table aborts
    /// rather than producing a silent zero-findings result.
    pub fn validate_graph_schema(&self) -> Result<()> {
        let conn = self.graph()?;
        for table in REQUIRED_GRAPH_TABLES {
            if !Self::table_exists(conn, table)? {
                return Err(QueryError::SchemaMismatch {
                    table: (*table).to_string(),
                    detail: "table not found in graph store".to_string(),
                });
            }
        }
        Self::require_columns(conn, "edges", REQUIRED_EDGE_COLUMNS)?;
        Ok(())
    }
}
