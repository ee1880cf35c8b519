use thiserror::Error;

/// Crate-wide error type.
///
/// Variants fall into three tiers: precondition failures that abort the whole
/// engine (`IndexNotFound`, `SchemaMismatch`), optional-dependency failures
/// that degrade a single query (`GraphUnavailable`, `TableMissing`), and
/// input validation failures raised before any storage access
/// (`InvalidDepth`, `EmptyTarget`).
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index not found: {path}\nrun the extraction pipeline to build the code index first")]
    IndexNotFound { path: String },

    #[error("index schema mismatch in table '{table}': {detail}\nthe index is stale or was built by an incompatible extractor; rebuild it")]
    SchemaMismatch { table: String, detail: String },

    #[error("graph store not available: dependency and dead-code analysis require graphs.db\nrun the graph builder to create it")]
    GraphUnavailable,

    #[error("table '{table}' not found in the index\nrebuild the index with a current extractor to populate it")]
    TableMissing { table: String },

    #[error("depth must be between 1 and 5, got {depth}")]
    InvalidDepth { depth: u32 },

    #[error("{what} cannot be empty")]
    EmptyTarget { what: &'static str },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
