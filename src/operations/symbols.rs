//! Symbol lookup.

use serde::Serialize;

use crate::db::CodeIndex;
use crate::error::Result;
use crate::models::Symbol;

/// Result of a symbol lookup.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolResult {
    /// The name that was looked up.
    pub name: String,
    /// Matching definitions, across all files.
    pub symbols: Vec<Symbol>,
}

/// Find symbol definitions by exact, case-sensitive name match.
///
/// Queries the main symbol table and the framework-flavored twin. A name
/// with no definitions yields an empty list, not an error.
pub fn find_symbol(index: &CodeIndex, name: &str, kind: Option<&str>) -> Result<SymbolResult> {
    let symbols = index.symbols_by_name(name, kind)?;
    Ok(SymbolResult {
        name: name.to_string(),
        symbols,
    })
}
