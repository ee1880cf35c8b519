use serde::Serialize;

/// A symbol definition with provenance.
///
/// Identity is `(file, name, line)`; multiple symbols may share a name
/// across files.
#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    /// Symbol name (function, class, method, variable binding).
    pub name: String,
    /// Symbol kind as recorded by the extractor (function, class, ...).
    pub kind: String,
    /// File path (project-relative).
    pub file: String,
    /// Starting line number.
    pub line: u32,
    /// Ending line number.
    pub end_line: u32,
    /// Type signature if the extractor recorded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Whether the symbol is exported from its module.
    pub is_exported: bool,
}

/// One call expression, as recorded in the call-site table.
///
/// `callee` is not guaranteed to resolve to a known [`Symbol`]: dynamically
/// dispatched and external-library calls never do.
#[derive(Debug, Clone, Serialize)]
pub struct CallSite {
    /// File containing the call.
    pub caller_file: String,
    /// Line number of the call.
    pub caller_line: u32,
    /// Enclosing function making the call; `None` for module-scope calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_function: Option<String>,
    /// Function being called.
    pub callee: String,
    /// Argument expressions at the call site.
    pub arguments: Vec<String>,
}

impl CallSite {
    /// Visited-set key bounding recursive and cyclic call chains.
    #[must_use]
    pub fn visit_key(&self) -> (Option<String>, String, u32) {
        (
            self.caller_function.clone(),
            self.caller_file.clone(),
            self.caller_line,
        )
    }
}

/// An import edge between two files.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    /// File that imports.
    pub source_file: String,
    /// File being imported.
    pub target_file: String,
    /// Kind of relationship (import, from, require).
    pub import_kind: String,
    /// Line number where the dependency occurs, 0 if unrecorded.
    pub line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_site_visit_key_distinguishes_lines() {
        let a = CallSite {
            caller_file: "src/a.py".into(),
            caller_line: 10,
            caller_function: Some("f".into()),
            callee: "g".into(),
            arguments: vec![],
        };
        let mut b = a.clone();
        b.caller_line = 11;
        assert_ne!(a.visit_key(), b.visit_key());
    }

    #[test]
    fn module_scope_call_serializes_without_caller() {
        let c = CallSite {
            caller_file: "src/a.py".into(),
            caller_line: 1,
            caller_function: None,
            callee: "setup".into(),
            arguments: vec!["cfg".into()],
        };
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("caller_function"));
        assert!(json.contains("\"callee\":\"setup\""));
    }
}
