//! File dependency queries over the import graph.

use serde::Serialize;

use crate::db::CodeIndex;
use crate::error::Result;
use crate::models::Dependency;

/// Which side of the import relation to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
    Both,
}

impl Direction {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incoming" => Some(Self::Incoming),
            "outgoing" => Some(Self::Outgoing),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Direct (non-transitive) import dependencies of one file.
///
/// A side that was not requested stays `None`; a requested side with no
/// edges is an empty list. "Graph store never built" is a separate error,
/// never conflated with either.
#[derive(Debug, Clone, Serialize)]
pub struct FileDependencies {
    /// The file queried.
    pub file: String,
    /// Files importing this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming: Option<Vec<Dependency>>,
    /// Files this one imports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<Vec<Dependency>>,
}

/// Look up direct import dependencies for a file.
///
/// Paths are substring-matched to tolerate prefix differences between the
/// extractor's normalization and the caller's. Requires the secondary graph
/// store; without it the query degrades to [`QueryError::GraphUnavailable`].
///
/// [`QueryError::GraphUnavailable`]: crate::error::QueryError::GraphUnavailable
pub fn get_file_dependencies(
    index: &CodeIndex,
    file: &str,
    direction: Direction,
) -> Result<FileDependencies> {
    let incoming = match direction {
        Direction::Incoming | Direction::Both => Some(index.edges_into_file(file)?),
        Direction::Outgoing => None,
    };
    let outgoing = match direction {
        Direction::Outgoing | Direction::Both => Some(index.edges_out_of_file(file)?),
        Direction::Incoming => None,
    };

    Ok(FileDependencies {
        file: file.to_string(),
        incoming,
        outgoing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_fixtures as fx;
    use crate::error::QueryError;

    fn deps_index() -> CodeIndex {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::import_edge(&idx, "src/app.py", "src/auth.py");
        fx::import_edge(&idx, "src/api.py", "src/auth.py");
        fx::import_edge(&idx, "src/auth.py", "src/db.py");
        idx
    }

    #[test]
    fn both_directions() {
        let idx = deps_index();
        let deps = get_file_dependencies(&idx, "auth.py", Direction::Both).unwrap();
        assert_eq!(deps.incoming.as_ref().unwrap().len(), 2);
        assert_eq!(deps.outgoing.as_ref().unwrap().len(), 1);
        assert_eq!(deps.outgoing.unwrap()[0].target_file, "src/db.py");
    }

    #[test]
    fn single_direction_leaves_other_unset() {
        let idx = deps_index();
        let deps = get_file_dependencies(&idx, "auth.py", Direction::Incoming).unwrap();
        assert!(deps.incoming.is_some());
        assert!(deps.outgoing.is_none());
    }

    #[test]
    fn no_dependencies_is_empty_not_error() {
        let idx = deps_index();
        let deps = get_file_dependencies(&idx, "orphan.py", Direction::Both).unwrap();
        assert!(deps.incoming.unwrap().is_empty());
        assert!(deps.outgoing.unwrap().is_empty());
    }

    #[test]
    fn missing_graph_store_is_unavailable_not_empty() {
        let idx = CodeIndex::open_in_memory_without_graph().unwrap();
        let err = get_file_dependencies(&idx, "auth.py", Direction::Both).unwrap_err();
        assert!(matches!(err, QueryError::GraphUnavailable));
    }

    #[test]
    fn substring_match_tolerates_prefixes() {
        let idx = deps_index();
        let deps = get_file_dependencies(&idx, "src/auth.py", Direction::Incoming).unwrap();
        assert_eq!(deps.incoming.unwrap().len(), 2);
    }

    #[test]
    fn direction_parse() {
        assert_eq!(Direction::parse("both"), Some(Direction::Both));
        assert_eq!(Direction::parse("incoming"), Some(Direction::Incoming));
        assert_eq!(Direction::parse("sideways"), None);
    }
}
