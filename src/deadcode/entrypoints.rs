//! Entry-point detection strategies.
//!
//! An entry point is a node assumed reachable by an external trigger the
//! import graph cannot see: process start, route dispatch, a task queue, a
//! test runner. Detection is a registered, ordered list of independent
//! strategies; supporting a new framework means adding a strategy, not
//! editing the existing ones.

use std::collections::HashSet;

use crate::config::DeadCodeSettings;
use crate::db::CodeIndex;
use crate::error::Result;

/// Inputs shared by every strategy.
pub struct StrategyContext<'a> {
    pub index: &'a CodeIndex,
    /// Import-graph node identifiers (file paths).
    pub nodes: &'a [String],
    pub settings: &'a DeadCodeSettings,
}

/// One independent way of recognizing entry points.
pub trait EntryPointStrategy {
    fn name(&self) -> &'static str;
    fn detect(&self, ctx: &StrategyContext<'_>) -> Result<HashSet<String>>;
}

/// Conventional entry-file names (`main.py`, `cli.py`, `index.ts`, ...).
pub struct EntryFileNames;

impl EntryPointStrategy for EntryFileNames {
    fn name(&self) -> &'static str {
        "entry-file-names"
    }

    fn detect(&self, ctx: &StrategyContext<'_>) -> Result<HashSet<String>> {
        Ok(ctx
            .nodes
            .iter()
            .filter(|node| {
                ctx.settings
                    .entry_file_patterns
                    .iter()
                    .any(|p| node.contains(p.as_str()))
            })
            .cloned()
            .collect())
    }
}

/// Files registering routes, tasks, or commands, queried from the index:
/// endpoint registrations plus symbols whose extractor-recorded kind marks
/// them as externally dispatched.
pub struct RegistrationMarkers;

/// Symbol kinds treated as external-dispatch registrations.
const MARKER_KINDS: &[&str] = &["route", "task", "command"];

impl EntryPointStrategy for RegistrationMarkers {
    fn name(&self) -> &'static str {
        "registration-markers"
    }

    fn detect(&self, ctx: &StrategyContext<'_>) -> Result<HashSet<String>> {
        let mut files: HashSet<String> = ctx.index.endpoint_files()?.into_iter().collect();
        files.extend(ctx.index.files_with_symbol_kinds(MARKER_KINDS)?);
        Ok(files)
    }
}

/// Files declaring framework-recognized UI components or route tables, from
/// the framework twin symbol table. Conservative: any component file may be
/// mounted by a router the import graph cannot see.
pub struct FrameworkComponents;

const COMPONENT_KINDS: &[&str] = &["component", "route"];

impl EntryPointStrategy for FrameworkComponents {
    fn name(&self) -> &'static str {
        "framework-components"
    }

    fn detect(&self, ctx: &StrategyContext<'_>) -> Result<HashSet<String>> {
        Ok(ctx
            .index
            .files_with_framework_kinds(COMPONENT_KINDS)?
            .into_iter()
            .collect())
    }
}

/// Test files: invoked by the test runner, so always externally reachable.
pub struct TestFiles;

impl EntryPointStrategy for TestFiles {
    fn name(&self) -> &'static str {
        "test-files"
    }

    fn detect(&self, ctx: &StrategyContext<'_>) -> Result<HashSet<String>> {
        Ok(ctx
            .nodes
            .iter()
            .filter(|node| {
                ctx.settings
                    .test_file_patterns
                    .iter()
                    .any(|p| node.contains(p.as_str()))
            })
            .cloned()
            .collect())
    }
}

/// The built-in strategy list, in registration order.
#[must_use]
pub fn default_strategies() -> Vec<Box<dyn EntryPointStrategy>> {
    vec![
        Box::new(EntryFileNames),
        Box::new(RegistrationMarkers),
        Box::new(FrameworkComponents),
        Box::new(TestFiles),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_fixtures as fx;

    fn ctx_nodes() -> Vec<String> {
        vec![
            "src/main.py".to_string(),
            "src/helpers.py".to_string(),
            "tests/test_helpers.py".to_string(),
        ]
    }

    #[test]
    fn entry_file_names_match_conventions() {
        let idx = CodeIndex::open_in_memory().unwrap();
        let nodes = ctx_nodes();
        let settings = DeadCodeSettings::default();
        let ctx = StrategyContext {
            index: &idx,
            nodes: &nodes,
            settings: &settings,
        };

        let found = EntryFileNames.detect(&ctx).unwrap();
        assert!(found.contains("src/main.py"));
        assert!(!found.contains("src/helpers.py"));
    }

    #[test]
    fn registration_markers_pick_up_endpoints_and_kinds() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::endpoint(&idx, "src/api.py", 5, "GET", "/x", "/x", "h");
        fx::symbol(&idx, "src/worker.py", "nightly_sync", "task", 10, 30);

        let nodes = ctx_nodes();
        let settings = DeadCodeSettings::default();
        let ctx = StrategyContext {
            index: &idx,
            nodes: &nodes,
            settings: &settings,
        };

        let found = RegistrationMarkers.detect(&ctx).unwrap();
        assert!(found.contains("src/api.py"));
        assert!(found.contains("src/worker.py"));
    }

    #[test]
    fn framework_components_use_twin_table() {
        let idx = CodeIndex::open_in_memory().unwrap();
        fx::jsx_symbol(&idx, "src/App.jsx", "App", "component", 1, 50);

        let nodes = ctx_nodes();
        let settings = DeadCodeSettings::default();
        let ctx = StrategyContext {
            index: &idx,
            nodes: &nodes,
            settings: &settings,
        };

        let found = FrameworkComponents.detect(&ctx).unwrap();
        assert!(found.contains("src/App.jsx"));
    }

    #[test]
    fn framework_components_empty_without_twin_table() {
        let idx = CodeIndex::open_in_memory().unwrap();
        idx.index().execute_batch("DROP TABLE symbols_jsx").unwrap();

        let nodes = ctx_nodes();
        let settings = DeadCodeSettings::default();
        let ctx = StrategyContext {
            index: &idx,
            nodes: &nodes,
            settings: &settings,
        };

        let found = FrameworkComponents.detect(&ctx).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_files_are_entry_points() {
        let idx = CodeIndex::open_in_memory().unwrap();
        let nodes = ctx_nodes();
        let settings = DeadCodeSettings::default();
        let ctx = StrategyContext {
            index: &idx,
            nodes: &nodes,
            settings: &settings,
        };

        let found = TestFiles.detect(&ctx).unwrap();
        assert!(found.contains("tests/test_helpers.py"));
        assert!(!found.contains("src/helpers.py"));
    }

    #[test]
    fn default_strategy_order_is_stable() {
        let names: Vec<_> = default_strategies().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "entry-file-names",
                "registration-markers",
                "framework-components",
                "test-files"
            ]
        );
    }
}
