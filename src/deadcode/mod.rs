//! Dead-code detection over the import and call graphs.
//!
//! One bulk pass per run: build the import graph from the graph store,
//! determine entry points, compute reachability, report the unreachable
//! remainder. Mutually-isolated modules are clustered into one finding
//! group, since removing one member without the others is meaningless.

pub mod classify;
pub mod entrypoints;
pub mod graph;

use std::collections::HashSet;

use serde::Serialize;

use crate::config::DeadCodeSettings;
use crate::db::CodeIndex;
use crate::error::Result;

pub use classify::{classify_module, classify_symbol, Confidence};
pub use entrypoints::{default_strategies, EntryPointStrategy, StrategyContext};
pub use graph::FileGraph;

/// Symbol kinds considered in the symbol-level pass.
const CALLABLE_KINDS: &[&str] = &["function", "method", "class"];

/// Tuning for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct DeadCodeOptions {
    /// Restrict the graphs to sources matching this substring.
    pub path_filter: Option<String>,
    /// Also report uncalled symbols within live modules.
    pub analyze_symbols: bool,
    /// Exclusion and entry-point patterns.
    pub settings: DeadCodeSettings,
}

/// One dead-code finding.
#[derive(Debug, Clone, Serialize)]
pub struct DeadCodeFinding {
    /// "module" for import-graph findings, else the symbol kind.
    pub kind: String,
    pub path: String,
    /// Symbol name; empty for module findings.
    pub name: String,
    /// Declaration line; 0 for module findings.
    pub line: u32,
    /// Symbols declared in the module (weight of the finding).
    pub symbol_count: u64,
    pub reason: String,
    pub confidence: Confidence,
    /// Set when the finding belongs to a zombie cluster of size > 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<usize>,
}

/// Summary of one analysis run.
#[derive(Debug, Serialize)]
pub struct DeadCodeReport {
    pub modules_analyzed: usize,
    pub entry_points: usize,
    pub reachable: usize,
    pub findings: Vec<DeadCodeFinding>,
}

/// Graph-reachability dead-code analyzer.
///
/// Requires the secondary graph store: reachability without edges is
/// meaningless, so a missing store or a mismatched table aborts the whole
/// detector rather than producing an empty report.
pub struct DeadCodeDetector<'a> {
    index: &'a CodeIndex,
    strategies: Vec<Box<dyn EntryPointStrategy>>,
}

impl<'a> DeadCodeDetector<'a> {
    /// Create a detector, verifying the graph store up front.
    pub fn new(index: &'a CodeIndex) -> Result<Self> {
        index.validate_graph_schema()?;
        Ok(Self {
            index,
            strategies: default_strategies(),
        })
    }

    /// Register an additional entry-point strategy.
    pub fn push_strategy(&mut self, strategy: Box<dyn EntryPointStrategy>) {
        self.strategies.push(strategy);
    }

    /// Run the full pipeline.
    pub fn analyze(&self, options: &DeadCodeOptions) -> Result<DeadCodeReport> {
        let import_graph = self.build_import_graph(options.path_filter.as_deref())?;
        let nodes: Vec<String> = import_graph.nodes().map(String::from).collect();
        tracing::debug!(
            nodes = import_graph.node_count(),
            edges = import_graph.edge_count(),
            "import graph built"
        );

        let entry_points = self.detect_entry_points(&nodes, &options.settings)?;
        let reachable = import_graph.reachable_from(&entry_points);

        let dead: HashSet<String> = nodes
            .iter()
            .filter(|node| !reachable.contains(*node) && !Self::excluded(node, options))
            .cloned()
            .collect();

        let mut findings = Vec::new();
        let mut cluster_seq = 0;
        for component in import_graph.components_within(&dead) {
            let cluster_id = if component.len() > 1 {
                let id = cluster_seq;
                cluster_seq += 1;
                Some(id)
            } else {
                None
            };
            for path in &component {
                let (confidence, reason) = classify_module(path, component.len());
                findings.push(DeadCodeFinding {
                    kind: "module".to_string(),
                    path: path.clone(),
                    name: String::new(),
                    line: 0,
                    symbol_count: self.index.symbol_count_for_file(path)?,
                    reason,
                    confidence,
                    cluster_id,
                });
            }
        }

        if options.analyze_symbols {
            let dead_paths: HashSet<&str> = dead.iter().map(String::as_str).collect();
            let live: Vec<String> = nodes
                .iter()
                .filter(|n| !dead_paths.contains(n.as_str()))
                .cloned()
                .collect();
            findings.extend(self.find_dead_symbols(&live, options)?);
        }

        tracing::info!(findings = findings.len(), "dead-code analysis complete");
        Ok(DeadCodeReport {
            modules_analyzed: nodes.len(),
            entry_points: entry_points.len(),
            reachable: reachable.len(),
            findings,
        })
    }

    fn build_import_graph(&self, path_filter: Option<&str>) -> Result<FileGraph> {
        let mut graph = FileGraph::new();
        for edge in self.index.import_edges(path_filter)? {
            graph.add_edge(&edge.source, &edge.target);
        }
        Ok(graph)
    }

    fn detect_entry_points(
        &self,
        nodes: &[String],
        settings: &DeadCodeSettings,
    ) -> Result<HashSet<String>> {
        let ctx = StrategyContext {
            index: self.index,
            nodes,
            settings,
        };
        let mut entry_points = HashSet::new();
        for strategy in &self.strategies {
            let found = strategy.detect(&ctx)?;
            tracing::debug!(strategy = strategy.name(), count = found.len(), "entry points");
            entry_points.extend(found);
        }
        Ok(entry_points)
    }

    fn excluded(node: &str, options: &DeadCodeOptions) -> bool {
        node.starts_with("external::")
            || options
                .settings
                .exclude_patterns
                .iter()
                .any(|p| node.contains(p.as_str()))
    }

    /// Symbol-level pass: within modules already classified live, report
    /// symbols no call edge targets. Both edge endpoints must resolve to
    /// live files for the edge to count.
    fn find_dead_symbols(
        &self,
        live: &[String],
        options: &DeadCodeOptions,
    ) -> Result<Vec<DeadCodeFinding>> {
        let live_set: HashSet<&str> = live.iter().map(String::as_str).collect();

        let mut called: HashSet<(String, String)> = HashSet::new();
        for edge in self.index.call_edges(options.path_filter.as_deref())? {
            let source_file = edge.source.split(':').next().unwrap_or(&edge.source);
            let Some((target_file, target_name)) = edge.target.rsplit_once(':') else {
                continue;
            };
            if live_set.contains(source_file) && live_set.contains(target_file) {
                called.insert((target_file.to_string(), target_name.to_string()));
            }
        }

        let mut findings = Vec::new();
        for symbol in self.index.symbols_in_files(live, CALLABLE_KINDS)? {
            if called.contains(&(symbol.file.clone(), symbol.name.clone())) {
                continue;
            }
            if Self::excluded(&symbol.file, options) {
                continue;
            }
            let (confidence, reason) = classify_symbol(&symbol.name, &symbol.kind);
            findings.push(DeadCodeFinding {
                kind: symbol.kind,
                path: symbol.file,
                name: symbol.name,
                line: symbol.line,
                symbol_count: 1,
                reason,
                confidence,
                cluster_id: None,
            });
        }
        Ok(findings)
    }
}
