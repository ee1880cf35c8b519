//! Directed file graph used for reachability and cluster analysis.
//!
//! A thin wrapper over petgraph keyed by node path, since the graph store
//! identifies nodes by string, not by index.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::Bfs;

/// Directed graph over file-path (or `file:symbol`) node identifiers.
#[derive(Debug, Default)]
pub struct FileGraph {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl FileGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, node: &str) -> NodeIndex {
        if let Some(&idx) = self.indices.get(node) {
            return idx;
        }
        let idx = self.graph.add_node(node.to_string());
        self.indices.insert(node.to_string(), idx);
        idx
    }

    /// Add a directed edge, creating missing nodes.
    pub fn add_edge(&mut self, source: &str, target: &str) {
        let s = self.intern(source);
        let t = self.intern(target);
        self.graph.update_edge(s, t, ());
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node identifiers.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Every node reachable from the entry set, entries included (when
    /// present in the graph). Union of per-entry BFS descendants.
    #[must_use]
    pub fn reachable_from(&self, entries: &HashSet<String>) -> HashSet<String> {
        let mut reachable = HashSet::new();
        for entry in entries {
            let Some(&start) = self.indices.get(entry) else {
                continue;
            };
            if !reachable.insert(self.graph[start].clone()) {
                // Already swept from an earlier entry.
                continue;
            }
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(idx) = bfs.next(&self.graph) {
                reachable.insert(self.graph[idx].clone());
            }
        }
        reachable
    }

    /// Connected components of the undirected projection restricted to
    /// `subset`. Isolated members come back as singleton components.
    #[must_use]
    pub fn components_within(&self, subset: &HashSet<String>) -> Vec<Vec<String>> {
        let members: Vec<NodeIndex> = subset
            .iter()
            .filter_map(|n| self.indices.get(n).copied())
            .collect();
        let position: HashMap<NodeIndex, usize> = members
            .iter()
            .enumerate()
            .map(|(pos, &idx)| (idx, pos))
            .collect();

        let mut uf = UnionFind::<usize>::new(members.len());
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                if let (Some(&pa), Some(&pb)) = (position.get(&a), position.get(&b)) {
                    uf.union(pa, pb);
                }
            }
        }

        let mut groups: HashMap<usize, Vec<String>> = HashMap::new();
        for (pos, &idx) in members.iter().enumerate() {
            groups
                .entry(uf.find(pos))
                .or_default()
                .push(self.graph[idx].clone());
        }
        let mut components: Vec<Vec<String>> = groups.into_values().collect();
        for c in &mut components {
            c.sort();
        }
        components.sort();
        components
    }
}
