//! Stylesheet load graph and cascade order.
//!
//! Load order is modelled as an explicit directed graph: one node per
//! stylesheet or script, one edge per import, weighted with the import's
//! position inside the importing file. The graph is built once, then walked
//! once breadth-first from its seeds to produce an immutable [`CascadeOrder`].

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// What kind of file a graph node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// A `.css` file; ranked when reached
    Stylesheet,
    /// A script that imports stylesheets; never ranked
    Script,
}

/// A file in the load graph, identified by its project-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleNode {
    /// Project-relative path with forward slashes
    pub path: String,
    /// Stylesheet or script
    pub kind: FileKind,
}

impl StyleNode {
    /// A stylesheet node.
    pub fn stylesheet(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::Stylesheet,
        }
    }

    /// A script node.
    pub fn script(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::Script,
        }
    }
}

impl fmt::Display for StyleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Directed import graph. An edge `from -> to` means `from` loads `to`.
#[derive(Debug, Default)]
pub struct StyleGraph {
    graph: DiGraph<StyleNode, usize>,
    node_map: HashMap<StyleNode, NodeIndex>,
    seeds: Vec<NodeIndex>,
}

impl StyleGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph if it doesn't already exist.
    fn ensure_node(&mut self, node: StyleNode) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node) {
            index
        } else {
            let index = self.graph.add_node(node.clone());
            self.node_map.insert(node, index);
            index
        }
    }

    /// Register a traversal seed. Seeds are walked in registration order.
    pub fn add_seed(&mut self, node: StyleNode) {
        let index = self.ensure_node(node);
        self.seeds.push(index);
    }

    /// Add an import edge; `position` orders the imports of one file.
    pub fn add_import(&mut self, from: StyleNode, to: StyleNode, position: usize) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, position);
        }
    }

    /// Whether the graph already holds `node`.
    pub fn contains(&self, node: &StyleNode) -> bool {
        self.node_map.contains_key(node)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of import edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct imports of `index`, in import position order.
    fn imports_of(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (*edge.weight(), edge.target()))
            .collect();
        edges.sort_by_key(|(position, _)| *position);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Walk the graph once and rank every reachable stylesheet.
    ///
    /// All seeds are queued first; each visited stylesheet then appends its
    /// own imports to the back of the queue. A stylesheet receives the next
    /// rank the first time it is dequeued. Script seeds are expanded in place
    /// of themselves and are never ranked.
    pub fn cascade_order(&self) -> CascadeOrder {
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        for &seed in &self.seeds {
            match self.graph[seed].kind {
                FileKind::Stylesheet => queue.push_back(seed),
                FileKind::Script => queue.extend(self.imports_of(seed)),
            }
        }

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut order = Vec::new();
        while let Some(index) = queue.pop_front() {
            if !visited.insert(index) {
                continue;
            }
            let node = &self.graph[index];
            if node.kind != FileKind::Stylesheet {
                continue;
            }
            order.push(node.path.clone());
            queue.extend(self.imports_of(index));
        }

        CascadeOrder::from_visit_order(order)
    }
}

/// Immutable `path -> rank` index; later rank loads later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOrder {
    order: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl CascadeOrder {
    /// Build from project-relative paths in the order they were reached.
    pub fn from_visit_order(order: Vec<String>) -> Self {
        let mut ranks = HashMap::with_capacity(order.len());
        let mut unique = Vec::with_capacity(order.len());
        for path in order {
            if !ranks.contains_key(&path) {
                ranks.insert(path.clone(), unique.len());
                unique.push(path);
            }
        }
        Self {
            order: unique,
            ranks,
        }
    }

    /// Rank of a project-relative path; `None` when never reached.
    pub fn rank(&self, path: &str) -> Option<usize> {
        self.ranks.get(path).copied()
    }

    /// Ranked paths, earliest first.
    pub fn paths(&self) -> &[String] {
        &self.order
    }

    /// Number of ranked stylesheets.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing was reached.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(path: &str) -> StyleNode {
        StyleNode::stylesheet(path)
    }

    #[test]
    fn test_breadth_first_ranks() {
        let mut graph = StyleGraph::new();
        graph.add_seed(sheet("main.css"));
        graph.add_import(sheet("main.css"), sheet("base.css"), 0);
        graph.add_import(sheet("main.css"), sheet("components.css"), 1);
        graph.add_import(sheet("base.css"), sheet("reset.css"), 0);

        let order = graph.cascade_order();
        assert_eq!(order.paths(), ["main.css", "base.css", "components.css", "reset.css"]);
        assert_eq!(order.rank("main.css"), Some(0));
        assert_eq!(order.rank("reset.css"), Some(3));
        assert_eq!(order.rank("orphan.css"), None);
    }

    #[test]
    fn test_import_position_orders_children() {
        let mut graph = StyleGraph::new();
        graph.add_seed(sheet("main.css"));
        // Discovered out of order; position decides
        graph.add_import(sheet("main.css"), sheet("second.css"), 1);
        graph.add_import(sheet("main.css"), sheet("first.css"), 0);
        assert_eq!(graph.cascade_order().paths(), ["main.css", "first.css", "second.css"]);
    }

    #[test]
    fn test_script_seeds_are_expanded_not_ranked() {
        let mut graph = StyleGraph::new();
        graph.add_seed(sheet("main.css"));
        graph.add_seed(StyleNode::script("src/app.js"));
        graph.add_import(StyleNode::script("src/app.js"), sheet("app.css"), 0);
        graph.add_import(sheet("main.css"), sheet("base.css"), 0);

        let order = graph.cascade_order();
        // Seeds are all queued before any import is followed
        assert_eq!(order.paths(), ["main.css", "app.css", "base.css"]);
        assert_eq!(order.rank("src/app.js"), None);
    }

    #[test]
    fn test_cycles_terminate() {
        let mut graph = StyleGraph::new();
        graph.add_seed(sheet("a.css"));
        graph.add_import(sheet("a.css"), sheet("b.css"), 0);
        graph.add_import(sheet("b.css"), sheet("a.css"), 0);
        graph.add_import(sheet("b.css"), sheet("b.css"), 1);
        assert_eq!(graph.cascade_order().paths(), ["a.css", "b.css"]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_duplicate_paths_keep_first_rank() {
        let order = CascadeOrder::from_visit_order(vec!["a.css".into(), "b.css".into(), "a.css".into()]);
        assert_eq!(order.len(), 2);
        assert_eq!(order.rank("a.css"), Some(0));
        assert_eq!(order.rank("b.css"), Some(1));
    }
}
