//! Node/edge export of either trie for external graph tooling.

use serde::Serialize;

use crate::{NodeId, ROOT};

/// Read-only view shared by both tries for rendering.
pub trait TreeView {
    fn root_id(&self) -> NodeId {
        ROOT
    }

    /// Outgoing `(label, child)` edges of `node` in traversal order.
    fn edges(&self, node: NodeId) -> Vec<(String, NodeId)>;

    /// Extra text shown next to the edge label leading into `node`.
    fn annotation(&self, node: NodeId) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: usize,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
}

/// Flattened tree: nodes numbered in preorder, root is `0` labelled `ROOT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl TreeGraph {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Walk `tree` in preorder and emit one graph node per trie node.
pub fn tree_graph<T: TreeView + ?Sized>(tree: &T) -> TreeGraph {
    let mut graph = TreeGraph::default();
    graph.nodes.push(GraphNode {
        id: 0,
        label: "ROOT".to_string(),
    });

    // (trie node, parent graph id, incoming edge label)
    let mut stack: Vec<(NodeId, usize, String)> = Vec::new();
    push_edges(tree, tree.root_id(), 0, &mut stack);

    while let Some((node, parent, edge_label)) = stack.pop() {
        let id = graph.nodes.len();
        let label = match tree.annotation(node) {
            Some(note) => format!("{edge_label} ({note})"),
            None => edge_label,
        };
        graph.nodes.push(GraphNode { id, label });
        graph.edges.push(GraphEdge { source: parent, target: id });
        push_edges(tree, node, id, &mut stack);
    }

    graph
}

fn push_edges<T: TreeView + ?Sized>(
    tree: &T,
    node: NodeId,
    graph_id: usize,
    stack: &mut Vec<(NodeId, usize, String)>,
) {
    for (label, child) in tree.edges(node).into_iter().rev() {
        stack.push((child, graph_id, label));
    }
}
