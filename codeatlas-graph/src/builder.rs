//! Graph builder (spec §4.6): upserts symbols as vertices and edges as
//! relationships into an in-memory property graph, keyed so re-runs update
//! in place rather than duplicating. Mirrors the index-map-while-copying
//! shape the teacher's graph merger used for petgraph node/edge identity,
//! applied here to upsert-by-key instead of copy-all.

use crate::node::GraphNode;
use crate::vertex::label_for;
use codeatlas_types::{StoredEdge, StoredSymbol};
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

pub struct GraphBuilder {
    graph: Graph<GraphNode, String>,
    vertex_index: HashMap<Uuid, NodeIndex>,
    edge_index: HashMap<Uuid, EdgeIndex>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            vertex_index: HashMap::new(),
            edge_index: HashMap::new(),
        }
    }

    /// Upserts one symbol as a vertex. Returns `false` (and logs a warning)
    /// for kinds spec §4.6 says to skip.
    pub fn upsert_symbol(&mut self, symbol: &StoredSymbol) -> bool {
        let Some(label) = label_for(symbol.kind) else {
            warn!(symbol = %symbol.name, kind = ?symbol.kind, "symbol kind has no graph vertex label, skipping");
            return false;
        };
        let node = GraphNode::from_symbol(symbol, label);
        match self.vertex_index.get(&symbol.symbol_id) {
            Some(&idx) => {
                self.graph[idx] = node;
            }
            None => {
                let idx = self.graph.add_node(node);
                self.vertex_index.insert(symbol.symbol_id, idx);
            }
        }
        true
    }

    /// Upserts one edge as a relationship. Returns `false` without error
    /// when the missing-target policy applies (spec §4.6): an unresolved
    /// target (only `target_module` set) or an endpoint that was never
    /// projected as a vertex.
    pub fn upsert_edge(&mut self, edge: &StoredEdge) -> bool {
        let (Some(source_id), Some(target_id)) = (edge.source_id, edge.target_id) else {
            return false;
        };
        let (Some(&source_idx), Some(&target_idx)) =
            (self.vertex_index.get(&source_id), self.vertex_index.get(&target_id))
        else {
            return false;
        };
        let label = edge.edge_type.relationship_label();
        match self.edge_index.get(&edge.edge_id) {
            Some(&idx) => {
                self.graph[idx] = label;
            }
            None => {
                let idx = self.graph.add_edge(source_idx, target_idx, label);
                self.edge_index.insert(edge.edge_id, idx);
            }
        }
        true
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &Graph<GraphNode, String> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeatlas_types::{EdgeType, SymbolKind};

    fn symbol(id: Uuid, kind: SymbolKind) -> StoredSymbol {
        StoredSymbol {
            symbol_id: id,
            file_id: Uuid::new_v4(),
            name: "thing".into(),
            kind,
            signature: None,
            start_line: 1,
            end_line: 1,
            start_byte: 0,
            end_byte: 1,
            docstring: None,
            semantic_summary: None,
        }
    }

    #[test]
    fn upsert_is_idempotent_by_symbol_id() {
        let mut builder = GraphBuilder::new();
        let id = Uuid::new_v4();
        assert!(builder.upsert_symbol(&symbol(id, SymbolKind::Function)));
        assert!(builder.upsert_symbol(&symbol(id, SymbolKind::Function)));
        assert_eq!(builder.vertex_count(), 1);
    }

    #[test]
    fn unmappable_kind_is_skipped() {
        let mut builder = GraphBuilder::new();
        assert!(!builder.upsert_symbol(&symbol(Uuid::new_v4(), SymbolKind::Macro)));
        assert_eq!(builder.vertex_count(), 0);
    }

    #[test]
    fn edge_with_unresolved_target_is_not_projected() {
        let mut builder = GraphBuilder::new();
        let source = Uuid::new_v4();
        builder.upsert_symbol(&symbol(source, SymbolKind::Function));
        let edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::Call,
            source_id: Some(source),
            target_id: None,
            source_file: "a.rs".into(),
            target_file: None,
            target_module: Some("external".into()),
            line_number: None,
        };
        assert!(!builder.upsert_edge(&edge));
        assert_eq!(builder.edge_count(), 0);
    }

    #[test]
    fn edge_between_projected_vertices_is_added_once() {
        let mut builder = GraphBuilder::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        builder.upsert_symbol(&symbol(a, SymbolKind::Function));
        builder.upsert_symbol(&symbol(b, SymbolKind::Function));
        let edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::Call,
            source_id: Some(a),
            target_id: Some(b),
            source_file: "a.rs".into(),
            target_file: None,
            target_module: None,
            line_number: None,
        };
        assert!(builder.upsert_edge(&edge));
        assert!(builder.upsert_edge(&edge));
        assert_eq!(builder.edge_count(), 1);
    }
}
