//! The vertex payload stored in the property graph.

use crate::vertex::VertexLabel;
use codeatlas_types::StoredSymbol;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub symbol_id: Uuid,
    pub label: VertexLabel,
    pub name: String,
    pub file_id: Uuid,
    pub signature: Option<String>,
}

impl GraphNode {
    pub fn from_symbol(symbol: &StoredSymbol, label: VertexLabel) -> Self {
        Self {
            symbol_id: symbol.symbol_id,
            label,
            name: symbol.name.clone(),
            file_id: symbol.file_id,
            signature: symbol.signature.clone(),
        }
    }
}
