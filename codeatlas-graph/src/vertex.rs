//! Symbol kind → vertex label mapping (spec §4.6).

use codeatlas_types::SymbolKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexLabel {
    Function,
    Class,
    Interface,
    Variable,
    Module,
}

impl VertexLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VertexLabel::Function => "Function",
            VertexLabel::Class => "Class",
            VertexLabel::Interface => "Interface",
            VertexLabel::Variable => "Variable",
            VertexLabel::Module => "Module",
        }
    }
}

/// `None` for kinds spec §4.6 says to skip (package, annotation, macro,
/// typedef): the caller logs a warning and moves on rather than projecting
/// a vertex with no label.
pub fn label_for(kind: SymbolKind) -> Option<VertexLabel> {
    Some(match kind {
        SymbolKind::Function | SymbolKind::Method => VertexLabel::Function,
        SymbolKind::Class | SymbolKind::Struct => VertexLabel::Class,
        SymbolKind::Interface | SymbolKind::Protocol => VertexLabel::Interface,
        SymbolKind::Variable | SymbolKind::Field | SymbolKind::Property => VertexLabel::Variable,
        SymbolKind::Package | SymbolKind::Module | SymbolKind::Namespace => VertexLabel::Module,
        SymbolKind::Annotation | SymbolKind::Macro | SymbolKind::Typedef | SymbolKind::Enum => {
            return None
        }
    })
}
