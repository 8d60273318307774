//! Raw-kind → canonical `SymbolKind` table (spec §3 closed set).
//!
//! Unknown raw kinds are not coerced into the nearest-looking variant: the
//! mapper rejects them with a `mapping` error and the rest of the file's
//! symbols still get mapped.

use codeatlas_types::SymbolKind;

pub fn map_kind(raw: &str) -> Option<SymbolKind> {
    Some(match raw {
        "function" | "function_definition" | "function_declaration" => SymbolKind::Function,
        "method" | "method_declaration" => SymbolKind::Method,
        "class" => SymbolKind::Class,
        "struct" => SymbolKind::Struct,
        "interface" => SymbolKind::Interface,
        "protocol" => SymbolKind::Protocol,
        "trait" => SymbolKind::Interface,
        "enum" => SymbolKind::Enum,
        "variable" => SymbolKind::Variable,
        "field" => SymbolKind::Field,
        "property" => SymbolKind::Property,
        "package" => SymbolKind::Package,
        "module" => SymbolKind::Module,
        "namespace" => SymbolKind::Namespace,
        "annotation" => SymbolKind::Annotation,
        "macro_definition" | "macro" => SymbolKind::Macro,
        "typedef" => SymbolKind::Typedef,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_canonical_kind_is_reachable_from_some_raw_string() {
        for kind in SymbolKind::ALL {
            let raw = kind.as_str();
            assert!(
                map_kind(raw).is_some() || map_kind(&format!("{raw}_item")).is_some(),
                "no raw spelling maps to {kind:?}"
            );
        }
    }

    #[test]
    fn unknown_raw_kind_is_rejected() {
        assert_eq!(map_kind("gizmo"), None);
    }
}
