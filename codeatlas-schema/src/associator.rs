//! Header/implementation associator (spec §4.3): cross-file declaration↔
//! definition edges for C/C++/Objective-C that no single-file parser can
//! emit. Runs once all files in a run have been mapped.

use crate::normalize::normalize_signature;
use codeatlas_parser::language::{DEFINITION_EXTENSIONS, DECLARATION_EXTENSIONS};
use codeatlas_types::{EdgeType, MappedFile, StoredEdge, SymbolKind, ids};
use std::collections::HashMap;

pub struct HeaderImplAssociator;

impl HeaderImplAssociator {
    /// Emits `implements_header` (one per decl/impl file pair) and
    /// `implements_declaration` (one per matched symbol pair) edges. Never
    /// errors: unmatched files and symbols are simply unpaired (spec §4.3
    /// step 3).
    pub fn associate(files: &[MappedFile]) -> Vec<StoredEdge> {
        let mut groups: HashMap<(String, String), (Vec<&MappedFile>, Vec<&MappedFile>)> = HashMap::new();
        for mf in files {
            let Some((dir, stem, ext)) = split_path(&mf.file.path) else {
                continue;
            };
            let entry = groups.entry((dir, stem)).or_default();
            if DECLARATION_EXTENSIONS.contains(&ext.as_str()) {
                entry.0.push(mf);
            } else if DEFINITION_EXTENSIONS.contains(&ext.as_str()) {
                entry.1.push(mf);
            }
        }

        let mut edges = Vec::new();
        for (decls, impls) in groups.values() {
            for decl in decls {
                for imp in impls {
                    edges.push(StoredEdge {
                        edge_id: ids::new_id(),
                        edge_type: EdgeType::ImplementsHeader,
                        source_id: None,
                        target_id: None,
                        source_file: imp.file.path.clone(),
                        target_file: Some(decl.file.path.clone()),
                        target_module: None,
                        line_number: None,
                    });

                    let mut by_key: HashMap<(String, SymbolKind), Vec<(uuid::Uuid, Option<String>)>> =
                        HashMap::new();
                    for sym in &decl.symbols {
                        by_key.entry((sym.name.clone(), sym.kind)).or_default().push((
                            sym.symbol_id,
                            sym.signature.as_deref().map(normalize_signature),
                        ));
                    }

                    for sym in &imp.symbols {
                        let Some(candidates) = by_key.get(&(sym.name.clone(), sym.kind)) else {
                            continue;
                        };
                        let impl_sig = sym.signature.as_deref().map(normalize_signature);
                        let matches: Vec<uuid::Uuid> = candidates
                            .iter()
                            .filter(|(_, decl_sig)| decl_sig.is_none() || impl_sig.is_none() || decl_sig == &impl_sig)
                            .map(|(id, _)| *id)
                            .collect();
                        for target_id in matches {
                            edges.push(StoredEdge {
                                edge_id: ids::new_id(),
                                edge_type: EdgeType::ImplementsDeclaration,
                                source_id: Some(sym.symbol_id),
                                target_id: Some(target_id),
                                source_file: imp.file.path.clone(),
                                target_file: None,
                                target_module: None,
                                line_number: None,
                            });
                        }
                    }
                }
            }
        }
        edges
    }
}

/// Splits `dir/stem.ext` into its three parts; `None` for extensionless
/// paths, which can't be declaration/definition pairs.
fn split_path(path: &str) -> Option<(String, String, String)> {
    let (dir, file) = match path.rsplit_once('/') {
        Some((d, f)) => (d.to_string(), f),
        None => (String::new(), path),
    };
    let (stem, ext) = file.rsplit_once('.')?;
    Some((dir, stem.to_string(), ext.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codeatlas_types::{StoredFile, StoredSymbol};
    use uuid::Uuid;

    fn file(path: &str, symbols: Vec<StoredSymbol>) -> MappedFile {
        MappedFile {
            file: StoredFile {
                file_id: Uuid::new_v4(),
                repo_id: Uuid::new_v4(),
                path: path.into(),
                language: "c".into(),
                size: 10,
                checksum: "x".into(),
                updated_at: Utc::now(),
            },
            symbols,
        }
    }

    fn symbol(name: &str, kind: SymbolKind, sig: &str) -> StoredSymbol {
        StoredSymbol {
            symbol_id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            name: name.into(),
            kind,
            signature: Some(sig.into()),
            start_line: 1,
            end_line: 1,
            start_byte: 0,
            end_byte: 10,
            docstring: None,
            semantic_summary: None,
        }
    }

    #[test]
    fn pairs_math_h_and_math_c() {
        let header = file(
            "math.h",
            vec![symbol("add", SymbolKind::Function, "int add(int a, int b)")],
        );
        let impl_file = file(
            "math.c",
            vec![symbol("add", SymbolKind::Function, "int add(int a, int b)")],
        );
        let edges = HeaderImplAssociator::associate(&[header, impl_file]);
        let header_edges: Vec<_> = edges.iter().filter(|e| e.edge_type == EdgeType::ImplementsHeader).collect();
        assert_eq!(header_edges.len(), 1);
        assert_eq!(header_edges[0].source_file, "math.c");
        assert_eq!(header_edges[0].target_file.as_deref(), Some("math.h"));

        let decl_edges: Vec<_> = edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::ImplementsDeclaration)
            .collect();
        assert_eq!(decl_edges.len(), 1);
        assert!(decl_edges[0].source_id.is_some());
        assert!(decl_edges[0].target_id.is_some());
    }

    #[test]
    fn unrelated_stems_are_not_paired() {
        let header = file("a.h", vec![]);
        let impl_file = file("b.c", vec![]);
        let edges = HeaderImplAssociator::associate(&[header, impl_file]);
        assert!(edges.is_empty());
    }
}
