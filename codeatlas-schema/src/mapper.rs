//! Schema mapper (spec §4.2 implied by §3/§6): turns one `ParsedFile` into a
//! canonical `MappedFile` plus the `StoredEdge`s it can resolve without
//! looking at any other file. Cross-file resolution (header/impl) is a
//! separate pass — see `associator`.

use crate::kind_map::map_kind;
use chrono::{DateTime, Utc};
use codeatlas_parser::{ParsedFile, RawTarget, ScannedFile};
use codeatlas_types::{
    EdgeType, ErrorType, IndexerError, MappedFile, StoredEdge, StoredFile, StoredSymbol, ids,
};
use std::collections::HashMap;
use uuid::Uuid;

pub struct SchemaMapper;

impl SchemaMapper {
    /// Maps one file's raw parser output into canonical entities. Per-symbol
    /// and per-edge failures are collected as `mapping` errors and skipped;
    /// they never abort the rest of the file.
    pub fn map_file(
        repo_id: Uuid,
        scanned: &ScannedFile,
        parsed: &ParsedFile,
        checksum: String,
        now: DateTime<Utc>,
    ) -> (MappedFile, Vec<StoredEdge>, Vec<IndexerError>) {
        let file_id = ids::file_id(repo_id, &scanned.rel_path);
        let mut errors = Vec::new();

        let mut symbols = Vec::with_capacity(parsed.symbols.len());
        let mut by_name: HashMap<String, Uuid> = HashMap::new();

        for raw in &parsed.symbols {
            if raw.start_byte >= raw.end_byte {
                errors.push(
                    IndexerError::new(
                        ErrorType::Mapping,
                        format!("symbol '{}' has a zero or negative span", raw.name),
                    )
                    .with_file(scanned.rel_path.clone()),
                );
                continue;
            }
            let Some(kind) = map_kind(&raw.raw_kind) else {
                errors.push(
                    IndexerError::new(
                        ErrorType::Mapping,
                        format!("unknown symbol kind '{}' for '{}'", raw.raw_kind, raw.name),
                    )
                    .with_file(scanned.rel_path.clone()),
                );
                continue;
            };
            let symbol_id = ids::symbol_id(file_id, raw.start_byte, raw.end_byte, &raw.name, &raw.raw_kind);
            by_name.insert(raw.name.clone(), symbol_id);
            symbols.push(StoredSymbol {
                symbol_id,
                file_id,
                name: raw.name.clone(),
                kind,
                signature: raw.signature.clone(),
                start_line: raw.start_line,
                end_line: raw.end_line,
                start_byte: raw.start_byte as u32,
                end_byte: raw.end_byte as u32,
                docstring: raw.docstring.clone(),
                semantic_summary: None,
            });
        }

        let mut edges = Vec::with_capacity(parsed.raw_edges.len());
        for raw in &parsed.raw_edges {
            let Some(edge_type) = edge_type_from_str(&raw.edge_type) else {
                errors.push(
                    IndexerError::new(
                        ErrorType::Mapping,
                        format!("unknown edge type '{}'", raw.edge_type),
                    )
                    .with_file(scanned.rel_path.clone()),
                );
                continue;
            };
            let source_id = raw.source_symbol.as_ref().and_then(|n| by_name.get(n).copied());
            let (target_id, target_module) = match &raw.target {
                RawTarget::Name(name) => match by_name.get(name) {
                    Some(id) => (Some(*id), None),
                    None => (None, Some(name.clone())),
                },
                RawTarget::Module(path) => (None, Some(path.clone())),
            };
            edges.push(StoredEdge {
                edge_id: ids::new_id(),
                edge_type,
                source_id,
                target_id,
                source_file: scanned.rel_path.clone(),
                target_file: None,
                target_module,
                line_number: raw.line_number,
            });
        }

        for err in &parsed.errors {
            if err.error_type == codeatlas_parser::ParseErrorKind::Parse {
                errors.push(
                    IndexerError::new(ErrorType::Parse, err.message.clone())
                        .with_file(scanned.rel_path.clone()),
                );
            }
        }

        let file = StoredFile {
            file_id,
            repo_id,
            path: scanned.rel_path.clone(),
            language: scanned.language.as_str().to_string(),
            size: scanned.size,
            checksum,
            updated_at: now,
        };

        (MappedFile { file, symbols }, edges, errors)
    }
}

fn edge_type_from_str(raw: &str) -> Option<EdgeType> {
    EdgeType::ALL.iter().find(|e| e.as_str() == raw).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeatlas_parser::{LanguageKind, RawEdge, RawSymbol};

    fn scanned() -> ScannedFile {
        ScannedFile {
            abs_path: "/repo/lib.rs".into(),
            rel_path: "lib.rs".into(),
            language: LanguageKind::Rust,
            size: 42,
        }
    }

    #[test]
    fn zero_span_symbol_is_rejected_but_others_survive() {
        let mut pf = ParsedFile::empty(LanguageKind::Rust, "lib.rs".into());
        pf.symbols.push(RawSymbol {
            name: "broken".into(),
            raw_kind: "function".into(),
            signature: None,
            start_line: 1,
            end_line: 1,
            start_byte: 5,
            end_byte: 5,
            docstring: None,
        });
        pf.symbols.push(RawSymbol {
            name: "good".into(),
            raw_kind: "function".into(),
            signature: None,
            start_line: 2,
            end_line: 3,
            start_byte: 10,
            end_byte: 20,
            docstring: None,
        });
        let repo_id = Uuid::new_v4();
        let (mapped, _edges, errors) =
            SchemaMapper::map_file(repo_id, &scanned(), &pf, "cksum".into(), Utc::now());
        assert_eq!(mapped.symbols.len(), 1);
        assert_eq!(mapped.symbols[0].name, "good");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ErrorType::Mapping);
    }

    #[test]
    fn same_file_call_resolves_to_symbol_id() {
        let mut pf = ParsedFile::empty(LanguageKind::Rust, "lib.rs".into());
        pf.symbols.push(RawSymbol {
            name: "add".into(),
            raw_kind: "function".into(),
            signature: Some("fn add()".into()),
            start_line: 1,
            end_line: 1,
            start_byte: 0,
            end_byte: 10,
            docstring: None,
        });
        pf.raw_edges.push(RawEdge {
            edge_type: "call".into(),
            source_symbol: None,
            target: RawTarget::Name("add".into()),
            line_number: Some(1),
        });
        let repo_id = Uuid::new_v4();
        let (mapped, edges, _errors) =
            SchemaMapper::map_file(repo_id, &scanned(), &pf, "cksum".into(), Utc::now());
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target_id, Some(mapped.symbols[0].symbol_id));
        assert!(edges[0].target_module.is_none());
    }

    #[test]
    fn unresolved_target_becomes_target_module() {
        let pf = {
            let mut pf = ParsedFile::empty(LanguageKind::Rust, "lib.rs".into());
            pf.raw_edges.push(RawEdge {
                edge_type: "call".into(),
                source_symbol: None,
                target: RawTarget::Name("external_fn".into()),
                line_number: Some(4),
            });
            pf
        };
        let repo_id = Uuid::new_v4();
        let (_mapped, edges, _errors) =
            SchemaMapper::map_file(repo_id, &scanned(), &pf, "cksum".into(), Utc::now());
        assert_eq!(edges[0].target_id, None);
        assert_eq!(edges[0].target_module.as_deref(), Some("external_fn"));
    }
}
