//! Stage 1 (spec §4.4.1): structural validation, no side effects. A
//! validation failure aborts the whole run before anything is written.

use codeatlas_types::{IndexRequest, IndexerError};
use std::collections::HashSet;
use uuid::Uuid;

pub fn validate(request: &IndexRequest) -> Result<(), IndexerError> {
    if request.repo_name.trim().is_empty() {
        return Err(IndexerError::validation("repo_name must not be empty"));
    }

    let known: HashSet<Uuid> = request
        .parse_output
        .files
        .iter()
        .flat_map(|f| f.symbols.iter())
        .map(|s| s.symbol_id)
        .collect();

    for edge in &request.parse_output.relationships {
        if !edge.is_structurally_valid() {
            return Err(IndexerError::validation(format!(
                "edge {} has neither target_id, target_module nor target_file",
                edge.edge_id
            ))
            .with_entity(edge.edge_id));
        }
        if let Some(source_id) = edge.source_id {
            if !known.contains(&source_id) {
                return Err(IndexerError::validation(format!(
                    "edge {} references source symbol {source_id} not present in this payload",
                    edge.edge_id
                ))
                .with_entity(edge.edge_id));
            }
        }
        if let Some(target_id) = edge.target_id {
            if !known.contains(&target_id) {
                return Err(IndexerError::validation(format!(
                    "edge {} references target symbol {target_id} not present in this payload",
                    edge.edge_id
                ))
                .with_entity(edge.edge_id));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codeatlas_types::{
        EdgeType, IndexOptions, MappedFile, ParseOutput, StoredEdge, StoredFile, StoredSymbol, SymbolKind,
    };

    fn file_with_symbol() -> (MappedFile, Uuid) {
        let file_id = Uuid::new_v4();
        let symbol_id = Uuid::new_v4();
        (
            MappedFile {
                file: StoredFile {
                    file_id,
                    repo_id: Uuid::new_v4(),
                    path: "a.rs".into(),
                    language: "rust".into(),
                    size: 10,
                    checksum: "c".into(),
                    updated_at: Utc::now(),
                },
                symbols: vec![StoredSymbol {
                    symbol_id,
                    file_id,
                    name: "f".into(),
                    kind: SymbolKind::Function,
                    signature: None,
                    start_line: 1,
                    end_line: 1,
                    start_byte: 0,
                    end_byte: 1,
                    docstring: None,
                    semantic_summary: None,
                }],
            },
            symbol_id,
        )
    }

    fn request(files: Vec<MappedFile>, relationships: Vec<StoredEdge>) -> IndexRequest {
        IndexRequest {
            repo_id: None,
            repo_name: "demo".into(),
            repo_url: None,
            branch: None,
            commit_hash: None,
            parse_output: ParseOutput {
                files,
                relationships,
                metadata: serde_json::json!({}),
            },
            options: IndexOptions::default(),
        }
    }

    #[test]
    fn rejects_edge_referencing_unknown_same_payload_symbol() {
        let (file, _sym) = file_with_symbol();
        let bogus_edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::Call,
            source_id: Some(Uuid::new_v4()),
            target_id: Some(Uuid::new_v4()),
            source_file: "a.rs".into(),
            target_file: None,
            target_module: None,
            line_number: None,
        };
        let req = request(vec![file], vec![bogus_edge]);
        assert!(validate(&req).is_err());
    }

    #[test]
    fn accepts_edge_resolving_within_payload() {
        let (file, sym) = file_with_symbol();
        let edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::Call,
            source_id: Some(sym),
            target_id: Some(sym),
            source_file: "a.rs".into(),
            target_file: None,
            target_module: None,
            line_number: None,
        };
        let req = request(vec![file], vec![edge]);
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn accepts_external_module_import_with_no_target_id() {
        let (file, sym) = file_with_symbol();
        let edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::Import,
            source_id: Some(sym),
            target_id: None,
            source_file: "a.rs".into(),
            target_file: None,
            target_module: Some("std::fmt".into()),
            line_number: None,
        };
        let req = request(vec![file], vec![edge]);
        assert!(validate(&req).is_ok());
    }
}
