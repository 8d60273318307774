//! PostgreSQL-backed relational store. `ON CONFLICT ... DO UPDATE` upserts
//! for repositories and files, delete-then-insert for the symbol-replace
//! semantics spec §4.4.1 requires.

use crate::errors::StorageError;
use crate::traits::RelationalStore;
use async_trait::async_trait;
use codeatlas_types::{Repository, StoredEdge, StoredFile, StoredSymbol, Vector};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresRelationalStore {
    pool: PgPool,
}

impl PostgresRelationalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Session tuning for a bulk load (spec §4.4.1 step 4): wider working
    /// memory, async commit for throughput. Caller is responsible for
    /// releasing (`reset_session`) even on error.
    pub async fn tune_for_bulk_load(&self) -> Result<(), StorageError> {
        sqlx::query("SET work_mem = '256MB'")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        sqlx::query("SET synchronous_commit = off")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Best-effort maintenance (spec §4.4.1 step 10): failure here is
    /// warning-level, never fatal, so callers should log and continue
    /// rather than propagate.
    pub async fn analyze_and_reset(&self) -> Result<(), StorageError> {
        sqlx::query("RESET synchronous_commit").execute(&self.pool).await.map_err(db_err)?;
        sqlx::query("RESET work_mem").execute(&self.pool).await.map_err(db_err)?;
        sqlx::query("ANALYZE symbols, files, edges").execute(&self.pool).await.map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl RelationalStore for PostgresRelationalStore {
    async fn upsert_repository(&self, repo: &Repository) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO repositories (repo_id, name, url, branch, commit_hash, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (repo_id) DO UPDATE SET
                name = EXCLUDED.name,
                url = EXCLUDED.url,
                branch = EXCLUDED.branch,
                commit_hash = EXCLUDED.commit_hash,
                metadata = EXCLUDED.metadata
            "#,
        )
        .bind(repo.repo_id)
        .bind(&repo.name)
        .bind(&repo.url)
        .bind(&repo.branch)
        .bind(&repo.commit_hash)
        .bind(&repo.metadata)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_file_checksum(&self, repo_id: Uuid, path: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT checksum FROM files WHERE repo_id = $1 AND path = $2")
            .bind(repo_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(|(c,)| c))
    }

    async fn upsert_files(&self, files: &[StoredFile]) -> Result<HashMap<String, Uuid>, StorageError> {
        let mut out = HashMap::with_capacity(files.len());
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for file in files {
            let row: (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO files (file_id, repo_id, path, language, size, checksum, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (repo_id, path) DO UPDATE SET
                    language = EXCLUDED.language,
                    size = EXCLUDED.size,
                    checksum = EXCLUDED.checksum,
                    updated_at = EXCLUDED.updated_at
                RETURNING file_id
                "#,
            )
            .bind(file.file_id)
            .bind(file.repo_id)
            .bind(&file.path)
            .bind(&file.language)
            .bind(file.size as i64)
            .bind(&file.checksum)
            .bind(file.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
            out.insert(file.path.clone(), row.0);
        }
        tx.commit().await.map_err(db_err)?;
        Ok(out)
    }

    async fn replace_symbols(&self, file_id: Uuid, symbols: &[StoredSymbol]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query("DELETE FROM symbols WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        for sym in symbols {
            sqlx::query(
                r#"
                INSERT INTO symbols (
                    symbol_id, file_id, name, kind, signature,
                    start_line, end_line, start_byte, end_byte, docstring, semantic_summary
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(sym.symbol_id)
            .bind(sym.file_id)
            .bind(&sym.name)
            .bind(sym.kind.as_str())
            .bind(&sym.signature)
            .bind(sym.start_line as i32)
            .bind(sym.end_line as i32)
            .bind(sym.start_byte as i32)
            .bind(sym.end_byte as i32)
            .bind(&sym.docstring)
            .bind(&sym.semantic_summary)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn insert_edges(&self, edges: &[StoredEdge]) -> Result<(), StorageError> {
        for edge in edges {
            sqlx::query(
                r#"
                INSERT INTO edges (
                    edge_id, edge_type, source_id, target_id,
                    source_file, target_file, target_module, line_number
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (edge_id) DO NOTHING
                "#,
            )
            .bind(edge.edge_id)
            .bind(edge.edge_type.as_str())
            .bind(edge.source_id)
            .bind(edge.target_id)
            .bind(&edge.source_file)
            .bind(&edge.target_file)
            .bind(&edge.target_module)
            .bind(edge.line_number.map(|n| n as i32))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        }
        Ok(())
    }

    async fn insert_vectors(&self, vectors: &[Vector]) -> Result<(), StorageError> {
        for v in vectors {
            sqlx::query(
                r#"
                INSERT INTO vectors (vector_id, entity_id, entity_type, embedding, content, model, chunk_index)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (vector_id) DO NOTHING
                "#,
            )
            .bind(v.vector_id)
            .bind(v.entity_id)
            .bind(&v.entity_type)
            .bind(&v.embedding)
            .bind(&v.content)
            .bind(&v.model)
            .bind(v.chunk_index as i32)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        }
        Ok(())
    }

    async fn prepare_bulk_load(&self) -> Result<(), StorageError> {
        self.tune_for_bulk_load().await
    }

    async fn finalize_bulk_load(&self) -> Result<(), StorageError> {
        self.analyze_and_reset().await
    }
}

fn db_err(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}
