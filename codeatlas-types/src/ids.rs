//! Identifier helpers.
//!
//! Fresh entities get a random v4 UUID. `deterministic` produces a v5 UUID
//! from a logical key so that re-parsing the same file within a run can
//! reuse a stable id without a round-trip to storage (spec: "deterministic
//! IDs within one run").

use uuid::Uuid;

/// Fixed namespace for all v5 ids minted by the indexer. Arbitrary but
/// stable across builds so deterministic ids don't drift between versions.
const NAMESPACE: Uuid = Uuid::from_bytes([
    0x4b, 0x1b, 0x5a, 0x9e, 0x0c, 0x1d, 0x4e, 0xaa, 0x9a, 0x4f, 0x8b, 0x6e, 0x2d, 0x77, 0x11, 0x02,
]);

/// A fresh, randomly generated entity id.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// A deterministic id derived from `key`. Same key, same id, forever.
pub fn deterministic(key: &str) -> Uuid {
    Uuid::new_v5(&NAMESPACE, key.as_bytes())
}

/// Deterministic file id: repo + normalized path.
pub fn file_id(repo_id: Uuid, path: &str) -> Uuid {
    deterministic(&format!("file|{repo_id}|{path}"))
}

/// Deterministic symbol id: file + span + name + kind, so identical symbols
/// across re-parses of an unchanged file collide on purpose.
pub fn symbol_id(file_id: Uuid, start_byte: usize, end_byte: usize, name: &str, kind: &str) -> Uuid {
    deterministic(&format!(
        "symbol|{file_id}|{start_byte}-{end_byte}|{name}|{kind}"
    ))
}
