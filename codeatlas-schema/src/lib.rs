//! Normalizes raw parser output into canonical entities (spec §3/§6) and
//! links cross-file declaration/definition pairs for C-family languages
//! (spec §4.3). Sits between `codeatlas-parser` and the indexer: nothing
//! downstream ever looks at a `RawSymbol`/`RawEdge` again once this crate
//! has run.

pub mod associator;
pub mod kind_map;
pub mod mapper;
pub mod normalize;

pub use associator::HeaderImplAssociator;
pub use mapper::SchemaMapper;
