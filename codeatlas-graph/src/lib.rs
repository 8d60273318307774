//! Property-graph projection of the relational symbol/edge store (spec
//! §4.6). The indexer calls `GraphBuilder::upsert_symbol`/`upsert_edge`
//! once per persisted entity; this crate has no I/O of its own — the
//! in-memory `petgraph::Graph` it builds is handed to `codeatlas-storage`'s
//! `GraphStore` for the actual write.

pub mod builder;
pub mod node;
pub mod vertex;

pub use builder::GraphBuilder;
pub use node::GraphNode;
pub use vertex::{VertexLabel, label_for};
