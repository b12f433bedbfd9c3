//! recall-core
//!
//! Chunk and hit types, the sentence-aware chunker, input processing and the
//! figment-backed configuration shared by the `recall` crates.

#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::{Chunker, ChunkingConfig};
pub use data_processor::DataProcessor;
pub use types::{ChunkMeta, ChunkRecord, RankedHit};
