//! recall-text
//!
//! Lexical side of `recall`: the top-k ranker, the JSON chunk store it reads
//! from, the retriever that falls back to it, and the answer composer. See
//! `examples/search.rs` for chunking and ranking a corpus held in memory.

pub mod compose;
pub mod rank;
pub mod search;
pub mod store;

pub use compose::{Answer, Composer};
pub use rank::rank_top_k;
pub use search::{NoPrimary, Retriever};
pub use store::JsonChunkStore;
