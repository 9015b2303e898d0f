pub mod catalog;
pub mod chunk;
pub mod compact;
pub mod error;
pub mod extract;
pub mod html;
pub mod index;
pub mod merge;
pub mod offset;
pub mod persist;
pub mod pipeline;
pub mod query;
pub mod tokenizer;

pub use catalog::{DocumentCatalog, DocumentRecord};
pub use error::IndexError;
pub use index::{DocId, Posting, PostingLine, Tier};
pub use query::{QueryEngine, ScoredDoc};
