//! In-memory full-text search over a static site's document catalog.
//!
//! Documents are tokenized, filtered and stemmed into an inverted index that is
//! built once per load and then only read. Queries use a small lunr-style
//! language (`+must -not field:term prefix* fuzzy~1 boost^2`) and are ranked by
//! field-weighted TF-IDF.
//!
//! ```no_run
//! use sitesearch::{store, EngineConfig, SearchEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let script = std::fs::read_to_string("assets/js/lunr/lunr-store.js")?;
//! let engine = SearchEngine::new(EngineConfig::site_defaults())?;
//! engine.build(store::load_documents(&script)?)?;
//! for hit in engine.search_top("+git comm*", 5)? {
//!     println!("{} {:.3}", hit.id, hit.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod query;
pub mod scorer;
pub mod searcher;
pub mod snapshot;
pub mod store;
pub mod tokenizer;

pub use config::{EngineConfig, FieldConfig, FieldId, QueryConfig};
pub use engine::{BuildStats, CancellationToken, SearchEngine};
pub use error::{Error, Result};
pub use index::{DocOrd, Document, InvertedIndex, Posting, StoredDocument, TermEntry};
pub use pipeline::{Analyzer, EnglishAnalyzer, Pipeline};
pub use query::{Clause, Occur, Query, QueryParser, TermMatcher};
pub use searcher::{SearchHit, Searcher, TermMatch};
pub use snapshot::{Fingerprint, Snapshot};
