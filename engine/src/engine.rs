use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::index::{Document, IndexBuilder, InvertedIndex};
use crate::pipeline::Pipeline;
use crate::query::{Query, QueryParser};
use crate::searcher::{SearchHit, Searcher};
use crate::snapshot::{Fingerprint, Snapshot};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag for long builds. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub documents: usize,
    pub terms: usize,
    pub postings: usize,
}

/// Owns the configuration, the term pipeline and the currently published index.
///
/// Queries read whichever index is published when they start; builds and
/// imports assemble a complete replacement first and swap it in atomically, so
/// a failed or cancelled build leaves the previous index in place.
pub struct SearchEngine {
    config: Arc<EngineConfig>,
    pipeline: Pipeline,
    current: ArcSwap<InvertedIndex>,
    build_lock: Mutex<()>,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_pipeline(config, Pipeline::english())
    }

    pub fn with_pipeline(config: EngineConfig, pipeline: Pipeline) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            pipeline,
            current: ArcSwap::from_pointee(InvertedIndex::new()),
            build_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint { analyzer: self.pipeline.fingerprint(), fields: self.config.fields.clone() }
    }

    /// The published index. Holding the `Arc` keeps it alive across later rebuilds.
    pub fn index(&self) -> Arc<InvertedIndex> {
        self.current.load_full()
    }

    /// Rebuild from a full batch of documents and publish the result.
    pub fn build<I>(&self, documents: I) -> Result<BuildStats>
    where
        I: IntoIterator<Item = Document>,
    {
        self.build_inner(documents, None)
    }

    pub fn build_with_cancel<I>(&self, documents: I, cancel: &CancellationToken) -> Result<BuildStats>
    where
        I: IntoIterator<Item = Document>,
    {
        self.build_inner(documents, Some(cancel))
    }

    fn build_inner<I>(&self, documents: I, cancel: Option<&CancellationToken>) -> Result<BuildStats>
    where
        I: IntoIterator<Item = Document>,
    {
        let _guard = self.build_lock.lock();
        let index = IndexBuilder::new(&self.config, &self.pipeline).build(documents, cancel)?;
        if cancel.map_or(false, CancellationToken::is_cancelled) {
            tracing::warn!("index build cancelled before publish");
            return Err(Error::Cancelled);
        }
        let stats = BuildStats { documents: index.num_docs() as usize, terms: index.num_terms(), postings: index.num_postings() };
        self.current.store(Arc::new(index));
        tracing::info!(documents = stats.documents, terms = stats.terms, "index published");
        Ok(stats)
    }

    pub fn parse(&self, query: &str) -> Result<Query> {
        QueryParser::new(&self.config, &self.pipeline).parse(query)
    }

    /// Run an already parsed query against the published index.
    pub fn execute(&self, query: &Query) -> Vec<SearchHit> {
        let index = self.current.load();
        Searcher::new(&index, &self.config).search(query)
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query = self.parse(query)?;
        Ok(self.execute(&query))
    }

    pub fn search_top(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let mut hits = self.search(query)?;
        hits.truncate(limit);
        Ok(hits)
    }

    pub fn export(&self) -> Snapshot {
        Snapshot::new(self.fingerprint(), self.index())
    }

    /// Publish a previously exported index without re-tokenizing anything.
    pub fn import(&self, snapshot: Snapshot) -> Result<()> {
        let _guard = self.build_lock.lock();
        if let Err(err) = snapshot.check_compatible(&self.fingerprint(), &self.config) {
            tracing::warn!(error = %err, "rejected snapshot");
            return Err(err);
        }
        let index = snapshot.into_index();
        tracing::info!(documents = index.num_docs(), terms = index.num_terms(), "snapshot imported");
        self.current.store(index);
        Ok(())
    }
}
