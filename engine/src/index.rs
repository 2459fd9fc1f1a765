use crate::config::{EngineConfig, FieldId};
use crate::engine::CancellationToken;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::time::Instant;

/// Ordinal of a document in the index's document table.
pub type DocOrd = u32;

/// A document as supplied by the host, before indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: BTreeMap<String, String>,
    /// Replaces the schema weight of the named fields for this document only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_weights: Option<BTreeMap<String, f32>>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn with_field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.insert(name.into(), text.into());
        self
    }

    pub fn with_field_weight(mut self, name: impl Into<String>, weight: f32) -> Self {
        self.field_weights.get_or_insert_with(BTreeMap::new).insert(name.into(), weight);
        self
    }
}

/// Document table entry: the identifier plus every schema field the document supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub fields: BTreeMap<String, String>,
    pub weight_overrides: Vec<(FieldId, f32)>,
}

impl StoredDocument {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn weight_override(&self, field: FieldId) -> Option<f32> {
        self.weight_overrides.iter().find(|(f, _)| *f == field).map(|(_, w)| *w)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc: DocOrd,
    pub field: FieldId,
    pub term_frequency: u32,
    /// Token positions within the field, ascending.
    pub positions: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub document_frequency: u32,
    /// Sorted by (doc, field).
    pub postings: Vec<Posting>,
}

/// Frozen term → postings map plus the document table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    terms: BTreeMap<String, TermEntry>,
    docs: Vec<StoredDocument>,
    doc_lookup: HashMap<String, DocOrd>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_docs(&self) -> u32 {
        self.docs.len() as u32
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn num_postings(&self) -> usize {
        self.terms.values().map(|e| e.postings.len()).sum()
    }

    pub fn term(&self, term: &str) -> Option<(&str, &TermEntry)> {
        self.terms.get_key_value(term).map(|(k, v)| (k.as_str(), v))
    }

    /// Indexed terms starting with `prefix`, in lexicographic order.
    pub fn terms_with_prefix<'a>(&'a self, prefix: &str) -> impl Iterator<Item = (&'a str, &'a TermEntry)> + 'a {
        let prefix = prefix.to_owned();
        self.terms
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(move |(k, _)| k.starts_with(prefix.as_str()))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermEntry)> {
        self.terms.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn document(&self, doc: DocOrd) -> Option<&StoredDocument> {
        self.docs.get(doc as usize)
    }

    pub fn document_by_id(&self, id: &str) -> Option<&StoredDocument> {
        self.doc_lookup.get(id).and_then(|&ord| self.document(ord))
    }

    pub fn documents(&self) -> &[StoredDocument] {
        &self.docs
    }

    /// Structural checks run on indexes that did not come from [`IndexBuilder`].
    pub(crate) fn check_consistency(&self, config: &EngineConfig) -> std::result::Result<(), String> {
        if self.doc_lookup.len() != self.docs.len() {
            return Err("document lookup does not cover the document table".into());
        }
        for (ord, doc) in self.docs.iter().enumerate() {
            if self.doc_lookup.get(&doc.id) != Some(&(ord as DocOrd)) {
                return Err(format!("document `{}` is not addressable", doc.id));
            }
        }
        for (term, entry) in &self.terms {
            let mut distinct = 0u32;
            let mut last: Option<(DocOrd, FieldId)> = None;
            for p in &entry.postings {
                if p.doc as usize >= self.docs.len() {
                    return Err(format!("term `{term}` references missing document {}", p.doc));
                }
                if !config.fields.get(p.field as usize).map_or(false, |f| f.indexed) {
                    return Err(format!("term `{term}` references unknown field {}", p.field));
                }
                if p.term_frequency as usize != p.positions.len() {
                    return Err(format!("term `{term}` has inconsistent frequency"));
                }
                match last {
                    Some(prev) if prev >= (p.doc, p.field) => {
                        return Err(format!("postings of `{term}` are not sorted"));
                    }
                    Some((prev_doc, _)) if prev_doc == p.doc => {}
                    _ => distinct += 1,
                }
                last = Some((p.doc, p.field));
            }
            if distinct != entry.document_frequency {
                return Err(format!("term `{term}` has wrong document frequency"));
            }
        }
        Ok(())
    }
}

/// One-shot batch construction of an [`InvertedIndex`].
pub struct IndexBuilder<'a> {
    config: &'a EngineConfig,
    pipeline: &'a Pipeline,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(config: &'a EngineConfig, pipeline: &'a Pipeline) -> Self {
        Self { config, pipeline }
    }

    pub fn build<I>(&self, documents: I, cancel: Option<&CancellationToken>) -> Result<InvertedIndex>
    where
        I: IntoIterator<Item = Document>,
    {
        let start = Instant::now();
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut docs: Vec<StoredDocument> = Vec::new();
        let mut doc_lookup: HashMap<String, DocOrd> = HashMap::new();

        for doc in documents {
            if cancel.map_or(false, CancellationToken::is_cancelled) {
                tracing::warn!(indexed = docs.len(), "index build cancelled");
                return Err(Error::Cancelled);
            }
            if doc.id.is_empty() {
                return Err(Error::InvalidDocument(format!("document #{} has an empty identifier", docs.len())));
            }
            if doc_lookup.contains_key(&doc.id) {
                return Err(Error::InvalidDocument(format!("duplicate identifier `{}`", doc.id)));
            }
            let ord = docs.len() as DocOrd;
            let weight_overrides = self.resolve_weights(&doc)?;

            for (field_id, field) in self.config.indexed_fields() {
                let Some(text) = doc.fields.get(&field.name) else { continue };
                let mut per_term: HashMap<String, Vec<u32>> = HashMap::new();
                for (term, pos) in self.pipeline.analyze(text) {
                    per_term.entry(term).or_default().push(pos as u32);
                }
                for (term, positions) in per_term {
                    postings.entry(term).or_default().push(Posting {
                        doc: ord,
                        field: field_id,
                        term_frequency: positions.len() as u32,
                        positions,
                    });
                }
            }

            let fields = doc
                .fields
                .into_iter()
                .filter(|(name, _)| self.config.field_id(name).is_some())
                .collect();
            doc_lookup.insert(doc.id.clone(), ord);
            docs.push(StoredDocument { id: doc.id, fields, weight_overrides });
        }

        let terms: BTreeMap<String, TermEntry> = postings
            .into_iter()
            .map(|(term, list)| {
                // Documents and fields are visited in order, so each list is already sorted.
                let mut seen = HashSet::new();
                let document_frequency = list.iter().filter(|p| seen.insert(p.doc)).count() as u32;
                (term, TermEntry { document_frequency, postings: list })
            })
            .collect();

        let index = InvertedIndex { terms, docs, doc_lookup };
        tracing::info!(
            num_docs = index.num_docs(),
            num_terms = index.num_terms(),
            num_postings = index.num_postings(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "index build complete"
        );
        Ok(index)
    }

    fn resolve_weights(&self, doc: &Document) -> Result<Vec<(FieldId, f32)>> {
        let mut out = Vec::new();
        let Some(weights) = &doc.field_weights else { return Ok(out) };
        for (name, &weight) in weights {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(Error::InvalidDocument(format!(
                    "document `{}` has non-positive weight {weight} for `{name}`",
                    doc.id
                )));
            }
            if let Some(field) = self.config.indexed_field_id(name) {
                out.push((field, weight));
            }
        }
        Ok(out)
    }
}
