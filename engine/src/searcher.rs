use crate::config::{EngineConfig, FieldId, MAX_EDIT_DISTANCE};
use crate::index::{DocOrd, InvertedIndex, Posting, TermEntry};
use crate::query::{Clause, Occur, Query, TermMatcher};
use crate::scorer::Scorer;
use lazy_static::lazy_static;
use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref LEV_BUILDERS: HashMap<u8, LevenshteinAutomatonBuilder> =
        (1..=MAX_EDIT_DISTANCE).map(|distance| (distance, LevenshteinAutomatonBuilder::new(distance, false))).collect();
}

/// A term that contributed to a hit, with where it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermMatch {
    pub term: String,
    pub field: String,
    pub positions: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    pub matches: Vec<TermMatch>,
}

#[derive(Default)]
struct Candidate {
    score: f64,
    matches: Vec<TermMatch>,
}

/// Evaluates parsed queries against one frozen index.
pub struct Searcher<'a> {
    index: &'a InvertedIndex,
    config: &'a EngineConfig,
    scorer: Scorer,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a InvertedIndex, config: &'a EngineConfig) -> Self {
        Self { index, config, scorer: Scorer::new(index.num_docs()) }
    }

    /// Ranked hits, best first; equal scores are ordered by identifier.
    pub fn search(&self, query: &Query) -> Vec<SearchHit> {
        let mut candidates: HashMap<DocOrd, Candidate> = HashMap::new();
        let mut required: Vec<HashSet<DocOrd>> = Vec::new();
        let mut excluded: HashSet<DocOrd> = HashSet::new();

        for clause in &query.clauses {
            // exclusions are not scored, so they see every expansion
            let terms = self.resolve(clause, clause.occur != Occur::MustNot);
            match clause.occur {
                Occur::MustNot => {
                    for (_, entry) in &terms {
                        excluded.extend(self.postings(clause, entry).map(|p| p.doc));
                    }
                }
                Occur::Must | Occur::Should => {
                    let mut touched = HashSet::new();
                    for (term, entry) in &terms {
                        let idf = self.scorer.idf(entry.document_frequency);
                        for posting in self.postings(clause, entry) {
                            let weight = self.field_weight(posting.doc, posting.field);
                            let candidate = candidates.entry(posting.doc).or_default();
                            candidate.score += self.scorer.term_score(posting.term_frequency, idf, weight, clause.boost);
                            let field = &self.config.field(posting.field).name;
                            if !candidate.matches.iter().any(|m| m.term == *term && m.field == *field) {
                                candidate.matches.push(TermMatch {
                                    term: term.to_string(),
                                    field: field.clone(),
                                    positions: posting.positions.clone(),
                                });
                            }
                            touched.insert(posting.doc);
                        }
                    }
                    if clause.occur == Occur::Must {
                        required.push(touched);
                    }
                }
            }
        }

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .filter(|(doc, _)| !excluded.contains(doc) && required.iter().all(|set| set.contains(doc)))
            .filter_map(|(doc, c)| {
                self.index.document(doc).map(|d| SearchHit { id: d.id.clone(), score: c.score, matches: c.matches })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits
    }

    fn postings<'e>(&self, clause: &Clause, entry: &'e TermEntry) -> impl Iterator<Item = &'e Posting> {
        let field = clause.field;
        entry.postings.iter().filter(move |p| field.map_or(true, |f| f == p.field))
    }

    fn field_weight(&self, doc: DocOrd, field: FieldId) -> f32 {
        self.index
            .document(doc)
            .and_then(|d| d.weight_override(field))
            .unwrap_or_else(|| self.config.field(field).weight)
    }

    fn resolve(&self, clause: &Clause, bounded: bool) -> Vec<(&'a str, &'a TermEntry)> {
        let limits = &self.config.query;
        let cap = if bounded { limits.max_expansions } else { usize::MAX };
        match &clause.matcher {
            TermMatcher::Exact(term) => self.index.term(term).into_iter().collect(),
            TermMatcher::Prefix(prefix) => {
                if prefix.chars().count() < limits.min_prefix_len && !limits.allow_short_prefix {
                    return self.index.term(prefix).into_iter().collect();
                }
                let terms: Vec<_> = self.index.terms_with_prefix(prefix).take(cap).collect();
                if terms.len() == cap {
                    tracing::debug!(prefix = %prefix, limit = cap, "prefix expansion capped");
                }
                terms
            }
            TermMatcher::Fuzzy { term, distance } => {
                let Some(builder) = LEV_BUILDERS.get(distance) else {
                    return self.index.term(term).into_iter().collect();
                };
                let dfa = builder.build_dfa(term);
                let terms: Vec<_> = self
                    .index
                    .terms()
                    .filter(|(candidate, _)| matches!(dfa.eval(candidate), Distance::Exact(_)))
                    .take(cap)
                    .collect();
                if terms.len() == cap {
                    tracing::debug!(term = %term, limit = cap, "fuzzy expansion capped");
                }
                terms
            }
        }
    }
}
