//! Free-text query language.
//!
//! ```text
//! +required -excluded optional title:scoped prefix* fuzzy~1 boosted^10
//! ```
//!
//! Parsing is lenient: anything it does not understand is matched as literal
//! text. The only failure is a query left with nothing to rank by.

use crate::config::{EngineConfig, FieldId};
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a clause must, should or must not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occur {
    Should,
    Must,
    MustNot,
}

impl Occur {
    fn to_char(self) -> char {
        match self {
            Occur::Should => '?',
            Occur::Must => '+',
            Occur::MustNot => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TermMatcher {
    /// Pipeline-processed term, looked up verbatim.
    Exact(String),
    /// Normalized but unstemmed prefix.
    Prefix(String),
    Fuzzy { term: String, distance: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub matcher: TermMatcher,
    pub occur: Occur,
    pub field: Option<FieldId>,
    pub boost: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

impl Query {
    pub fn has_positive_clause(&self) -> bool {
        self.clauses.iter().any(|c| c.occur != Occur::MustNot)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.occur.to_char())?;
        if let Some(field) = self.field {
            write!(f, "#{field}:")?;
        }
        match &self.matcher {
            TermMatcher::Exact(t) => write!(f, "{t}")?,
            TermMatcher::Prefix(p) => write!(f, "{p}*")?,
            TermMatcher::Fuzzy { term, distance } => write!(f, "{term}~{distance}")?,
        }
        if self.boost != 1.0 {
            write!(f, "^{}", self.boost)?;
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modifier {
    None,
    Prefix,
    Fuzzy(u8),
}

pub struct QueryParser<'a> {
    config: &'a EngineConfig,
    pipeline: &'a Pipeline,
}

impl<'a> QueryParser<'a> {
    pub fn new(config: &'a EngineConfig, pipeline: &'a Pipeline) -> Self {
        Self { config, pipeline }
    }

    pub fn parse(&self, input: &str) -> Result<Query> {
        let mut query = Query::default();
        for raw in input.split_whitespace() {
            self.parse_clause(raw, &mut query.clauses);
        }
        if !query.has_positive_clause() {
            tracing::debug!(input, clauses = query.clauses.len(), "query has nothing to rank by");
            return Err(Error::EmptyQuery);
        }
        tracing::debug!(input, parsed = %query, "parsed query");
        Ok(query)
    }

    fn parse_clause(&self, raw: &str, out: &mut Vec<Clause>) {
        let (occur, rest) = match raw.as_bytes()[0] {
            b'+' => (Occur::Must, &raw[1..]),
            b'-' => (Occur::MustNot, &raw[1..]),
            _ => (Occur::Should, raw),
        };
        let (field, rest) = match rest.split_once(':') {
            Some((name, term)) => match self.config.indexed_field_id(name) {
                Some(id) => (Some(id), term),
                None => (None, rest),
            },
            None => (None, rest),
        };
        let (rest, boost) = split_boost(rest);
        let (text, modifier) = split_modifier(rest, self.config.query.max_edit_distance);

        let tokens: Vec<String> = self.pipeline.tokens(text).map(|(t, _)| t).collect();
        let last = tokens.len().saturating_sub(1);
        for (i, token) in tokens.into_iter().enumerate() {
            let modifier = if i == last { modifier } else { Modifier::None };
            let matcher = match modifier {
                Modifier::Prefix => TermMatcher::Prefix(token),
                Modifier::Fuzzy(distance) => match self.pipeline.analyze_token(&token) {
                    Some(term) => TermMatcher::Fuzzy { term, distance },
                    None => continue,
                },
                Modifier::None => match self.pipeline.analyze_token(&token) {
                    Some(term) => TermMatcher::Exact(term),
                    None => continue,
                },
            };
            out.push(Clause { matcher, occur, field, boost });
        }
    }
}

/// `term^2.5` → (`term`, 2.5). Boosts that are not positive finite numbers stay literal.
fn split_boost(raw: &str) -> (&str, f32) {
    if let Some((head, tail)) = raw.rsplit_once('^') {
        if let Ok(boost) = tail.parse::<f32>() {
            if boost.is_finite() && boost > 0.0 {
                return (head, boost);
            }
        }
    }
    (raw, 1.0)
}

fn split_modifier(raw: &str, max_edit_distance: u8) -> (&str, Modifier) {
    if let Some((head, tail)) = raw.rsplit_once('~') {
        if let Ok(distance) = tail.parse::<u8>() {
            let distance = distance.min(max_edit_distance);
            let modifier = if distance == 0 { Modifier::None } else { Modifier::Fuzzy(distance) };
            return (head, modifier);
        }
    }
    match raw.strip_suffix('*') {
        Some(head) if !head.is_empty() => (head, Modifier::Prefix),
        _ => (raw, Modifier::None),
    }
}
