use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type FieldId = u16;

/// One entry of the engine's field schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    /// Relevance multiplier applied to every match in this field.
    pub weight: f32,
    /// Stored-only fields are carried through for display but never tokenized.
    pub indexed: bool,
}

impl FieldConfig {
    pub fn indexed(name: impl Into<String>, weight: f32) -> Self {
        Self { name: name.into(), weight, indexed: true }
    }

    pub fn stored(name: impl Into<String>) -> Self {
        Self { name: name.into(), weight: 1.0, indexed: false }
    }
}

/// Largest `~N` edit distance the fuzzy matcher supports.
pub const MAX_EDIT_DISTANCE: u8 = 2;

/// Bounds applied while expanding prefix and fuzzy clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Prefixes shorter than this only match the literal term.
    pub min_prefix_len: usize,
    pub allow_short_prefix: bool,
    /// Maximum number of index terms a scoring prefix or fuzzy clause may expand to.
    /// Excluded clauses are never capped.
    pub max_expansions: usize,
    /// Upper bound for the `~N` edit distance.
    pub max_edit_distance: u8,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { min_prefix_len: 2, allow_short_prefix: false, max_expansions: 50, max_edit_distance: MAX_EDIT_DISTANCE }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub query: QueryConfig,
}

impl EngineConfig {
    pub fn new(fields: Vec<FieldConfig>) -> Self {
        Self { fields, query: QueryConfig::default() }
    }

    /// Schema of the site's document store: title boosted ten-fold, url kept as payload.
    pub fn site_defaults() -> Self {
        Self::new(vec![
            FieldConfig::indexed("title", 10.0),
            FieldConfig::indexed("excerpt", 1.0),
            FieldConfig::indexed("categories", 1.0),
            FieldConfig::indexed("tags", 1.0),
            FieldConfig::stored("url"),
        ])
    }

    pub fn with_query(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.len() > FieldId::MAX as usize {
            return Err(Error::InvalidConfig(format!("too many fields: {}", self.fields.len())));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(Error::InvalidConfig("field name is empty".into()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(Error::InvalidConfig(format!("duplicate field `{}`", field.name)));
            }
            if !(field.weight.is_finite() && field.weight > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "field `{}` has non-positive weight {}",
                    field.name, field.weight
                )));
            }
        }
        if !self.fields.iter().any(|f| f.indexed) {
            return Err(Error::InvalidConfig("no indexed field configured".into()));
        }
        if self.query.max_edit_distance > MAX_EDIT_DISTANCE {
            return Err(Error::InvalidConfig(format!(
                "max_edit_distance {} exceeds {MAX_EDIT_DISTANCE}",
                self.query.max_edit_distance
            )));
        }
        Ok(())
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.fields.iter().position(|f| f.name == name).map(|i| i as FieldId)
    }

    /// Resolves a field name usable in `field:term` clauses.
    pub fn indexed_field_id(&self, name: &str) -> Option<FieldId> {
        self.field_id(name).filter(|&id| self.fields[id as usize].indexed)
    }

    pub fn field(&self, id: FieldId) -> &FieldConfig {
        &self.fields[id as usize]
    }

    pub fn indexed_fields(&self) -> impl Iterator<Item = (FieldId, &FieldConfig)> {
        self.fields.iter().enumerate().filter(|(_, f)| f.indexed).map(|(i, f)| (i as FieldId, f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_defaults_are_valid() {
        let config = EngineConfig::site_defaults();
        config.validate().unwrap();
        assert_eq!(config.indexed_field_id("title"), Some(0));
        assert_eq!(config.indexed_field_id("url"), None);
        assert_eq!(config.indexed_fields().count(), 4);
    }

    #[test]
    fn rejects_bad_weights_and_duplicates() {
        let bad = EngineConfig::new(vec![FieldConfig::indexed("title", 0.0)]);
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));

        let dup = EngineConfig::new(vec![FieldConfig::indexed("a", 1.0), FieldConfig::indexed("a", 2.0)]);
        assert!(matches!(dup.validate(), Err(Error::InvalidConfig(_))));

        let stored_only = EngineConfig::new(vec![FieldConfig::stored("url")]);
        assert!(matches!(stored_only.validate(), Err(Error::InvalidConfig(_))));

        let fuzzy = EngineConfig::site_defaults().with_query(QueryConfig { max_edit_distance: 3, ..QueryConfig::default() });
        assert!(matches!(fuzzy.validate(), Err(Error::InvalidConfig(_))));
    }
}
