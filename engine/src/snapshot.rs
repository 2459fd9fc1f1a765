use crate::config::{EngineConfig, FieldConfig};
use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Everything that changes which terms a text produces or how they score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub analyzer: String,
    pub fields: Vec<FieldConfig>,
}

/// Portable form of a built index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u32,
    pub fingerprint: Fingerprint,
    index: Arc<InvertedIndex>,
}

impl Snapshot {
    pub fn new(fingerprint: Fingerprint, index: Arc<InvertedIndex>) -> Self {
        Self { format_version: SNAPSHOT_FORMAT_VERSION, fingerprint, index }
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(Error::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(Error::Decode)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn check_compatible(&self, expected: &Fingerprint, config: &EngineConfig) -> Result<()> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::IncompatibleSnapshot(format!(
                "format version {} (expected {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        if self.fingerprint.analyzer != expected.analyzer {
            return Err(Error::IncompatibleSnapshot(format!(
                "analyzer `{}` (expected `{}`)",
                self.fingerprint.analyzer, expected.analyzer
            )));
        }
        if self.fingerprint.fields != expected.fields {
            return Err(Error::IncompatibleSnapshot("field schema or weights differ".into()));
        }
        self.index.check_consistency(config).map_err(Error::IncompatibleSnapshot)
    }

    pub(crate) fn into_index(self) -> Arc<InvertedIndex> {
        self.index
    }
}
