//! Reader for the site's generated document store.
//!
//! The store is a script of the form `var store = [{ "title": ..., "excerpt": ...,
//! "categories": [...], "tags": [...], "url": ..., "teaser": ... }, ...]`; a bare JSON
//! array is accepted as well.

use crate::error::{Error, Result};
use crate::index::Document;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

lazy_static! {
    static ref ENTITY: Regex = Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub teaser: Option<String>,
}

impl StoreEntry {
    /// The url doubles as the stable identifier; entries without one fall back to their position.
    pub fn into_document(self, ordinal: usize) -> Document {
        let id = if self.url.is_empty() { format!("#{ordinal}") } else { self.url.clone() };
        Document::new(id)
            .with_field("title", decode_entities(&self.title))
            .with_field("excerpt", decode_entities(&self.excerpt))
            .with_field("categories", self.categories.join(" "))
            .with_field("tags", self.tags.join(" "))
            .with_field("url", self.url)
    }
}

pub fn parse_store(script: &str) -> Result<Vec<StoreEntry>> {
    let start = script.find('[').ok_or_else(|| Error::Store("no array literal found".into()))?;
    let end = script.rfind(']').filter(|&end| end > start).ok_or_else(|| Error::Store("unterminated array literal".into()))?;
    let entries: Vec<StoreEntry> = serde_json::from_str(&script[start..=end])?;
    tracing::debug!(entries = entries.len(), "parsed document store");
    Ok(entries)
}

pub fn load_documents(script: &str) -> Result<Vec<Document>> {
    Ok(parse_store(script)?.into_iter().enumerate().map(|(i, e)| e.into_document(i)).collect())
}

/// Decode the HTML entities the site generator leaves in titles and excerpts.
/// Unknown named entities are kept verbatim.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY.replace_all(text, |caps: &Captures| {
        let body = &caps[1];
        let decoded = match body {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            "hellip" => Some('\u{2026}'),
            "mdash" => Some('\u{2014}'),
            "ndash" => Some('\u{2013}'),
            _ => body
                .strip_prefix('#')
                .and_then(|num| match num.strip_prefix(&['x', 'X'][..]) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                })
                .and_then(char::from_u32),
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}
