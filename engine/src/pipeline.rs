//! Term pipeline: stop-word filtering followed by stemming.
//!
//! Index terms and query terms must come out of the same [`Pipeline`], otherwise
//! lookups silently miss. The analyzer's fingerprint is recorded in snapshots so a
//! mismatch is caught on import instead.

use crate::tokenizer;
use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use sha1::{Digest, Sha1};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

const ENGLISH_STEMMER_VERSION: &str = "snowball-english/1";

lazy_static! {
    static ref STOPWORDS: Vec<&'static str> = vec![
        "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
        "be","because","been","before","being","below","between","both","but","by",
        "can","can't","cannot","could","couldn't",
        "did","didn't","do","does","doesn't","doing","don't","down","during",
        "each","few","for","from","further",
        "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
        "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
        "let's","me","more","most","mustn't","my","myself",
        "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
        "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
        "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
        "under","until","up","very",
        "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
        "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
    ];
}

/// Default English stop words.
pub fn english_stop_words() -> impl Iterator<Item = &'static str> {
    STOPWORDS.iter().copied()
}

/// Language capability plugged into a [`Pipeline`].
pub trait Analyzer: Send + Sync {
    fn tokenize<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = (String, usize)> + 'a>;

    fn is_stop_word(&self, token: &str) -> bool;

    fn stem<'a>(&self, token: &'a str) -> Cow<'a, str>;

    /// Identifies the stemmer and stop-word set. Two analyzers producing
    /// different terms for the same text must not share a fingerprint.
    fn fingerprint(&self) -> String;
}

pub struct EnglishAnalyzer {
    stemmer: Stemmer,
    stop_words: HashSet<String>,
    fingerprint: String,
}

impl EnglishAnalyzer {
    pub fn new() -> Self {
        Self::with_stop_words(english_stop_words())
    }

    pub fn with_stop_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words: HashSet<String> =
            words.into_iter().map(|w| tokenizer::normalize(w.as_ref())).filter(|w| !w.is_empty()).collect();
        let mut sorted: Vec<&str> = stop_words.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let mut hasher = Sha1::new();
        hasher.update(sorted.join("\n").as_bytes());
        let fingerprint = format!("{};stop-words={}:{:x}", ENGLISH_STEMMER_VERSION, sorted.len(), hasher.finalize());
        Self { stemmer: Stemmer::create(Algorithm::English), stop_words, fingerprint }
    }
}

impl Default for EnglishAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for EnglishAnalyzer {
    fn tokenize<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = (String, usize)> + 'a> {
        Box::new(tokenizer::tokenize(text))
    }

    fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    fn stem<'a>(&self, token: &'a str) -> Cow<'a, str> {
        self.stemmer.stem(token)
    }

    fn fingerprint(&self) -> String {
        self.fingerprint.clone()
    }
}

/// Shared tokenize → filter → stem chain used at build and query time.
#[derive(Clone)]
pub struct Pipeline {
    analyzer: Arc<dyn Analyzer>,
}

impl Pipeline {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self { analyzer }
    }

    pub fn english() -> Self {
        Self::new(Arc::new(EnglishAnalyzer::new()))
    }

    /// Terms with their original positions. Stop words leave gaps in the numbering.
    pub fn analyze<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (String, usize)> + 'a {
        self.analyzer
            .tokenize(text)
            .filter(move |(token, _)| !self.analyzer.is_stop_word(token))
            .map(move |(token, pos)| (self.analyzer.stem(&token).into_owned(), pos))
    }

    /// Runs one already-tokenized query token through the pipeline; `None` for stop words.
    pub fn analyze_token(&self, token: &str) -> Option<String> {
        if self.analyzer.is_stop_word(token) {
            return None;
        }
        Some(self.analyzer.stem(token).into_owned())
    }

    /// Raw tokens without filtering or stemming.
    pub fn tokens<'a>(&self, text: &'a str) -> Box<dyn Iterator<Item = (String, usize)> + 'a> {
        self.analyzer.tokenize(text)
    }

    pub fn fingerprint(&self) -> String {
        self.analyzer.fingerprint()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::english()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("fingerprint", &self.fingerprint()).finish()
    }
}
