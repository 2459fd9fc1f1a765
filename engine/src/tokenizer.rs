use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Alphanumeric runs; an apostrophe survives only between two alphanumerics.
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+(?:'[\p{L}\p{N}]+)*").expect("valid regex");
}

/// Lazy stream of `(token, position)` over one field's text.
///
/// Positions count tokens, not bytes, starting at zero.
#[derive(Debug, Clone)]
pub struct Tokens {
    normalized: String,
    offset: usize,
    position: usize,
}

impl Iterator for Tokens {
    type Item = (String, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let mat = RE.find_at(&self.normalized, self.offset)?;
        self.offset = mat.end();
        let position = self.position;
        self.position += 1;
        Some((mat.as_str().to_string(), position))
    }
}

/// NFKC-normalize and lowercase, folding typographic apostrophes to `'`.
pub fn normalize(text: &str) -> String {
    text.nfkc()
        .map(|c| if matches!(c, '\u{2018}' | '\u{2019}') { '\'' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Tokenize text into `(token, position)` pairs. No stop-word removal or stemming happens here.
pub fn tokenize(text: &str) -> Tokens {
    Tokens { normalized: normalize(text), offset: 0, position: 0 }
}
