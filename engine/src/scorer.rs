/// TF-IDF relevance with per-field weighting.
///
/// Scores are relative to one result set; they are not normalized across queries.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    num_docs: u32,
}

impl Scorer {
    pub fn new(num_docs: u32) -> Self {
        Self { num_docs }
    }

    /// Smoothed IDF `ln(1 + N/df)`, with `df` floored at one.
    pub fn idf(&self, document_frequency: u32) -> f64 {
        let df = document_frequency.max(1) as f64;
        (1.0 + self.num_docs as f64 / df).ln()
    }

    pub fn term_score(&self, term_frequency: u32, idf: f64, field_weight: f32, boost: f32) -> f64 {
        term_frequency as f64 * idf * field_weight as f64 * boost as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rare_terms_weigh_more() {
        let scorer = Scorer::new(100);
        assert!(scorer.idf(1) > scorer.idf(50));
        assert!((scorer.idf(1) - 101f64.ln()).abs() < 1e-12);
        assert!((scorer.idf(50) - 3f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn zero_document_frequency_is_floored() {
        let scorer = Scorer::new(10);
        assert_eq!(scorer.idf(0), scorer.idf(1));
        assert!(Scorer::new(0).idf(0) == 0.0);
    }

    #[test]
    fn weight_and_boost_multiply() {
        let scorer = Scorer::new(4);
        let idf = scorer.idf(2);
        let base = scorer.term_score(1, idf, 1.0, 1.0);
        assert!((scorer.term_score(3, idf, 10.0, 2.0) - base * 60.0).abs() < 1e-9);
    }
}
