//! Semantic scorer: TF-IDF cosine similarity over a two-document corpus.
//!
//! The vector space is fit on exactly the resume and the JD, so it is local to
//! one evaluation and never reused. Weighting follows the usual vectorizer
//! defaults:
//!
//! - vocabulary: terms of at least two characters
//! - tf: raw term counts
//! - idf: smoothed, `ln((1 + n) / (1 + df)) + 1`
//! - each document vector is L2-normalized before the dot product

use std::collections::BTreeMap;

use crate::scoring::normalizer::NormalizedText;

const MIN_TERM_CHARS: usize = 2;

/// Cosine similarity in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticResult {
    pub similarity: f64,
}

impl SemanticResult {
    pub fn percent(&self) -> f64 {
        self.similarity * 100.0
    }
}

fn term_counts(text: &NormalizedText) -> BTreeMap<&str, f64> {
    let mut counts = BTreeMap::new();
    for term in text.terms() {
        if term.chars().count() >= MIN_TERM_CHARS {
            *counts.entry(term).or_insert(0.0) += 1.0;
        }
    }
    counts
}

/// Fits TF-IDF over `[resume, jd]` and returns their cosine similarity.
///
/// An empty vocabulary (both documents empty) or an all-zero vector yields 0.
pub fn semantic_score(resume: &NormalizedText, jd: &NormalizedText) -> SemanticResult {
    let docs = [term_counts(resume), term_counts(jd)];
    let n_docs = docs.len() as f64;

    let mut vocabulary: BTreeMap<&str, f64> = BTreeMap::new();
    for doc in &docs {
        for term in doc.keys() {
            *vocabulary.entry(*term).or_insert(0.0) += 1.0;
        }
    }
    if vocabulary.is_empty() {
        return SemanticResult { similarity: 0.0 };
    }

    let idf: BTreeMap<&str, f64> = vocabulary
        .iter()
        .map(|(term, df)| (*term, ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0))
        .collect();

    let vectors: Vec<Vec<f64>> = docs
        .iter()
        .map(|doc| {
            let raw: Vec<f64> = idf
                .iter()
                .map(|(term, w)| doc.get(term).copied().unwrap_or(0.0) * w)
                .collect();
            l2_normalize(raw)
        })
        .collect();

    let similarity = cosine_of_normalized(&vectors[0], &vectors[1]);
    SemanticResult { similarity }
}

fn l2_normalize(mut v: Vec<f64>) -> Vec<f64> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

fn cosine_of_normalized(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    if dot.is_finite() {
        dot.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
