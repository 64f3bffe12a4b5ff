// Scoring core: normalization, lexical coverage, TF-IDF similarity, fusion.
// Everything here is synchronous and pure; the evaluation pipeline decides
// where it runs.

pub mod fusion;
pub mod lemmatizer;
pub mod lexical;
pub mod normalizer;
pub mod semantic;
pub mod stopwords;
