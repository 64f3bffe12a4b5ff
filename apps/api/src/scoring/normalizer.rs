//! Text normalizer: turns raw extracted text into a stream of lowercase lemmas.
//!
//! The `LanguageModel` (lemma tables + stopword list) is built once at startup and
//! shared read-only through `Arc`. Normalization itself is a pure function of the
//! input text and that model.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::scoring::lemmatizer::Lemmatizer;
use crate::scoring::stopwords::ENGLISH_STOPWORDS;

/// Which language model backs the normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationModel {
    /// Lemmatization + stopwords + alphabetic filter.
    #[default]
    English,
    /// Stopwords + alphabetic filter only; tokens are lowercased but not lemmatized.
    Lowercase,
}

impl FromStr for NormalizationModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Self::English),
            "lowercase" => Ok(Self::Lowercase),
            other => Err(format!(
                "unknown normalization model '{other}' (expected 'english' or 'lowercase')"
            )),
        }
    }
}

impl fmt::Display for NormalizationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => f.write_str("english"),
            Self::Lowercase => f.write_str("lowercase"),
        }
    }
}

/// Immutable lemmatizer + stopword list, loaded once per process.
pub struct LanguageModel {
    kind: NormalizationModel,
    lemmatizer: Option<Lemmatizer>,
    stopwords: HashSet<&'static str>,
}

impl LanguageModel {
    pub fn load(kind: NormalizationModel) -> Self {
        let lemmatizer = match kind {
            NormalizationModel::English => Some(Lemmatizer::english()),
            NormalizationModel::Lowercase => None,
        };
        Self {
            kind,
            lemmatizer,
            stopwords: ENGLISH_STOPWORDS.iter().copied().collect(),
        }
    }

    pub fn english() -> Self {
        Self::load(NormalizationModel::English)
    }

    pub fn kind(&self) -> NormalizationModel {
        self.kind
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }
}

/// Whitespace-joined lemmas. Tokens are lowercase, alphabetic, and never stopwords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the whitespace-delimited terms (duplicates included).
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub struct Normalizer {
    model: Arc<LanguageModel>,
}

impl Normalizer {
    pub fn new(model: Arc<LanguageModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &LanguageModel {
        &self.model
    }

    pub fn normalize(&self, text: &str) -> NormalizedText {
        let mut lemmas: Vec<String> = Vec::new();

        for token in tokenize(text) {
            if !is_alpha(token) {
                continue;
            }
            let lower = token.to_lowercase();
            if self.model.is_stopword(&lower) {
                continue;
            }
            let lemma = match &self.model.lemmatizer {
                Some(lemmatizer) => lemmatizer.lemmatize(&lower).into_owned(),
                None => lower,
            };
            if self.model.is_stopword(&lemma) {
                continue;
            }
            lemmas.push(lemma);
        }

        NormalizedText(lemmas.join(" "))
    }
}

fn is_alpha(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// Splits text into word-like units on Unicode word boundaries (UAX #29).
///
/// Punctuation between words (`Python,SQL`, `docker;terraform`) separates them.
/// Colons, hyphens and slashes always split, so `Skills:Python` and `CI/CD` give
/// two tokens each. Clitics (`'s`, `n't`, `'ll`, …) are detached from their host.
/// Words with inner periods or digits (`node.js`, `python3`) stay whole so the
/// alphabetic filter rejects them.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.unicode_words()
        .flat_map(|word| word.split([':', '\u{ff1a}', '-', '/']))
        .map(detach_clitic)
        .filter(|token| !token.is_empty())
}

fn detach_clitic(token: &str) -> &str {
    let Some(idx) = token.find(['\'', '’']) else {
        return token;
    };
    let base = &token[..idx];
    let apostrophe_len = token[idx..].chars().next().map_or(1, char::len_utf8);
    let rest = &token[idx + apostrophe_len..];

    match rest.to_ascii_lowercase().as_str() {
        "s" | "re" | "ll" | "ve" | "d" | "m" => base,
        "t" if base.ends_with(['n', 'N']) => &base[..base.len() - 1],
        _ => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(Arc::new(LanguageModel::english()))
    }

    #[test]
    fn test_removes_stopwords_and_lemmatizes() {
        let out = normalizer().normalize("Python developer with SQL experience");
        assert_eq!(out.as_str(), "python developer sql experience");
    }

    #[test]
    fn test_lemmatizes_inflected_forms() {
        let out = normalizer().normalize("Required: managed teams, built services");
        assert_eq!(out.as_str(), "require manage team build service");
    }

    #[test]
    fn test_drops_non_alphabetic_tokens() {
        let out = normalizer().normalize("5+ years python3 node.js 2019-2023 Go!");
        assert_eq!(out.as_str(), "year");
    }

    #[test]
    fn test_splits_hyphenated_and_slashed_words() {
        let out = normalizer().normalize("full-stack CI/CD");
        // "full" is a stopword
        assert_eq!(out.as_str(), "stack ci cd");
    }

    #[test]
    fn test_splits_punctuation_joined_skills() {
        let n = normalizer();
        assert_eq!(n.normalize("Python,SQL,Kubernetes").as_str(), "python sql kubernetes");
        assert_eq!(n.normalize("Skills:Python").as_str(), "skill python");
        assert_eq!(n.normalize("docker;terraform").as_str(), "docker terraform");
        assert_eq!(n.normalize("golang(gin)").as_str(), "golang gin");
    }

    #[test]
    fn test_detaches_clitics() {
        let out = normalizer().normalize("The company's roadmap doesn't change");
        assert_eq!(out.as_str(), "company roadmap change");
    }

    #[test]
    fn test_empty_and_stopword_only_input_is_empty() {
        let n = normalizer();
        assert!(n.normalize("").is_empty());
        assert!(n.normalize("   \n\t ").is_empty());
        assert!(n.normalize("the and of with").is_empty());
        assert!(n.normalize("1234 !!! ###").is_empty());
    }

    #[test]
    fn test_output_invariant_lowercase_alpha_no_stopwords() {
        let n = normalizer();
        let out = n.normalize(
            "Senior Rust Engineer — We're looking for someone who has BUILT distributed systems \
             at scale (10k+ RPS) and is comfortable on-call.",
        );
        for term in out.terms() {
            assert!(term.chars().all(|c| c.is_alphabetic() && !c.is_uppercase()));
            assert!(!n.model().is_stopword(term), "stopword leaked: {term}");
        }
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let n = normalizer();
        let text = "Designed and deployed microservices on Kubernetes";
        assert_eq!(n.normalize(text), n.normalize(text));
    }

    #[test]
    fn test_lowercase_model_skips_lemmatization() {
        let n = Normalizer::new(Arc::new(LanguageModel::load(NormalizationModel::Lowercase)));
        let out = n.normalize("Managed Teams");
        assert_eq!(out.as_str(), "managed teams");
    }

    #[test]
    fn test_model_parses_from_config_string() {
        assert_eq!("english".parse::<NormalizationModel>(), Ok(NormalizationModel::English));
        assert_eq!(" Lowercase ".parse::<NormalizationModel>(), Ok(NormalizationModel::Lowercase));
        assert!("spacy".parse::<NormalizationModel>().is_err());
    }
}
