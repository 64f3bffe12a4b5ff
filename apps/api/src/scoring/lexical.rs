use std::collections::BTreeSet;

use crate::scoring::normalizer::NormalizedText;

/// Guards the coverage ratio against an empty JD term set.
pub const COVERAGE_EPSILON: f64 = 1e-5;

/// Exact-term overlap between a resume and a JD.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// JD terms that also appear in the resume.
    pub matched: BTreeSet<String>,
    /// JD terms absent from the resume, in lexicographic order.
    pub missing: BTreeSet<String>,
    /// `|matched| / (|matched| + |missing| + ε)`, in [0, 1].
    pub coverage: f64,
}

impl MatchResult {
    pub fn coverage_percent(&self) -> f64 {
        self.coverage * 100.0
    }
}

fn term_set(text: &NormalizedText) -> BTreeSet<String> {
    text.terms().map(str::to_string).collect()
}

/// Set intersection / difference over unique normalized terms.
///
/// No partial credit: substrings and synonyms do not count.
pub fn lexical_match(resume: &NormalizedText, jd: &NormalizedText) -> MatchResult {
    let resume_terms = term_set(resume);
    let jd_terms = term_set(jd);

    let matched: BTreeSet<String> = jd_terms.intersection(&resume_terms).cloned().collect();
    let missing: BTreeSet<String> = jd_terms.difference(&resume_terms).cloned().collect();

    let coverage =
        matched.len() as f64 / (matched.len() as f64 + missing.len() as f64 + COVERAGE_EPSILON);

    MatchResult {
        matched,
        missing,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::normalizer::{LanguageModel, Normalizer};
    use std::sync::Arc;

    fn norm(text: &str) -> NormalizedText {
        Normalizer::new(Arc::new(LanguageModel::english())).normalize(text)
    }

    #[test]
    fn test_matched_and_missing_partition_jd_terms() {
        let resume = norm("python developer sql experience");
        let jd = norm("python developer sql experience required");
        let result = lexical_match(&resume, &jd);

        assert_eq!(result.matched.len(), 4);
        assert_eq!(
            result.missing.iter().collect::<Vec<_>>(),
            vec!["require"]
        );
        let union: BTreeSet<String> = result.matched.union(&result.missing).cloned().collect();
        assert_eq!(union, term_set(&jd));
    }

    #[test]
    fn test_matched_is_symmetric() {
        let a = norm("rust tokio axum postgres docker");
        let b = norm("go docker kubernetes postgres");
        assert_eq!(lexical_match(&a, &b).matched, lexical_match(&b, &a).matched);
    }

    #[test]
    fn test_coverage_in_unit_interval() {
        let cases = [
            ("", ""),
            ("python", ""),
            ("", "python"),
            ("python", "python"),
            ("python java", "python rust go scala"),
        ];
        for (r, j) in cases {
            let c = lexical_match(&norm(r), &norm(j)).coverage;
            assert!((0.0..=1.0).contains(&c), "coverage {c} for ({r:?}, {j:?})");
        }
    }

    #[test]
    fn test_both_empty_has_zero_coverage() {
        let result = lexical_match(&norm(""), &norm(""));
        assert_eq!(result.coverage, 0.0);
        assert!(result.matched.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_full_overlap_coverage_close_to_one() {
        let text = norm("rust kafka terraform");
        let result = lexical_match(&text, &text);
        assert!(result.missing.is_empty());
        assert!((result.coverage - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_duplicates_count_once() {
        let resume = norm("python python python");
        let jd = norm("python sql sql");
        let result = lexical_match(&resume, &jd);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.missing.len(), 1);
        assert!((result.coverage_percent() - 50.0).abs() < 1e-2);
    }

    #[test]
    fn test_no_partial_credit_for_substrings() {
        let result = lexical_match(&norm("javascript"), &norm("java"));
        assert!(result.matched.is_empty());
        assert!(result.missing.contains("java"));
    }
}
