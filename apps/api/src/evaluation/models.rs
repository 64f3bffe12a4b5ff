use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::scoring::fusion::Verdict;

/// One uploaded file, before extraction.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Outcome of scoring one resume against one JD. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub resume_file: String,
    pub jd_file: String,
    /// Final fused score in [0, 100], rounded to two decimals.
    pub score: f64,
    pub verdict: Verdict,
    /// JD terms missing from the resume, sorted lexicographically.
    pub missing_skills: Vec<String>,
    pub ai_feedback: String,
}

/// Component scores behind a final score. Logged, not returned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub coverage_percent: f64,
    pub semantic_percent: f64,
    pub final_score: f64,
    pub matched_count: usize,
    pub missing_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateTextRequest {
    pub resume_text: String,
    pub jd_text: String,
    #[serde(default)]
    pub resume_file: Option<String>,
    #[serde(default)]
    pub jd_file: Option<String>,
}

/// An upload or (resume, JD) pair in a bulk request that could not be evaluated.
///
/// A file that failed extraction names only its own side of the pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jd_file: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkEvaluation {
    /// Every submitted JD, in upload order.
    pub jd_files: Vec<String>,
    /// All (resume, JD) pairs sorted by score, highest first; truncated to `top_n`
    /// when requested.
    pub results: Vec<EvaluationResult>,
    pub errors: Vec<BulkItemError>,
}
