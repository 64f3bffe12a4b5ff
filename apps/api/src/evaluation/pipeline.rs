//! Evaluation pipeline: Normalizer → {Lexical, Semantic} → Fusion → Feedback.
//!
//! Each evaluation is self-contained. The only shared data is the read-only
//! normalizer and the feedback client. CPU-bound work (extraction, scoring)
//! runs on the blocking pool.

use std::cmp::Ordering;
use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{spawn_blocking, JoinSet};
use tracing::{info, warn};

use crate::config::FeedbackInput;
use crate::errors::AppError;
use crate::evaluation::models::{
    BulkEvaluation, BulkItemError, EvaluationResult, ScoreBreakdown, Upload,
};
use crate::extract::{extract_document, Document, ExtractError};
use crate::feedback::{feedback_or_placeholder, FeedbackGenerator};
use crate::scoring::fusion::{round2, FusionConfig, Verdict};
use crate::scoring::lexical::{lexical_match, MatchResult};
use crate::scoring::normalizer::{NormalizedText, Normalizer};
use crate::scoring::semantic::{semantic_score, SemanticResult};

/// Everything the scoring core derives from one (resume, JD) pair.
#[derive(Debug, Clone)]
pub struct ScoredPair {
    pub resume: NormalizedText,
    pub jd: NormalizedText,
    pub lexical: MatchResult,
    pub semantic: SemanticResult,
    pub final_score: f64,
    pub verdict: Verdict,
}

impl ScoredPair {
    pub fn breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown {
            coverage_percent: self.lexical.coverage_percent(),
            semantic_percent: self.semantic.percent(),
            final_score: self.final_score,
            matched_count: self.lexical.matched.len(),
            missing_count: self.lexical.missing.len(),
        }
    }
}

/// Pure scoring of two raw texts. Empty or stopword-only input scores 0.
pub fn score_pair(
    normalizer: &Normalizer,
    fusion: &FusionConfig,
    resume_text: &str,
    jd_text: &str,
) -> ScoredPair {
    let resume = normalizer.normalize(resume_text);
    let jd = normalizer.normalize(jd_text);

    let lexical = lexical_match(&resume, &jd);
    let semantic = semantic_score(&resume, &jd);

    let final_score = fusion.final_score(lexical.coverage_percent(), semantic.percent());
    let verdict = fusion.verdict(final_score);

    ScoredPair {
        resume,
        jd,
        lexical,
        semantic,
        final_score,
        verdict,
    }
}

#[derive(Clone)]
pub struct Evaluator {
    normalizer: Arc<Normalizer>,
    fusion: FusionConfig,
    feedback: Arc<dyn FeedbackGenerator>,
    feedback_input: FeedbackInput,
    bulk_concurrency: usize,
}

impl Evaluator {
    pub fn new(
        normalizer: Arc<Normalizer>,
        fusion: FusionConfig,
        feedback: Arc<dyn FeedbackGenerator>,
        feedback_input: FeedbackInput,
        bulk_concurrency: usize,
    ) -> Self {
        Self {
            normalizer,
            fusion,
            feedback,
            feedback_input,
            bulk_concurrency: bulk_concurrency.max(1),
        }
    }

    /// Scores a resume against a JD and attaches generator feedback.
    pub async fn evaluate(
        &self,
        resume: Document,
        jd: Document,
    ) -> Result<EvaluationResult, AppError> {
        let normalizer = self.normalizer.clone();
        let fusion = self.fusion.clone();
        let (scored, resume, jd) = spawn_blocking(move || {
            let scored = score_pair(&normalizer, &fusion, &resume.text, &jd.text);
            (scored, resume, jd)
        })
        .await?;

        let (feedback_resume, feedback_jd) = match self.feedback_input {
            FeedbackInput::Original => (resume.text.as_str(), jd.text.as_str()),
            FeedbackInput::Normalized => (scored.resume.as_str(), scored.jd.as_str()),
        };
        let ai_feedback =
            feedback_or_placeholder(self.feedback.as_ref(), feedback_resume, feedback_jd).await;

        let breakdown = scored.breakdown();
        info!(
            resume_file = %resume.filename,
            jd_file = %jd.filename,
            coverage = breakdown.coverage_percent,
            semantic = breakdown.semantic_percent,
            matched = breakdown.matched_count,
            missing = breakdown.missing_count,
            "Evaluated resume: score {:.2} ({})",
            breakdown.final_score,
            scored.verdict
        );

        Ok(EvaluationResult {
            resume_file: resume.filename,
            jd_file: jd.filename,
            score: round2(scored.final_score),
            verdict: scored.verdict,
            missing_skills: scored.lexical.missing.into_iter().collect(),
            ai_feedback,
        })
    }

    /// Extracts both uploads, then evaluates them.
    pub async fn evaluate_uploads(
        &self,
        resume: Upload,
        jd: Upload,
    ) -> Result<EvaluationResult, AppError> {
        let (resume, jd) = spawn_blocking(move || -> Result<_, ExtractError> {
            let resume = extract_document(&resume.filename, &resume.bytes)?;
            let jd = extract_document(&jd.filename, &jd.bytes)?;
            Ok((resume, jd))
        })
        .await??;

        self.evaluate(resume, jd).await
    }

    /// Evaluates every resume against every JD, at most `bulk_concurrency` at a time.
    ///
    /// Uploads that cannot be extracted and pairs that cannot be evaluated are
    /// reported in `errors`; the remaining pairs are still scored. All pairs are
    /// ranked together before `top_n` applies.
    pub async fn evaluate_bulk(
        &self,
        resumes: Vec<Upload>,
        jds: Vec<Upload>,
        top_n: Option<NonZeroUsize>,
    ) -> Result<BulkEvaluation, AppError> {
        let jd_files: Vec<String> = jds.iter().map(|jd| jd.filename.clone()).collect();
        let mut errors = Vec::new();

        let (jds, failed_jds) = self.extract_all(jds).await?;
        for (jd_file, e) in failed_jds {
            warn!("Skipping JD {jd_file} in bulk evaluation: {e}");
            errors.push(BulkItemError {
                resume_file: None,
                jd_file: Some(jd_file),
                error: e.message(),
            });
        }

        let (resumes, failed_resumes) = self.extract_all(resumes).await?;
        for (resume_file, e) in failed_resumes {
            warn!("Skipping {resume_file} in bulk evaluation: {e}");
            errors.push(BulkItemError {
                resume_file: Some(resume_file),
                jd_file: None,
                error: e.message(),
            });
        }

        let semaphore = Arc::new(Semaphore::new(self.bulk_concurrency));
        let mut tasks = JoinSet::new();

        for resume in &resumes {
            for jd in &jds {
                let evaluator = self.clone();
                let semaphore = semaphore.clone();
                let (resume, jd) = (resume.clone(), jd.clone());
                tasks.spawn(async move {
                    let pair = (resume.filename.clone(), jd.filename.clone());
                    let outcome = match semaphore.acquire_owned().await {
                        Ok(_permit) => evaluator.evaluate(resume, jd).await,
                        Err(e) => Err(AppError::Internal(e.into())),
                    };
                    (pair, outcome)
                });
            }
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let ((resume_file, jd_file), outcome) = joined?;
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Skipping {resume_file} against {jd_file} in bulk evaluation: {e}");
                    errors.push(BulkItemError {
                        resume_file: Some(resume_file),
                        jd_file: Some(jd_file),
                        error: e.message(),
                    });
                }
            }
        }

        rank_by_score(&mut results, top_n);
        errors.sort_by(|a, b| (&a.resume_file, &a.jd_file).cmp(&(&b.resume_file, &b.jd_file)));

        info!(
            resumes = resumes.len(),
            jds = jds.len(),
            evaluated = results.len(),
            failed = errors.len(),
            "Bulk evaluation complete"
        );

        Ok(BulkEvaluation {
            jd_files,
            results,
            errors,
        })
    }

    /// Extracts uploads concurrently. Successes keep upload order; failures carry
    /// the file name.
    async fn extract_all(&self, uploads: Vec<Upload>) -> Result<Extracted, AppError> {
        let semaphore = Arc::new(Semaphore::new(self.bulk_concurrency));
        let mut tasks = JoinSet::new();

        for (index, upload) in uploads.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let filename = upload.filename.clone();
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => extract_upload(upload).await,
                    Err(e) => Err(AppError::Internal(e.into())),
                };
                (index, filename, outcome)
            });
        }

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (index, filename, outcome) = joined?;
            match outcome {
                Ok(document) => documents.push((index, document)),
                Err(e) => failures.push((filename, e)),
            }
        }
        documents.sort_by_key(|(index, _)| *index);
        failures.sort_by(|a, b| a.0.cmp(&b.0));

        Ok((documents.into_iter().map(|(_, doc)| doc).collect(), failures))
    }
}

type Extracted = (Vec<Document>, Vec<(String, AppError)>);

async fn extract_upload(upload: Upload) -> Result<Document, AppError> {
    let document =
        spawn_blocking(move || extract_document(&upload.filename, &upload.bytes)).await??;
    Ok(document)
}

/// Highest score first; ties broken by resume then JD file name. Keeps the first `top_n`.
pub fn rank_by_score(results: &mut Vec<EvaluationResult>, top_n: Option<NonZeroUsize>) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.resume_file.cmp(&b.resume_file))
            .then_with(|| a.jd_file.cmp(&b.jd_file))
    });
    if let Some(n) = top_n {
        results.truncate(n.get());
    }
}
