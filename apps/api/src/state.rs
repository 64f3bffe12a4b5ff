use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::evaluation::pipeline::Evaluator;
use crate::feedback::{FeedbackGenerator, OpenAiFeedback};
use crate::scoring::normalizer::{LanguageModel, Normalizer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub evaluator: Evaluator,
    /// Whether the feedback generator has credentials. Reported by /health.
    pub feedback_configured: bool,
}

impl AppState {
    /// Loads the language model once and builds the OpenAI feedback client.
    pub fn from_config(config: Config) -> Result<Self> {
        let feedback = OpenAiFeedback::new(config.feedback.clone())?;
        if feedback.is_configured() {
            info!("Feedback generator initialized (model: {})", feedback.model());
        } else {
            warn!("OPENAI_API_KEY is not set; responses will carry placeholder feedback");
        }
        let configured = feedback.is_configured();

        let mut state = Self::with_feedback(config, Arc::new(feedback));
        state.feedback_configured = configured;
        Ok(state)
    }

    pub fn with_feedback(config: Config, feedback: Arc<dyn FeedbackGenerator>) -> Self {
        let model = Arc::new(LanguageModel::load(config.normalization_model));
        info!("Language model loaded: {}", model.kind());

        let evaluator = Evaluator::new(
            Arc::new(Normalizer::new(model)),
            config.fusion.clone(),
            feedback,
            config.feedback_input,
            config.bulk_concurrency,
        );

        Self {
            config: Arc::new(config),
            evaluator,
            feedback_configured: true,
        }
    }
}
