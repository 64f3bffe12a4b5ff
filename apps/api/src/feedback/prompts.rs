// Prompt constants for the feedback generator.

/// Feedback prompt template. Replace `{jd_text}` and `{resume_text}` before sending.
pub const FEEDBACK_PROMPT_TEMPLATE: &str = "\
Evaluate this resume against the following job description:
Job Description: {jd_text}
Resume: {resume_text}

Give a short evaluation with missing skills, gaps, and suggestions.";

pub fn build_feedback_prompt(resume_text: &str, jd_text: &str) -> String {
    // Placeholders inside either document are never expanded: the resume is
    // substituted first and the JD slot precedes it in the template.
    FEEDBACK_PROMPT_TEMPLATE
        .replacen("{resume_text}", resume_text, 1)
        .replacen("{jd_text}", jd_text, 1)
}
