use tracing::{debug, info};

use crate::error::PipelineError;
use crate::llm::{
    build_formatting_prompt, parse_format_response, Gateway, FORMATTING_SYSTEM_PROMPT,
    MAX_FORMATTING_EXAMPLES,
};
use crate::models::{FormattingExample, PipelineState, StageOutput};
use crate::stages::StageSettings;

pub const FORMATTING_STAGE: &str = "formatting";

/// Execute the formatting stage
///
/// Reformats the best answer so far using up to five few-shot examples.
/// Unparseable responses fall back to the sentinel assessment, which carries
/// the unformatted answer forward.
pub async fn execute_formatting_stage(
    gateway: &dyn Gateway,
    state: &PipelineState,
    examples: &[FormattingExample],
    settings: &StageSettings,
) -> Result<StageOutput, PipelineError> {
    let current_answer = state.current_answer();
    debug!(
        "Formatting stage: using {} of {} examples",
        examples.len().min(MAX_FORMATTING_EXAMPLES),
        examples.len()
    );

    let prompt = build_formatting_prompt(state.user_query(), current_answer, examples);

    let response = gateway
        .generate(
            FORMATTING_SYSTEM_PROMPT,
            &prompt,
            settings.max_tokens,
            settings.temperature,
        )
        .await
        .map_err(|e| PipelineError::service(FORMATTING_STAGE, e))?;

    let assessment = parse_format_response(&response, current_answer);

    info!(
        "Formatting stage: {} issues, {} improvements",
        assessment.formatting_issues.len(),
        assessment.improvements_made.len()
    );

    Ok(StageOutput::Formatting(assessment))
}
