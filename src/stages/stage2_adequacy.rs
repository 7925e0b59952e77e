use tracing::info;

use crate::error::PipelineError;
use crate::llm::{build_adequacy_prompt, parse_adequacy_response, Gateway, ADEQUACY_SYSTEM_PROMPT};
use crate::models::{PipelineState, StageOutput};
use crate::stages::StageSettings;

pub const ADEQUACY_STAGE: &str = "adequacy";

/// Execute the adequacy stage
///
/// Evaluates the grammar-fixed answer (or the original, if the grammar stage
/// returned nothing) against the user's query. Responses that cannot be
/// parsed are replaced by the sentinel assessment; only gateway failures abort.
pub async fn execute_adequacy_stage(
    gateway: &dyn Gateway,
    state: &PipelineState,
    settings: &StageSettings,
) -> Result<StageOutput, PipelineError> {
    let answer = state.adequacy_input();
    let prompt = build_adequacy_prompt(state.user_query(), answer);

    let response = gateway
        .generate(
            ADEQUACY_SYSTEM_PROMPT,
            &prompt,
            settings.max_tokens,
            settings.temperature,
        )
        .await
        .map_err(|e| PipelineError::service(ADEQUACY_STAGE, e))?;

    let assessment = parse_adequacy_response(&response, answer);

    info!(
        "Adequacy stage: addressed={}, {} missing aspects, {} suggestions",
        assessment.adequately_addressed,
        assessment.missing_aspects.len(),
        assessment.suggestions.len()
    );

    Ok(StageOutput::Adequacy(assessment))
}
