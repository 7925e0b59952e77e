use tracing::info;

use crate::error::PipelineError;
use crate::llm::{build_grammar_prompt, Gateway, GRAMMAR_SYSTEM_PROMPT};
use crate::models::{PipelineState, StageOutput};
use crate::stages::StageSettings;

pub const GRAMMAR_STAGE: &str = "grammar";

/// Execute the grammar stage
///
/// Asks the model for a minimal grammatical correction of the proposed answer
/// and keeps the returned text verbatim. A gateway failure aborts the run.
pub async fn execute_grammar_stage(
    gateway: &dyn Gateway,
    state: &PipelineState,
    settings: &StageSettings,
) -> Result<StageOutput, PipelineError> {
    let prompt = build_grammar_prompt(state.proposed_answer());

    let fixed = gateway
        .generate(
            GRAMMAR_SYSTEM_PROMPT,
            &prompt,
            settings.max_tokens,
            settings.temperature,
        )
        .await
        .map_err(|e| PipelineError::service(GRAMMAR_STAGE, e))?;

    info!(
        "Grammar stage: {}",
        if fixed == state.proposed_answer() {
            "no changes"
        } else {
            "answer corrected"
        }
    );

    Ok(StageOutput::Grammar(fixed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::llm::testing::ScriptedGateway;

    #[tokio::test]
    async fn test_grammar_output_kept_verbatim() {
        let gateway = ScriptedGateway::new(["  Go to settings, then click the reset password link.\n"]);
        let state = PipelineState::new("q", "go to setting then click reste pasword link");
        let settings = StageSettings::new(1024, 0.0);

        let output = execute_grammar_stage(&gateway, &state, &settings)
            .await
            .unwrap();

        match output {
            StageOutput::Grammar(text) => assert_eq!(
                text,
                "  Go to settings, then click the reset password link.\n"
            ),
            other => panic!("unexpected output {:?}", other),
        }

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system_prompt, GRAMMAR_SYSTEM_PROMPT);
        assert_eq!(calls[0].max_tokens, 1024);
        assert_eq!(calls[0].temperature, 0.0);
        assert!(calls[0].user_prompt.contains("reste pasword"));
    }

    #[tokio::test]
    async fn test_grammar_gateway_failure_propagates() {
        let gateway = ScriptedGateway::default();
        gateway.push(Err(ServiceError::RateLimited {
            body: "slow down".to_string(),
        }));
        let state = PipelineState::new("q", "a");

        let err = execute_grammar_stage(&gateway, &state, &StageSettings::new(16, 0.0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Service {
                stage: GRAMMAR_STAGE,
                source: ServiceError::RateLimited { .. }
            }
        ));
    }
}
