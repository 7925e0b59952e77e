use std::path::Path;
use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::io::load_formatting_examples;
use crate::llm::Gateway;
use crate::models::{FormattingExample, PipelineStage, PipelineState, ProcessedAnswer, StageOutput};
use crate::stages::{
    execute_adequacy_stage, execute_formatting_stage, execute_grammar_stage,
    execute_synthesis_stage,
};

/// Token budget and sampling temperature for one model-backed stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageSettings {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl StageSettings {
    pub fn new(max_tokens: u32, temperature: f64) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Configuration for the model-backed stages
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub grammar: StageSettings,
    pub adequacy: StageSettings,
    pub formatting: StageSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grammar: StageSettings::new(1024, 0.0),
            adequacy: StageSettings::new(2048, 0.0),
            formatting: StageSettings::new(2048, 0.0),
        }
    }
}

/// The four-stage answer pipeline.
///
/// Cheap to clone: the gateway and examples are shared, and every run owns
/// its own [`PipelineState`], so concurrent runs never interfere.
#[derive(Clone)]
pub struct Pipeline {
    gateway: Arc<dyn Gateway>,
    examples: Arc<[FormattingExample]>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        examples: impl Into<Arc<[FormattingExample]>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            gateway,
            examples: examples.into(),
            config,
        }
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }

    /// Run every stage and reduce the final state to a result
    pub async fn run(
        &self,
        user_query: &str,
        proposed_answer: &str,
    ) -> Result<ProcessedAnswer, PipelineError> {
        self.run_with_id(Uuid::new_v4(), user_query, proposed_answer)
            .await
    }

    /// Like [`run`](Self::run), logging under the caller's run id
    pub async fn run_with_id(
        &self,
        run_id: Uuid,
        user_query: &str,
        proposed_answer: &str,
    ) -> Result<ProcessedAnswer, PipelineError> {
        let span = info_span!("pipeline", %run_id);

        async {
            info!("Processing answer with {}", self.gateway.model_name());
            let mut state = PipelineState::new(user_query, proposed_answer);
            self.execute(&mut state).await?;
            ProcessedAnswer::from_state(state)
        }
        .instrument(span)
        .await
    }

    /// Drive `state` from its current stage to the terminal one.
    ///
    /// Stops at the first failing stage, leaving `state` at the last stage
    /// that completed.
    pub async fn execute(&self, state: &mut PipelineState) -> Result<(), PipelineError> {
        while let Some(next) = state.stage().next() {
            let output = self.execute_stage(next, state).await?;
            state.apply(output)?;
        }
        Ok(())
    }

    async fn execute_stage(
        &self,
        stage: PipelineStage,
        state: &PipelineState,
    ) -> Result<StageOutput, PipelineError> {
        let gateway = self.gateway.as_ref();
        match stage {
            PipelineStage::GrammarFixed => {
                execute_grammar_stage(gateway, state, &self.config.grammar).await
            }
            PipelineStage::AdequacyChecked => {
                execute_adequacy_stage(gateway, state, &self.config.adequacy).await
            }
            PipelineStage::FormatImproved => {
                execute_formatting_stage(gateway, state, &self.examples, &self.config.formatting)
                    .await
            }
            PipelineStage::Final => Ok(execute_synthesis_stage(state)),
            PipelineStage::Init => Err(PipelineError::InvalidTransition {
                from: state.stage(),
                to: stage,
            }),
        }
    }
}

/// Process a proposed answer end to end.
///
/// Pre-loaded `examples` take precedence; otherwise they are read from
/// `csv_path`. Supplying neither is a configuration error and no stage runs.
pub async fn process_answer(
    gateway: Arc<dyn Gateway>,
    user_query: &str,
    proposed_answer: &str,
    examples: Option<Vec<FormattingExample>>,
    csv_path: Option<&Path>,
    config: PipelineConfig,
) -> Result<ProcessedAnswer, PipelineError> {
    let examples = match (examples, csv_path) {
        (Some(examples), _) => examples,
        (None, Some(path)) => load_formatting_examples(path)?,
        (None, None) => {
            return Err(PipelineError::Configuration(
                "either formatting examples or an example CSV path must be provided".to_string(),
            ));
        }
    };

    Pipeline::new(gateway, examples, config)
        .run(user_query, proposed_answer)
        .await
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::ServiceError;
    use crate::llm::testing::ScriptedGateway;
    use crate::llm::{ADEQUACY_SYSTEM_PROMPT, FORMATTING_SYSTEM_PROMPT, GRAMMAR_SYSTEM_PROMPT};
    use crate::models::{AdequacyAssessment, FormatAssessment};
    use crate::stages::{ADEQUACY_STAGE, FORMATTING_STAGE};

    const QUERY: &str = "How do I reset my password?";
    const PROPOSED: &str = "go to setting then click reste pasword link";
    const GRAMMAR_FIXED: &str = "Go to settings, then click the reset password link.";

    const ADEQUACY_RESPONSE: &str = r#"Here is my evaluation:
```json
{
  "adequately_addressed": false,
  "missing_aspects": ["Step-by-step detail on finding the settings page"],
  "suggestions": ["Explain where Settings is located", "Mention the confirmation email"],
  "improved_answer": "Open the menu and go to Settings, then click the reset password link. Check your email for a confirmation link."
}
```"#;

    const FORMATTING_RESPONSE: &str = r#"```json
{
  "formatting_issues": ["Instructions written as a single sentence"],
  "improvements_made": ["Split the instructions into numbered steps", "Bolded UI labels"],
  "improved_answer": "1. Open the menu and go to **Settings**.\n2. Click **Reset password**.\n3. Check your email for a confirmation link."
}
```"#;

    fn examples(count: usize) -> Vec<FormattingExample> {
        (1..=count)
            .map(|n| {
                FormattingExample::from_change_descriptions(
                    format!("task {}", n),
                    format!("bad {}", n),
                    format!("good {}", n),
                    ["Used numbered steps"],
                )
            })
            .collect()
    }

    fn pipeline(gateway: &Arc<ScriptedGateway>, example_count: usize) -> Pipeline {
        Pipeline::new(
            gateway.clone(),
            examples(example_count),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_password_reset_scenario() {
        let gateway = Arc::new(ScriptedGateway::new([
            GRAMMAR_FIXED,
            ADEQUACY_RESPONSE,
            FORMATTING_RESPONSE,
        ]));

        let result = pipeline(&gateway, 3).run(QUERY, PROPOSED).await.unwrap();

        assert_eq!(result.original_answer, PROPOSED);
        assert_ne!(result.final_answer, PROPOSED);
        assert!(result.final_answer.starts_with("1. Open the menu"));
        assert!(result.analysis.grammar_fixed);
        assert!(!result.analysis.adequacy_assessment.adequately_addressed);
        assert!(!result.analysis.adequacy_assessment.suggestions.is_empty());
        assert!(result.changes_summary.grammar_changed);
        assert_eq!(
            result.changes_summary.adequacy_issues,
            result.analysis.adequacy_assessment.suggestions
        );
        assert_eq!(
            result.changes_summary.formatting_improvements,
            vec!["Split the instructions into numbered steps", "Bolded UI labels"]
        );

        // Synthesis is local: exactly three model calls, one per stage
        let calls = gateway.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].system_prompt, GRAMMAR_SYSTEM_PROMPT);
        assert_eq!(calls[1].system_prompt, ADEQUACY_SYSTEM_PROMPT);
        assert_eq!(calls[2].system_prompt, FORMATTING_SYSTEM_PROMPT);
        assert!(calls[0].user_prompt.contains(PROPOSED));
        assert!(calls[1].user_prompt.contains(GRAMMAR_FIXED));
        assert!(calls[2].user_prompt.contains("Check your email for a confirmation link."));
    }

    #[tokio::test]
    async fn test_stage_settings_reach_gateway() {
        let gateway = Arc::new(ScriptedGateway::new([PROPOSED, "x", "y"]));
        pipeline(&gateway, 0).run(QUERY, PROPOSED).await.unwrap();

        let budgets: Vec<(u32, f64)> = gateway
            .calls()
            .iter()
            .map(|c| (c.max_tokens, c.temperature))
            .collect();
        assert_eq!(budgets, vec![(1024, 0.0), (2048, 0.0), (2048, 0.0)]);
    }

    #[tokio::test]
    async fn test_malformed_adequacy_response_continues() {
        let gateway = Arc::new(ScriptedGateway::new([
            GRAMMAR_FIXED,
            "Sure, here's my thoughts: the answer needs more detail.",
            FORMATTING_RESPONSE,
        ]));

        let result = pipeline(&gateway, 1).run(QUERY, PROPOSED).await.unwrap();

        assert_eq!(
            result.analysis.adequacy_assessment,
            AdequacyAssessment::unparseable(GRAMMAR_FIXED)
        );
        assert_eq!(
            result.changes_summary.adequacy_issues,
            vec!["Error processing assessment"]
        );
        // The formatting stage received the grammar-fixed answer
        let calls = gateway.calls();
        assert_eq!(calls.len(), 3);
        assert!(
            calls[2]
                .user_prompt
                .contains(&format!("Current Answer:\n{}", GRAMMAR_FIXED))
        );
        assert!(result.final_answer.starts_with("1. Open the menu"));
    }

    #[tokio::test]
    async fn test_all_parse_failures_carry_grammar_fix_forward() {
        let gateway = Arc::new(ScriptedGateway::new([
            GRAMMAR_FIXED,
            "I cannot help with that.",
            "I cannot help with that.",
        ]));

        let result = pipeline(&gateway, 1).run(QUERY, PROPOSED).await.unwrap();

        assert_eq!(result.final_answer, GRAMMAR_FIXED);
        assert_eq!(
            result.analysis.format_assessment,
            FormatAssessment::unparseable(GRAMMAR_FIXED)
        );
        assert_eq!(
            result.changes_summary.formatting_improvements,
            vec!["Error processing formatting"]
        );
    }

    #[tokio::test]
    async fn test_unchanged_grammar_is_reported() {
        let gateway = Arc::new(ScriptedGateway::new([
            "Already fine.",
            r#"{"adequately_addressed": true, "missing_aspects": [], "suggestions": ["unused"], "improved_answer": "Already fine."}"#,
            r#"{"formatting_issues": [], "improvements_made": [], "improved_answer": "Already fine."}"#,
        ]));

        let result = pipeline(&gateway, 1)
            .run("Is it fine?", "Already fine.")
            .await
            .unwrap();

        assert!(!result.analysis.grammar_fixed);
        assert!(!result.changes_summary.grammar_changed);
        assert!(result.changes_summary.adequacy_issues.is_empty());
        assert!(result.changes_summary.formatting_improvements.is_empty());
        assert_eq!(result.final_answer, "Already fine.");
    }

    #[tokio::test]
    async fn test_grammar_failure_stops_pipeline() {
        let gateway = Arc::new(ScriptedGateway::default());
        gateway.push(Err(ServiceError::Authentication {
            status: 401,
            body: "invalid key".to_string(),
        }));

        let err = pipeline(&gateway, 1).run(QUERY, PROPOSED).await.unwrap_err();

        assert!(matches!(err, PipelineError::Service { stage: "grammar", .. }));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_formatting_failure_leaves_state_at_last_completed_stage() {
        let gateway = Arc::new(ScriptedGateway::new([GRAMMAR_FIXED, ADEQUACY_RESPONSE]));
        gateway.push(Err(ServiceError::Timeout(std::time::Duration::from_secs(60))));

        let pipeline = pipeline(&gateway, 1);
        let mut state = PipelineState::new(QUERY, PROPOSED);
        let err = pipeline.execute(&mut state).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Service {
                stage: FORMATTING_STAGE,
                source: ServiceError::Timeout(_)
            }
        ));
        assert_eq!(state.stage(), PipelineStage::AdequacyChecked);
        assert!(state.format_assessment().is_none());
        assert!(state.final_answer().is_none());
    }

    #[tokio::test]
    async fn test_adequacy_failure_returns_no_result() {
        let gateway = Arc::new(ScriptedGateway::new([GRAMMAR_FIXED]));
        gateway.push(Err(ServiceError::Provider {
            status: 500,
            body: "boom".to_string(),
        }));

        let err = pipeline(&gateway, 1).run(QUERY, PROPOSED).await.unwrap_err();

        assert!(matches!(err, PipelineError::Service { stage: ADEQUACY_STAGE, .. }));
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_only_first_five_examples_are_sent() {
        let gateway = Arc::new(ScriptedGateway::new([GRAMMAR_FIXED, "x", "y"]));
        pipeline(&gateway, 8).run(QUERY, PROPOSED).await.unwrap();

        let calls = gateway.calls();
        let prompt = &calls[2].user_prompt;
        assert!(prompt.contains("Example 5:\nUser Query: task 5\n"));
        assert!(!prompt.contains("Example 6:"));
        assert!(!prompt.contains("task 8"));
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_isolated() {
        let first = Arc::new(ScriptedGateway::new(["first fixed", "a", "b"]));
        let second = Arc::new(ScriptedGateway::new(["second fixed", "c", "d"]));
        let examples: Arc<[FormattingExample]> = examples(2).into();

        let p1 = Pipeline::new(first.clone(), examples.clone(), PipelineConfig::default());
        let p2 = Pipeline::new(second.clone(), examples, PipelineConfig::default());

        let (r1, r2) = tokio::join!(p1.run("q1", "first"), p2.run("q2", "second"));

        assert_eq!(r1.unwrap().final_answer, "first fixed");
        assert_eq!(r2.unwrap().final_answer, "second fixed");
    }

    #[tokio::test]
    async fn test_process_answer_requires_examples() {
        let gateway = Arc::new(ScriptedGateway::default());

        let err = process_answer(
            gateway.clone(),
            QUERY,
            PROPOSED,
            None,
            None,
            PipelineConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_process_answer_loads_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "Task,Bad Formatting,Good Formatting,Change Description 1\nReset password,click reset,1. Click **Reset**,Numbered steps\n"
        )
        .unwrap();
        let gateway = Arc::new(ScriptedGateway::new([GRAMMAR_FIXED, "x", "y"]));

        let result = process_answer(
            gateway.clone(),
            QUERY,
            PROPOSED,
            None,
            Some(file.path()),
            PipelineConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(result.final_answer, GRAMMAR_FIXED);
        assert!(gateway.calls()[2].user_prompt.contains("User Query: Reset password"));
    }

    #[tokio::test]
    async fn test_process_answer_prefers_loaded_examples() {
        let gateway = Arc::new(ScriptedGateway::new([GRAMMAR_FIXED, "x", "y"]));

        process_answer(
            gateway.clone(),
            QUERY,
            PROPOSED,
            Some(examples(1)),
            Some(Path::new("/nonexistent/examples.csv")),
            PipelineConfig::default(),
        )
        .await
        .unwrap();

        assert!(gateway.calls()[2].user_prompt.contains("User Query: task 1"));
    }

    #[tokio::test]
    async fn test_process_answer_bad_csv_path() {
        let gateway = Arc::new(ScriptedGateway::default());

        let err = process_answer(
            gateway.clone(),
            QUERY,
            PROPOSED,
            None,
            Some(Path::new("/nonexistent/examples.csv")),
            PipelineConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::ExampleLoad(_)));
        assert!(gateway.calls().is_empty());
    }
}
