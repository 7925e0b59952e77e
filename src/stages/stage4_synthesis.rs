use tracing::info;

use crate::models::{ChangesSummary, PipelineState, StageOutput};

/// Execute the synthesis stage
///
/// Pure local computation over the state: picks the most refined answer and
/// summarises what each earlier stage changed. No model call is made.
pub fn execute_synthesis_stage(state: &PipelineState) -> StageOutput {
    let adequacy_issues = state
        .adequacy_assessment()
        .filter(|a| !a.adequately_addressed)
        .map(|a| a.suggestions.clone())
        .unwrap_or_default();

    let formatting_improvements = state
        .format_assessment()
        .map(|f| f.improvements_made.clone())
        .unwrap_or_default();

    let changes_summary = ChangesSummary {
        grammar_changed: state.grammar_changed(),
        adequacy_issues,
        formatting_improvements,
    };

    info!(
        "Synthesis stage: grammar_changed={}, {} adequacy issues, {} formatting improvements",
        changes_summary.grammar_changed,
        changes_summary.adequacy_issues.len(),
        changes_summary.formatting_improvements.len()
    );

    StageOutput::Final {
        final_answer: state.formatted_answer().to_string(),
        changes_summary,
    }
}
