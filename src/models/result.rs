use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::{AdequacyAssessment, ChangesSummary, FormatAssessment, PipelineState};

/// Per-stage findings reported alongside the final answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub grammar_fixed: bool,
    pub adequacy_assessment: AdequacyAssessment,
    pub format_assessment: FormatAssessment,
}

/// User-facing outcome of a completed pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedAnswer {
    pub original_answer: String,
    pub final_answer: String,
    pub analysis: Analysis,
    pub changes_summary: ChangesSummary,
}

impl ProcessedAnswer {
    /// Collapse a terminal state into the result payload.
    ///
    /// Fails with [`PipelineError::Incomplete`] unless every stage has run.
    pub fn from_state(state: PipelineState) -> Result<Self, PipelineError> {
        let incomplete = || PipelineError::Incomplete(state.stage());

        if !state.stage().is_terminal() {
            return Err(incomplete());
        }

        let (Some(final_answer), Some(changes_summary), Some(adequacy), Some(format)) = (
            state.final_answer(),
            state.changes_summary(),
            state.adequacy_assessment(),
            state.format_assessment(),
        ) else {
            return Err(incomplete());
        };

        Ok(Self {
            original_answer: state.proposed_answer().to_string(),
            final_answer: final_answer.to_string(),
            analysis: Analysis {
                grammar_fixed: state.grammar_changed(),
                adequacy_assessment: adequacy.clone(),
                format_assessment: format.clone(),
            },
            changes_summary: changes_summary.clone(),
        })
    }
}
