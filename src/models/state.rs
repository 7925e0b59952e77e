use crate::error::PipelineError;
use crate::models::{AdequacyAssessment, ChangesSummary, FormatAssessment};

/// Position of a run in the fixed four-stage sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    GrammarFixed,
    AdequacyChecked,
    FormatImproved,
    Final,
}

impl PipelineStage {
    /// The stage that follows this one, or `None` at the terminal stage
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::GrammarFixed),
            Self::GrammarFixed => Some(Self::AdequacyChecked),
            Self::AdequacyChecked => Some(Self::FormatImproved),
            Self::FormatImproved => Some(Self::Final),
            Self::Final => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Final
    }
}

/// Result of a single stage, folded into the state by [`PipelineState::apply`]
#[derive(Debug, Clone)]
pub enum StageOutput {
    Grammar(String),
    Adequacy(AdequacyAssessment),
    Formatting(FormatAssessment),
    Final {
        final_answer: String,
        changes_summary: ChangesSummary,
    },
}

impl StageOutput {
    /// The stage the state reaches once this output is applied
    pub fn target(&self) -> PipelineStage {
        match self {
            Self::Grammar(_) => PipelineStage::GrammarFixed,
            Self::Adequacy(_) => PipelineStage::AdequacyChecked,
            Self::Formatting(_) => PipelineStage::FormatImproved,
            Self::Final { .. } => PipelineStage::Final,
        }
    }
}

/// State threaded through one pipeline run.
///
/// Each optional field is written once, by its own stage, via [`apply`](Self::apply).
/// Nothing is ever cleared, so later stages always see everything earlier ones produced.
#[derive(Debug, Clone)]
pub struct PipelineState {
    user_query: String,
    proposed_answer: String,
    grammar_fixed_answer: Option<String>,
    adequacy_assessment: Option<AdequacyAssessment>,
    format_assessment: Option<FormatAssessment>,
    final_answer: Option<String>,
    changes_summary: Option<ChangesSummary>,
    stage: PipelineStage,
}

impl PipelineState {
    pub fn new(user_query: impl Into<String>, proposed_answer: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            proposed_answer: proposed_answer.into(),
            grammar_fixed_answer: None,
            adequacy_assessment: None,
            format_assessment: None,
            final_answer: None,
            changes_summary: None,
            stage: PipelineStage::Init,
        }
    }

    /// Advance to the next stage by recording its output.
    ///
    /// Fails without touching the state if `output` does not belong to the
    /// stage immediately after the current one.
    pub fn apply(&mut self, output: StageOutput) -> Result<(), PipelineError> {
        let to = output.target();
        if self.stage.next() != Some(to) {
            return Err(PipelineError::InvalidTransition {
                from: self.stage,
                to,
            });
        }

        match output {
            StageOutput::Grammar(text) => self.grammar_fixed_answer = Some(text),
            StageOutput::Adequacy(assessment) => self.adequacy_assessment = Some(assessment),
            StageOutput::Formatting(assessment) => self.format_assessment = Some(assessment),
            StageOutput::Final {
                final_answer,
                changes_summary,
            } => {
                self.final_answer = Some(final_answer);
                self.changes_summary = Some(changes_summary);
            }
        }
        self.stage = to;
        Ok(())
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    pub fn proposed_answer(&self) -> &str {
        &self.proposed_answer
    }

    pub fn grammar_fixed_answer(&self) -> Option<&str> {
        self.grammar_fixed_answer.as_deref()
    }

    pub fn adequacy_assessment(&self) -> Option<&AdequacyAssessment> {
        self.adequacy_assessment.as_ref()
    }

    pub fn format_assessment(&self) -> Option<&FormatAssessment> {
        self.format_assessment.as_ref()
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.final_answer.as_deref()
    }

    pub fn changes_summary(&self) -> Option<&ChangesSummary> {
        self.changes_summary.as_ref()
    }

    /// Answer the adequacy stage evaluates: grammar-fixed text, else the proposal
    pub fn adequacy_input(&self) -> &str {
        non_empty(self.grammar_fixed_answer.as_deref()).unwrap_or(self.proposed_answer.as_str())
    }

    /// Best answer available to the formatting stage
    pub fn current_answer(&self) -> &str {
        non_empty(
            self.adequacy_assessment
                .as_ref()
                .map(|a| a.improved_answer.as_str()),
        )
        .unwrap_or_else(|| self.adequacy_input())
    }

    /// Best answer available once formatting has run
    pub fn formatted_answer(&self) -> &str {
        non_empty(
            self.format_assessment
                .as_ref()
                .map(|f| f.improved_answer.as_str()),
        )
        .unwrap_or_else(|| self.current_answer())
    }

    /// True iff the grammar stage produced text that differs from the proposal
    pub fn grammar_changed(&self) -> bool {
        non_empty(self.grammar_fixed_answer.as_deref())
            .is_some_and(|fixed| fixed != self.proposed_answer)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
