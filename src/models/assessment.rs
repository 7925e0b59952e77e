use serde::{Deserialize, Serialize};

/// Marker placed in the first list of a sentinel record
pub const UNPARSEABLE_ASSESSMENT: &str = "Unable to parse assessment";
/// Marker placed in the second list of an adequacy sentinel record
pub const ADEQUACY_PROCESSING_ERROR: &str = "Error processing assessment";
/// Marker placed in the second list of a formatting sentinel record
pub const FORMATTING_PROCESSING_ERROR: &str = "Error processing formatting";

/// Model judgement of whether an answer addresses the user's query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdequacyAssessment {
    /// Whether the answer covers every aspect of the query
    pub adequately_addressed: bool,
    /// Aspects of the query the answer leaves out
    #[serde(default)]
    pub missing_aspects: Vec<String>,
    /// Concrete improvements the model recommends
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// The answer with the suggestions folded in
    pub improved_answer: String,
}

impl AdequacyAssessment {
    /// Sentinel substituted when the model response cannot be parsed
    pub fn unparseable(fallback_answer: &str) -> Self {
        Self {
            adequately_addressed: false,
            missing_aspects: vec![UNPARSEABLE_ASSESSMENT.to_string()],
            suggestions: vec![ADEQUACY_PROCESSING_ERROR.to_string()],
            improved_answer: fallback_answer.to_string(),
        }
    }

    pub fn is_unparseable(&self) -> bool {
        self.missing_aspects.len() == 1
            && self.missing_aspects[0] == UNPARSEABLE_ASSESSMENT
            && self.suggestions.len() == 1
            && self.suggestions[0] == ADEQUACY_PROCESSING_ERROR
    }
}

/// Model report on formatting problems and the reformatted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatAssessment {
    #[serde(default)]
    pub formatting_issues: Vec<String>,
    #[serde(default)]
    pub improvements_made: Vec<String>,
    pub improved_answer: String,
}

impl FormatAssessment {
    /// Sentinel substituted when the model response cannot be parsed
    pub fn unparseable(fallback_answer: &str) -> Self {
        Self {
            formatting_issues: vec![UNPARSEABLE_ASSESSMENT.to_string()],
            improvements_made: vec![FORMATTING_PROCESSING_ERROR.to_string()],
            improved_answer: fallback_answer.to_string(),
        }
    }

    pub fn is_unparseable(&self) -> bool {
        self.formatting_issues.len() == 1
            && self.formatting_issues[0] == UNPARSEABLE_ASSESSMENT
            && self.improvements_made.len() == 1
            && self.improvements_made[0] == FORMATTING_PROCESSING_ERROR
    }
}

/// What the pipeline changed, for reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesSummary {
    pub grammar_changed: bool,
    pub adequacy_issues: Vec<String>,
    pub formatting_improvements: Vec<String>,
}
