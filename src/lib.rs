pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;

pub use error::{PipelineError, ServiceError};
pub use io::{load_formatting_examples, parse_formatting_examples, AnswerReport, HumanReport};
pub use llm::{AnthropicClient, AnthropicConfig, Gateway};
pub use models::{
    AdequacyAssessment, Analysis, ChangesSummary, FormatAssessment, FormattingExample,
    PipelineStage, PipelineState, ProcessedAnswer,
};
pub use stages::{process_answer, Pipeline, PipelineConfig, StageSettings};
