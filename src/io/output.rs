use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::ProcessedAnswer;

/// Machine-readable output format
#[derive(Debug, Clone, Serialize)]
pub struct AnswerReport<'a> {
    pub run_id: Uuid,
    pub model: &'a str,
    pub processed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: &'a ProcessedAnswer,
}

impl<'a> AnswerReport<'a> {
    pub fn new(run_id: Uuid, model: &'a str, result: &'a ProcessedAnswer) -> Self {
        Self {
            run_id,
            model,
            processed_at: Utc::now(),
            result,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Human-readable report: the final answer and a summary of changes
pub struct HumanReport<'a> {
    result: &'a ProcessedAnswer,
}

impl<'a> HumanReport<'a> {
    pub fn new(result: &'a ProcessedAnswer) -> Self {
        Self { result }
    }

    pub fn format(&self) -> String {
        let summary = &self.result.changes_summary;
        let mut output = String::new();

        output.push_str("Final Answer\n");
        output.push_str("============\n");
        output.push_str(self.result.final_answer.trim_end());
        output.push_str("\n\n");

        output.push_str("Summary of Changes\n");
        output.push_str("==================\n");
        output.push_str(&format!(
            "Grammar corrected: {}\n",
            if summary.grammar_changed { "yes" } else { "no" }
        ));
        push_list(&mut output, "Adequacy issues", &summary.adequacy_issues);
        push_list(
            &mut output,
            "Formatting issues",
            &self.result.analysis.format_assessment.formatting_issues,
        );
        push_list(
            &mut output,
            "Formatting improvements",
            &summary.formatting_improvements,
        );

        output
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

fn push_list(output: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        output.push_str(&format!("{}: none\n", heading));
        return;
    }
    output.push_str(&format!("{}:\n", heading));
    for item in items {
        output.push_str(&format!("  - {}\n", item));
    }
}
