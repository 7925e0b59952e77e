use std::path::Path;

use crate::error::PipelineError;
use crate::models::FormattingExample;

const TASK_COLUMN: &str = "Task";
const BAD_FORMAT_COLUMN: &str = "Bad Formatting";
const GOOD_FORMAT_COLUMN: &str = "Good Formatting";
const CHANGE_DESCRIPTION_COLUMNS: [&str; 4] = [
    "Change Description 1",
    "Change Description 2",
    "Change Description 3",
    "Change Description 4",
];

/// Load formatting examples from a CSV file
pub fn load_formatting_examples(path: &Path) -> Result<Vec<FormattingExample>, PipelineError> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| PipelineError::ExampleLoad(format!("{}: {}", path.display(), e)))?;
    read_formatting_examples(reader)
}

/// Parse formatting examples from CSV text
pub fn parse_formatting_examples(content: &str) -> Result<Vec<FormattingExample>, PipelineError> {
    read_formatting_examples(
        csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes()),
    )
}

fn read_formatting_examples<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<FormattingExample>, PipelineError> {
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::ExampleLoad(format!("failed to read header row: {}", e)))?
        .clone();

    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let required = |name: &str| {
        column(name)
            .ok_or_else(|| PipelineError::ExampleLoad(format!("missing required column '{}'", name)))
    };

    let task_idx = required(TASK_COLUMN)?;
    let bad_idx = required(BAD_FORMAT_COLUMN)?;
    let good_idx = required(GOOD_FORMAT_COLUMN)?;
    let description_idxs: Vec<usize> = CHANGE_DESCRIPTION_COLUMNS
        .iter()
        .filter_map(|name| column(name))
        .collect();

    let mut examples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| PipelineError::ExampleLoad(format!("row {}: {}", row + 1, e)))?;
        let field = |idx: usize| record.get(idx).unwrap_or_default();

        examples.push(FormattingExample::from_change_descriptions(
            field(task_idx),
            field(bad_idx),
            field(good_idx),
            description_idxs.iter().map(|&idx| field(idx)),
        ));
    }

    Ok(examples)
}
