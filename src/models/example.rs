use serde::{Deserialize, Serialize};

/// A before/after formatting pair used as few-shot guidance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingExample {
    /// The user query the example answers
    pub task: String,
    pub bad_format: String,
    pub good_format: String,
    /// Bullet list describing what changed between the two formats
    pub explanation: String,
}

impl FormattingExample {
    /// Build an example, rendering each non-blank change description as a bullet
    pub fn from_change_descriptions<'a>(
        task: impl Into<String>,
        bad_format: impl Into<String>,
        good_format: impl Into<String>,
        descriptions: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let explanation = descriptions
            .into_iter()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| format!("• {}", d))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            task: task.into(),
            bad_format: bad_format.into(),
            good_format: good_format.into(),
            explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_skips_blank_descriptions() {
        let example = FormattingExample::from_change_descriptions(
            "Cancel order",
            "click cancel",
            "1. Click **Cancel**",
            ["Numbered the steps", "  ", "", " Bolded the button name "],
        );

        assert_eq!(
            example.explanation,
            "• Numbered the steps\n• Bolded the button name"
        );
    }

    #[test]
    fn test_explanation_empty_without_descriptions() {
        let example = FormattingExample::from_change_descriptions("t", "b", "g", []);
        assert!(example.explanation.is_empty());
    }
}
