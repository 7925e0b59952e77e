use crate::models::FormattingExample;

/// Few-shot examples shown to the formatting stage; later ones are dropped
pub const MAX_FORMATTING_EXAMPLES: usize = 5;

/// System prompt for the grammar stage
pub const GRAMMAR_SYSTEM_PROMPT: &str = "You are a conservative grammar editor. You make the \
smallest possible edits needed to correct clear grammatical errors and nothing else. The \
author's wording, style and voice must survive untouched.";

/// System prompt for the adequacy stage
pub const ADEQUACY_SYSTEM_PROMPT: &str = "You review customer service responses. Be thorough \
but practical: only recommend changes that are genuinely needed for the response to answer \
the customer's question.";

/// System prompt for the formatting stage
pub const FORMATTING_SYSTEM_PROMPT: &str = "You format customer service responses for \
readability and clarity. Follow the patterns shown in the good examples while keeping the \
meaning and content of the response intact.";

/// Build the user prompt for the grammar stage
pub fn build_grammar_prompt(proposed_answer: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Fix ONLY clear grammatical errors in the answer below.\n");
    prompt.push_str("Make the minimum changes necessary.\n\n");
    prompt.push_str("You MUST NOT:\n");
    prompt.push_str("- Change word choice unless grammar requires it\n");
    prompt.push_str("- Change sentence structure\n");
    prompt.push_str("- Change punctuation unless it is ungrammatical\n");
    prompt.push_str("- Change the tone, style, formality or voice\n");
    prompt.push_str("- Add or remove any content\n\n");
    prompt.push_str(
        "The result should read almost exactly like the original. \
         Reply with the corrected text only, without commentary.\n\n",
    );
    prompt.push_str(&format!("Original answer: {}", proposed_answer));

    prompt
}

/// Build the user prompt for the adequacy stage
pub fn build_adequacy_prompt(user_query: &str, answer: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Decide whether the proposed answer fully and explicitly answers the user's query.\n\n");
    prompt.push_str(&format!("User Query: {}\n\n", user_query));
    prompt.push_str(&format!("Proposed Answer: {}\n\n", answer));
    prompt.push_str("## Instructions\n");
    prompt.push_str("1. Check that every aspect of the query is addressed\n");
    prompt.push_str("2. Identify important information that is missing\n");
    prompt.push_str("3. Note any irrelevant information\n");
    prompt.push_str("4. Suggest specific improvements where needed\n\n");
    prompt.push_str("Reply with a JSON object containing exactly these fields:\n");
    prompt.push_str("- \"adequately_addressed\": boolean\n");
    prompt.push_str("- \"missing_aspects\": list of strings (empty if none)\n");
    prompt.push_str("- \"suggestions\": list of specific improvements (empty if none)\n");
    prompt.push_str(
        "- \"improved_answer\": the answer with your improvements applied \
         (the original answer if no changes are needed)\n",
    );

    prompt
}

/// Build the user prompt for the formatting stage.
///
/// At most [`MAX_FORMATTING_EXAMPLES`] examples are rendered, in the order given.
pub fn build_formatting_prompt(
    user_query: &str,
    current_answer: &str,
    examples: &[FormattingExample],
) -> String {
    let mut prompt = String::new();

    prompt.push_str("Improve the formatting of this customer service answer so it is easier to read.\n");
    prompt.push_str("Keep the content essentially the same and apply the formatting practices shown in these examples:\n\n");

    for (i, example) in examples.iter().take(MAX_FORMATTING_EXAMPLES).enumerate() {
        prompt.push_str(&format_example(i + 1, example));
    }

    prompt.push_str(&format!("\nCurrent Task: {}\n", user_query));
    prompt.push_str(&format!("Current Answer:\n{}\n\n", current_answer));
    prompt.push_str("Reply with a JSON object containing these fields:\n");
    prompt.push_str("- \"formatting_issues\": list of formatting issues you found\n");
    prompt.push_str("- \"improvements_made\": list of improvements you made\n");
    prompt.push_str("- \"improved_answer\": the answer with improved formatting\n");

    prompt
}

fn format_example(number: usize, example: &FormattingExample) -> String {
    format!(
        "Example {}:\nUser Query: {}\nBad format: {}\nGood format: {}\nChanges made: {}\n\n",
        number, example.task, example.bad_format, example.good_format, example.explanation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(n: usize) -> FormattingExample {
        FormattingExample::from_change_descriptions(
            format!("task {}", n),
            format!("bad {}", n),
            format!("good {}", n),
            ["Added line breaks"],
        )
    }

    #[test]
    fn test_grammar_prompt_contains_answer() {
        let prompt = build_grammar_prompt("go to setting then click reste pasword link");
        assert!(prompt.ends_with("Original answer: go to setting then click reste pasword link"));
        assert!(prompt.contains("minimum changes"));
    }

    #[test]
    fn test_adequacy_prompt_names_all_fields() {
        let prompt = build_adequacy_prompt("How do I reset my password?", "Click reset.");
        assert!(prompt.contains("User Query: How do I reset my password?"));
        assert!(prompt.contains("Proposed Answer: Click reset."));
        for field in [
            "adequately_addressed",
            "missing_aspects",
            "suggestions",
            "improved_answer",
        ] {
            assert!(prompt.contains(field), "missing field {}", field);
        }
    }

    #[test]
    fn test_formatting_prompt_uses_first_five_examples_in_order() {
        let examples: Vec<_> = (1..=8).map(example).collect();
        let prompt = build_formatting_prompt("q", "a", &examples);

        let mut last = 0;
        for n in 1..=5 {
            let pos = prompt
                .find(&format!("User Query: task {}\n", n))
                .unwrap_or_else(|| panic!("example {} missing", n));
            assert!(pos > last, "example {} out of order", n);
            last = pos;
            assert!(prompt.contains(&format!("Example {}:\n", n)));
        }
        for n in 6..=8 {
            assert!(!prompt.contains(&format!("task {}", n)));
            assert!(!prompt.contains(&format!("Example {}:", n)));
        }
    }

    #[test]
    fn test_formatting_prompt_with_fewer_examples() {
        let examples = vec![example(1), example(2)];
        let prompt = build_formatting_prompt("Reset password", "click the link", &examples);

        assert!(prompt.contains("Example 2:"));
        assert!(!prompt.contains("Example 3:"));
        assert!(prompt.contains("Changes made: • Added line breaks"));
        assert!(prompt.contains("Current Task: Reset password"));
        assert!(prompt.contains("Current Answer:\nclick the link"));
    }
}
