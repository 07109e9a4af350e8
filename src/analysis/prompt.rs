//! Prompt construction for category analysis and executive summaries.

use serde_json::Value;

use super::category::AnalysisCategory;

/// Maximum characters of document text embedded in an analysis prompt.
pub const MAX_PROMPT_TEXT_CHARS: usize = 8000;

/// Instruction shared by every analysis prompt. `{content}` receives the document text.
const BASE_PROMPT: &str = r#"Analyze the following startup document text and extract relevant information.
Return your response as valid JSON only, no additional text or explanation.

Document content:
{content}

"#;

/// Summary prompt. `{analysis}` receives the pretty-printed analysis JSON.
const SUMMARY_PROMPT: &str = r#"
Based on the following startup analysis data, generate a comprehensive executive summary
that highlights the key investment opportunity, risks, and recommendation:

{analysis}

Please provide a clear, concise executive summary (200-300 words) suitable for investors that covers:
1. Business overview and value proposition
2. Key financial metrics and traction
3. Market opportunity
4. Team strengths
5. Main risks and mitigations
6. Investment recommendation

Format as plain text, not JSON.
"#;

/// Truncate to at most `max_chars` characters (UTF-8 safe).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Build the analysis prompt for a document.
///
/// `None` stands for a category name outside the known set: the generic
/// instruction is returned without any schema.
pub fn build_prompt(text: &str, category: Option<AnalysisCategory>) -> String {
    let base = BASE_PROMPT.replace("{content}", truncate_chars(text, MAX_PROMPT_TEXT_CHARS));
    match category {
        Some(category) => base + category.schema_instructions(),
        None => base,
    }
}

/// Build the executive summary prompt from prior analysis results.
pub fn build_summary_prompt(analysis: &Value) -> String {
    let dump = serde_json::to_string_pretty(analysis).unwrap_or_else(|_| analysis.to_string());
    SUMMARY_PROMPT.replace("{analysis}", &dump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_prompt_embeds_at_most_8000_chars() {
        let text = "ж".repeat(20_000);
        let prompt = build_prompt(&text, Some(AnalysisCategory::Company));
        let embedded = prompt.matches('ж').count();
        assert_eq!(embedded, MAX_PROMPT_TEXT_CHARS);
    }

    #[test]
    fn test_prompt_truncation_counts_characters() {
        let text = "é".repeat(9_000);
        let prompt = build_prompt(&text, None);
        assert_eq!(prompt.matches('é').count(), MAX_PROMPT_TEXT_CHARS);
    }

    #[test]
    fn test_short_text_is_embedded_whole() {
        let prompt = build_prompt("Acme builds rockets.", Some(AnalysisCategory::Team));
        assert!(prompt.contains("Acme builds rockets."));
        assert!(prompt.contains("\"founders\""));
    }

    #[test]
    fn test_category_prompts_request_json_only() {
        for category in AnalysisCategory::ALL {
            let prompt = build_prompt("text", Some(category));
            assert!(prompt.contains("return ONLY valid JSON"), "{}", category);
        }
        let financial = build_prompt("text", Some(AnalysisCategory::Financial));
        assert!(financial.contains("financialMetrics"));
        assert!(financial.contains("unitEconomics"));
        let risk = build_prompt("text", Some(AnalysisCategory::Risk));
        assert!(risk.contains("\"riskFlags\": ["));
    }

    #[test]
    fn test_unknown_category_gets_generic_prompt() {
        let prompt = build_prompt("some text", None);
        assert!(prompt.contains("valid JSON only"));
        assert!(!prompt.contains("exact structure"));
    }

    #[test]
    fn test_summary_prompt_embeds_analysis() {
        let prompt = build_summary_prompt(&json!({"companyInfo": {"name": "Acme"}}));
        assert!(prompt.contains("\"name\": \"Acme\""));
        assert!(prompt.contains("200-300 words"));
        assert!(prompt.contains("Format as plain text, not JSON."));
    }
}
