//! Prompt templates for the interpretation operations.

use crate::interpreter::{PageQuery, SimilarityQuery};

/// Prompt asking the model to read an ambiguous registry results page.
#[must_use]
pub fn page_interpretation(query: &PageQuery) -> String {
    format!(
        r#"You are analyzing the text of a U.S. state Secretary of State entity search results page.

State: {jurisdiction}
Searched for: "{name}" ({entity_type})

Page text (truncated):
---
{excerpt}
---

Return a JSON object with these fields:
- availability: "available" | "taken" | "similar" | "unknown"
- similar_names: list of entity names that appear similar to the searched name (may be empty)
- clarity: "clear" | "inferred" | "ambiguous"
- notes: one sentence explaining your conclusion

Return only valid JSON, no other text."#,
        jurisdiction = query.jurisdiction,
        name = query.searched_name,
        entity_type = query.entity_type,
        excerpt = query.page_excerpt,
    )
}

/// Prompt asking the model to assess deceptive-similarity risk.
#[must_use]
pub fn similarity_risk(query: &SimilarityQuery) -> String {
    let names = serde_json::to_string_pretty(&query.similar_names)
        .unwrap_or_else(|_| query.similar_names.join("\n"));
    format!(
        r#"You are a business name availability specialist assessing deceptive similarity risk.

Searched name: "{name}" ({entity_type})
State: {jurisdiction}
State naming rules summary:
{rules}

Similar names already registered in this state:
{names}

Assess whether "{name}" would likely be rejected due to deceptive similarity to any of the above names.

Return a JSON object with:
- risk_level: "low" | "medium" | "high"
- conflicting_names: list of the specific names that pose the greatest conflict
- explanation: 2-3 sentences explaining the risk assessment
- recommendation: one actionable sentence for the user

Return only valid JSON, no other text."#,
        name = query.searched_name,
        entity_type = query.entity_type,
        jurisdiction = query.jurisdiction,
        rules = query.rules_summary,
    )
}
