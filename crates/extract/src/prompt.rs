pub fn build_extraction_prompt(title: &str, text: &str) -> String {
    let title = if title.trim().is_empty() {
        "Untitled"
    } else {
        title
    };
    format!(
        r#"Analyze the following article and extract the knowledge graph.

Article Title: {}
Article Text:
{}

Produce:
- "summary": a concise summary highlighting key facts and impact
- "entities": one entry per unique real-world referent, with id (kebab-case),
  name, type, description, sentiment, importance
- "relationships": directed connections between entity ids, with a specific
  action-verb type, description, and strength

Relationship "from" and "to" values must be entity ids that appear in the
"entities" list of this same response."#,
        title, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_title_and_text() {
        let prompt = build_extraction_prompt("Breach at Acme", "Acme was attacked.");
        assert!(prompt.contains("Article Title: Breach at Acme"));
        assert!(prompt.contains("Acme was attacked."));
    }

    #[test]
    fn blank_title_becomes_untitled() {
        let prompt = build_extraction_prompt("  ", "text");
        assert!(prompt.contains("Article Title: Untitled"));
    }
}
