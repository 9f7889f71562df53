//! Model-assisted guideline selection.
//!
//! The filtered assembly strategy asks the model which guideline files are
//! worth pulling into context, instead of fetching all of them. The model
//! is told to answer with nothing but a JSON array of filenames; output
//! that cannot be read that way falls back to the first few filenames of
//! the catalog. The fallback never fails.

use tracing::{debug, warn};

/// How many filenames the fallback keeps when the model's selection is
/// unusable.
pub const FALLBACK_COUNT: usize = 3;

/// Build the single-turn selection prompt: patient context, the user's
/// question, and the enumerated guideline filenames.
pub fn selection_prompt(patient_block: &str, query: &str, filenames: &[String]) -> String {
    let listing = filenames
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Here is the patient's health data:\n\n{patient_block}\n\n\
         User's question: {query}\n\n\
         Available guideline documents:\n{listing}\n\n\
         Select the guideline documents relevant to the patient's clinical issues \
         implied by the data and the question above.\n\
         Respond with ONLY a JSON array of filenames, for example: \
         [\"file_a.pdf\", \"file_b.pdf\"]\n\
         Do NOT include any other text."
    )
}

/// Parse the model's raw selection output. `None` when the text is not a
/// JSON array of strings, or the array is empty.
pub fn parse_selection(raw: &str) -> Option<Vec<String>> {
    let names: Vec<String> = serde_json::from_str(raw.trim()).ok()?;
    if names.is_empty() {
        return None;
    }
    Some(names)
}

/// The deterministic fallback: the first three catalog filenames, fewer
/// when the catalog itself is smaller.
pub fn fallback_selection(filenames: &[String]) -> Vec<String> {
    filenames.iter().take(FALLBACK_COUNT).cloned().collect()
}

/// Resolve the selected filename set from the model's raw output, falling
/// back when the output is unusable. Returns the set and whether the
/// fallback was applied.
pub fn resolve_selection(raw: &str, filenames: &[String]) -> (Vec<String>, bool) {
    match parse_selection(raw) {
        Some(selected) => {
            debug!(count = selected.len(), "model selected guidelines");
            (selected, false)
        }
        None => {
            warn!("guideline selection output unusable, keeping first {FALLBACK_COUNT} filenames");
            (fallback_selection(filenames), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filenames(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn valid_array_parses() {
        let parsed = parse_selection(r#"["B.pdf", "D.pdf"]"#).unwrap();
        assert_eq!(parsed, vec!["B.pdf", "D.pdf"]);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let parsed = parse_selection("  [\"A.pdf\"]\n").unwrap();
        assert_eq!(parsed, vec!["A.pdf"]);
    }

    #[test]
    fn non_array_output_is_rejected() {
        assert_eq!(parse_selection("I would pick B.pdf and D.pdf"), None);
        assert_eq!(parse_selection(r#"{"files": ["B.pdf"]}"#), None);
        assert_eq!(parse_selection(r#"["B.pdf", 3]"#), None);
        assert_eq!(parse_selection(""), None);
        assert_eq!(parse_selection("[]"), None);
    }

    #[test]
    fn fallback_keeps_first_three_in_listing_order() {
        let names = filenames(&["A.pdf", "B.pdf", "C.pdf", "D.pdf"]);
        assert_eq!(fallback_selection(&names), vec!["A.pdf", "B.pdf", "C.pdf"]);
    }

    #[test]
    fn fallback_shrinks_with_the_catalog() {
        assert_eq!(fallback_selection(&filenames(&["A.pdf", "B.pdf"])), vec!["A.pdf", "B.pdf"]);
        assert!(fallback_selection(&[]).is_empty());
    }

    #[test]
    fn resolve_prefers_the_model_selection() {
        let names = filenames(&["A.pdf", "B.pdf", "C.pdf", "D.pdf"]);
        let (selected, fell_back) = resolve_selection(r#"["D.pdf", "B.pdf"]"#, &names);
        assert_eq!(selected, vec!["D.pdf", "B.pdf"]);
        assert!(!fell_back);
    }

    #[test]
    fn resolve_falls_back_on_garbage() {
        let names = filenames(&["A.pdf", "B.pdf", "C.pdf", "D.pdf"]);
        for raw in ["not json", "{}", "", "[]"] {
            let (selected, fell_back) = resolve_selection(raw, &names);
            assert_eq!(selected, vec!["A.pdf", "B.pdf", "C.pdf"]);
            assert!(fell_back);
        }
    }

    #[test]
    fn prompt_enumerates_every_filename() {
        let names = filenames(&["hypertension.pdf", "lipids.pdf"]);
        let prompt = selection_prompt("Document: vitals\nBP 150/95", "Explain my alerts", &names);

        assert!(prompt.contains("1. hypertension.pdf"));
        assert!(prompt.contains("2. lipids.pdf"));
        assert!(prompt.contains("BP 150/95"));
        assert!(prompt.contains("User's question: Explain my alerts"));
        assert!(prompt.contains("ONLY a JSON array"));
    }
}
