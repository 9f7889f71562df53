//! Prompt composition — the exact strings sent to the answering model.

use crate::catalog::FrameworkEntry;
use crate::context::ContextBundle;

/// System instruction: the chosen framework's full text wrapped in hard
/// delimiters, under an instruction the model must not deviate from it.
pub fn system_prompt(framework: &FrameworkEntry) -> String {
    format!(
        "You MUST strictly follow the framework provided below.\n\
         Do NOT ignore, modify, or override any part of it.\n\
         \n\
         === FRAMEWORK START: {} ===\n\
         {}\n\
         === FRAMEWORK END ===",
        framework.name, framework.content
    )
}

/// User message: each context section rendered as heading then body,
/// sections separated by blank lines, then a divider and the literal,
/// unmodified query.
pub fn user_message(context: &ContextBundle, query: &str) -> String {
    let sections = context
        .sections
        .iter()
        .map(|s| format!("{}\n\n{}", s.heading, s.body))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{sections}\n\n---\n\nUser's question: {query}")
}
