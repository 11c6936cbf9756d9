//! Strips the `<move>...</move>` envelope every presentation function asks
//! model-backed players to wrap their answer in, so the DSL sees only the
//! move text itself.

/// Returns the text between the first `<move>` and the next `</move>`, or
/// the input unchanged (trimmed) if no envelope is present — a model that
/// ignores the instructions should not have its whole reply discarded.
pub fn strip_move_tags(text: &str) -> String {
    let Some(start) = text.find("<move>") else {
        return text.trim().to_string();
    };
    let after_open = start + "<move>".len();
    match text[after_open..].find("</move>") {
        Some(end) => text[after_open..after_open + end].trim().to_string(),
        None => text[after_open..].trim().to_string(),
    }
}
