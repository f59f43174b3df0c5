//! Literal find/replace over serialized control payloads
//!
//! The widget JSON schema belongs to the front-end component, so payloads are
//! treated as opaque text. Matching is exact and case-sensitive.

/// Apply each `(literal, replacement)` pair in order, replacing every
/// occurrence. Empty literals are ignored.
pub fn replace_literals<S: AsRef<str>>(payload: &str, pairs: &[(&str, S)]) -> String {
    pairs
        .iter()
        .filter(|(literal, _)| !literal.is_empty())
        .fold(payload.to_string(), |acc, (literal, replacement)| {
            acc.replace(*literal, replacement.as_ref())
        })
}

/// Escape a value for insertion between the quotes of a JSON string
pub fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
