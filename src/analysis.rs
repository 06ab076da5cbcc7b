use deunicode::deunicode;

/// Lowercased ASCII tokens of a sentence, split on any non-alphanumeric
/// character. Digits survive tokenization; counting questions depend on them.
pub fn tokenize(text: &str) -> Vec<String> {
    deunicode(text)
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
