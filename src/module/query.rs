//! Declaration-line lookup
//!
//! Every structured lookup in pipewright (prerequisite lists, output tokens,
//! argument annotations, master-description bindings) goes through the same
//! primitive: find the first line that starts with a literal keyword and
//! return the tokens that follow it. Keeping a single tokenizer here means
//! module headers and `KEY=value` master lines parse identically.

/// Splits a line into tokens, treating `=` like whitespace.
///
/// Master descriptions write their global bindings as `KEY=value`, so the
/// tokenizer cannot distinguish `=` from a space. Values therefore must not
/// carry positional `=` semantics of their own.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split(|c: char| c.is_whitespace() || c == '=')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the tokens following the first line whose trimmed text starts
/// with `pattern`.
///
/// The match is a literal prefix, not a regex, and only the first matching
/// line is considered. Empty tokens and tokens equal to the pattern itself
/// are removed; `None` is returned when no line matches or when removing the
/// pattern leaves nothing behind.
pub fn find<S: AsRef<str>>(lines: &[S], pattern: &str) -> Option<Vec<String>> {
    let line = lines
        .iter()
        .map(AsRef::as_ref)
        .find(|line| line.trim().starts_with(pattern))?;

    let tokens: Vec<String> = tokenize(line)
        .into_iter()
        .filter(|t| t != pattern)
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}
