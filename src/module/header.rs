//! Module-file header and body extraction
//!
//! A module script is split in two by its first non-comment line: everything
//! above it (after the interpreter line) is the declaration header, everything
//! from it onward is the executable body. Both views insist on the same
//! interpreter line so a file cannot be accepted by one and rejected by the
//! other.

use thiserror::Error;

/// Required first line of every module file.
pub const INTERPRETER_LINE: &str = "#!/bin/bash";

/// Marker that introduces a header line.
pub const COMMENT_MARKER: char = '#';

/// Malformed or missing header declarations.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The file does not start with the interpreter line.
    #[error("module `{module}`: first line must be `#!/bin/bash`")]
    MissingInterpreter { module: String },

    /// An argument is being resolved but carries no `[type]` annotation.
    #[error("module `{module}`: argument `{arg}` has no `[type]` annotation")]
    UntypedArgument { module: String, arg: String },

    /// An argument's `[type]` annotation is not one of `int`, `float`,
    /// or `list: ...`.
    #[error("module `{module}`: argument `{arg}` has unsupported type `[{annotation}]`")]
    UnsupportedType {
        module: String,
        arg: String,
        annotation: String,
    },
}

fn check_interpreter(module: &str, contents: &str) -> Result<(), FormatError> {
    match contents.lines().next() {
        Some(first) if first == INTERPRETER_LINE => Ok(()),
        _ => Err(FormatError::MissingInterpreter {
            module: module.to_string(),
        }),
    }
}

/// Extracts the declaration header of a module file.
///
/// Reads every line after the interpreter line that begins with the comment
/// marker, strips the marker and surrounding whitespace, and stops at the
/// first non-comment line. The remaining text of each line is returned in
/// order.
pub fn read_header(module: &str, contents: &str) -> Result<Vec<String>, FormatError> {
    check_interpreter(module, contents)?;

    Ok(contents
        .lines()
        .skip(1)
        .take_while(|line| line.starts_with(COMMENT_MARKER))
        .map(|line| line[1..].trim().to_string())
        .collect())
}

/// Extracts the executable body of a module file.
///
/// Returns every line from the first non-comment line onward, verbatim.
/// Comment lines appearing after the body has started belong to the body.
pub fn read_body(module: &str, contents: &str) -> Result<Vec<String>, FormatError> {
    check_interpreter(module, contents)?;

    Ok(contents
        .lines()
        .skip(1)
        .skip_while(|line| line.starts_with(COMMENT_MARKER))
        .map(str::to_string)
        .collect())
}
