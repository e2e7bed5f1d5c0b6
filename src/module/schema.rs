//! Typed module-header record
//!
//! The declaration header is a small tagged-line language: `prereq:`,
//! `output:`, and `others:` are reserved tags, and any other `name: ...` line
//! declares a positional argument. This module parses the whole header into
//! one record up front, counting duplicate tags instead of prefix-scanning
//! for them repeatedly, so a second `output:` line is a hard error rather
//! than a silent winner-takes-first.

use serde::Serialize;
use thiserror::Error;

use super::query;

/// The argument name that binds the previous module's output.
const INPUT_ARG: &str = "input";

/// Structural violations of the module declaration schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// More than one `output:` line.
    #[error("module `{module}` declares more than one `output:`")]
    MultipleOutputs { module: String },

    /// More than one argument named `input`.
    #[error("module `{module}` declares more than one `input` argument")]
    MultipleInputs { module: String },

    /// A pipeline line supplies a different number of arguments than the
    /// module currently declares.
    #[error(
        "module `{module}` declares {declared} argument(s) but the pipeline supplies {supplied}"
    )]
    OptionCountMismatch {
        module: String,
        declared: usize,
        supplied: usize,
    },
}

/// One declared positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgSpec {
    /// Argument name (the tag before the colon).
    pub name: String,

    /// Free-text description between the colon and the type annotation.
    pub description: String,

    /// Raw text between the first `[` and the last `]` on the line, if any.
    /// Interpreted lazily: a missing or malformed annotation is only an
    /// error once the argument actually has to be resolved.
    pub annotation: Option<String>,
}

impl ArgSpec {
    /// Whether this argument binds the previous module's output.
    pub fn is_input(&self) -> bool {
        self.name.eq_ignore_ascii_case(INPUT_ARG)
    }
}

/// The parsed declaration header of one module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleHeader {
    /// Module name, derived from the file name.
    pub name: String,

    /// Prerequisite module-name patterns, in declaration order.
    pub prereqs: Vec<String>,

    /// Declared output-file-prefix token, at most one.
    pub output: Option<String>,

    /// Additional removable-artifact prefixes.
    pub others: Vec<String>,

    /// Positional arguments in declaration order, `input` included.
    pub args: Vec<ArgSpec>,
}

impl ModuleHeader {
    /// Parses the header lines of `module` into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` when the header declares more than one
    /// `output:` line or more than one `input` argument.
    pub fn parse(module: &str, header: &[String]) -> Result<Self, SchemaError> {
        let mut prereqs = Vec::new();
        let mut outputs = Vec::new();
        let mut others = Vec::new();
        let mut args = Vec::new();

        for line in header {
            let Some((tag, rest)) = split_tag(line) else {
                continue; // free-text description line
            };

            match tag {
                "prereq" => prereqs.extend(query::tokenize(rest)),
                "others" => others.extend(query::tokenize(rest)),
                "output" => {
                    if let Some(token) = query::tokenize(rest).into_iter().next() {
                        outputs.push(token);
                    }
                }
                name => args.push(parse_arg(name, rest, line)),
            }
        }

        if outputs.len() > 1 {
            return Err(SchemaError::MultipleOutputs {
                module: module.to_string(),
            });
        }
        if args.iter().filter(|a| a.is_input()).count() > 1 {
            return Err(SchemaError::MultipleInputs {
                module: module.to_string(),
            });
        }

        Ok(Self {
            name: module.to_string(),
            prereqs,
            output: outputs.into_iter().next(),
            others,
            args,
        })
    }

    /// Position of the `input` argument among the declared arguments.
    pub fn input_position(&self) -> Option<usize> {
        self.args.iter().position(ArgSpec::is_input)
    }

    /// The arguments that must be resolved by prompting, in declaration
    /// order: everything except `input`.
    pub fn options(&self) -> impl Iterator<Item = &ArgSpec> {
        self.args.iter().filter(|a| !a.is_input())
    }

    /// Fails unless `supplied` matches the declared argument count.
    pub fn check_arg_count(&self, supplied: usize) -> Result<(), SchemaError> {
        if supplied != self.args.len() {
            return Err(SchemaError::OptionCountMismatch {
                module: self.name.clone(),
                declared: self.args.len(),
                supplied,
            });
        }
        Ok(())
    }
}

/// Splits `tag: rest`, requiring the tag to be a single non-empty word.
///
/// Returns the tag with a reserved tag's trailing colon semantics already
/// applied (the colon itself is never part of the tag). Lines without a
/// colon, or whose pre-colon text is empty or contains whitespace, are
/// free text.
fn split_tag(line: &str) -> Option<(&str, &str)> {
    let (tag, rest) = line.split_once(':')?;
    let tag = tag.trim_end();
    if tag.is_empty() || tag.chars().any(char::is_whitespace) {
        return None;
    }
    Some((tag, rest))
}

/// Parses an argument declaration line.
///
/// The annotation is delimited by the first `[` and the last `]` on the
/// whole line; the description is whatever precedes the annotation.
fn parse_arg(name: &str, rest: &str, line: &str) -> ArgSpec {
    let annotation = match (line.find('['), line.rfind(']')) {
        (Some(open), Some(close)) if open < close => Some(line[open + 1..close].to_string()),
        _ => None,
    };

    let description = match rest.find('[') {
        Some(open) => rest[..open].trim().to_string(),
        None => rest.trim().to_string(),
    };

    ArgSpec {
        name: name.to_string(),
        description,
        annotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full_header() {
        let header = lines(&[
            "Smooths a volume with a gaussian kernel.",
            "prereq: convert_* motion",
            "output: smooth",
            "others: tmp_ mean_",
            "input: image series to smooth",
            "fwhm: kernel width in mm [int]",
            "space: target space [list: native standard]",
        ]);
        let parsed = ModuleHeader::parse("smooth", &header).unwrap();

        assert_eq!(parsed.prereqs, vec!["convert_*", "motion"]);
        assert_eq!(parsed.output.as_deref(), Some("smooth"));
        assert_eq!(parsed.others, vec!["tmp_", "mean_"]);
        assert_eq!(parsed.args.len(), 3);
        assert_eq!(parsed.input_position(), Some(0));

        let options: Vec<&str> = parsed.options().map(|a| a.name.as_str()).collect();
        assert_eq!(options, vec!["fwhm", "space"]);

        assert_eq!(parsed.args[1].annotation.as_deref(), Some("int"));
        assert_eq!(parsed.args[1].description, "kernel width in mm");
        assert_eq!(
            parsed.args[2].annotation.as_deref(),
            Some("list: native standard")
        );
    }

    #[test]
    fn test_two_outputs_rejected() {
        let header = lines(&["output: a", "output: b"]);
        assert!(matches!(
            ModuleHeader::parse("m", &header),
            Err(SchemaError::MultipleOutputs { .. })
        ));
    }

    #[test]
    fn test_two_inputs_rejected() {
        let header = lines(&["input: one", "Input: two"]);
        assert!(matches!(
            ModuleHeader::parse("m", &header),
            Err(SchemaError::MultipleInputs { .. })
        ));
    }

    #[test]
    fn test_input_is_case_insensitive() {
        let header = lines(&["INPUT: series"]);
        let parsed = ModuleHeader::parse("m", &header).unwrap();
        assert_eq!(parsed.input_position(), Some(0));
    }

    #[test]
    fn test_free_text_lines_ignored() {
        let header = lines(&[
            "This line has no colon and is prose",
            "so is: this one, the tag has whitespace",
            "output: x",
        ]);
        let parsed = ModuleHeader::parse("m", &header).unwrap();
        assert!(parsed.args.is_empty());
        assert_eq!(parsed.output.as_deref(), Some("x"));
    }

    #[test]
    fn test_annotation_spans_first_and_last_bracket() {
        let header = lines(&["roi: region [of interest] [list: a b]"]);
        let parsed = ModuleHeader::parse("m", &header).unwrap();
        assert_eq!(
            parsed.args[0].annotation.as_deref(),
            Some("of interest] [list: a b")
        );
    }

    #[test]
    fn test_argument_without_annotation() {
        let header = lines(&["mask: binary mask to apply"]);
        let parsed = ModuleHeader::parse("m", &header).unwrap();
        assert_eq!(parsed.args[0].annotation, None);
        assert_eq!(parsed.args[0].description, "binary mask to apply");
    }

    #[test]
    fn test_empty_header() {
        let parsed = ModuleHeader::parse("m", &[]).unwrap();
        assert!(parsed.prereqs.is_empty());
        assert!(parsed.output.is_none());
        assert!(parsed.args.is_empty());
        assert_eq!(parsed.input_position(), None);
    }

    #[test]
    fn test_arg_count_check() {
        let header = lines(&["input: series", "fwhm: width [int]"]);
        let parsed = ModuleHeader::parse("m", &header).unwrap();
        assert!(parsed.check_arg_count(2).is_ok());
        assert!(matches!(
            parsed.check_arg_count(1),
            Err(SchemaError::OptionCountMismatch {
                declared: 2,
                supplied: 1,
                ..
            })
        ));
    }
}
