//! Prerequisite validation
//!
//! A module may require other modules to have run earlier in the pipeline.
//! Each declared pattern is matched case-insensitively as a literal prefix of
//! a previously-used module name; a trailing `*` reads as "any suffix" and
//! changes nothing about the comparison once stripped.

use thiserror::Error;

/// A declared prerequisite has no matching prior module.
#[derive(Debug, Error)]
#[error("module `{module}` requires `{pattern}` to have run earlier in the pipeline")]
pub struct PrerequisiteError {
    pub module: String,
    pub pattern: String,
}

/// Whether `used` satisfies a single prerequisite pattern.
pub fn matches(pattern: &str, used: &str) -> bool {
    let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
    used.to_ascii_lowercase()
        .starts_with(&prefix.to_ascii_lowercase())
}

/// Verifies that every declared prerequisite of `module` is satisfied by at
/// least one entry of `used`.
///
/// Runs before any option prompting, so an unmet prerequisite aborts the
/// selection without partial prompting.
pub fn validate(module: &str, prereqs: &[String], used: &[String]) -> Result<(), PrerequisiteError> {
    for pattern in prereqs {
        if !used.iter().any(|u| matches(pattern, u)) {
            return Err(PrerequisiteError {
                module: module.to_string(),
                pattern: pattern.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        exact_prefix = { "convert", "convert_dicom", true },
        full_name = { "motion", "motion", true },
        case_insensitive = { "Convert", "cONVERT_dicom", true },
        wildcard = { "convert_*", "convert_dicom", true },
        wildcard_bare = { "convert_*", "convert_", true },
        wildcard_case = { "CONVERT_*", "convert_epi", true },
        wildcard_no_prefix = { "convert_*", "motion", false },
        different = { "smooth", "motion", false },
        longer_than_used = { "motionx", "motion", false },
        empty_pattern = { "", "anything", true },
    )]
    fn test_matches(pattern: &str, used: &str, expected: bool) {
        assert_eq!(matches(pattern, used), expected);
    }

    #[test]
    fn test_validate_all_met() {
        let prereqs = vec!["convert_*".to_string(), "motion".to_string()];
        let used = vec!["convert_dicom".to_string(), "motion".to_string()];
        assert!(validate("smooth", &prereqs, &used).is_ok());
    }

    #[test]
    fn test_validate_names_the_unmet_pattern() {
        let prereqs = vec!["convert_*".to_string(), "register".to_string()];
        let used = vec!["convert_dicom".to_string()];
        let err = validate("smooth", &prereqs, &used).unwrap_err();
        assert_eq!(err.pattern, "register");
        assert_eq!(err.module, "smooth");
    }

    #[test]
    fn test_validate_no_prereqs() {
        assert!(validate("first", &[], &[]).is_ok());
    }

    #[test]
    fn test_validate_nothing_used_yet() {
        let prereqs = vec!["anything".to_string()];
        assert!(validate("m", &prereqs, &[]).is_err());
    }
}
