//! Output formatting for the read-only commands
//!
//! `list` and `info` speak two formats: a human-readable table and JSON for
//! machine consumption.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use crate::module::schema::ModuleHeader;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

/// One row of `pipewright list`.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub output: Option<String>,
    pub prereqs: Vec<String>,
    pub arg_count: usize,
}

impl ModuleSummary {
    pub fn from_header(header: &ModuleHeader) -> Self {
        Self {
            name: header.name.clone(),
            output: header.output.clone(),
            prereqs: header.prereqs.clone(),
            arg_count: header.args.len(),
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the library listing.
    pub fn format_summaries(&self, summaries: &[ModuleSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(summaries).context("cannot serialize module list")
            }
            OutputFormat::Human => Ok(format_summaries_human(summaries)),
        }
    }

    /// Formats one module's parsed header.
    pub fn format_header(&self, header: &ModuleHeader) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(header).context("cannot serialize module header")
            }
            OutputFormat::Human => Ok(format_header_human(header)),
        }
    }
}

fn format_summaries_human(summaries: &[ModuleSummary]) -> String {
    if summaries.is_empty() {
        return "no modules found".to_string();
    }

    let name_width = summaries
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("module".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{}  {}  {}\n",
        style(format!("{:name_width$}", "module")).bold(),
        style(format!("{:8}", "output")).bold(),
        style("prereq").bold(),
    ));
    for summary in summaries {
        out.push_str(&format!(
            "{:name_width$}  {:8}  {}\n",
            summary.name,
            summary.output.as_deref().unwrap_or("-"),
            if summary.prereqs.is_empty() {
                "-".to_string()
            } else {
                summary.prereqs.join(" ")
            },
        ));
    }
    out
}

fn format_header_human(header: &ModuleHeader) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style(&header.name).bold()));

    if !header.prereqs.is_empty() {
        out.push_str(&format!("  prereq: {}\n", header.prereqs.join(" ")));
    }
    if let Some(output) = &header.output {
        out.push_str(&format!("  output: {output}\n"));
    }
    if !header.others.is_empty() {
        out.push_str(&format!("  others: {}\n", header.others.join(" ")));
    }

    if header.args.is_empty() {
        out.push_str("  arguments: none\n");
    } else {
        out.push_str("  arguments:\n");
        for arg in &header.args {
            let kind = if arg.is_input() {
                "bound to the previous output".to_string()
            } else {
                arg.annotation
                    .clone()
                    .unwrap_or_else(|| "untyped".to_string())
            };
            out.push_str(&format!(
                "    {} [{}] {}\n",
                style(&arg.name).cyan(),
                kind,
                arg.description,
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ModuleHeader {
        ModuleHeader::parse(
            "smooth",
            &[
                "prereq: convert_*".to_string(),
                "output: smooth".to_string(),
                "input: series".to_string(),
                "fwhm: kernel width [int]".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_json_summaries_round_trip() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let summaries = vec![ModuleSummary::from_header(&header())];
        let text = formatter.format_summaries(&summaries).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["name"], "smooth");
        assert_eq!(parsed[0]["output"], "smooth");
        assert_eq!(parsed[0]["arg_count"], 2);
    }

    #[test]
    fn test_human_summaries_include_every_module() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let summaries = vec![
            ModuleSummary::from_header(&header()),
            ModuleSummary {
                name: "motion".to_string(),
                output: None,
                prereqs: vec![],
                arg_count: 0,
            },
        ];
        let text = formatter.format_summaries(&summaries).unwrap();
        assert!(text.contains("smooth"));
        assert!(text.contains("motion"));
        assert!(text.contains('-'));
    }

    #[test]
    fn test_human_summaries_empty_library() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        assert_eq!(formatter.format_summaries(&[]).unwrap(), "no modules found");
    }

    #[test]
    fn test_human_header_shows_arguments() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let text = formatter.format_header(&header()).unwrap();
        assert!(text.contains("prereq: convert_*"));
        assert!(text.contains("output: smooth"));
        assert!(text.contains("fwhm"));
        assert!(text.contains("bound to the previous output"));
    }

    #[test]
    fn test_json_header_includes_annotations() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let text = formatter.format_header(&header()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["args"][1]["annotation"], "int");
    }
}
