//! Interactive pipeline assembly
//!
//! One selection cycle per iteration: pick a module from the remaining ones
//! (or `stop` to finish), validate it, resolve its options, and append the
//! completed invocation line to the master description on disk. A failed or
//! cancelled selection evicts the module from the used list and returns to
//! the menu; nothing partial is ever recorded.

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::assemble::master::{Bindings, InvocationLine, MasterWriter};
use crate::assemble::options::{self, STOP};
use crate::assemble::prereq;
use crate::module::schema::ModuleHeader;
use crate::module::ModuleLibrary;
use crate::prompt::Prompter;

/// An `input` argument was required before any output existed.
#[derive(Debug, Error)]
#[error("module `{module}` consumes an input, but no prior module has produced an output")]
pub struct InputUnavailableError {
    pub module: String,
}

/// One fully processed selection.
struct Step {
    line: InvocationLine,
    output: Option<String>,
}

/// Drives one interactive assembly session.
pub struct Assembler<'a> {
    library: &'a ModuleLibrary,
    prompter: &'a mut dyn Prompter,
}

impl<'a> Assembler<'a> {
    pub fn new(library: &'a ModuleLibrary, prompter: &'a mut dyn Prompter) -> Self {
        Self { library, prompter }
    }

    /// Runs the selection loop until `stop` or until the library is
    /// exhausted, writing the master description to `master_path` as it
    /// goes. Returns the completed invocation lines.
    pub fn generate(
        &mut self,
        bindings: &Bindings,
        master_path: &Path,
    ) -> Result<Vec<InvocationLine>> {
        let mut writer = MasterWriter::create(master_path, bindings).with_context(|| {
            format!("cannot create master description `{}`", master_path.display())
        })?;

        let mut used: Vec<String> = Vec::new();
        let mut last_output: Option<String> = None;
        let mut lines: Vec<InvocationLine> = Vec::new();

        loop {
            let remaining: Vec<String> = self
                .library
                .module_names()?
                .into_iter()
                .filter(|name| !used.contains(name))
                .collect();

            if remaining.is_empty() {
                println!("  every module in the library has been used");
                break;
            }

            let mut items = remaining.clone();
            items.push(STOP.to_string());
            let choice = self.prompter.select("select a module to add", &items)?;
            if choice == remaining.len() {
                debug!("assembly stopped by user after {} step(s)", lines.len());
                break;
            }

            let name = remaining[choice].clone();
            used.push(name.clone());
            let previously_used = &used[..used.len() - 1];

            match self.process(&name, previously_used, last_output.as_deref()) {
                Ok(Some(step)) => {
                    writer.append(&step.line).with_context(|| {
                        format!("cannot extend master description `{}`", master_path.display())
                    })?;
                    if let Some(token) = step.output {
                        last_output = Some(token);
                    }
                    info!("recorded `{}`", step.line);
                    lines.push(step.line);

                    println!();
                    println!("{}", style("Pipeline so far:").cyan().bold());
                    for line in &lines {
                        println!("  {line}");
                    }
                    if !self.prompter.confirm("Add another module?", true)? {
                        break;
                    }
                }
                Ok(None) => {
                    used.pop();
                    println!("  {} `{name}` cancelled", style("-").yellow().bold());
                }
                Err(err) => {
                    used.pop();
                    println!("  {} {err:#}", style("!").red().bold());
                }
            }
        }

        Ok(lines)
    }

    /// Attempts full processing of one selected module.
    ///
    /// Prerequisites and input availability are checked before any option
    /// value is prompted for. Returns `Ok(None)` when the user cancels
    /// option resolution.
    fn process(
        &mut self,
        name: &str,
        previously_used: &[String],
        last_output: Option<&str>,
    ) -> Result<Option<Step>> {
        let module = self.library.load(name)?;
        let header_lines = module.header()?;
        let header = ModuleHeader::parse(name, &header_lines)?;

        prereq::validate(name, &header.prereqs, previously_used)?;

        let input = match header.input_position() {
            Some(_) => match last_output {
                Some(token) => Some(token.to_string()),
                None => {
                    return Err(InputUnavailableError {
                        module: name.to_string(),
                    }
                    .into())
                }
            },
            None => None,
        };

        let Some(values) = options::resolve_all(&header, self.prompter)? else {
            return Ok(None);
        };

        let mut args = Vec::new();
        args.extend(input);
        args.extend(values);

        Ok(Some(Step {
            line: InvocationLine {
                module: name.to_string(),
                args,
            },
            output: header.output,
        }))
    }
}
