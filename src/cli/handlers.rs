//! Subcommand handlers
//!
//! Each handler resolves configuration, runs the operation, and converts the
//! outcome into a process exit code. Diagnostics go to stderr; stdout is
//! reserved for the command's own output.

use anyhow::{bail, Context, Result};
use console::style;
use std::path::PathBuf;
use tracing::warn;

use crate::assemble::master::{Bindings, MasterDescription};
use crate::assemble::Assembler;
use crate::cli::commands::{AssembleArgs, InfoArgs, ListArgs, RenderArgs, ScaffoldArgs};
use crate::cli::output::{ModuleSummary, OutputFormatter};
use crate::config::PipewrightConfig;
use crate::module::ModuleLibrary;
use crate::prompt::{ConsolePrompter, Prompter};
use crate::render::{RenderError, Renderer};
use crate::workspace::Workspace;

pub fn handle_assemble(args: &AssembleArgs) -> i32 {
    exit_code(run_assemble(args))
}

pub fn handle_render(args: &RenderArgs) -> i32 {
    exit_code(run_render(args))
}

pub fn handle_list(args: &ListArgs) -> i32 {
    exit_code(run_list(args))
}

pub fn handle_info(args: &InfoArgs) -> i32 {
    exit_code(run_info(args))
}

pub fn handle_scaffold(args: &ScaffoldArgs) -> i32 {
    exit_code(run_scaffold(args))
}

fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            1
        }
    }
}

fn run_assemble(args: &AssembleArgs) -> Result<()> {
    let config = PipewrightConfig::from_env()?
        .with_overrides(args.library.clone(), args.data_root.clone());
    config.validate()?;
    require_terminal("assemble")?;

    let library = ModuleLibrary::new(&config.library);
    if library.module_names()?.is_empty() {
        bail!("module library `{}` holds no modules", config.library.display());
    }

    let mut prompter = ConsolePrompter;
    let experiment = resolve_identifier(args.experiment.clone(), "experiment", &mut prompter)?;
    let modality = resolve_identifier(args.modality.clone(), "modality", &mut prompter)?;
    let run = resolve_identifier(args.run.clone(), "run name", &mut prompter)?;

    let workspace = Workspace::new(&config.data_root);
    let scripts_dir = workspace.ensure_scripts_dir(&experiment)?;
    let master_path = scripts_dir.join(format!("{run}.master"));
    if master_path.exists() {
        bail!(
            "`{}` already exists; master descriptions are immutable, pick a new run name",
            master_path.display()
        );
    }

    let bindings = Bindings {
        library: config.library.clone(),
        dataroot: config.data_root.clone(),
        experiment,
        modality,
    };

    let lines = Assembler::new(&library, &mut prompter).generate(&bindings, &master_path)?;

    println!();
    println!(
        "{} {} step(s) saved to `{}`",
        style("done:").green().bold(),
        lines.len(),
        master_path.display()
    );
    println!("render it with: pipewright render {}", master_path.display());
    Ok(())
}

fn run_render(args: &RenderArgs) -> Result<()> {
    let master = MasterDescription::load(&args.master)
        .with_context(|| format!("cannot read master description `{}`", args.master.display()))?;

    let library_path = match &args.library {
        Some(path) => path.clone(),
        None => master
            .binding("LIBRARY")
            .map(PathBuf::from)
            .ok_or(RenderError::MissingBinding("LIBRARY"))?,
    };
    let library = ModuleLibrary::new(library_path);

    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.master.with_extension("sh"));

    Renderer::new(&library).render_to_file(&args.master, &out_path)?;
    println!("wrote `{}`", out_path.display());
    Ok(())
}

fn run_list(args: &ListArgs) -> Result<()> {
    let config = PipewrightConfig::from_env()?.with_overrides(args.library.clone(), None);
    let library = ModuleLibrary::new(&config.library);

    let mut summaries = Vec::new();
    for name in library.module_names()? {
        match library.load(&name)?.schema() {
            Ok(header) => summaries.push(ModuleSummary::from_header(&header)),
            Err(err) => warn!("skipping `{name}`: {err}"),
        }
    }

    let formatter = OutputFormatter::new(args.format.into());
    print!("{}", ensure_newline(formatter.format_summaries(&summaries)?));
    Ok(())
}

fn run_info(args: &InfoArgs) -> Result<()> {
    let config = PipewrightConfig::from_env()?.with_overrides(args.library.clone(), None);
    let library = ModuleLibrary::new(&config.library);

    let header = library
        .load(&args.module)?
        .schema()
        .with_context(|| format!("cannot parse module `{}`", args.module))?;

    let formatter = OutputFormatter::new(args.format.into());
    print!("{}", ensure_newline(formatter.format_header(&header)?));
    Ok(())
}

fn run_scaffold(args: &ScaffoldArgs) -> Result<()> {
    let config = PipewrightConfig::from_env()?.with_overrides(None, args.data_root.clone());
    config.validate()?;
    require_terminal("scaffold")?;

    let mut prompter = ConsolePrompter;
    let experiment = resolve_identifier(args.experiment.clone(), "experiment", &mut prompter)?;
    let modality = resolve_identifier(args.modality.clone(), "modality", &mut prompter)?;

    let workspace = Workspace::new(&config.data_root);
    workspace.ensure_scripts_dir(&experiment)?;

    let existing = workspace.subjects(&experiment, &modality)?;
    if !existing.is_empty() {
        println!("  {} existing subject(s): {}", existing.len(), existing.join(" "));
    }

    let mut created = 0usize;
    loop {
        let reply = prompter.line("subject id (empty to finish)")?;
        let subject = reply.trim();
        if subject.is_empty() {
            break;
        }
        if !is_single_token(subject) {
            println!(
                "  {} subject ids must be a single token without `=`",
                style("!").yellow().bold()
            );
            continue;
        }
        if workspace.scaffold_subject(&experiment, &modality, subject)? {
            created += 1;
            println!(
                "  {} {}",
                style("+").green().bold(),
                workspace.subject_dir(&experiment, &modality, subject).display()
            );
        } else {
            println!("  {} `{subject}` already exists", style("-").yellow().bold());
        }
    }

    println!("{} {created} subject(s) created", style("done:").green().bold());
    Ok(())
}

/// Interactive commands need a terminal on stdin; anything else means the
/// session would hang waiting for input that never comes.
fn require_terminal(command: &str) -> Result<()> {
    if !atty::is(atty::Stream::Stdin) {
        bail!("`{command}` is interactive; run it from a terminal");
    }
    Ok(())
}

/// Returns the identifier from the flag when given, otherwise prompts until
/// a usable one arrives. Identifiers become `KEY=value` values and path
/// segments, so they must be single tokens without `=`.
fn resolve_identifier(
    provided: Option<String>,
    what: &str,
    prompter: &mut dyn Prompter,
) -> Result<String> {
    if let Some(value) = provided {
        let value = value.trim().to_string();
        if !is_single_token(&value) {
            bail!("{what} `{value}` must be a single token without `=`");
        }
        return Ok(value);
    }

    loop {
        let reply = prompter.line(what)?;
        let reply = reply.trim();
        if is_single_token(reply) {
            return Ok(reply.to_string());
        }
        println!(
            "  {} the {what} must be a single token without `=`",
            style("!").yellow().bold()
        );
    }
}

fn is_single_token(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(|c| c.is_whitespace() || c == '=')
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
