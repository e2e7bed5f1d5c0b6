//! Typed option resolution
//!
//! Each declared argument carries a `[type]` annotation that decides how its
//! value is prompted for: `int` and `float` loop until a usable number
//! arrives, `list: a b c` presents a 1-indexed menu. The literal reply
//! `stop` cancels resolution; a listed option whose value is the literal
//! token `?` escapes to free-form text. Rejected input re-prompts, it never
//! aborts.

use anyhow::Result;
use console::style;
use tracing::debug;

use crate::module::header::FormatError;
use crate::module::schema::{ArgSpec, ModuleHeader};
use crate::prompt::Prompter;

/// Reply that cancels the current prompt loop.
pub const STOP: &str = "stop";

/// The supported option types.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionKind {
    Int,
    Float,
    List(Vec<String>),
}

/// Interprets an argument's `[type]` annotation.
///
/// Missing or unrecognized annotations are a `FormatError` naming the
/// offending module; the error is only raised here, when the argument
/// actually has to be resolved.
fn option_kind(module: &str, arg: &ArgSpec) -> Result<OptionKind, FormatError> {
    let annotation = arg
        .annotation
        .as_deref()
        .ok_or_else(|| FormatError::UntypedArgument {
            module: module.to_string(),
            arg: arg.name.clone(),
        })?;

    let annotation = annotation.trim();
    if annotation == "int" {
        return Ok(OptionKind::Int);
    }
    if annotation == "float" {
        return Ok(OptionKind::Float);
    }
    if let Some(rest) = annotation.strip_prefix("list:") {
        let options: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
        if !options.is_empty() {
            return Ok(OptionKind::List(options));
        }
    }

    Err(FormatError::UnsupportedType {
        module: module.to_string(),
        arg: arg.name.clone(),
        annotation: annotation.to_string(),
    })
}

/// Resolves one declared argument to its literal value.
///
/// Returns `Ok(None)` when the user cancels with `stop`.
pub fn resolve(
    module: &str,
    arg: &ArgSpec,
    prompter: &mut dyn Prompter,
) -> Result<Option<String>> {
    let kind = option_kind(module, arg)?;
    debug!("resolving `{}` for `{module}` as {kind:?}", arg.name);

    match kind {
        OptionKind::Int => resolve_number(arg, prompter, |text| {
            text.parse::<i64>().ok().filter(|v| *v >= 0).is_some()
        }),
        OptionKind::Float => resolve_number(arg, prompter, |text| {
            text.parse::<f64>().ok().filter(|v| *v >= 0.0).is_some()
        }),
        OptionKind::List(options) => resolve_list(arg, &options, prompter),
    }
}

/// Resolves every promptable argument of a module, in declaration order.
///
/// Returns `Ok(None)` as soon as any single resolution is cancelled; no
/// partial value list escapes.
pub fn resolve_all(
    header: &ModuleHeader,
    prompter: &mut dyn Prompter,
) -> Result<Option<Vec<String>>> {
    let mut values = Vec::new();
    for arg in header.options() {
        match resolve(&header.name, arg, prompter)? {
            Some(value) => values.push(value),
            None => return Ok(None),
        }
    }
    Ok(Some(values))
}

/// Shared int/float loop.
///
/// Empty input stands in for `-1`, which the acceptance check then rejects,
/// forcing an explicit number. The accepted reply is returned verbatim.
fn resolve_number(
    arg: &ArgSpec,
    prompter: &mut dyn Prompter,
    accepts: impl Fn(&str) -> bool,
) -> Result<Option<String>> {
    loop {
        let reply = prompter.line(&prompt_text(arg))?;
        let reply = reply.trim();
        if reply == STOP {
            return Ok(None);
        }

        let candidate = if reply.is_empty() { "-1" } else { reply };
        if accepts(candidate) {
            return Ok(Some(candidate.to_string()));
        }
        println!(
            "  {} `{}` is not a usable value for `{}`; enter a non-negative number or `stop`",
            style("!").yellow().bold(),
            reply,
            arg.name
        );
    }
}

/// 1-indexed menu loop for `list:` options.
fn resolve_list(
    arg: &ArgSpec,
    options: &[String],
    prompter: &mut dyn Prompter,
) -> Result<Option<String>> {
    loop {
        println!();
        println!("{}", style(prompt_text(arg)).bold());
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }

        let reply = prompter.line("choice")?;
        let reply = reply.trim();
        if reply == STOP {
            return Ok(None);
        }

        match reply.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => {
                let chosen = &options[n - 1];
                if chosen == "?" {
                    return resolve_custom(arg, prompter);
                }
                return Ok(Some(chosen.clone()));
            }
            _ => println!(
                "  {} pick a number between 1 and {}, or `stop`",
                style("!").yellow().bold(),
                options.len()
            ),
        }
    }
}

/// Free-form escape behind the `?` menu entry.
///
/// The custom value ends up as one token on an invocation line, so replies
/// containing whitespace or `=` are rejected and re-prompted.
fn resolve_custom(arg: &ArgSpec, prompter: &mut dyn Prompter) -> Result<Option<String>> {
    loop {
        let reply = prompter.line(&format!("custom value for `{}`", arg.name))?;
        let reply = reply.trim();
        if reply == STOP {
            return Ok(None);
        }
        if reply.is_empty() || reply.chars().any(|c| c.is_whitespace() || c == '=') {
            println!(
                "  {} the value must be a single token without `=`",
                style("!").yellow().bold()
            );
            continue;
        }
        return Ok(Some(reply.to_string()));
    }
}

fn prompt_text(arg: &ArgSpec) -> String {
    if arg.description.is_empty() {
        arg.name.clone()
    } else {
        format!("{} ({})", arg.name, arg.description)
    }
}
