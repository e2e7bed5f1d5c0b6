//! Interactive prompting
//!
//! The assembler and option resolver only ever need three gestures from the
//! user: a free-text line, a pick from a menu, and a yes/no answer. They are
//! behind a trait so the interactive loops can be driven by a deterministic
//! scripted implementation in tests; the terminal implementation wraps
//! dialoguer. Sentinel handling (the literal `stop`) is interpreted by the
//! callers, never by the widget.

use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input, Select};
use std::collections::VecDeque;

/// Line-oriented interactive prompt surface.
pub trait Prompter {
    /// Reads one line of free text. Empty input is allowed.
    fn line(&mut self, prompt: &str) -> Result<String>;

    /// Picks one item from a menu, returning its index.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Asks a yes/no question.
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn line(&mut self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .context("prompt failed")
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .context("selection failed")
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .context("confirmation failed")
    }
}

/// Deterministic prompter that replays a fixed list of replies.
///
/// `line` pops the next reply verbatim, `select` parses it as an index, and
/// `confirm` parses `y`/`n`. Running out of replies is an error so a test
/// that prompts more than it scripted fails loudly.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    replies: VecDeque<String>,
}

impl ScriptedPrompter {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
        }
    }

    /// Replies that were scripted but never consumed.
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    fn pop(&mut self, prompt: &str) -> Result<String> {
        self.replies
            .pop_front()
            .with_context(|| format!("scripted prompter exhausted at prompt `{prompt}`"))
    }
}

impl Prompter for ScriptedPrompter {
    fn line(&mut self, prompt: &str) -> Result<String> {
        self.pop(prompt)
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        let reply = self.pop(prompt)?;
        let index: usize = reply
            .parse()
            .with_context(|| format!("scripted reply `{reply}` is not a menu index"))?;
        if index >= items.len() {
            bail!("scripted index {index} out of range for {} item(s)", items.len());
        }
        Ok(index)
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> Result<bool> {
        match self.pop(prompt)?.as_str() {
            "y" => Ok(true),
            "n" => Ok(false),
            other => bail!("scripted reply `{other}` is not y/n"),
        }
    }
}
