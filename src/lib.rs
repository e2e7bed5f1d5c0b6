//! pipewright - reproducible per-subject shell pipelines from module scripts
//!
//! A module is a self-contained shell script whose comment header declares
//! its name, positional arguments, option types, declared output, and
//! prerequisite modules. pipewright turns a library of such modules into a
//! pipeline in two phases:
//!
//! - **Assembly**: an interactive session selects and configures modules in
//!   order, validating prerequisites and single-input/single-output data
//!   flow as it goes, and persists the result as a *master description*:
//!   four `KEY=value` global bindings plus one invocation line per step,
//!   written incrementally so an interrupted session leaves a valid
//!   (truncated) description.
//! - **Rendering**: a saved master description is reconstructed into one
//!   standalone executable script, each module body with its positional
//!   placeholders replaced by the recorded argument values, after a fixed
//!   preamble that exports the bindings and takes the subject identifier.
//!
//! Modules execute strictly in the order the user chose; the most recently
//! declared output is the only value ever consumable as the next module's
//! `input`. There is no dependency graph and no parallelism.
//!
//! # Project Structure
//!
//! - [`module`]: the header mini-language (parsing, typed records, library
//!   access)
//! - [`assemble`]: the interactive assembler and the master description
//! - [`render`]: master description to executable script
//! - [`prompt`]: the interactive prompt seam, with a scripted test double
//! - [`workspace`]: the experiment/subject directory layout
//! - [`config`], [`cli`]: environment configuration and the command surface

pub mod assemble;
pub mod cli;
pub mod config;
pub mod module;
pub mod prompt;
pub mod render;
pub mod workspace;

pub use assemble::{
    Assembler, Bindings, InputUnavailableError, InvocationLine, MasterDescription, MasterWriter,
    PrerequisiteError,
};
pub use config::{ConfigError, PipewrightConfig};
pub use module::{FormatError, Module, ModuleHeader, ModuleLibrary, SchemaError};
pub use prompt::{ConsolePrompter, Prompter, ScriptedPrompter};
pub use render::{RenderError, Renderer};
pub use workspace::Workspace;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
