pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{
    AssembleArgs, CliArgs, Commands, InfoArgs, ListArgs, RenderArgs, ScaffoldArgs,
};
pub use output::{ModuleSummary, OutputFormat, OutputFormatter};
