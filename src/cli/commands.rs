use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Interactive assembler for reproducible per-subject shell pipelines
#[derive(Parser, Debug)]
#[command(
    name = "pipewright",
    about = "Assemble and render reproducible per-subject shell pipelines",
    version,
    author,
    long_about = "pipewright builds a pipeline from a library of module scripts: an \
                  interactive session selects and configures modules into a persisted \
                  master description, which later renders into a standalone, fully \
                  parameterized executable script."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Interactively assemble a pipeline into a master description",
        long_about = "Walks through selecting and configuring modules from the library, \
                      validating prerequisites and data flow as it goes, and persists the \
                      resulting master description incrementally.\n\n\
                      Examples:\n  \
                      pipewright assemble\n  \
                      pipewright assemble --experiment pilot01 --modality func --run nightly"
    )]
    Assemble(AssembleArgs),

    #[command(
        about = "Render a master description into a standalone executable script",
        long_about = "Reconstructs each recorded module's body with its argument values \
                      hard-coded and concatenates them after a fixed preamble.\n\n\
                      Examples:\n  \
                      pipewright render /data/pilot01/scripts/nightly.master\n  \
                      pipewright render nightly.master -o run_nightly.sh"
    )]
    Render(RenderArgs),

    #[command(about = "List the modules available in the library")]
    List(ListArgs),

    #[command(about = "Show the parsed declaration header of one module")]
    Info(InfoArgs),

    #[command(
        about = "Create experiment/subject folder trees under the data root",
        long_about = "Interactive wizard that creates \
                      <dataroot>/<experiment>/<modality>/<subject> directories plus the \
                      experiment's scripts directory."
    )]
    Scaffold(ScaffoldArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AssembleArgs {
    #[arg(long, value_name = "DIR", help = "Module library directory")]
    pub library: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Data root directory")]
    pub data_root: Option<PathBuf>,

    #[arg(long, value_name = "NAME", help = "Experiment identifier (prompted if omitted)")]
    pub experiment: Option<String>,

    #[arg(long, value_name = "NAME", help = "Modality identifier (prompted if omitted)")]
    pub modality: Option<String>,

    #[arg(long, value_name = "NAME", help = "Run identifier (prompted if omitted)")]
    pub run: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    #[arg(value_name = "MASTER", help = "Path to the master description")]
    pub master: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Output script path (defaults to the master path with a .sh extension)"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Module library directory (defaults to the LIBRARY binding in the master)"
    )]
    pub library: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, value_name = "DIR", help = "Module library directory")]
    pub library: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {
    #[arg(value_name = "MODULE", help = "Module name")]
    pub module: String,

    #[arg(long, value_name = "DIR", help = "Module library directory")]
    pub library: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ScaffoldArgs {
    #[arg(long, value_name = "DIR", help = "Data root directory")]
    pub data_root: Option<PathBuf>,

    #[arg(long, value_name = "NAME", help = "Experiment identifier (prompted if omitted)")]
    pub experiment: Option<String>,

    #[arg(long, value_name = "NAME", help = "Modality identifier (prompted if omitted)")]
    pub modality: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
