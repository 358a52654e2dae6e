use clap::{Parser, Subcommand, ValueEnum};
use hookgate_runtime::HookPhase;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum PhaseArg {
    /// Before the file operation (may block)
    Pre,
    /// After the file operation
    Post,
}

impl From<PhaseArg> for HookPhase {
    fn from(phase: PhaseArg) -> Self {
        match phase {
            PhaseArg::Pre => HookPhase::PreToolUse,
            PhaseArg::Post => HookPhase::PostToolUse,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// Exit 0 to allow, exit 2 with the reason on stderr to block
    Exit,
    /// Always exit 0, print {"status":"ok"|"blocked","message"?} on stdout
    Json,
}

#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(about = "Hookgate - parallel file-operation hook runner", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (default: ./hookgate.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level and surface hook errors on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a tool-call payload from stdin and run the configured hooks
    Run {
        #[arg(long, default_value = "pre", value_enum)]
        phase: PhaseArg,
        #[arg(long, default_value = "exit", value_enum)]
        format: OutputFormat,
    },
    /// Initialize a new config file
    Init {
        /// Path for new config file
        #[arg(default_value = "hookgate.toml")]
        path: PathBuf,
    },
    /// Show the priority batches each phase would run
    List {
        /// Only show one phase
        #[arg(long, value_enum)]
        phase: Option<PhaseArg>,
    },
}
