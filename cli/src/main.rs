//! proctree CLI - Inspect and terminate spawned process trees
//!
//! A command-line tool for listing the descendants of a process,
//! terminating them with tree-shape-aware policies, and launching
//! commands to see which processes they fan out into.

mod commands;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use proctree_core::TerminationMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "proctree")]
#[command(author, version, about = "Inspect and terminate spawned process trees")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all descendants of a process
    #[command(alias = "ls")]
    Tree {
        /// Root process ID
        pid: u32,
    },

    /// Terminate a process tree
    Kill {
        /// Root process ID
        pid: u32,

        /// Which process(es) to terminate
        #[arg(short, long, value_enum, default_value_t = ModeArg::RootOrCompat)]
        mode: ModeArg,

        /// Descendant to terminate with `--mode direct-child`
        #[arg(short, long)]
        target: Option<u32>,

        /// Show the selected targets without terminating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Spawn a command and show the processes it starts
    Launch {
        /// Terminate the tree after listing it
        #[arg(short, long, value_enum)]
        kill: Option<ModeArg>,

        /// Descendant to terminate with `--kill direct-child`
        #[arg(short, long)]
        target: Option<u32>,

        /// Command and arguments to run
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value (e.g. `set fanOutThreshold 4`)
    Set { key: String, value: String },
    /// Restore default configuration
    Reset,
    /// Print the configuration file path
    Path,
}

/// Termination mode as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Terminate one named descendant (requires --target)
    DirectChild,
    /// Terminate the root, or the compatibility-layer process of a fan-out tree
    RootOrCompat,
    /// Terminate every descendant
    All,
}

impl ModeArg {
    fn into_mode(self, target: Option<u32>) -> anyhow::Result<TerminationMode> {
        match (self, target) {
            (ModeArg::DirectChild, Some(pid)) => Ok(TerminationMode::DirectChild { pid }),
            (ModeArg::DirectChild, None) => {
                anyhow::bail!("--target <PID> is required with the direct-child mode")
            }
            (ModeArg::RootOrCompat, _) => Ok(TerminationMode::RootOrCompatLayer),
            (ModeArg::All, _) => Ok(TerminationMode::AllDescendants),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tree { pid } => {
            commands::tree::run(pid, cli.json).await?;
        }
        Commands::Kill {
            pid,
            mode,
            target,
            dry_run,
        } => {
            let mode = mode.into_mode(target)?;
            commands::kill::run(pid, mode, dry_run, cli.json).await?;
        }
        Commands::Launch {
            kill,
            target,
            command,
        } => {
            let mode = kill.map(|m| m.into_mode(target)).transpose()?;
            commands::launch::run(&command, mode, cli.json).await?;
        }
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show(cli.json).await?,
            ConfigAction::Set { key, value } => {
                commands::config::set(&key, &value, cli.json).await?
            }
            ConfigAction::Reset => commands::config::reset(cli.json).await?,
            ConfigAction::Path => commands::config::path()?,
        },
    }

    Ok(())
}
