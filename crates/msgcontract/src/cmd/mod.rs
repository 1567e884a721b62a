use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod check;
pub mod message;
pub mod resolve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a contract definition and list every failure.
    Check(CheckArgs),
    /// Print the contract's schema-set with all references resolved.
    Resolve(ResolveArgs),
    /// Validate one message against a contract.
    Message(MessageArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Check(args) => check::run(args, format),
        Command::Resolve(args) => resolve::run(args),
        Command::Message(args) => message::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Contract file (`-` reads stdin).
    pub contract: PathBuf,
    /// Maximum contract size in bytes.
    #[arg(long, default_value_t = 1024 * 1024)]
    pub max_bytes: usize,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Contract file (`-` reads stdin).
    pub contract: PathBuf,
    /// Pretty-print the resolved schema-set.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Contract file.
    pub contract: PathBuf,
    /// Inline JSON message.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the message from a file.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    /// Reject properties the contract does not declare.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read a contract or message from `path`, or stdin for `-`.
pub fn read_input(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| io_error("failed reading stdin", err))?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))
}

/// Display name for an input path.
pub fn source_name(path: &Path) -> String {
    if path == Path::new("-") {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
