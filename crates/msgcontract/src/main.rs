mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "msgcontract", version, about = "Message contract checker")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::try_parse_from(["msgcontract", "check", "contract.json"])
            .expect("check args should parse");

        assert!(matches!(cli.command, Command::Check(_)));
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn parses_message_subcommand_with_global_flags() {
        let cli = Cli::try_parse_from([
            "msgcontract",
            "message",
            "contract.json",
            "--json",
            "{\"x\":1}",
            "--strict",
            "--format",
            "json",
        ])
        .expect("message args should parse");

        match cli.command {
            Command::Message(args) => {
                assert!(args.strict);
                assert_eq!(args.json.as_deref(), Some("{\"x\":1}"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "msgcontract",
            "message",
            "contract.json",
            "--json",
            "{}",
            "--file",
            "payload.json",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn message_requires_a_payload() {
        let err = Cli::try_parse_from(["msgcontract", "message", "contract.json"])
            .expect_err("missing payload should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
