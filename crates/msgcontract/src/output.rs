use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use msgcontract_schema::{Failure, ValidationReport};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    schema_id: &'a str,
    source: &'a str,
    valid: bool,
    failures: &'a [Failure],
}

pub fn print_report(report: &ValidationReport, source: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReportOutput {
                schema_id: "https://schemas.3leaps.dev/msgcontract/cli/v1/contract-report.schema.json",
                source,
                valid: report.is_valid(),
                failures: report.failures(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            if report.is_valid() {
                println!("{source}: contract is valid");
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "KIND", "MESSAGE"]);
            for (index, failure) in report.failures().iter().enumerate() {
                table.add_row(vec![
                    (index + 1).to_string(),
                    failure.kind.as_str().to_string(),
                    failure.message.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if report.is_valid() {
                println!("{source}: contract is valid");
                return;
            }
            println!("{source}: {} failure(s)", report.len());
            for failure in report.failures() {
                println!("  - [{}] {}", failure.kind.as_str(), failure.message);
            }
        }
        OutputFormat::Raw => {
            for failure in report.failures() {
                println!("{}", failure.message);
            }
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    schema_id: &'a str,
    accepted: bool,
    error: Option<&'a str>,
}

pub fn print_message_verdict(error: Option<&str>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                schema_id: "https://schemas.3leaps.dev/msgcontract/cli/v1/message-verdict.schema.json",
                accepted: error.is_none(),
                error,
            };
            print_json(&out);
        }
        OutputFormat::Table | OutputFormat::Pretty => match error {
            None => println!("message accepted"),
            Some(err) => println!("message rejected: {err}"),
        },
        OutputFormat::Raw => println!("{}", if error.is_none() { "accepted" } else { "rejected" }),
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
