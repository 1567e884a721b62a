use msgcontract_schema::{EngineConfig, MessageValidator, SchemaError};
use tracing::debug;

use crate::cmd::{read_input, MessageArgs};
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_message_verdict, OutputFormat};

pub fn run(args: MessageArgs, format: OutputFormat) -> CliResult<i32> {
    let contract = read_input(&args.contract)?;
    let payload = resolve_payload(&args)?;

    let config = EngineConfig {
        strict_mode: args.strict,
        ..EngineConfig::default()
    };
    let validator = MessageValidator::from_contract(&contract, config)
        .map_err(|err| schema_error("contract rejected", err))?;
    debug!(schema = %validator.schema(), "message schema ready");

    match validator.validate(payload.as_bytes()) {
        Ok(()) => {
            print_message_verdict(None, format);
            Ok(SUCCESS)
        }
        Err(err @ (SchemaError::ValidationFailed { .. } | SchemaError::InvalidJson(_))) => {
            print_message_verdict(Some(&err.to_string()), format);
            Ok(DATA_INVALID)
        }
        Err(err) => Err(schema_error("message validation failed", err)),
    }
}

fn resolve_payload(args: &MessageArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return read_input(path);
    }
    Err(CliError::new(USAGE, "one of --json or --file is required"))
}
