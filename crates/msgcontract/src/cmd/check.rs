use msgcontract_schema::{ContractValidator, EngineConfig};
use tracing::info;

use crate::cmd::{read_input, source_name, CheckArgs};
use crate::exit::{CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let text = read_input(&args.contract)?;
    let validator = ContractValidator::new(EngineConfig {
        max_contract_bytes: args.max_bytes,
        ..EngineConfig::default()
    });

    let report = validator.validate(&text);
    let source = source_name(&args.contract);
    info!(source = %source, failures = report.len(), "contract checked");
    print_report(&report, &source, format);

    if report.is_valid() {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}
