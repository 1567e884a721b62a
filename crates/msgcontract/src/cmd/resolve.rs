use msgcontract_schema::ContractValidator;

use crate::cmd::{read_input, ResolveArgs};
use crate::exit::{CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS};

pub fn run(args: ResolveArgs) -> CliResult<i32> {
    let text = read_input(&args.contract)?;
    let (dictionary, report) = ContractValidator::default().resolve(&text);

    if !report.is_valid() {
        for failure in report.failures() {
            eprintln!("{failure}");
        }
        return Ok(DATA_INVALID);
    }

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&dictionary)
    } else {
        serde_json::to_string(&dictionary)
    }
    .map_err(|err| CliError::new(INTERNAL, format!("failed rendering schema-set: {err}")))?;
    println!("{rendered}");

    Ok(SUCCESS)
}
