use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("msgcontract {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: msgcontract");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("MSGCONTRACT_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "data_types: {}",
        msgcontract_schema::DataType::ALL
            .iter()
            .map(|kind| kind.value())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "formats: {}",
        msgcontract_schema::Format::ALL
            .iter()
            .map(|format| format.value())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(SUCCESS)
}
