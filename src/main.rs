use atrium::flags::Flags;
use atrium::shell::Shell;
use std::env;
use std::process::ExitCode;

fn main() -> Result<ExitCode, atrium::error::ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if flags.is_set("version") {
        println!("Atrium {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let mut shell = Shell::interactive(&flags)?;
    let status = shell.run()?;
    Ok(ExitCode::from(u8::try_from(status).unwrap_or(1)))
}
