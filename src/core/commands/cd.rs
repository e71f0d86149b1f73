use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::core::command::Command;
use crate::path::ExpandError;
use crate::process::describe_errno;

const SUCCESS: i32 = 0;
const FAILURE: i32 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct CdCommand;

impl CdCommand {
    /// No argument or a bare `~` means the home directory. Arguments
    /// arrive already expanded by the parser.
    pub fn target(&self, command: &Command) -> Result<PathBuf, ExpandError> {
        match command.args().first() {
            None => home_dir(),
            Some(arg) if arg == "~" => home_dir(),
            Some(arg) => Ok(PathBuf::from(arg)),
        }
    }

    pub fn run<E: Write>(&self, command: &Command, err: &mut E) -> io::Result<i32> {
        let target = match self.target(command) {
            Ok(target) => target,
            Err(e) => {
                writeln!(err, "cd: {}", e)?;
                return Ok(FAILURE);
            }
        };

        match env::set_current_dir(&target) {
            Ok(()) => Ok(SUCCESS),
            Err(e) => {
                writeln!(err, "{}: {}", target.display(), describe_failure(&e))?;
                Ok(FAILURE)
            }
        }
    }
}

fn home_dir() -> Result<PathBuf, ExpandError> {
    dirs::home_dir().ok_or(ExpandError::HomeDirNotFound)
}

fn describe_failure(e: &io::Error) -> String {
    match e.raw_os_error() {
        Some(libc::ENOENT) => "does not exist".to_string(),
        Some(libc::ENOTDIR) => "is not a directory".to_string(),
        Some(code) => describe_errno(code),
        None => e.to_string(),
    }
}
