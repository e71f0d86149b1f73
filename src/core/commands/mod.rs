use std::io::{self, Write};

mod cd;

pub use cd::CdCommand;

use crate::core::command::Command;

/// Commands the control loop handles itself instead of forking.
#[derive(Debug, Clone)]
pub enum Builtin {
    Cd(CdCommand),
    Exit,
}

impl Builtin {
    pub fn lookup(program_name: &str) -> Option<Self> {
        match program_name {
            "cd" => Some(Builtin::Cd(CdCommand)),
            "exit" => Some(Builtin::Exit),
            _ => None,
        }
    }

    /// Run the builtin and return its exit code. `exit` has no work of its
    /// own; ending the session is the control loop's job.
    pub fn run<E: Write>(&self, command: &Command, err: &mut E) -> io::Result<i32> {
        match self {
            Builtin::Cd(cd) => cd.run(command, err),
            Builtin::Exit => Ok(0),
        }
    }
}
