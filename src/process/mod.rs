use std::ffi::CStr;
use std::fmt;
use std::io;

pub mod executor;

pub use executor::{candidate_paths, exec_failure_status, ProcessExecutor};

/// Child could not set up its redirections.
pub const REDIRECT_FAILURE_STATUS: i32 = 126;
/// No candidate path could be executed because none exists.
pub const NOT_FOUND_STATUS: i32 = 127;
/// Exec failures without an entry of their own.
pub const GENERIC_FAILURE_STATUS: i32 = 10;

#[derive(Debug)]
pub enum ProcessError {
    NoCommand,
    InvalidArgument(String),
    Fork(io::Error),
    Wait(io::Error),
}

impl ProcessError {
    pub fn errno(&self) -> Option<i32> {
        match self {
            ProcessError::Fork(e) | ProcessError::Wait(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::NoCommand => write!(f, "no command"),
            ProcessError::InvalidArgument(arg) => {
                write!(f, "argument contains a NUL byte: {:?}", arg)
            }
            ProcessError::Fork(e) => write!(f, "fork failed: {}", e),
            ProcessError::Wait(e) => write!(f, "wait failed: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {}

/// Platform message for an errno value.
pub fn describe_errno(code: i32) -> String {
    let mut buf = [0 as libc::c_char; 256];
    let rc = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
    if rc != 0 {
        return io::Error::from_raw_os_error(code).to_string();
    }
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}
