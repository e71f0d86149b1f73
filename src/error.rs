use crate::path::ExpandError;
use crate::process::ProcessError;

#[derive(Debug)]
pub enum ShellError {
    Readline(rustyline::error::ReadlineError),
    Io(std::io::Error),
    WorkingDir(std::io::Error),
    Pattern(regex::Error),
    HomeDirNotFound,
    Expand(ExpandError),
    Process(ProcessError),
    MissingRedirectTarget(&'static str),
    NoCommand,
    LineTooLong { length: usize, limit: usize },
    Internal(&'static str),
    InvalidTransition(String),
    FlagError(String),
    CtrlC(String),
}

impl ShellError {
    /// Numeric code reported by the error state. OS-backed errors carry their errno.
    pub fn code(&self) -> i32 {
        match self {
            ShellError::Io(e) | ShellError::WorkingDir(e) => e.raw_os_error().unwrap_or(1),
            ShellError::Process(e) => e.errno().unwrap_or(1),
            ShellError::Readline(_) => 2,
            ShellError::Pattern(_) => 3,
            ShellError::HomeDirNotFound => 4,
            ShellError::Expand(_) => 5,
            ShellError::MissingRedirectTarget(_) => 6,
            ShellError::NoCommand => 7,
            ShellError::LineTooLong { .. } => libc::E2BIG,
            ShellError::Internal(_) => 8,
            ShellError::InvalidTransition(_) => 9,
            ShellError::FlagError(_) => 10,
            ShellError::CtrlC(_) => 11,
        }
    }

    /// Setup and stream failures end the session; everything else is
    /// reported and the loop moves on to the next line.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::Readline(_)
                | ShellError::Io(_)
                | ShellError::WorkingDir(_)
                | ShellError::Pattern(_)
                | ShellError::Internal(_)
                | ShellError::InvalidTransition(_)
                | ShellError::CtrlC(_)
        )
    }
}

impl From<rustyline::error::ReadlineError> for ShellError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        ShellError::Readline(err)
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<regex::Error> for ShellError {
    fn from(err: regex::Error) -> Self {
        ShellError::Pattern(err)
    }
}

impl From<ExpandError> for ShellError {
    fn from(err: ExpandError) -> Self {
        match err {
            ExpandError::HomeDirNotFound => ShellError::HomeDirNotFound,
            other => ShellError::Expand(other),
        }
    }
}

impl From<ProcessError> for ShellError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NoCommand => ShellError::NoCommand,
            other => ShellError::Process(other),
        }
    }
}

impl From<ctrlc::Error> for ShellError {
    fn from(err: ctrlc::Error) -> Self {
        ShellError::CtrlC(err.to_string())
    }
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::Readline(e) => write!(f, "Readline error: {}", e),
            ShellError::Io(e) => write!(f, "IO error: {}", e),
            ShellError::WorkingDir(e) => write!(f, "cannot get working directory: {}", e),
            ShellError::Pattern(e) => write!(f, "bad redirection pattern: {}", e),
            ShellError::HomeDirNotFound => write!(f, "Home directory not found"),
            ShellError::Expand(e) => write!(f, "parse error: {}", e),
            ShellError::Process(e) => write!(f, "{}", e),
            ShellError::MissingRedirectTarget(stream) => {
                write!(f, "parse error: missing {} redirection target", stream)
            }
            ShellError::NoCommand => write!(f, "no command"),
            ShellError::LineTooLong { length, limit } => {
                write!(f, "line too long ({} > {})", length, limit)
            }
            ShellError::Internal(msg) => write!(f, "{}", msg),
            ShellError::InvalidTransition(msg) => write!(f, "invalid transition: {}", msg),
            ShellError::FlagError(msg) => write!(f, "Flag error: {}", msg),
            ShellError::CtrlC(msg) => write!(f, "Ctrl-C error: {}", msg),
        }
    }
}

impl std::error::Error for ShellError {}
