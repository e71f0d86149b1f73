use std::env;

pub const DEFAULT_PROMPT: &str = "$ ";
const FALLBACK_LINE_LENGTH: usize = 4096;

/// PS1 used verbatim, or the default prompt when unset.
pub fn get_prompt(ps1: Option<String>) -> String {
    ps1.unwrap_or_else(|| DEFAULT_PROMPT.to_string())
}

pub fn get_path() -> Option<String> {
    env::var("PATH").ok()
}

/// Upper bound for an input line, from `sysconf(_SC_ARG_MAX)`.
pub fn max_line_length() -> usize {
    let limit = unsafe { libc::sysconf(libc::_SC_ARG_MAX) };
    if limit > 0 {
        limit as usize
    } else {
        FALLBACK_LINE_LENGTH
    }
}
