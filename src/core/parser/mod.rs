mod redirect;

pub use redirect::{extract_redirections, take_redirection, RedirectPatterns, Redirection, Stream};

use crate::core::command::Command;
use crate::error::ShellError;
use crate::path::WordExpander;

/// Fill in `command` from its raw line: redirections first, then the
/// remaining words. An input that was only a redirection leaves the
/// program name empty.
pub fn parse_command(
    command: &mut Command,
    patterns: &RedirectPatterns,
    expander: &WordExpander,
) -> Result<(), ShellError> {
    let mut line = command.raw_line.trim().to_string();
    extract_redirections(&mut line, patterns, expander, command)?;

    let words = expander.expand(&line)?;
    command.program_name = words.first().cloned().unwrap_or_default();
    command.argv = words;
    Ok(())
}
