use regex::Regex;

use crate::core::command::Command;
use crate::error::ShellError;
use crate::path::WordExpander;

// Each pattern runs to the end of the line; `first_word` cuts the target out of the capture.
const STDERR_PATTERN: &str = r"[ \t\f\v]*2>(?P<append>>)?(?P<target>.*)";
const STDOUT_PATTERN: &str = r"[ \t\f\v]*1?>(?P<append>>)?(?P<target>.*)";
const STDIN_PATTERN: &str = r"[ \t\f\v]*<(?P<target>.*)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stderr,
    Stdout,
    Stdin,
}

impl Stream {
    /// Stderr first: the stdout pattern would otherwise swallow `2>`.
    pub const EXTRACTION_ORDER: [Stream; 3] = [Stream::Stderr, Stream::Stdout, Stream::Stdin];

    pub fn name(self) -> &'static str {
        match self {
            Stream::Stderr => "stderr",
            Stream::Stdout => "stdout",
            Stream::Stdin => "stdin",
        }
    }
}

/// The three redirection patterns, compiled once per session.
#[derive(Debug, Clone)]
pub struct RedirectPatterns {
    stderr: Regex,
    stdout: Regex,
    stdin: Regex,
}

impl RedirectPatterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            stderr: Regex::new(STDERR_PATTERN)?,
            stdout: Regex::new(STDOUT_PATTERN)?,
            stdin: Regex::new(STDIN_PATTERN)?,
        })
    }

    pub fn pattern(&self, stream: Stream) -> &Regex {
        match stream {
            Stream::Stderr => &self.stderr,
            Stream::Stdout => &self.stdout,
            Stream::Stdin => &self.stdin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub stream: Stream,
    pub target: String,
    pub append: bool,
}

/// Remove the first redirection for `stream` from `line`. The target is the
/// first word after the operator; the words behind it stay on the line for
/// the remaining scans.
pub fn take_redirection(
    line: &mut String,
    patterns: &RedirectPatterns,
    stream: Stream,
    expander: &WordExpander,
) -> Result<Option<Redirection>, ShellError> {
    let (start, append, target_text, rest) = match patterns.pattern(stream).captures(line) {
        Some(caps) => {
            let start = caps.get(0).map_or(line.len(), |m| m.start());
            let append = caps.name("append").is_some();
            let (target, rest) = caps.name("target").map_or(("", ""), |m| first_word(m.as_str()));
            (start, append, target.to_string(), rest.trim().to_string())
        }
        None => return Ok(None),
    };

    line.truncate(start);
    if !rest.is_empty() {
        line.push(' ');
        line.push_str(&rest);
    }

    let target = expander
        .expand(&target_text)?
        .into_iter()
        .next()
        .ok_or(ShellError::MissingRedirectTarget(stream.name()))?;

    Ok(Some(Redirection {
        stream,
        target,
        append,
    }))
}

/// Split off the first shell word of `text`. A word ends at unquoted
/// whitespace or at the next redirection operator.
fn first_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    let mut quote = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            _ if escaped => escaped = false,
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('\''), _) => {}
            (_, '\\') => escaped = true,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '<' | '>') => return text.split_at(i),
            (None, c) if c.is_whitespace() => return text.split_at(i),
            _ => {}
        }
    }
    (text, "")
}

/// Strip every redirection from `line` and record the targets on `command`.
/// A stream redirected twice keeps the last target.
pub fn extract_redirections(
    line: &mut String,
    patterns: &RedirectPatterns,
    expander: &WordExpander,
    command: &mut Command,
) -> Result<(), ShellError> {
    for stream in Stream::EXTRACTION_ORDER {
        while let Some(redirection) = take_redirection(line, patterns, stream, expander)? {
            match redirection.stream {
                Stream::Stderr => {
                    command.stderr_path = Some(redirection.target);
                    command.stderr_append = redirection.append;
                }
                Stream::Stdout => {
                    command.stdout_path = Some(redirection.target);
                    command.stdout_append = redirection.append;
                }
                Stream::Stdin => command.stdin_path = Some(redirection.target),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(line: &str, stream: Stream) -> (String, Option<Redirection>) {
        let patterns = RedirectPatterns::compile().unwrap();
        let mut line = line.to_string();
        let found = take_redirection(&mut line, &patterns, stream, &WordExpander::new()).unwrap();
        (line, found)
    }

    #[test]
    fn test_patterns_compile() {
        assert!(RedirectPatterns::compile().is_ok());
    }

    #[test]
    fn test_take_stdout_truncate() {
        let (line, found) = take("cmd > out.txt", Stream::Stdout);
        assert_eq!(line, "cmd");
        let found = found.unwrap();
        assert_eq!(found.target, "out.txt");
        assert!(!found.append);
    }

    #[test]
    fn test_take_stdout_append() {
        let (line, found) = take("cmd 1>>out.txt", Stream::Stdout);
        assert_eq!(line, "cmd");
        assert!(found.unwrap().append);
    }

    #[test]
    fn test_take_stderr() {
        let (line, found) = take("cmd arg 2> err.txt", Stream::Stderr);
        assert_eq!(line, "cmd arg");
        let found = found.unwrap();
        assert_eq!(found.target, "err.txt");
        assert!(!found.append);
    }

    #[test]
    fn test_no_match_leaves_line() {
        let (line, found) = take("cmd arg", Stream::Stdin);
        assert_eq!(line, "cmd arg");
        assert!(found.is_none());
    }

    #[test]
    fn test_words_after_target_stay_on_line() {
        let (line, found) = take("cmd <in.txt extra", Stream::Stdin);
        assert_eq!(line, "cmd extra");
        assert_eq!(found.unwrap().target, "in.txt");

        let (line, found) = take("cmd 2>>err.txt >out.txt", Stream::Stderr);
        assert_eq!(line, "cmd >out.txt");
        assert_eq!(found.unwrap().target, "err.txt");
    }

    #[test]
    fn test_quoted_target_keeps_spaces() {
        let (line, found) = take("cmd > 'my file.txt' arg", Stream::Stdout);
        assert_eq!(line, "cmd arg");
        assert_eq!(found.unwrap().target, "my file.txt");
    }

    #[test]
    fn test_first_word() {
        assert_eq!(first_word(" out.txt rest"), ("out.txt", " rest"));
        assert_eq!(first_word("out.txt<in.txt"), ("out.txt", "<in.txt"));
        assert_eq!(first_word(r#""a b" c"#), (r#""a b""#, " c"));
        assert_eq!(first_word(r"a\ b c"), (r"a\ b", " c"));
        assert_eq!(first_word("   "), ("", ""));
    }

    #[test]
    fn test_missing_target() {
        let patterns = RedirectPatterns::compile().unwrap();
        let mut line = "cmd >".to_string();
        let result = take_redirection(&mut line, &patterns, Stream::Stdout, &WordExpander::new());
        assert!(matches!(result, Err(ShellError::MissingRedirectTarget("stdout"))));
    }

    #[test]
    fn test_extraction_order_keeps_streams_apart() {
        let patterns = RedirectPatterns::compile().unwrap();
        let mut command = Command::new("");
        let mut line = "./a.out < in.txt > out.txt 2>>err.txt".to_string();
        extract_redirections(&mut line, &patterns, &WordExpander::new(), &mut command).unwrap();

        assert_eq!(line, "./a.out");
        assert_eq!(command.stdin_path.as_deref(), Some("in.txt"));
        assert_eq!(command.stdout_path.as_deref(), Some("out.txt"));
        assert_eq!(command.stderr_path.as_deref(), Some("err.txt"));
        assert!(!command.stdout_append);
        assert!(command.stderr_append);
    }

    #[test]
    fn test_stderr_before_stdout() {
        let patterns = RedirectPatterns::compile().unwrap();
        let mut command = Command::new("");
        let mut line = "cmd 2>>err.txt >out.txt <in.txt".to_string();
        extract_redirections(&mut line, &patterns, &WordExpander::new(), &mut command).unwrap();

        assert_eq!(line, "cmd");
        assert_eq!(command.stderr_path.as_deref(), Some("err.txt"));
        assert!(command.stderr_append);
        assert_eq!(command.stdout_path.as_deref(), Some("out.txt"));
        assert!(!command.stdout_append);
        assert_eq!(command.stdin_path.as_deref(), Some("in.txt"));
    }

    #[test]
    fn test_last_redirection_wins() {
        let patterns = RedirectPatterns::compile().unwrap();
        let mut command = Command::new("");
        let mut line = "cmd >a.txt arg >>b.txt".to_string();
        extract_redirections(&mut line, &patterns, &WordExpander::new(), &mut command).unwrap();

        assert_eq!(line, "cmd arg");
        assert_eq!(command.stdout_path.as_deref(), Some("b.txt"));
        assert!(command.stdout_append);
    }
}
