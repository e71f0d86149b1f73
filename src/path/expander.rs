use super::ExpandError;
use glob::Pattern;
use std::iter::Peekable;
use std::path::PathBuf;
use std::str::Chars;

const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// One word as it is being built. `pattern` mirrors `text` with quoted
/// pattern characters escaped, so only bare ones act as wildcards.
#[derive(Debug, Default)]
struct Word {
    text: String,
    pattern: String,
    started: bool,
    globbed: bool,
    tilde: bool,
}

impl Word {
    fn push(&mut self, c: char, quoted: bool) {
        if !self.started && c == '~' && !quoted {
            self.tilde = true;
        }
        self.started = true;
        self.text.push(c);

        if !GLOB_CHARS.contains(&c) {
            self.pattern.push(c);
        } else if quoted {
            self.pattern.push_str(&Pattern::escape(&c.to_string()));
        } else {
            self.globbed = true;
            self.pattern.push(c);
        }
    }

    /// Substituted text is never tilde-expanded, only split and globbed.
    fn push_substituted(&mut self, c: char, quoted: bool) {
        let tilde = self.tilde;
        self.push(c, quoted);
        self.tilde = tilde;
    }
}

/// Shell-style word expansion: environment references, quoting,
/// home-directory shorthand and filename patterns, in that order.
#[derive(Clone, Debug)]
pub struct WordExpander;

impl Default for WordExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl WordExpander {
    pub fn new() -> Self {
        Self
    }

    /// Expand `text` into zero or more words.
    pub fn expand(&self, text: &str) -> Result<Vec<String>, ExpandError> {
        let words = self.split(text.trim())?;

        let mut expanded = Vec::with_capacity(words.len());
        for word in words {
            let word = self.expand_tilde(word)?;
            self.expand_pattern(word, &mut expanded);
        }
        Ok(expanded)
    }

    pub fn home_dir(&self) -> Result<PathBuf, ExpandError> {
        dirs::home_dir().ok_or(ExpandError::HomeDirNotFound)
    }

    /// Break `input` into words, removing quotes and substituting variable
    /// references. Unquoted substitutions are split on whitespace.
    fn split(&self, input: &str) -> Result<Vec<Word>, ExpandError> {
        let mut words = Vec::new();
        let mut word = Word::default();
        let mut chars = input.chars().peekable();
        let mut in_single = false;
        let mut in_double = false;

        while let Some(c) = chars.next() {
            match c {
                '\'' if !in_double => {
                    in_single = !in_single;
                    word.started = true;
                }
                '"' if !in_single => {
                    in_double = !in_double;
                    word.started = true;
                }
                '\\' if !in_single => push_escape(&mut word, chars.next(), in_double),
                '$' if !in_single => match self.read_reference(&mut chars)? {
                    Some(value) => substitute(&mut words, &mut word, &value, in_double),
                    None => word.push('$', true),
                },
                c if c.is_whitespace() && !in_single && !in_double => {
                    finish(&mut words, &mut word);
                }
                c => word.push(c, in_single || in_double),
            }
        }

        if in_single || in_double {
            return Err(ExpandError::UnbalancedQuotes);
        }
        finish(&mut words, &mut word);
        Ok(words)
    }

    /// Reads `NAME` or `{NAME}` after a `$`. `None` means the dollar sign was literal.
    fn read_reference(
        &self,
        chars: &mut Peekable<Chars<'_>>,
    ) -> Result<Option<String>, ExpandError> {
        if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => name.push(c),
                    None => return Err(ExpandError::BadSubstitution(format!("${{{}", name))),
                }
            }
            if name.is_empty() || !name.chars().all(is_name_char) {
                return Err(ExpandError::BadSubstitution(format!("${{{}}}", name)));
            }
            return Ok(Some(std::env::var(&name).unwrap_or_default()));
        }

        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            chars.next();
        }

        if name.is_empty() {
            Ok(None)
        } else {
            Ok(Some(std::env::var(&name).unwrap_or_default()))
        }
    }

    /// Only a bare leading `~` followed by nothing or `/` names the home directory.
    fn expand_tilde(&self, mut word: Word) -> Result<Word, ExpandError> {
        if !word.tilde || !(word.text == "~" || word.text.starts_with("~/")) {
            return Ok(word);
        }

        let home = self.home_dir()?.to_string_lossy().into_owned();
        word.text.replace_range(..1, &home);
        word.pattern.replace_range(..1, &Pattern::escape(&home));
        Ok(word)
    }

    /// No match, or text that is not a valid pattern, keeps the literal word.
    fn expand_pattern(&self, word: Word, out: &mut Vec<String>) {
        if !word.globbed {
            out.push(word.text);
            return;
        }

        let Ok(entries) = glob::glob(&word.pattern) else {
            out.push(word.text);
            return;
        };

        let before = out.len();
        for entry in entries.flatten() {
            out.push(entry.to_string_lossy().into_owned());
        }
        if out.len() == before {
            out.push(word.text);
        }
    }
}

/// A backslash quotes the next character. Inside double quotes it only
/// does so for characters that are special there.
fn push_escape(word: &mut Word, next: Option<char>, in_double: bool) {
    match next {
        Some(next) if !in_double || matches!(next, '$' | '"' | '\\' | '`') => {
            word.push(next, true)
        }
        Some(next) => {
            word.push('\\', true);
            word.push(next, true);
        }
        None => word.push('\\', true),
    }
}

fn substitute(words: &mut Vec<Word>, word: &mut Word, value: &str, quoted: bool) {
    for c in value.chars() {
        if c.is_whitespace() && !quoted {
            finish(words, word);
        } else {
            word.push_substituted(c, quoted);
        }
    }
}

fn finish(words: &mut Vec<Word>, word: &mut Word) {
    if word.started {
        words.push(std::mem::take(word));
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
