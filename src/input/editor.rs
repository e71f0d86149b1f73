use std::io::Write;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::LineSource;
use crate::error::ShellError;

/// Interactive terminal input. The editor draws the prompt itself.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self, ShellError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line<W: Write>(
        &mut self,
        prompt: &str,
        _out: &mut W,
    ) -> Result<Option<String>, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C at the prompt discards the line.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
