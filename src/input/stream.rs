use std::io::{BufRead, Write};

use super::LineSource;
use crate::error::ShellError;

/// Line input from any buffered reader; the prompt goes to the output stream.
pub struct StreamSource<R> {
    reader: R,
}

impl<R: BufRead> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for StreamSource<R> {
    fn read_line<W: Write>(
        &mut self,
        prompt: &str,
        out: &mut W,
    ) -> Result<Option<String>, ShellError> {
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
