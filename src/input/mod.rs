use std::io::Write;

mod editor;
mod stream;

pub use editor::EditorSource;
pub use stream::StreamSource;

use crate::error::ShellError;

/// Where command lines come from. `Ok(None)` means the input has ended.
pub trait LineSource {
    fn read_line<W: Write>(
        &mut self,
        prompt: &str,
        out: &mut W,
    ) -> Result<Option<String>, ShellError>;
}
