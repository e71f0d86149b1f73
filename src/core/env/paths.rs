use crate::error::ShellError;
use crate::path::WordExpander;

/// Split a PATH-like value on `:`. Each segment is expanded on its own;
/// empty segments stay in place as empty strings.
pub fn parse_path(path: &str, expander: &WordExpander) -> Result<Vec<String>, ShellError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    path.split(':')
        .map(|segment| {
            let expanded = expander.expand(segment)?;
            Ok(expanded
                .into_iter()
                .next()
                .unwrap_or_else(|| segment.to_string()))
        })
        .collect()
}
