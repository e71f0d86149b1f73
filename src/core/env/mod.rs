mod paths;
mod vars;

pub use paths::parse_path;
pub use vars::{get_path, get_prompt, max_line_length, DEFAULT_PROMPT};
