use std::fmt;

mod expander;

pub use expander::WordExpander;

#[derive(Debug)]
pub enum ExpandError {
    HomeDirNotFound,
    UnbalancedQuotes,
    BadSubstitution(String),
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandError::HomeDirNotFound => write!(f, "Home directory not found"),
            ExpandError::UnbalancedQuotes => write!(f, "unbalanced quotes"),
            ExpandError::BadSubstitution(text) => write!(f, "bad substitution: {}", text),
        }
    }
}

impl std::error::Error for ExpandError {}
