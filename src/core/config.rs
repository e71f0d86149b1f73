use std::env;

use crate::core::env::get_path;
use crate::flags::Flags;

/// Session settings captured once, before the state machine starts.
#[derive(Debug, Clone, Default)]
pub struct ShellConfig {
    /// Raw PATH value; `None` when unset.
    pub path: Option<String>,
    /// Raw PS1 value; `None` when unset.
    pub prompt: Option<String>,
    pub debug: bool,
    pub quiet: bool,
    pub color: bool,
}

impl ShellConfig {
    pub fn from_env(flags: &Flags) -> Self {
        Self {
            path: get_path(),
            prompt: env::var("PS1").ok(),
            debug: flags.is_set("debug"),
            quiet: flags.is_set("quiet"),
            color: !flags.is_set("no-color"),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}
