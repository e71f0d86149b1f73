use std::io::Write;

use crate::core::command::Command;
use crate::core::config::ShellConfig;
use crate::core::env::{get_prompt, max_line_length, parse_path};
use crate::core::parser::RedirectPatterns;
use crate::error::ShellError;
use crate::path::WordExpander;

/// Everything one shell session owns. The control loop is the only owner.
#[derive(Debug, Default)]
pub struct ShellState {
    pub search_paths: Vec<String>,
    pub prompt: String,
    pub max_line_length: usize,
    pub current_line: Option<String>,
    pub current_command: Option<Command>,
    pub fatal_error: bool,
    pub patterns: Option<RedirectPatterns>,
    /// Set by a failing handler, consumed by the error state.
    pub error: Option<ShellError>,
}

impl ShellState {
    pub fn init(
        &mut self,
        config: &ShellConfig,
        expander: &WordExpander,
    ) -> Result<(), ShellError> {
        self.fatal_error = false;
        self.current_line = None;
        self.current_command = None;

        self.patterns = Some(RedirectPatterns::compile()?);
        self.search_paths = match &config.path {
            Some(path) => parse_path(path, expander)?,
            None => Vec::new(),
        };
        self.prompt = get_prompt(config.prompt.clone());
        self.max_line_length = max_line_length();
        Ok(())
    }

    /// Drop the per-iteration line, command and error. Safe to call on a clean state.
    pub fn reset(&mut self) {
        self.current_line = None;
        self.current_command = None;
        self.error = None;
    }

    pub fn destroy(&mut self) {
        self.patterns = None;
        self.search_paths = Vec::new();
        self.prompt = String::new();
        self.max_line_length = 0;
        self.reset();
    }

    pub fn is_clean(&self) -> bool {
        self.current_line.is_none() && self.current_command.is_none() && self.error.is_none()
    }

    pub fn display<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "search_paths: {:?}", self.search_paths)?;
        writeln!(out, "prompt: {:?}", self.prompt)?;
        writeln!(out, "max_line_length: {}", self.max_line_length)?;
        writeln!(out, "current_line: {:?}", self.current_line)?;
        writeln!(out, "current_command: {:?}", self.current_command)?;
        writeln!(out, "patterns compiled: {}", self.patterns.is_some())?;
        writeln!(out, "fatal_error: {}", self.fatal_error)
    }
}
