use std::env;
use std::io::{self, Stderr, Stdout, Write};

pub mod fsm;

use fsm::{Machine, Transition};

use crate::core::commands::Builtin;
use crate::core::parser::parse_command;
use crate::core::{Command, ShellConfig, ShellState};
use crate::error::ShellError;
use crate::flags::Flags;
use crate::highlight::Highlighter;
use crate::input::{EditorSource, LineSource};
use crate::path::WordExpander;
use crate::process::{ProcessExecutor, NOT_FOUND_STATUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    ReadInput,
    SplitCommand,
    ParseCommand,
    ExecuteCommand,
    Exit,
    ResetState,
    Error,
    DestroyState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Empty,
    EndOfInput,
    ExitRequested,
    Failed,
    Fatal,
}

pub const TRANSITIONS: &[Transition<State, Outcome>] = &[
    Transition::new(State::Init, Outcome::Done, Some(State::ReadInput)),
    Transition::new(State::Init, Outcome::Failed, Some(State::Error)),
    Transition::new(State::ReadInput, Outcome::Empty, Some(State::ResetState)),
    Transition::new(State::ReadInput, Outcome::Done, Some(State::SplitCommand)),
    Transition::new(State::ReadInput, Outcome::EndOfInput, Some(State::Exit)),
    Transition::new(State::ReadInput, Outcome::Failed, Some(State::Error)),
    Transition::new(State::SplitCommand, Outcome::Done, Some(State::ParseCommand)),
    Transition::new(State::SplitCommand, Outcome::Failed, Some(State::Error)),
    Transition::new(State::ParseCommand, Outcome::Done, Some(State::ExecuteCommand)),
    Transition::new(State::ParseCommand, Outcome::Failed, Some(State::Error)),
    Transition::new(State::ExecuteCommand, Outcome::ExitRequested, Some(State::Exit)),
    Transition::new(State::ExecuteCommand, Outcome::Done, Some(State::ResetState)),
    Transition::new(State::ExecuteCommand, Outcome::Failed, Some(State::Error)),
    Transition::new(State::ResetState, Outcome::Done, Some(State::ReadInput)),
    Transition::new(State::Error, Outcome::Done, Some(State::ResetState)),
    Transition::new(State::Error, Outcome::Fatal, Some(State::DestroyState)),
    Transition::new(State::Exit, Outcome::Done, Some(State::DestroyState)),
    Transition::new(State::DestroyState, Outcome::Done, None),
];

/// The control loop: reads a line, parses it, runs it, repeats.
pub struct Shell<S, O, E> {
    source: S,
    out: O,
    err: E,
    state: ShellState,
    config: ShellConfig,
    expander: WordExpander,
    executor: ProcessExecutor,
    highlighter: Highlighter,
    status: i32,
}

impl Shell<EditorSource, Stdout, Stderr> {
    /// Terminal session on the process's own streams.
    pub fn interactive(flags: &Flags) -> Result<Self, ShellError> {
        let config = ShellConfig::from_env(flags);

        let quiet = config.quiet;
        ctrlc::set_handler(move || {
            if !quiet {
                eprintln!("\nUse 'exit' to exit the shell");
            }
        })?;

        Ok(Shell::new(EditorSource::new()?, io::stdout(), io::stderr(), config))
    }
}

impl<S: LineSource, O: Write, E: Write> Shell<S, O, E> {
    pub fn new(source: S, out: O, err: E, config: ShellConfig) -> Self {
        Self {
            source,
            out,
            err,
            state: ShellState::default(),
            highlighter: Highlighter::new(config.color),
            config,
            expander: WordExpander::new(),
            executor: ProcessExecutor::new(),
            status: 0,
        }
    }

    /// Run the session to completion and return its exit status.
    pub fn run(&mut self) -> Result<i32, ShellError> {
        fsm::run(self, TRANSITIONS, State::Init)
            .map_err(|e| ShellError::InvalidTransition(e.to_string()))?;
        Ok(self.status)
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn into_output(self) -> (O, E) {
        (self.out, self.err)
    }

    fn init(&mut self) -> Result<Outcome, ShellError> {
        if let Err(e) = self.state.init(&self.config, &self.expander) {
            self.state.fatal_error = true;
            return Err(e);
        }
        Ok(Outcome::Done)
    }

    fn read_input(&mut self) -> Result<Outcome, ShellError> {
        let cwd = env::current_dir().map_err(ShellError::WorkingDir)?;
        let prompt = format!("[{}] {}", cwd.display(), self.state.prompt);

        let Some(line) = self.source.read_line(&prompt, &mut self.out)? else {
            return Ok(Outcome::EndOfInput);
        };

        let line = line.trim();
        if line.len() > self.state.max_line_length {
            return Err(ShellError::LineTooLong {
                length: line.len(),
                limit: self.state.max_line_length,
            });
        }

        self.state.current_line = Some(line.to_string());
        if line.is_empty() {
            Ok(Outcome::Empty)
        } else {
            Ok(Outcome::Done)
        }
    }

    // One line is one command for now.
    fn split_command(&mut self) -> Result<Outcome, ShellError> {
        let line = self
            .state
            .current_line
            .as_deref()
            .ok_or(ShellError::Internal("no input line to split"))?;
        self.state.current_command = Some(Command::new(line));
        Ok(Outcome::Done)
    }

    fn parse_command(&mut self) -> Result<Outcome, ShellError> {
        let patterns = self
            .state
            .patterns
            .as_ref()
            .ok_or(ShellError::Internal("redirection patterns not compiled"))?;
        let command = self
            .state
            .current_command
            .as_mut()
            .ok_or(ShellError::Internal("no command to parse"))?;

        parse_command(command, patterns, &self.expander)?;
        Ok(Outcome::Done)
    }

    fn execute_command(&mut self) -> Result<Outcome, ShellError> {
        let command = self
            .state
            .current_command
            .as_mut()
            .ok_or(ShellError::Internal("no command to execute"))?;

        let code = match Builtin::lookup(&command.program_name) {
            Some(Builtin::Exit) => return Ok(Outcome::ExitRequested),
            Some(builtin) => {
                command.exit_code = builtin.run(command, &mut self.err)?;
                command.exit_code
            }
            None => {
                self.out.flush()?;
                self.err.flush()?;
                let code = self.executor.execute(command, &self.state.search_paths)?;
                if code == NOT_FOUND_STATUS && !self.config.quiet {
                    writeln!(self.err, "{}: command not found", command.program_name)?;
                }
                code
            }
        };

        writeln!(self.out, "{}", code)?;
        Ok(Outcome::Done)
    }

    fn reset(&mut self) -> Outcome {
        self.state.reset();
        if self.config.debug {
            let _ = self.state.display(&mut self.err);
        }
        Outcome::Done
    }

    fn handle_error(&mut self) -> Outcome {
        if let Some(error) = self.state.error.take() {
            let mut message = format!("internal error ({}) {}", error.code(), error);
            if let Some(line) = &self.state.current_line {
                message.push_str(&format!(": \"{}\"", line));
            }
            if writeln!(self.err, "{}", self.highlighter.error(&message)).is_err() {
                self.state.fatal_error = true;
            }
        }

        if self.state.fatal_error {
            self.status = 1;
            Outcome::Fatal
        } else {
            Outcome::Done
        }
    }

    fn exit(&mut self) -> Outcome {
        self.state.reset();
        self.status = 0;
        Outcome::Done
    }

    fn destroy(&mut self) -> Outcome {
        if self.state.fatal_error && !self.config.quiet {
            let _ = writeln!(self.err, "{}", self.highlighter.hint("exiting after fatal error"));
        }
        self.state.destroy();
        let _ = self.out.flush();
        let _ = self.err.flush();
        Outcome::Done
    }
}

impl<S: LineSource, O: Write, E: Write> Machine for Shell<S, O, E> {
    type State = State;
    type Outcome = Outcome;

    fn handle(&mut self, state: State) -> Outcome {
        let result = match state {
            State::Init => self.init(),
            State::ReadInput => self.read_input(),
            State::SplitCommand => self.split_command(),
            State::ParseCommand => self.parse_command(),
            State::ExecuteCommand => self.execute_command(),
            State::ResetState => return self.reset(),
            State::Error => return self.handle_error(),
            State::Exit => return self.exit(),
            State::DestroyState => return self.destroy(),
        };

        result.unwrap_or_else(|e| {
            if e.is_fatal() {
                self.state.fatal_error = true;
            }
            self.state.error = Some(e);
            Outcome::Failed
        })
    }

    fn on_transition(&mut self, from: State, outcome: Outcome, to: Option<State>) {
        if self.config.debug {
            let to = to.map_or_else(|| "end".to_string(), |s| format!("{:?}", s));
            let _ = writeln!(self.err, "debug: {:?} -[{:?}]-> {}", from, outcome, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StreamSource;
    use std::fs;
    use std::io::Cursor;

    type TestShell = Shell<StreamSource<Cursor<String>>, Vec<u8>, Vec<u8>>;

    fn config() -> ShellConfig {
        ShellConfig::default()
            .with_path("/bin:/usr/bin")
            .with_prompt("$ ")
    }

    fn shell(script: &str, config: ShellConfig) -> TestShell {
        Shell::new(
            StreamSource::new(Cursor::new(script.to_string())),
            Vec::new(),
            Vec::new(),
            config,
        )
    }

    fn run_script(script: &str) -> (i32, String, String) {
        let mut shell = shell(script, config());
        let status = shell.run().unwrap();
        let (out, err) = shell.into_output();
        (
            status,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_transition_table() {
        use fsm::next_state;

        let cases = [
            (State::Init, Outcome::Done, Some(State::ReadInput)),
            (State::ReadInput, Outcome::Empty, Some(State::ResetState)),
            (State::ReadInput, Outcome::EndOfInput, Some(State::Exit)),
            (State::ExecuteCommand, Outcome::ExitRequested, Some(State::Exit)),
            (State::Exit, Outcome::Done, Some(State::DestroyState)),
            (State::Error, Outcome::Fatal, Some(State::DestroyState)),
            (State::Error, Outcome::Done, Some(State::ResetState)),
            (State::DestroyState, Outcome::Done, None),
        ];
        for (from, outcome, to) in cases {
            assert_eq!(next_state(TRANSITIONS, from, outcome), Ok(to));
        }
        assert!(next_state(TRANSITIONS, State::ResetState, Outcome::Failed).is_err());
    }

    #[test]
    fn test_exit() {
        let (status, out, err) = run_script("exit\n");
        assert_eq!(status, 0);
        assert!(out.ends_with("$ "));
        assert!(out.starts_with('['));
        assert!(err.is_empty());
    }

    #[test]
    fn test_exit_ignores_arguments() {
        let (status, out, _) = run_script("exit 5 six\n/bin/sh -c 'exit 9'\n");
        assert_eq!(status, 0);
        assert!(!out.contains("9\n"));
    }

    #[test]
    fn test_end_of_input_exits() {
        let (status, _, err) = run_script("");
        assert_eq!(status, 0);
        assert!(err.is_empty());
    }

    #[test]
    fn test_prints_exit_code() {
        let (status, out, _) = run_script("/bin/sh -c 'exit 3'\nexit\n");
        assert_eq!(status, 0);
        assert!(out.contains("3\n"));
    }

    #[test]
    fn test_command_not_found() {
        let (_, out, err) = run_script("atrium-missing-command\nexit\n");
        assert!(out.contains("127\n"));
        assert!(err.contains("atrium-missing-command: command not found"));
    }

    #[test]
    fn test_parse_error_recovers() {
        let (status, out, err) = run_script("echo 'open\n/bin/sh -c 'exit 2'\n");
        assert_eq!(status, 0);
        assert!(err.contains("internal error (5) parse error: unbalanced quotes: \"echo 'open\""));
        assert!(out.contains("2\n"));
    }

    #[test]
    fn test_bracket_command_runs() {
        let (status, out, err) = run_script("[ -d / ]\n[ -f / ]\nexit\n");
        assert_eq!(status, 0);
        assert!(out.contains("0\n"));
        assert!(out.contains("1\n"));
        assert!(!err.contains("parse error"));
    }

    #[test]
    fn test_stderr_and_stdout_redirected_together() {
        let dir = tempfile::tempdir().unwrap();
        let script = format!(
            "/bin/sh -c 'echo out' 2>>{err} >{out}\nexit\n",
            err = dir.path().join("err.txt").display(),
            out = dir.path().join("out.txt").display()
        );
        run_script(&script);
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "out\n");
        assert_eq!(fs::read_to_string(dir.path().join("err.txt")).unwrap(), "");
    }

    #[test]
    fn test_redirection_only_is_no_command() {
        let (status, _, err) = run_script("<in.txt\nexit\n");
        assert_eq!(status, 0);
        assert!(err.contains("no command"));
    }

    #[test]
    fn test_cd_failure_reported() {
        let (_, out, err) = run_script("cd /nonexistent-atrium-dir\nexit\n");
        assert!(err.contains("/nonexistent-atrium-dir: does not exist"));
        assert!(out.contains("1\n"));
    }

    #[test]
    fn test_redirects_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let script = format!(
            "/bin/sh -c 'echo hello' > {path}\n/bin/sh -c 'echo again' >> {path}\nexit\n",
            path = target.display()
        );
        let (_, out, _) = run_script(&script);
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello\nagain\n");
        assert!(!out.contains("hello"));
    }

    #[test]
    fn test_empty_line_skips_command() {
        let mut shell = shell("\n", config());
        assert_eq!(shell.handle(State::Init), Outcome::Done);
        assert_eq!(shell.handle(State::ReadInput), Outcome::Empty);
        assert!(shell.state().current_command.is_none());
        assert_eq!(shell.handle(State::ResetState), Outcome::Done);
        assert!(shell.state().is_clean());
    }

    #[test]
    fn test_line_too_long() {
        let mut shell = shell("abcdef\n", config());
        assert_eq!(shell.handle(State::Init), Outcome::Done);
        shell.state.max_line_length = 3;
        assert_eq!(shell.handle(State::ReadInput), Outcome::Failed);
        assert!(matches!(
            shell.state().error,
            Some(ShellError::LineTooLong { length: 6, limit: 3 })
        ));
        assert_eq!(shell.handle(State::Error), Outcome::Done);
        assert!(shell.state().error.is_none());
    }

    #[test]
    fn test_fatal_error_tears_down() {
        let mut shell = shell("", config());
        assert_eq!(shell.handle(State::Init), Outcome::Done);
        shell.state.fatal_error = true;
        shell.state.error = Some(ShellError::Internal("out of memory"));
        assert_eq!(shell.handle(State::Error), Outcome::Fatal);
        assert_eq!(shell.handle(State::DestroyState), Outcome::Done);
        assert!(shell.state().patterns.is_none());

        let (_, err) = shell.into_output();
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("internal error (8) out of memory"));
        assert!(err.contains("exiting after fatal error"));
    }

    #[test]
    fn test_setup_failure_is_fatal() {
        let config = ShellConfig::default().with_path("${broken");
        let mut shell = shell("exit\n", config);
        assert_eq!(shell.run().unwrap(), 1);
        let (out, err) = shell.into_output();
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().contains("bad substitution"));
    }

    #[test]
    fn test_debug_traces_transitions() {
        let mut config = config();
        config.debug = true;
        let mut shell = shell("\nexit\n", config);
        shell.run().unwrap();
        let (_, err) = shell.into_output();
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("debug: Init -[Done]-> ReadInput"));
        assert!(err.contains("debug: ReadInput -[Empty]-> ResetState"));
        assert!(err.contains("debug: ExecuteCommand -[ExitRequested]-> Exit"));
        assert!(err.contains("debug: DestroyState -[Done]-> end"));
        assert!(err.contains("search_paths:"));
    }
}
