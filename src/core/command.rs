/// One parsed input line. Built fresh every loop iteration and dropped on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub raw_line: String,
    pub program_name: String,
    /// Expanded words; element 0 is reserved for the resolved program path.
    pub argv: Vec<String>,
    pub stdin_path: Option<String>,
    pub stdout_path: Option<String>,
    pub stderr_path: Option<String>,
    pub stdout_append: bool,
    pub stderr_append: bool,
    pub exit_code: i32,
}

impl Command {
    pub fn new(raw_line: impl Into<String>) -> Self {
        Self {
            raw_line: raw_line.into(),
            ..Self::default()
        }
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.program_name.is_empty()
    }
}
