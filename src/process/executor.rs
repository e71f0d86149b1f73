use std::ffi::{CStr, CString};
use std::io;
use std::ptr;

use libc::{c_char, c_int};

use super::{ProcessError, GENERIC_FAILURE_STATUS, NOT_FOUND_STATUS, REDIRECT_FAILURE_STATUS};
use crate::core::command::Command;

const CREATE_MODE: libc::c_uint = 0o644;

/// Paths to try, in order. A name containing `/` is used as is.
pub fn candidate_paths(program: &str, search_paths: &[String]) -> Vec<String> {
    if program.contains('/') {
        return vec![program.to_string()];
    }
    search_paths
        .iter()
        .map(|dir| format!("{}/{}", dir, program))
        .collect()
}

/// Exit status the child reports when `execv` fails with `errno`.
pub fn exec_failure_status(errno: c_int) -> i32 {
    match errno {
        libc::E2BIG => 1,
        libc::EACCES => 2,
        libc::EINVAL => 3,
        libc::ELOOP => 4,
        libc::ENAMETOOLONG => 5,
        libc::ENOTDIR => 6,
        libc::ENOEXEC => 7,
        libc::ENOMEM => 8,
        libc::ETXTBSY => 9,
        libc::ENOENT => NOT_FOUND_STATUS,
        _ => GENERIC_FAILURE_STATUS,
    }
}

struct Target {
    path: CString,
    flags: c_int,
    fd: c_int,
}

/// Everything the child needs, converted before `fork` so the child
/// itself never allocates.
struct ExecPlan {
    redirects: Vec<Target>,
    candidates: Vec<CString>,
    args: Vec<CString>,
}

impl ExecPlan {
    fn new(command: &Command, search_paths: &[String]) -> Result<Self, ProcessError> {
        let mut redirects = Vec::with_capacity(3);
        if let Some(path) = &command.stdin_path {
            redirects.push(Target {
                path: to_cstring(path)?,
                flags: libc::O_RDONLY,
                fd: libc::STDIN_FILENO,
            });
        }
        if let Some(path) = &command.stdout_path {
            redirects.push(Target {
                path: to_cstring(path)?,
                flags: write_flags(command.stdout_append),
                fd: libc::STDOUT_FILENO,
            });
        }
        if let Some(path) = &command.stderr_path {
            redirects.push(Target {
                path: to_cstring(path)?,
                flags: write_flags(command.stderr_append),
                fd: libc::STDERR_FILENO,
            });
        }

        let candidates = candidate_paths(&command.program_name, search_paths)
            .iter()
            .map(|path| to_cstring(path))
            .collect::<Result<Vec<_>, _>>()?;
        let args = command
            .args()
            .iter()
            .map(|arg| to_cstring(arg))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            redirects,
            candidates,
            args,
        })
    }

    /// One NULL-terminated argv per candidate, with the candidate in slot 0.
    fn argvs(&self) -> Vec<Vec<*const c_char>> {
        self.candidates
            .iter()
            .map(|candidate| {
                let mut argv = Vec::with_capacity(self.args.len() + 2);
                argv.push(candidate.as_ptr());
                argv.extend(self.args.iter().map(|arg| arg.as_ptr()));
                argv.push(ptr::null());
                argv
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Fork, redirect, exec and wait. The mapped status is stored on
    /// `command` and returned.
    pub fn execute(
        &self,
        command: &mut Command,
        search_paths: &[String],
    ) -> Result<i32, ProcessError> {
        if command.is_empty() {
            return Err(ProcessError::NoCommand);
        }

        let plan = ExecPlan::new(command, search_paths)?;
        let argvs = plan.argvs();

        let pid = unsafe { libc::fork() };
        if pid < 0 {
            return Err(ProcessError::Fork(io::Error::last_os_error()));
        }
        if pid == 0 {
            unsafe { run_child(&plan, &argvs) }
        }

        let code = wait_for(pid)?;
        command.exit_code = code;
        Ok(code)
    }
}

/// Child side of the fork. Only async-signal-safe calls from here on.
unsafe fn run_child(plan: &ExecPlan, argvs: &[Vec<*const c_char>]) -> ! {
    for target in &plan.redirects {
        if !bind(&target.path, target.flags, target.fd) {
            libc::_exit(REDIRECT_FAILURE_STATUS);
        }
    }

    let mut errno = libc::ENOENT;
    for (path, argv) in plan.candidates.iter().zip(argvs) {
        libc::execv(path.as_ptr(), argv.as_ptr());
        errno = io::Error::last_os_error()
            .raw_os_error()
            .unwrap_or(libc::ENOENT);
        if errno != libc::ENOENT {
            break;
        }
    }

    libc::_exit(exec_failure_status(errno))
}

unsafe fn bind(path: &CStr, flags: c_int, fd: c_int) -> bool {
    let opened = libc::open(path.as_ptr(), flags, CREATE_MODE);
    if opened < 0 {
        return false;
    }
    if opened == fd {
        return true;
    }
    let bound = libc::dup2(opened, fd) >= 0;
    libc::close(opened);
    bound
}

fn wait_for(pid: libc::pid_t) -> Result<i32, ProcessError> {
    let mut status: c_int = 0;
    loop {
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
        if rc == pid {
            break;
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(ProcessError::Wait(err));
        }
    }

    if libc::WIFEXITED(status) {
        Ok(libc::WEXITSTATUS(status))
    } else if libc::WIFSIGNALED(status) {
        Ok(128 + libc::WTERMSIG(status))
    } else {
        Ok(GENERIC_FAILURE_STATUS)
    }
}

fn write_flags(append: bool) -> c_int {
    let mode = if append { libc::O_APPEND } else { libc::O_TRUNC };
    libc::O_WRONLY | libc::O_CREAT | mode
}

fn to_cstring(value: &str) -> Result<CString, ProcessError> {
    CString::new(value).map_err(|_| ProcessError::InvalidArgument(value.to_string()))
}
