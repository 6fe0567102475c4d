//! Error mapping guide:
//! - Launch-side failures (`NotFound`, `SpawnFailed`) are environment facts the user must fix.
//! - `NonZeroExit` means the tool ran; its exit code is propagated by the CLI.
//! - 127 ("command not found") is reserved for launch failures; file and pipe errors map to 1.
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

pub type Result<T> = std::result::Result<T, SensibleError>;

#[derive(Debug)]
pub enum SensibleError {
    /// Rejected input, e.g. an empty executable name.
    InvalidArgument(String),
    /// No candidate resolved on the search path.
    NotFound {
        tool: &'static str,
        env_vars: &'static [&'static str],
        candidates: Vec<String>,
        dir_errors: Vec<(PathBuf, io::Error)>,
    },
    /// `start` was called while a child is still live.
    AlreadyRunning,
    /// `wait` was called without a live child.
    NotRunning,
    /// The OS refused to launch the process.
    SpawnFailed {
        program: PathBuf,
        hint: Option<&'static str>,
        source: io::Error,
    },
    /// The process ran and exited unsuccessfully.
    NonZeroExit {
        program: PathBuf,
        status: ExitStatus,
    },
    Io(io::Error),
}

impl SensibleError {
    /// True when the tool never ran (nothing to show the user besides fixing their setup).
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            SensibleError::NotFound { .. } | SensibleError::SpawnFailed { .. }
        )
    }

    /// Map to a process exit code, preserving the launcher convention:
    /// - 127 when the command could not be found
    /// - the child's own code for a non-zero exit
    /// - 1 for all other errors
    pub fn exit_code(&self) -> u8 {
        match self {
            SensibleError::NotFound { .. } => 127,
            SensibleError::SpawnFailed { source, .. } => exit_code_for_io_error(source),
            SensibleError::NonZeroExit { status, .. } => status
                .code()
                .and_then(|c| u8::try_from(c).ok())
                .filter(|c| *c != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

/// Map an io::Error to a process exit code: 127 for NotFound, 1 otherwise.
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

impl fmt::Display for SensibleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensibleError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            SensibleError::NotFound {
                tool,
                env_vars,
                candidates,
                dir_errors,
            } => {
                if env_vars.is_empty() {
                    write!(f, "could not find {candidates:?} in PATH")?;
                } else {
                    let vars = env_vars
                        .iter()
                        .map(|v| format!("${v}"))
                        .collect::<Vec<_>>()
                        .join(" or ");
                    write!(
                        f,
                        "could not find a suitable {tool}; please set {vars} or install one of the following: {candidates:?}"
                    )?;
                }
                if !dir_errors.is_empty() {
                    let errs = dir_errors
                        .iter()
                        .map(|(dir, e)| format!("{}: {e}", dir.display()))
                        .collect::<Vec<_>>()
                        .join("; ");
                    write!(f, " (errors while reading search path: {errs})")?;
                }
                Ok(())
            }
            SensibleError::AlreadyRunning => write!(f, "there is already an ongoing session"),
            SensibleError::NotRunning => write!(f, "no process is currently running"),
            SensibleError::SpawnFailed {
                program,
                hint,
                source,
            } => {
                write!(f, "failed to start {}: {source}", program.display())?;
                if let Some(h) = hint {
                    write!(f, ". {h}")?;
                }
                Ok(())
            }
            SensibleError::NonZeroExit { program, status } => write!(
                f,
                "{} exited with non 0 status: {status}",
                program.display()
            ),
            SensibleError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SensibleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SensibleError::SpawnFailed { source, .. } => Some(source),
            SensibleError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SensibleError {
    fn from(e: io::Error) -> Self {
        SensibleError::Io(e)
    }
}
