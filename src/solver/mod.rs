pub mod process;
pub mod scope;
pub mod solution;
pub mod timing;
pub mod varisat;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use process::SolverRunner;
pub use solution::{DecodeError, Solution, Status};

/// How to launch an external solver. Relative paths (input files, the
/// timing side-channel file) are resolved against `working_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    pub solver: PathBuf,
    pub working_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub extra_args: Vec<String>,
    /// Timing wrapper, invoked as `<time_bin> -p -o <file> <solver> ...`.
    pub time_bin: Option<PathBuf>,
    pub time_output: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver: PathBuf::new(),
            working_dir: PathBuf::from("."),
            timeout: None,
            extra_args: Vec::new(),
            time_bin: None,
            time_output: None,
        }
    }
}

impl SolverConfig {
    pub fn new(solver: impl Into<PathBuf>) -> Self {
        Self {
            solver: solver.into(),
            ..Self::default()
        }
    }

    /// `0` means no deadline.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_time_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.time_bin = Some(bin.into());
        self
    }

    pub fn with_time_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.time_output = Some(path.into());
        self
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The solver exited and its output decoded.
    Success,
    /// The deadline passed and the process was killed.
    TimedOut,
    /// The solver exited but its output could not be decoded.
    ErrorParsingOutput,
    /// The process could not be started or waited on.
    Failed,
}

impl ProcessStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessStatus::Success => "success",
            ProcessStatus::TimedOut => "timeout",
            ProcessStatus::ErrorParsingOutput => "parse_error",
            ProcessStatus::Failed => "failed",
        }
    }
}

/// Milliseconds. `user`/`sys` are only known when a timing wrapper ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Times {
    pub real_ms: Option<u64>,
    pub user_ms: Option<u64>,
    pub sys_ms: Option<u64>,
}

impl Times {
    pub fn wall(elapsed: Duration) -> Self {
        Self {
            real_ms: Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult {
    pub output: String,
    pub status: ProcessStatus,
    pub times: Times,
    pub completed: bool,
    pub solution: Option<Solution>,
    pub error: Option<String>,
}

impl SolverResult {
    pub(crate) fn failed(error: String) -> Self {
        Self {
            output: String::new(),
            status: ProcessStatus::Failed,
            times: Times::default(),
            completed: false,
            solution: None,
            error: Some(error),
        }
    }

    pub(crate) fn timed_out(times: Times) -> Self {
        Self {
            output: String::new(),
            status: ProcessStatus::TimedOut,
            times,
            completed: false,
            solution: None,
            error: None,
        }
    }
}
