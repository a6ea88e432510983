use std::fmt;

use common::errors::*;

/// Classifies a failure by where in the adapter's lifecycle it occurred.
///
/// Only `Transport` and `Teardown` are ever suppressed (see
/// `RemoteProcess::close`); the other three always propagate to the caller
/// that triggered them.
#[derive(Debug)]
pub enum RemoteProcessError {
    /// Something was wrong before any workload was submitted (bad image,
    /// missing entrypoint env var). No cleanup is needed since nothing was
    /// created.
    Preflight(Error),

    /// The workload was submitted but never reached the state we needed
    /// (init container never ran, pod never showed up). `RemoteProcess`
    /// itself attempts a best-effort delete of the workload before this
    /// propagates; the caller does not need to clean up.
    Scheduling(Error),

    /// The pod went terminal before becoming ready. This isn't really a
    /// failure of the adapter; it surfaces as a normal exit with whatever
    /// exit code the pod produced.
    Runtime(Error),

    /// A socket `accept()` or `connect()` failed. The workload is left
    /// running and orphaned; the caller is expected to call `destroy()`.
    Transport(Error),

    /// A step of `close()` failed. Never propagated; only ever logged.
    Teardown(Error),
}

impl fmt::Display for RemoteProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preflight(e) => write!(f, "preflight error: {}", e),
            Self::Scheduling(e) => write!(f, "scheduling error: {}", e),
            Self::Runtime(e) => write!(f, "runtime error: {}", e),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Teardown(e) => write!(f, "teardown error: {}", e),
        }
    }
}

impl std::error::Error for RemoteProcessError {}

impl From<RemoteProcessError> for Error {
    fn from(e: RemoteProcessError) -> Error {
        format_err!("{}", e)
    }
}
