//! Running a cached executable.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::core::error::GorunError;

/// Run `executable` with `args` and wait for it, returning its exit code.
///
/// Standard input, output and error are inherited. A non-zero exit is not
/// an error here; only failing to start the program is.
pub fn run(executable: &Path, args: &[OsString]) -> Result<i32, GorunError> {
    tracing::debug!("Running {} {:?}", executable.display(), args);

    let status = Command::new(executable)
        .args(args)
        .status()
        .map_err(|source| GorunError::Spawn {
            path: executable.to_path_buf(),
            source,
        })?;

    let code = exit_code(status);
    tracing::debug!("{} exited with {}", executable.display(), code);
    Ok(code)
}

/// The exit code to propagate for a finished child.
///
/// A child killed by a signal reports `128 + signal`, as shells do.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
