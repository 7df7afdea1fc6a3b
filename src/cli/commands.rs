//! Invocation orchestration.
//!
//! Wires key resolution, source/sink handles, the progress observer, and
//! the cipher pipeline together for one job. Every step is a short-circuit
//! failure point; both handles are dropped on every exit path.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};

use tracing::debug;

use crate::cli::Cli;
use crate::core::keysource::KeyResolver;
use crate::core::locator::KeyLocator;
use crate::core::pipeline::{self, Mode};
use crate::core::progress::{ProgressObserver, SpinnerProgress};
use crate::core::vault::VaultConfig;
use crate::error::{Error, Result};

/// Path token meaning stdin or stdout.
const STDIO: &str = "-";

/// Run one encrypt/decrypt job.
///
/// # Errors
///
/// Returns the first error encountered: key resolution, handle opening, or
/// the pipeline itself. A failed run may leave a truncated sink file, which
/// callers must treat as invalid.
pub fn execute(cli: Cli) -> Result<()> {
    let locator = KeyLocator::parse(&cli.key)?;
    let resolver = KeyResolver::with_defaults(VaultConfig::from_env());
    let key = resolver.resolve(&locator)?;

    let mode = if cli.decrypt { Mode::Decrypt } else { Mode::Encrypt };
    debug!(?mode, input = %cli.input, output = %cli.output, "starting job");

    let (source, source_mode) = open_source(&cli.input)?;
    let (sink, sink_is_file) = open_sink(&cli.output, source_mode)?;

    // progress only for file sinks, so piped output stays clean
    let mut spinner = sink_is_file.then(SpinnerProgress::new);
    let observer = spinner
        .as_mut()
        .map(|s| s as &mut dyn ProgressObserver);

    let outcome = pipeline::run(mode, source, sink, &key, observer);

    if let Some(spinner) = &spinner {
        spinner.finish();
    }

    let written = outcome?;
    debug!(written, "job complete");
    Ok(())
}

/// Open the input handle. Returns the handle and, for real files on Unix,
/// the permission bits to mirror onto a newly created sink file.
fn open_source(path: &str) -> Result<(Box<dyn Read>, Option<u32>)> {
    if path == STDIO {
        return Ok((Box::new(io::stdin()), None));
    }

    let metadata = std::fs::metadata(path).map_err(|e| map_open_error(e, path))?;
    let file = File::open(path).map_err(|e| map_open_error(e, path))?;

    #[cfg(unix)]
    let mode = {
        use std::os::unix::fs::PermissionsExt;
        Some(metadata.permissions().mode())
    };
    #[cfg(not(unix))]
    let mode = {
        let _ = metadata;
        None
    };

    Ok((Box::new(file), mode))
}

/// Open the output handle, creating and truncating a real file. Returns the
/// handle and whether it is a real file (progress is only shown for files).
fn open_sink(path: &str, source_mode: Option<u32>) -> Result<(Box<dyn Write>, bool)> {
    if path == STDIO {
        return Ok((Box::new(io::stdout()), false));
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    if let Some(mode) = source_mode {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = source_mode;

    let file = options.open(path).map_err(|e| map_open_error(e, path))?;
    Ok((Box::new(file), true))
}

fn map_open_error(err: io::Error, path: &str) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_string()),
        io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.to_string()),
        _ => Error::Io(err),
    }
}
