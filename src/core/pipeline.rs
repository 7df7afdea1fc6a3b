//! Streaming cipher pipeline.
//!
//! Bounded-memory copy from a source through the authenticated stream codec
//! into a sink. One invocation runs exactly one job start-to-finish; the
//! loop is one-shot and forward-only.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::core::codec;
use crate::core::progress::ProgressObserver;
use crate::error::CipherError;

/// Transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Copy `source` through the codec into `sink`, returning bytes written.
///
/// Memory use is bounded by the codec chunk size regardless of payload
/// length. The observer, when attached, is handed the cumulative byte count
/// after every chunk lands in the sink; attaching one never changes the
/// bytes produced.
///
/// # Errors
///
/// `CipherError::Authentication` when decoding detects tampering or a wrong
/// key, `CipherError::Io` on any read or write fault.
pub fn run(
    mode: Mode,
    source: impl Read,
    mut sink: impl Write,
    key: &[u8],
    mut observer: Option<&mut dyn ProgressObserver>,
) -> Result<u64, CipherError> {
    debug!(?mode, "starting stream copy");

    let mut stream: Box<dyn Read + '_> = match mode {
        Mode::Encrypt => Box::new(codec::new_encoding_stream(source, key)),
        Mode::Decrypt => Box::new(codec::new_decoding_stream(source, key)),
    };

    let mut buf = vec![0u8; codec::CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_read_error(e)),
        };
        sink.write_all(&buf[..n])?;
        total += n as u64;
        if let Some(observer) = observer.as_deref_mut() {
            observer.on_bytes_written(total);
        }
    }
    sink.flush()?;

    debug!(total, "stream copy complete");
    Ok(total)
}

fn map_read_error(err: io::Error) -> CipherError {
    if codec::is_authentication_failure(&err) {
        CipherError::Authentication
    } else {
        CipherError::Io(err)
    }
}
