//! Authenticated stream codec.
//!
//! `Read` adapters over the XChaCha20-Poly1305 STREAM construction. Pulling
//! from an encoding stream yields ciphertext for the bytes of the wrapped
//! source; pulling from a decoding stream yields the original plaintext or
//! fails as soon as a chunk does not authenticate. Tag verification, nonce
//! counters, and the last-chunk flag all live in the STREAM primitives; this
//! module only frames chunks and speaks `Read`.
//!
//! Encoded stream layout (binary):
//! ```text
//! [4 bytes: magic "CPS1"][16 bytes: salt][19 bytes: nonce prefix]
//! [chunk]...[last chunk]
//! ```
//!
//! Each chunk is 64 KiB of plaintext plus a 16-byte Poly1305 tag; only the
//! last chunk may be shorter. The cipher key is derived from the caller's
//! key material with HKDF-SHA256 over the salt, so key material of any
//! length is accepted.

use std::fmt;
use std::io::{self, Read};

use chacha20poly1305::aead::generic_array::GenericArray;
use chacha20poly1305::aead::stream;
use chacha20poly1305::{KeyInit, XChaCha20Poly1305};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

const MAGIC: &[u8; 4] = b"CPS1";
const SALT_LEN: usize = 16;
const NONCE_PREFIX_LEN: usize = 19;
const HEADER_LEN: usize = MAGIC.len() + SALT_LEN + NONCE_PREFIX_LEN;
const KEY_LEN: usize = 32;
const TAG_LEN: usize = 16;
const STREAM_KEY_INFO: &[u8] = b"cryptpipe stream key v1";

/// Plaintext bytes per STREAM chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Marker carried inside `io::Error` when a stream fails authentication.
#[derive(Debug)]
struct AuthFailure(&'static str);

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for AuthFailure {}

fn auth_error(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, AuthFailure(msg))
}

/// Whether an I/O error carries the codec's tamper/wrong-key marker.
pub fn is_authentication_failure(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<AuthFailure>())
}

fn derive_stream_key(material: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), material);
    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hkdf.expand(STREAM_KEY_INFO, okm.as_mut())
        .expect("32 bytes is a valid hkdf output length");
    okm
}

/// Read a full chunk, tolerating short reads. A short or empty result means
/// end of stream.
fn read_chunk<R: Read>(source: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    buf.truncate(filled);
    Ok(buf)
}

/// Wrap `source` so reads yield the encoded (encrypted) stream.
pub fn new_encoding_stream<R: Read>(source: R, key: &[u8]) -> EncodingReader<R> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_PREFIX_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce);

    let stream_key = derive_stream_key(key, &salt);
    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(stream_key.as_ref()));
    let encryptor = stream::EncryptorBE32::from_aead(cipher, GenericArray::from_slice(&nonce));

    // the header goes out before the first chunk
    let mut out = Vec::with_capacity(HEADER_LEN);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);

    EncodingReader {
        source,
        encryptor: Some(encryptor),
        pending: None,
        primed: false,
        out,
        pos: 0,
    }
}

/// Wrap `source` (an encoded stream) so reads yield the original plaintext.
pub fn new_decoding_stream<R: Read>(source: R, key: &[u8]) -> DecodingReader<R> {
    DecodingReader {
        source,
        key: Zeroizing::new(key.to_vec()),
        decryptor: None,
        pending: None,
        primed: false,
        out: Vec::new(),
        pos: 0,
    }
}

/// Encrypting `Read` adapter. One-shot, forward-only.
pub struct EncodingReader<R: Read> {
    source: R,
    encryptor: Option<stream::EncryptorBE32<XChaCha20Poly1305>>,
    /// Plaintext lookahead so the final chunk can be sealed as last.
    pending: Option<Vec<u8>>,
    primed: bool,
    out: Vec<u8>,
    pos: usize,
}

impl<R: Read> EncodingReader<R> {
    fn refill(&mut self) -> io::Result<()> {
        self.out.clear();
        self.pos = 0;

        let Some(mut encryptor) = self.encryptor.take() else {
            return Ok(());
        };

        if !self.primed {
            self.pending = Some(read_chunk(&mut self.source, CHUNK_SIZE)?);
            self.primed = true;
        }

        let current = self.pending.take().unwrap_or_default();
        let lookahead = read_chunk(&mut self.source, CHUNK_SIZE)?;

        if lookahead.is_empty() {
            let sealed = encryptor
                .encrypt_last(current.as_slice())
                .map_err(|_| io::Error::other("stream encryption failed"))?;
            self.out.extend_from_slice(&sealed);
        } else {
            let sealed = encryptor
                .encrypt_next(current.as_slice())
                .map_err(|_| io::Error::other("stream encryption failed"))?;
            self.out.extend_from_slice(&sealed);
            self.encryptor = Some(encryptor);
            self.pending = Some(lookahead);
        }
        Ok(())
    }
}

impl<R: Read> Read for EncodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos == self.out.len() {
            self.refill()?;
            if self.out.is_empty() {
                return Ok(0);
            }
        }
        let n = (self.out.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Decrypting `Read` adapter. Fails with an authentication error on the
/// first chunk that does not verify; one-shot, forward-only.
pub struct DecodingReader<R: Read> {
    source: R,
    /// Caller's key material, held until the header's salt arrives.
    key: Zeroizing<Vec<u8>>,
    decryptor: Option<stream::DecryptorBE32<XChaCha20Poly1305>>,
    /// Ciphertext lookahead so the final chunk can be opened as last.
    pending: Option<Vec<u8>>,
    primed: bool,
    out: Vec<u8>,
    pos: usize,
}

impl<R: Read> DecodingReader<R> {
    fn init(&mut self) -> io::Result<()> {
        let header = read_chunk(&mut self.source, HEADER_LEN)?;
        if header.len() != HEADER_LEN || &header[..MAGIC.len()] != MAGIC {
            return Err(auth_error("input is not an authenticated cryptpipe stream"));
        }

        let salt = &header[MAGIC.len()..MAGIC.len() + SALT_LEN];
        let nonce = &header[MAGIC.len() + SALT_LEN..];
        let stream_key = derive_stream_key(&self.key, salt);
        self.key.zeroize();

        let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(stream_key.as_ref()));
        self.decryptor = Some(stream::DecryptorBE32::from_aead(
            cipher,
            GenericArray::from_slice(nonce),
        ));
        self.pending = Some(read_chunk(&mut self.source, CHUNK_SIZE + TAG_LEN)?);
        Ok(())
    }

    fn refill(&mut self) -> io::Result<()> {
        self.out.clear();
        self.pos = 0;

        if !self.primed {
            self.init()?;
            self.primed = true;
        }

        let Some(mut decryptor) = self.decryptor.take() else {
            return Ok(());
        };

        let current = self.pending.take().unwrap_or_default();
        let lookahead = read_chunk(&mut self.source, CHUNK_SIZE + TAG_LEN)?;

        if lookahead.is_empty() {
            let plain = decryptor
                .decrypt_last(current.as_slice())
                .map_err(|_| auth_error("stream authentication failed"))?;
            self.out.extend_from_slice(&plain);
        } else {
            let plain = decryptor
                .decrypt_next(current.as_slice())
                .map_err(|_| auth_error("stream authentication failed"))?;
            self.out.extend_from_slice(&plain);
            self.decryptor = Some(decryptor);
            self.pending = Some(lookahead);
        }
        Ok(())
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos == self.out.len() {
            self.refill()?;
            if self.out.is_empty() {
                return Ok(0);
            }
        }
        let n = (self.out.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
