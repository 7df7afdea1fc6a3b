//! Tests for the streaming cipher pipeline.

use std::io::Cursor;

use cryptpipe::core::pipeline::{run, Mode};
use cryptpipe::core::progress::ProgressObserver;
use cryptpipe::error::CipherError;

const KEY: &[u8] = b"integration test key material";

/// Record every cumulative count the pipeline reports.
#[derive(Default)]
struct RecordingObserver {
    totals: Vec<u64>,
}

impl ProgressObserver for RecordingObserver {
    fn on_bytes_written(&mut self, total: u64) {
        self.totals.push(total);
    }
}

fn encrypt(plaintext: &[u8], key: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    run(Mode::Encrypt, Cursor::new(plaintext.to_vec()), &mut out, key, None).unwrap();
    out
}

fn decrypt(encrypted: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut out = Vec::new();
    run(Mode::Decrypt, Cursor::new(encrypted.to_vec()), &mut out, key, None)?;
    Ok(out)
}

#[test]
fn test_roundtrip() {
    let plaintext = b"attack at dawn";
    let decrypted = decrypt(&encrypt(plaintext, KEY), KEY).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn test_roundtrip_larger_than_chunk_size() {
    // two full 64 KiB chunks plus a partial one
    let plaintext: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();
    let decrypted = decrypt(&encrypt(&plaintext, KEY), KEY).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn test_roundtrip_empty_input() {
    let decrypted = decrypt(&encrypt(b"", KEY), KEY).unwrap();
    assert_eq!(decrypted, b"");
}

#[test]
fn test_wrong_key_fails_with_authentication_error() {
    let encrypted = encrypt(b"payload", KEY);
    let err = decrypt(&encrypted, b"some other key").unwrap_err();
    assert!(matches!(err, CipherError::Authentication));
}

#[test]
fn test_tampered_input_fails_with_authentication_error() {
    let mut encrypted = encrypt(b"payload", KEY);
    let mid = encrypted.len() / 2;
    encrypted[mid] ^= 0x01;
    let err = decrypt(&encrypted, KEY).unwrap_err();
    assert!(matches!(err, CipherError::Authentication));
}

#[test]
fn test_progress_counts_are_monotonic_and_complete() {
    let plaintext = vec![9u8; 150_000];
    let mut observer = RecordingObserver::default();

    let mut encrypted = Vec::new();
    let written = run(
        Mode::Encrypt,
        Cursor::new(plaintext),
        &mut encrypted,
        KEY,
        Some(&mut observer),
    )
    .unwrap();

    assert!(!observer.totals.is_empty());
    assert!(observer.totals.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*observer.totals.last().unwrap(), written);
    assert_eq!(written, encrypted.len() as u64);
}

#[test]
fn test_observer_does_not_change_output() {
    let encrypted = encrypt(b"observed bytes", KEY);

    let mut with_observer = Vec::new();
    let mut observer = RecordingObserver::default();
    run(
        Mode::Decrypt,
        Cursor::new(encrypted.clone()),
        &mut with_observer,
        KEY,
        Some(&mut observer),
    )
    .unwrap();

    let without_observer = decrypt(&encrypted, KEY).unwrap();
    assert_eq!(with_observer, without_observer);
}
