//! Integrity verification for opened archives.
//!
//! Verification streams every file entry to its end, which makes the zip
//! reader check the stored CRC-32, and compares the SHA-256 of each entry
//! against the `SHA-256-Digest` attribute recorded for it in
//! `META-INF/MANIFEST.MF`, when present. Signature blocks are not checked.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{self, Read, Seek};
use zip::ZipArchive;

/// Path of the jar manifest inside an archive.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

const DIGEST_ATTRIBUTE: &str = "SHA-256-Digest";
const NAME_ATTRIBUTE: &str = "Name";
const BUFFER_SIZE: usize = 8192;

/// Errors arising while verifying an archive.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// An entry could not be read to its end, typically a CRC mismatch.
    #[error("entry {entry} is corrupt: {source}")]
    CorruptEntry {
        /// The entry that failed to read.
        entry: String,
        /// The underlying read failure.
        #[source]
        source: io::Error,
    },

    /// The manifest digest does not match the entry contents.
    #[error("digest mismatch for entry {entry}")]
    DigestMismatch {
        /// The entry whose digest differs.
        entry: String,
    },

    /// The manifest digest is not valid base64.
    #[error("malformed digest for entry {entry}: {reason}")]
    MalformedDigest {
        /// The entry whose digest is malformed.
        entry: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// The archive index could not be read.
    #[error("unreadable archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Verify every file entry in `archive`.
///
/// # Errors
///
/// Returns the first [`VerificationError`] encountered.
pub fn verify_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<(), VerificationError> {
    let digests = read_manifest_digests(archive)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_owned();
        if is_signature_block(&name) {
            debug!("archive is signed ({name}); signature blocks are not checked");
        }

        let actual = sha256_of(&mut entry).map_err(|source| VerificationError::CorruptEntry {
            entry: name.clone(),
            source,
        })?;

        if let Some(expected) = digests.get(&name) {
            let expected = STANDARD.decode(expected).map_err(|e| {
                VerificationError::MalformedDigest {
                    entry: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            if expected != actual {
                return Err(VerificationError::DigestMismatch { entry: name });
            }
        }
    }

    Ok(())
}

fn read_manifest_digests<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<HashMap<String, String>, VerificationError> {
    let mut manifest = match archive.by_name(MANIFEST_PATH) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(HashMap::new()),
        Err(e) => return Err(e.into()),
    };

    let mut text = String::new();
    manifest
        .read_to_string(&mut text)
        .map_err(|source| VerificationError::CorruptEntry {
            entry: MANIFEST_PATH.to_owned(),
            source,
        })?;

    Ok(parse_manifest_digests(&text))
}

/// Extract `Name` to `SHA-256-Digest` pairs from manifest text.
///
/// Lines starting with a single space continue the previous line, and a
/// blank line ends a section.
#[must_use]
pub fn parse_manifest_digests(text: &str) -> HashMap<String, String> {
    let mut digests = HashMap::new();
    let mut name: Option<String> = None;
    let mut digest: Option<String> = None;

    for line in unfold_lines(text) {
        if line.is_empty() {
            if let (Some(n), Some(d)) = (name.take(), digest.take()) {
                digests.insert(n, d);
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim().to_owned();
            if key.eq_ignore_ascii_case(NAME_ATTRIBUTE) {
                name = Some(value);
            } else if key.eq_ignore_ascii_case(DIGEST_ATTRIBUTE) {
                digest = Some(value);
            }
        }
    }
    if let (Some(n), Some(d)) = (name, digest) {
        digests.insert(n, d);
    }

    digests
}

fn unfold_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let raw = raw.trim_end_matches('\r');
        match (raw.strip_prefix(' '), lines.last_mut()) {
            (Some(continuation), Some(previous)) if !previous.is_empty() => {
                previous.push_str(continuation);
            }
            _ => lines.push(raw.to_owned()),
        }
    }
    lines
}

fn is_signature_block(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper.starts_with("META-INF/")
        && [".SF", ".RSA", ".DSA", ".EC"]
            .iter()
            .any(|suffix| upper.ends_with(suffix))
}

fn sha256_of(reader: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(hasher.finalize().to_vec())
}
