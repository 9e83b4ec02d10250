use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::transcript::Transcript;

/// A transcript document read into memory
#[derive(Debug, Clone)]
pub struct TranscriptFile {
    /// Path the document was read from
    pub path: String,
    pub transcript: Transcript,
    /// Byte length of the raw content
    pub len: usize,
    /// BLAKE3 hash of the raw content (hex-encoded)
    pub checksum: String,
}

/// Error types for transcript file operations
#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid UTF-8 in file: {0}")]
    InvalidUtf8(String),
    #[error("Invalid transcript JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// BLAKE3 checksum of `content`, hex-encoded
pub fn checksum(content: &[u8]) -> String {
    blake3::hash(content).to_hex().to_string()
}

/// Read a transcript document from disk
///
/// # Arguments
/// * `path` - Path to a JSON transcript document
///
/// # Returns
/// * `Ok(TranscriptFile)` - Parsed transcript with checksum of the raw bytes
/// * `Err(FileError)` - File not found, I/O error, invalid UTF-8 or JSON
pub fn read_transcript<P: AsRef<Path>>(path: P) -> Result<TranscriptFile, FileError> {
    let path_ref = path.as_ref();
    let display = path_ref.display().to_string();

    if !path_ref.exists() {
        return Err(FileError::NotFound(display));
    }

    let bytes = fs::read(path_ref).map_err(|source| FileError::Io {
        path: display.clone(),
        source,
    })?;
    let checksum = checksum(&bytes);

    let content = String::from_utf8(bytes).map_err(|_| FileError::InvalidUtf8(display.clone()))?;
    let transcript = serde_json::from_str(&content).map_err(|source| FileError::Parse {
        path: display.clone(),
        source,
    })?;

    Ok(TranscriptFile {
        path: display,
        transcript,
        len: content.len(),
        checksum,
    })
}

/// Write a transcript document as pretty JSON
///
/// # Returns
/// * `Ok(checksum)` - BLAKE3 checksum of the bytes written
pub fn write_transcript<P: AsRef<Path>>(path: P, transcript: &Transcript) -> Result<String, FileError> {
    let path_ref = path.as_ref();
    let display = path_ref.display().to_string();

    let mut content = serde_json::to_string_pretty(transcript).map_err(|source| FileError::Parse {
        path: display.clone(),
        source,
    })?;
    content.push('\n');

    fs::write(path_ref, content.as_bytes()).map_err(|source| FileError::Io {
        path: display,
        source,
    })?;

    Ok(checksum(content.as_bytes()))
}
