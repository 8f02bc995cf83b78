//! SHA-256 checksums of installed files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::error::{ComposeError, ComposeResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the lowercase hex SHA-256 of a file.
pub fn calculate_file_checksum(path: &Path) -> ComposeResult<String> {
    let mut file = File::open(path).map_err(ComposeError::read(path))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(ComposeError::read(path))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
