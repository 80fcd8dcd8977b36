/*
 * SHA-256 helpers used by the backup archive: every archive entry carries the
 * digest of its content, and a finished backup file is fingerprinted so the
 * user can compare copies.
 */
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/*
 * Calculates the SHA256 checksum of a file and returns it as a hex-encoded
 * string. The file is read in 4KB chunks. Paths that are not regular files
 * yield `ErrorKind::InvalidInput`.
 */
pub fn calculate_sha256_checksum(file_path: &Path) -> io::Result<String> {
    log::trace!("ChecksumUtils: Calculating SHA256 checksum for: {file_path:?}");
    if !file_path.is_file() {
        let err_msg = format!("Path {file_path:?} is not a file, cannot calculate checksum.");
        log::warn!("ChecksumUtils: {err_msg}");
        return Err(io::Error::new(io::ErrorKind::InvalidInput, err_msg));
    }

    let file = File::open(file_path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0; 1024 * 4];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    let hex_checksum = format!("{:x}", hasher.finalize());
    log::debug!("ChecksumUtils: Calculated checksum {hex_checksum} for {file_path:?}");
    Ok(hex_checksum)
}
