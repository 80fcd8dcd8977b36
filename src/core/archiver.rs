/*
 * Portable single-file backup archive. An archive is UTF-8 text: a magic line
 * followed by one block per packaged file:
 *
 *   --- START FILE: <name> sha256=<hex> bytes=<len> ---
 *   <exactly len bytes of content>
 *   --- END FILE: <name> ---
 *
 * The byte length makes the format independent of what the content contains,
 * and the per-entry checksum lets extraction reject damaged archives before
 * any data is loaded from them.
 */
use super::checksum_utils::sha256_hex;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

pub const ARCHIVE_MAGIC_LINE: &str = "DESK-CALENDAR-ARCHIVE 1\n";
const START_PREFIX: &str = "--- START FILE: ";
const MARKER_SUFFIX: &str = " ---";

#[derive(Debug)]
pub enum ArchiveError {
    Io(io::Error),
    Utf8(std::string::FromUtf8Error),
    Corrupt(String),
    ChecksumMismatch(String),
    InvalidEntryName(String),
}

impl From<io::Error> for ArchiveError {
    fn from(err: io::Error) -> Self {
        ArchiveError::Io(err)
    }
}

impl From<std::string::FromUtf8Error> for ArchiveError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ArchiveError::Utf8(err)
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Io(e) => write!(f, "Archive I/O error: {e}"),
            ArchiveError::Utf8(e) => write!(f, "Archive is not valid UTF-8: {e}"),
            ArchiveError::Corrupt(reason) => write!(f, "Archive is corrupt: {reason}"),
            ArchiveError::ChecksumMismatch(name) => {
                write!(f, "Checksum mismatch for archive entry '{name}'")
            }
            ArchiveError::InvalidEntryName(name) => {
                write!(f, "Invalid archive entry name: '{name}'")
            }
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Io(e) => Some(e),
            ArchiveError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: String,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        ArchiveEntry {
            name: name.into(),
            content: content.into(),
        }
    }
}

pub trait ArchiverOperations: Send + Sync {
    fn create_archive(&self, entries: &[ArchiveEntry], destination: &Path) -> Result<()>;
    fn extract_archive(&self, source: &Path) -> Result<Vec<ArchiveEntry>>;
}

pub struct CoreArchiver {}

impl CoreArchiver {
    pub fn new() -> Self {
        CoreArchiver {}
    }
}

impl Default for CoreArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiverOperations for CoreArchiver {
    fn create_archive(&self, entries: &[ArchiveEntry], destination: &Path) -> Result<()> {
        let content = create_archive_content(entries)?;
        fs::write(destination, content)?;
        log::debug!(
            "CoreArchiver: Wrote {} entries to {destination:?}.",
            entries.len()
        );
        Ok(())
    }

    fn extract_archive(&self, source: &Path) -> Result<Vec<ArchiveEntry>> {
        log::trace!("CoreArchiver: Extracting archive {source:?}");
        let text = String::from_utf8(fs::read(source)?)?;
        let entries = parse_archive_content(&text)?;
        log::debug!(
            "CoreArchiver: Extracted {} entries from {source:?}.",
            entries.len()
        );
        Ok(entries)
    }
}

fn validate_entry_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('\n') || name.contains('\r') || name.ends_with(' ')
    {
        return Err(ArchiveError::InvalidEntryName(name.to_string()));
    }
    Ok(())
}

pub fn create_archive_content(entries: &[ArchiveEntry]) -> Result<String> {
    let mut archive = String::from(ARCHIVE_MAGIC_LINE);
    for entry in entries {
        validate_entry_name(&entry.name)?;
        archive.push_str(&format!(
            "{START_PREFIX}{} sha256={} bytes={}{MARKER_SUFFIX}\n",
            entry.name,
            sha256_hex(entry.content.as_bytes()),
            entry.content.len()
        ));
        archive.push_str(&entry.content);
        archive.push_str(&format!("\n--- END FILE: {}{MARKER_SUFFIX}\n", entry.name));
    }
    Ok(archive)
}

/*
 * Parses `--- START FILE: <name> sha256=<hex> bytes=<len> ---`. The name may
 * contain spaces, so the two attributes are split off from the right.
 */
fn parse_start_line(line: &str) -> Result<(String, String, usize)> {
    let corrupt = || ArchiveError::Corrupt(format!("bad entry header '{line}'"));
    let inner = line
        .strip_prefix(START_PREFIX)
        .and_then(|rest| rest.strip_suffix(MARKER_SUFFIX))
        .ok_or_else(corrupt)?;
    let mut parts = inner.rsplitn(3, ' ');
    let bytes = parts
        .next()
        .and_then(|p| p.strip_prefix("bytes="))
        .and_then(|p| p.parse::<usize>().ok())
        .ok_or_else(corrupt)?;
    let checksum = parts
        .next()
        .and_then(|p| p.strip_prefix("sha256="))
        .ok_or_else(corrupt)?;
    let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(corrupt)?;
    Ok((name.to_string(), checksum.to_string(), bytes))
}

pub fn parse_archive_content(text: &str) -> Result<Vec<ArchiveEntry>> {
    let mut rest = text
        .strip_prefix(ARCHIVE_MAGIC_LINE)
        .ok_or_else(|| ArchiveError::Corrupt("missing archive header".to_string()))?;
    let mut entries = Vec::new();

    while !rest.trim().is_empty() {
        let (header, after_header) = rest
            .split_once('\n')
            .ok_or_else(|| ArchiveError::Corrupt("truncated entry header".to_string()))?;
        let (name, checksum, len) = parse_start_line(header.trim_end_matches('\r'))?;

        if after_header.len() < len || !after_header.is_char_boundary(len) {
            return Err(ArchiveError::Corrupt(format!(
                "entry '{name}' is shorter than its declared {len} bytes"
            )));
        }
        let (content, after_content) = after_header.split_at(len);
        let end_marker = format!("\n--- END FILE: {name}{MARKER_SUFFIX}\n");
        rest = after_content.strip_prefix(end_marker.as_str()).ok_or_else(|| {
            ArchiveError::Corrupt(format!("missing end marker for entry '{name}'"))
        })?;

        if sha256_hex(content.as_bytes()) != checksum {
            log::warn!("CoreArchiver: Checksum mismatch for entry '{name}'.");
            return Err(ArchiveError::ChecksumMismatch(name));
        }
        entries.push(ArchiveEntry::new(name, content));
    }
    Ok(entries)
}
