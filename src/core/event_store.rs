/*
 * Persistence of the event collection. The whole collection lives in one text
 * file (`events.txt`) inside the data directory: a header row followed by one
 * encoded event per line (see `event_codec`). Every save rewrites the file.
 *
 * `EventStoreOperations` is the seam the calendar controller depends on;
 * `CoreEventStore` is the file-backed implementation. Loading is lenient:
 * lines that fail to decode are logged and skipped. A missing file is an empty
 * calendar, not an error.
 */
use super::archiver::{ArchiveEntry, ArchiveError, ArchiverOperations, CoreArchiver};
use super::checksum_utils::calculate_sha256_checksum;
use super::event_codec::{CodecError, HEADER_LINE, decode_event, encode_event};
use super::models::Event;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const EVENTS_FILE_NAME: &str = "events.txt";
const TEMP_SUFFIX: &str = "tmp";

#[derive(Debug)]
pub enum EventStoreError {
    Io(io::Error),
    Archive(ArchiveError),
    Encode(CodecError),
    NoDataDirectory(PathBuf),
    MissingEventsEntry(PathBuf),
}

impl From<io::Error> for EventStoreError {
    fn from(err: io::Error) -> Self {
        EventStoreError::Io(err)
    }
}

impl From<ArchiveError> for EventStoreError {
    fn from(err: ArchiveError) -> Self {
        EventStoreError::Archive(err)
    }
}

impl From<CodecError> for EventStoreError {
    fn from(err: CodecError) -> Self {
        EventStoreError::Encode(err)
    }
}

impl fmt::Display for EventStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStoreError::Io(e) => write!(f, "Event store I/O error: {e}"),
            EventStoreError::Archive(e) => write!(f, "{e}"),
            EventStoreError::Encode(e) => write!(f, "Could not encode event: {e}"),
            EventStoreError::NoDataDirectory(path) => {
                write!(f, "Could not create data directory {}", path.display())
            }
            EventStoreError::MissingEventsEntry(path) => write!(
                f,
                "Backup {} does not contain {EVENTS_FILE_NAME}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for EventStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EventStoreError::Io(e) => Some(e),
            EventStoreError::Archive(e) => Some(e),
            EventStoreError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EventStoreError>;

/// How restored events combine with the live collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Discard the live collection and keep only the imported events.
    Replace,
    /// Keep the live collection and add the imported events after it. Ids are
    /// not reconciled.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    pub path: PathBuf,
    pub event_count: usize,
    pub checksum: String,
}

pub trait EventStoreOperations: Send + Sync {
    /// Directory holding the events file; default backups are written here too.
    fn data_dir(&self) -> &Path;
    fn load_events(&self) -> Result<Vec<Event>>;
    fn save_events(&self, events: &[Event]) -> Result<()>;
    fn backup(&self, destination: &Path) -> Result<BackupSummary>;
    /*
     * Reads the events packaged in `source`, combines them with `current`
     * according to `mode`, persists the result and returns it.
     */
    fn restore(&self, source: &Path, current: &[Event], mode: RestoreMode) -> Result<Vec<Event>>;
}

/// Serializes a collection in the on-disk layout: header plus one line per event.
pub fn encode_events_file(events: &[Event]) -> Result<String> {
    let mut text = String::with_capacity(64 * (events.len() + 1));
    text.push_str(HEADER_LINE);
    text.push('\n');
    for event in events {
        text.push_str(&encode_event(event)?);
        text.push('\n');
    }
    Ok(text)
}

/*
 * Parses an events file. The first line is skipped when it is the header row;
 * blank lines are ignored; undecodable lines are skipped with a warning.
 */
pub fn decode_events_file(text: &str) -> Vec<Event> {
    let mut events = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || (line_index == 0 && line.trim() == HEADER_LINE) {
            continue;
        }
        match decode_event(line) {
            Ok(event) => events.push(event),
            Err(e) => log::warn!(
                "CoreEventStore: Skipping malformed record on line {}: {e}",
                line_index + 1
            ),
        }
    }
    events
}

pub struct CoreEventStore {
    data_dir: PathBuf,
    archiver: Arc<dyn ArchiverOperations>,
}

impl CoreEventStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_archiver(data_dir, Arc::new(CoreArchiver::new()))
    }

    pub fn with_archiver(data_dir: impl Into<PathBuf>, archiver: Arc<dyn ArchiverOperations>) -> Self {
        CoreEventStore {
            data_dir: data_dir.into(),
            archiver,
        }
    }

    pub fn events_file_path(&self) -> PathBuf {
        self.data_dir.join(EVENTS_FILE_NAME)
    }

    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).map_err(|e| {
                log::error!(
                    "CoreEventStore: Failed to create data dir {:?}: {e}",
                    self.data_dir
                );
                EventStoreError::NoDataDirectory(self.data_dir.clone())
            })?;
            log::debug!("CoreEventStore: Created data directory: {:?}", self.data_dir);
        }
        Ok(())
    }

    fn read_events_file_text(&self) -> Result<Option<String>> {
        let path = self.events_file_path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl EventStoreOperations for CoreEventStore {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn load_events(&self) -> Result<Vec<Event>> {
        let path = self.events_file_path();
        log::trace!("CoreEventStore: Loading events from {path:?}");
        let Some(text) = self.read_events_file_text()? else {
            log::debug!("CoreEventStore: No events file at {path:?}; starting with an empty calendar.");
            return Ok(Vec::new());
        };
        let events = decode_events_file(&text);
        log::debug!("CoreEventStore: Loaded {} events from {path:?}.", events.len());
        Ok(events)
    }

    /*
     * Writes the collection to a sibling temp file and renames it over the
     * events file, so a failed write leaves the previous file in place.
     */
    fn save_events(&self, events: &[Event]) -> Result<()> {
        self.ensure_data_dir()?;
        let path = self.events_file_path();
        let temp_path = path.with_extension(TEMP_SUFFIX);
        fs::write(&temp_path, encode_events_file(events)?)?;
        fs::rename(&temp_path, &path)?;
        log::debug!("CoreEventStore: Saved {} events to {path:?}.", events.len());
        Ok(())
    }

    fn backup(&self, destination: &Path) -> Result<BackupSummary> {
        log::trace!("CoreEventStore: Backing up to {destination:?}");
        let text = match self.read_events_file_text()? {
            Some(text) => text,
            None => encode_events_file(&[])?,
        };
        let event_count = decode_events_file(&text).len();

        self.archiver
            .create_archive(&[ArchiveEntry::new(EVENTS_FILE_NAME, text)], destination)?;
        let checksum = calculate_sha256_checksum(destination)?;
        log::debug!(
            "CoreEventStore: Backed up {event_count} events to {destination:?} (sha256 {checksum})."
        );
        Ok(BackupSummary {
            path: destination.to_path_buf(),
            event_count,
            checksum,
        })
    }

    fn restore(&self, source: &Path, current: &[Event], mode: RestoreMode) -> Result<Vec<Event>> {
        log::trace!("CoreEventStore: Restoring from {source:?} ({mode:?})");
        let entries = self.archiver.extract_archive(source)?;
        let entry = entries
            .iter()
            .find(|entry| entry.name == EVENTS_FILE_NAME)
            .ok_or_else(|| EventStoreError::MissingEventsEntry(source.to_path_buf()))?;
        let imported = decode_events_file(&entry.content);

        let restored = match mode {
            RestoreMode::Replace => imported,
            RestoreMode::Append => {
                let mut merged = current.to_vec();
                merged.extend(imported);
                merged
            }
        };
        self.save_events(&restored)?;
        log::debug!(
            "CoreEventStore: Restore from {source:?} left {} events.",
            restored.len()
        );
        Ok(restored)
    }
}
