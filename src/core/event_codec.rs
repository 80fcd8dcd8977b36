/*
 * Line-oriented text encoding of events for the persisted events file.
 *
 * Each event is one line of seven `|`-separated fields:
 *   id|title|description|start|end|recurType|recurCount
 * Text fields escape `\` as `\\`, `|` as `\|`, and line breaks as `\n` / `\r`,
 * so any title or description survives a round trip. Timestamps use
 * `yyyy-MM-ddTHH:mm:ss`. Five-field lines (no recurrence columns) are accepted
 * as non-recurring events.
 */
use super::date_utils::{format_iso_date_time, parse_iso_date_time};
use super::models::{Event, RecurType};
use std::fmt;
use time::PrimitiveDateTime;

pub const FIELD_DELIMITER: char = '|';
pub const HEADER_LINE: &str = "eventId|title|description|start|end|recurType|recurCount";

const FIELD_COUNT: usize = 7;
const LEGACY_FIELD_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    FieldCount(usize),
    InvalidId(String),
    InvalidTimestamp { field: &'static str, value: String },
    UnformattableTimestamp { field: &'static str, reason: String },
    InvalidRecurCount(String),
    BadEscape(char),
    DanglingEscape,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::FieldCount(found) => write!(
                f,
                "expected {FIELD_COUNT} (or {LEGACY_FIELD_COUNT}) fields, found {found}"
            ),
            CodecError::InvalidId(value) => write!(f, "invalid event id '{value}'"),
            CodecError::InvalidTimestamp { field, value } => {
                write!(f, "invalid {field} timestamp '{value}'")
            }
            CodecError::UnformattableTimestamp { field, reason } => {
                write!(f, "cannot format {field} timestamp: {reason}")
            }
            CodecError::InvalidRecurCount(value) => {
                write!(f, "invalid recurrence count '{value}'")
            }
            CodecError::BadEscape(c) => write!(f, "unknown escape sequence '\\{c}'"),
            CodecError::DanglingEscape => write!(f, "line ends inside an escape sequence"),
        }
    }
}

impl std::error::Error for CodecError {}

pub fn escape_field(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            FIELD_DELIMITER => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/*
 * Splits a line on unescaped delimiters and unescapes each field in the same
 * pass.
 */
pub fn split_fields(line: &str) -> Result<Vec<String>, CodecError> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\\') => current.push('\\'),
                Some(FIELD_DELIMITER) => current.push(FIELD_DELIMITER),
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(other) => return Err(CodecError::BadEscape(other)),
                None => return Err(CodecError::DanglingEscape),
            },
            FIELD_DELIMITER => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    Ok(fields)
}

fn encode_timestamp(field: &'static str, value: PrimitiveDateTime) -> Result<String, CodecError> {
    format_iso_date_time(value).map_err(|e| CodecError::UnformattableTimestamp {
        field,
        reason: e.to_string(),
    })
}

pub fn encode_event(event: &Event) -> Result<String, CodecError> {
    Ok([
        event.id().to_string(),
        escape_field(event.title()),
        escape_field(event.description()),
        encode_timestamp("start", event.start())?,
        encode_timestamp("end", event.end())?,
        escape_field(event.recur_type().as_str()),
        event.recur_count().to_string(),
    ]
    .join("|"))
}

pub fn decode_event(line: &str) -> Result<Event, CodecError> {
    let fields = split_fields(line)?;
    if fields.len() != FIELD_COUNT && fields.len() != LEGACY_FIELD_COUNT {
        return Err(CodecError::FieldCount(fields.len()));
    }

    let id = fields[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| CodecError::InvalidId(fields[0].clone()))?;
    let start = parse_iso_date_time(&fields[3]).map_err(|_| CodecError::InvalidTimestamp {
        field: "start",
        value: fields[3].clone(),
    })?;
    let end = parse_iso_date_time(&fields[4]).map_err(|_| CodecError::InvalidTimestamp {
        field: "end",
        value: fields[4].clone(),
    })?;

    let event = Event::new(id, fields[1].as_str(), fields[2].as_str(), start, end);
    if fields.len() == LEGACY_FIELD_COUNT {
        return Ok(event);
    }

    let recur_type = RecurType::parse_lenient(&fields[5]);
    let recur_count = fields[6]
        .trim()
        .parse::<u32>()
        .map_err(|_| CodecError::InvalidRecurCount(fields[6].clone()))?;
    Ok(event.with_recurrence(recur_type, recur_count))
}
