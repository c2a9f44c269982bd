//! Container log filtering and field projection
//!
//! Log lines written as JSON objects with a recognised `level` are filtered
//! against a minimum level and projected onto the requested fields, in a
//! fixed field order. Any other line is passed through verbatim.

use crate::error::{BundleError, Result};
use crate::models::OrderedMap;
use crate::observability::BundleMetrics;
use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Known fields in output order; unknown fields follow in request order
pub const FIELD_ORDER: [&str; 8] = [
    "timeStamp",
    "level",
    "message",
    "messageKey",
    "messageParameters",
    "properties",
    "source",
    "version",
];

/// Fields projected when the caller asks for none
pub const DEFAULT_FIELDS: [&str; 3] = ["timeStamp", "level", "message"];

/// Display format for parsed timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LEVEL_FIELD: &str = "level";
const TIMESTAMP_FIELD: &str = "timeStamp";

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            other => Err(BundleError::InvalidInput(format!(
                "unknown log level '{}'",
                other.to_ascii_lowercase()
            ))),
        }
    }
}

/// Which records to keep and which fields to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub fields: Vec<String>,
    pub min_level: LogLevel,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            min_level: LogLevel::default(),
        }
    }
}

impl LogQuery {
    /// Build a query from optional caller input, applying the defaults
    pub fn new(fields: Option<Vec<String>>, level: Option<&str>) -> Result<Self> {
        let mut query = Self::default();
        if let Some(fields) = fields.filter(|f| !f.is_empty()) {
            query.fields = fields;
        }
        if let Some(level) = level {
            query.min_level = level.parse()?;
        }
        Ok(query)
    }

    /// Split a comma-separated field list
    pub fn parse_fields(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Sort key of a field: its known position, else after all known fields
    fn rank(&self, field: &str) -> usize {
        FIELD_ORDER
            .iter()
            .position(|known| *known == field)
            .or_else(|| {
                self.fields
                    .iter()
                    .position(|f| f == field)
                    .map(|idx| FIELD_ORDER.len() + idx)
            })
            .unwrap_or(usize::MAX)
    }
}

/// One output line of a filtered log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogRecord {
    /// Projected fields of a structured line
    Structured(OrderedMap<Value>),
    /// A line that is not a structured record, verbatim
    Raw(String),
}

/// Filters and projects one container's log text
#[derive(Debug, Clone)]
pub struct LogFilter {
    text: String,
    query: LogQuery,
}

impl LogFilter {
    /// Fails with [`BundleError::InvalidInput`] when there is no log text
    pub fn new(text: Option<String>, query: LogQuery) -> Result<Self> {
        let text = text
            .ok_or_else(|| BundleError::InvalidInput("log text must be provided".to_string()))?;
        Ok(Self { text, query })
    }

    pub fn query(&self) -> &LogQuery {
        &self.query
    }

    /// Records in input order, structured ones filtered by level
    pub fn records(&self) -> Vec<LogRecord> {
        let metrics = BundleMetrics::new();
        let mut records = Vec::new();
        let mut structured = 0u64;

        for line in self.text.split('\n') {
            if line.is_empty() {
                continue;
            }
            match parse_structured(line) {
                Some((level, fields)) => {
                    if level < self.query.min_level {
                        continue;
                    }
                    records.push(LogRecord::Structured(self.project(level, fields)));
                    structured += 1;
                }
                None => {
                    metrics.inc_log_lines_unparsed();
                    records.push(LogRecord::Raw(line.to_string()));
                }
            }
        }

        metrics.add_log_records_emitted(structured);
        debug!(
            emitted = records.len(),
            structured = structured,
            min_level = %self.query.min_level,
            "Filtered container log"
        );
        records
    }

    fn project(&self, level: LogLevel, mut fields: Map<String, Value>) -> OrderedMap<Value> {
        fields.insert(LEVEL_FIELD.to_string(), Value::from(level.as_str()));
        let formatted = fields
            .get(TIMESTAMP_FIELD)
            .and_then(Value::as_str)
            .map(format_timestamp);
        if let Some(formatted) = formatted {
            fields.insert(TIMESTAMP_FIELD.to_string(), Value::String(formatted));
        }

        let mut selected: Vec<&str> = Vec::new();
        for field in &self.query.fields {
            if fields.contains_key(field.as_str()) && !selected.contains(&field.as_str()) {
                selected.push(field);
            }
        }
        selected.sort_by_key(|f| self.query.rank(f));

        let mut projected = OrderedMap::new();
        for field in selected {
            if let Some(value) = fields.remove(field) {
                projected.insert(field, value);
            }
        }
        projected
    }
}

/// Level and fields of a structured line, `None` for anything else
fn parse_structured(line: &str) -> Option<(LogLevel, Map<String, Value>)> {
    let Value::Object(fields) = serde_json::from_str::<Value>(line).ok()? else {
        return None;
    };
    let level = fields.get(LEVEL_FIELD)?.as_str()?.parse().ok()?;
    Some((level, fields))
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS`, keeping its own offset
///
/// Unparseable input is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(TIMESTAMP_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format(TIMESTAMP_FORMAT).to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MIXED: &str = r#"{"level":"debug","timeStamp":"2024-05-01T10:00:00Z","message":"starting"}
plain text line
{"level":"warn","timeStamp":"2024-05-01T10:00:05.250Z","message":"slow","source":"svc","messageKey":"k"}
{"level":"error","timeStamp":"2024-05-01T10:00:09+02:00","message":"failed","properties":{"user":"u"}}
"#;

    fn query(fields: &[&str], level: &str) -> LogQuery {
        LogQuery::new(
            Some(fields.iter().map(|f| f.to_string()).collect()),
            Some(level),
        )
        .unwrap()
    }

    fn structured(record: &LogRecord) -> &OrderedMap<Value> {
        match record {
            LogRecord::Structured(fields) => fields,
            LogRecord::Raw(line) => panic!("expected structured record, got {line:?}"),
        }
    }

    #[test]
    fn test_level_order() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("ERROR".parse::<LogLevel>().unwrap(), LogLevel::Error);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert!(matches!(err, BundleError::InvalidInput(_)));
        assert!(LogQuery::new(None, Some("loud")).is_err());
    }

    #[test]
    fn test_query_defaults() {
        let q = LogQuery::new(None, None).unwrap();
        assert_eq!(q.fields, vec!["timeStamp", "level", "message"]);
        assert_eq!(q.min_level, LogLevel::Info);
        assert_eq!(LogQuery::new(Some(vec![]), None).unwrap(), LogQuery::default());
    }

    #[test]
    fn test_parse_fields_list() {
        assert_eq!(
            LogQuery::parse_fields("message, level,,source"),
            vec!["message", "level", "source"]
        );
    }

    #[test]
    fn test_absent_text_rejected() {
        let result = LogFilter::new(None, LogQuery::default());
        assert!(matches!(result, Err(BundleError::InvalidInput(_))));
    }

    #[test]
    fn test_warn_threshold_keeps_warn_and_error() {
        let text = MIXED
            .lines()
            .filter(|l| l.starts_with('{'))
            .collect::<Vec<_>>()
            .join("\n");
        let filter = LogFilter::new(Some(text), query(&["message", "level"], "WARN")).unwrap();
        let records = filter.records();

        assert_eq!(records.len(), 2);
        let warn = structured(&records[0]);
        assert_eq!(warn.keys().collect::<Vec<_>>(), vec!["level", "message"]);
        assert_eq!(warn.get("level"), Some(&json!("WARN")));
        let error = structured(&records[1]);
        assert_eq!(error.get("message"), Some(&json!("failed")));
        assert_eq!(error.get("level"), Some(&json!("ERROR")));
    }

    #[test]
    fn test_raw_lines_pass_through_any_level() {
        let filter = LogFilter::new(Some(MIXED.to_string()), query(&["message"], "fatal")).unwrap();
        let records = filter.records();
        assert_eq!(records, vec![LogRecord::Raw("plain text line".to_string())]);
    }

    #[test]
    fn test_unparsed_lines_kept_verbatim() {
        let text = "{\"level\":\"error\",\"message\":\"boom\"}\n   \n\tat frame\r\nplain\r\n\n";
        let filter = LogFilter::new(Some(text.to_string()), query(&["message"], "info")).unwrap();
        let records = filter.records();

        assert_eq!(records.len(), 4);
        assert_eq!(structured(&records[0]).get("message"), Some(&json!("boom")));
        assert_eq!(records[1], LogRecord::Raw("   ".to_string()));
        assert_eq!(records[2], LogRecord::Raw("\tat frame\r".to_string()));
        assert_eq!(records[3], LogRecord::Raw("plain\r".to_string()));
    }

    #[test]
    fn test_crlf_json_line_is_structured() {
        let text = "{\"level\":\"warn\",\"message\":\"slow\"}\r\n";
        let filter = LogFilter::new(Some(text.to_string()), query(&["message"], "warn")).unwrap();
        let records = filter.records();

        assert_eq!(records.len(), 1);
        assert_eq!(structured(&records[0]).get("message"), Some(&json!("slow")));
    }

    #[test]
    fn test_fields_follow_fixed_order() {
        let filter = LogFilter::new(
            Some(MIXED.to_string()),
            query(&["source", "message", "messageKey", "timeStamp"], "warn"),
        )
        .unwrap();
        let records = filter.records();
        let warn = structured(&records[1]);
        assert_eq!(
            warn.keys().collect::<Vec<_>>(),
            vec!["timeStamp", "message", "messageKey", "source"]
        );
        assert_eq!(warn.get("timeStamp"), Some(&json!("2024-05-01 10:00:05")));
    }

    #[test]
    fn test_unknown_fields_sort_last_in_request_order() {
        let line = r#"{"level":"info","zeta":1,"alpha":2,"message":"m"}"#;
        let filter =
            LogFilter::new(Some(line.to_string()), query(&["zeta", "alpha", "message"], "info"))
                .unwrap();
        let records = filter.records();
        assert_eq!(
            structured(&records[0]).keys().collect::<Vec<_>>(),
            vec!["message", "zeta", "alpha"]
        );
    }

    #[test]
    fn test_json_without_level_is_raw() {
        let text = "{\"message\":\"no level\"}\n[1,2,3]\n{\"level\":\"loud\"}";
        let filter = LogFilter::new(Some(text.to_string()), LogQuery::default()).unwrap();
        let records = filter.records();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| matches!(r, LogRecord::Raw(_))));
    }

    #[test]
    fn test_format_timestamp_variants() {
        assert_eq!(format_timestamp("2024-05-01T10:00:00.000Z"), "2024-05-01 10:00:00");
        assert_eq!(format_timestamp("2024-05-01T10:00:09+02:00"), "2024-05-01 10:00:09");
        assert_eq!(format_timestamp("2024-05-01T10:00:09.123"), "2024-05-01 10:00:09");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_record_serialization() {
        let mut fields = OrderedMap::new();
        fields.insert("level", json!("INFO"));
        let json = serde_json::to_string(&vec![
            LogRecord::Structured(fields),
            LogRecord::Raw("raw".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[{"level":"INFO"},"raw"]"#);
    }
}
