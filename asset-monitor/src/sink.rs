//! Durable, append-only alert log.
//!
//! One JSON object per line. Each append is synced to disk before it
//! returns, so an accepted alert survives a crash right after it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::SinkError;
use crate::tracing::prelude::*;
use crate::types::Alert;

/// Destination for accepted alerts.
pub trait AlertSink: Send {
    fn append(&mut self, alert: &Alert) -> Result<(), SinkError>;
}

/// Appends alerts to a newline-delimited JSON file, creating the parent
/// directory on first use.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl AlertSink for FileSink {
    fn append(&mut self, alert: &Alert) -> Result<(), SinkError> {
        // Encode first so a failure never leaves a partial line behind.
        let mut line = encode_record(alert)?;
        line.push(b'\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        file.write_all(&line).map_err(|e| self.io_error(e))?;
        file.sync_data().map_err(|e| self.io_error(e))?;

        Ok(())
    }
}

/// Single-line JSON with a space after every `:` and `,`, the layout
/// existing alert log consumers match on.
struct RecordFormatter;

impl Formatter for RecordFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }
}

fn encode_record(alert: &Alert) -> Result<Vec<u8>, SinkError> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, RecordFormatter);
    alert.serialize(&mut serializer)?;
    Ok(buf)
}

/// The last `limit` alerts in the log, oldest first.
///
/// A missing file is an empty log. Lines that do not parse are skipped.
pub fn read_recent(path: &Path, limit: usize) -> Result<Vec<Alert>, SinkError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(SinkError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut alerts: Vec<Alert> = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(alert) => Some(alert),
            Err(e) => {
                warn!(
                    event = "alert_log_malformed_line",
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed alert log line"
                );
                None
            }
        })
        .collect();

    let skip = alerts.len().saturating_sub(limit);
    alerts.drain(..skip);
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reading;

    fn alert_at(triggered_at: f64) -> Alert {
        Alert::new(Reading::new(100.0, 130.0, 6.0), triggered_at)
    }

    #[test]
    fn should_append_one_line_per_alert() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("alerts.log"));

        sink.append(&alert_at(1.0)).unwrap();
        sink.append(&alert_at(2.0)).unwrap();

        let contents = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["reading"]["temperature_celsius"], 100.0);
        assert_eq!(first["triggered_at"], 1.0);
    }

    #[test]
    fn should_write_spaced_separators() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("alerts.log"));
        let alert = Alert {
            message: "ALERT".to_string(),
            reading: Reading::new(100.0, 130.0, 6.0),
            triggered_at: 1.5,
        };

        sink.append(&alert).unwrap();

        let contents = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            contents,
            "{\"message\": \"ALERT\", \"reading\": {\"temperature_celsius\": 100.0, \
             \"pressure_bar\": 130.0, \"vibration_mm_s\": 6.0}, \"triggered_at\": 1.5}\n"
        );
    }

    #[test]
    fn should_create_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("var").join("log").join("alerts.log");
        let mut sink = FileSink::new(&path);

        sink.append(&alert_at(1.0)).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn should_keep_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.log");
        fs::write(&path, "previous\n").unwrap();

        FileSink::new(&path).append(&alert_at(1.0)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("previous\n"));
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn should_fail_when_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path());

        let result = sink.append(&alert_at(1.0));

        assert!(matches!(result, Err(SinkError::Io { .. })));
    }

    #[test]
    fn read_recent_returns_empty_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = read_recent(&dir.path().join("nope.log"), 10).unwrap();
        assert!(alerts.is_empty());
    }

    #[test]
    fn read_recent_keeps_newest_and_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.log");
        let mut sink = FileSink::new(&path);
        for t in 1..=5 {
            sink.append(&alert_at(f64::from(t))).unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();

        let alerts = read_recent(&path, 3).unwrap();

        let times: Vec<f64> = alerts.iter().map(|a| a.triggered_at).collect();
        assert_eq!(times, vec![3.0, 4.0, 5.0]);
    }
}
