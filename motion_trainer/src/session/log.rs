// Append-only CSV log of finished sessions. The header is written the first
// time the file is created (or found empty) and never again, so several runs
// can share one file.

use crate::core_modules::exercise::Exercise;
use crate::error::{Result, TrainerError};
use crate::session::summary::SessionSummary;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const HEADER: [&str; 5] = ["timestamp", "exercise", "reps", "duration_seconds", "calories"];
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
/// Accepts both the written form and timestamps without a fractional part.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One row of the log as read back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionRecord {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub exercise: Exercise,
    pub reps: u32,
    pub duration_seconds: f64,
    pub calories: f64,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_PARSE_FORMAT).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, summary: &SessionSummary) -> Result<()> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| TrainerError::io(&self.path, source))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.write_record([
            summary.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            summary.exercise.as_str().to_string(),
            summary.reps.to_string(),
            format!("{:.1}", summary.duration_seconds),
            format!("{:.2}", summary.calories),
        ])?;
        writer.flush().map_err(|source| TrainerError::io(&self.path, source))?;

        debug!(path = %self.path.display(), header = needs_header, "session appended");
        Ok(())
    }

    /// Every row in file order. A log that does not exist yet is empty.
    pub fn read_all(&self) -> Result<Vec<SessionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }
}
