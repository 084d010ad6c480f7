//! Rolling deploy log files.
//!
//! One file per calendar day (`deploy-YYYY-MM-DD.log`), one timestamped line
//! per pipeline step outcome. The HTTP caller of a deploy only ever gets an
//! immediate ack, so these files are where failures become visible.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::now_iso;
use crate::Result;

/// Lines returned by the "latest" view.
pub const LATEST_LINES: usize = 50;

/// One log file with its lines, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogFile {
    /// File name, e.g. "deploy-2024-03-01.log".
    pub filename: String,
    /// Non-empty lines, newest first.
    pub content: Vec<String>,
}

/// Append-only rolling deploy log.
#[derive(Debug, Clone)]
pub struct DeployLog {
    dir: PathBuf,
}

impl DeployLog {
    /// Create a log writer rooted at `dir`, creating the directory if absent.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Today's log file path.
    fn current_file(&self) -> PathBuf {
        let day = Utc::now().format("%Y-%m-%d");
        self.dir.join(format!("deploy-{day}.log"))
    }

    /// Append one timestamped line and mirror it to the tracing output.
    pub fn append(&self, level: &str, message: &str) -> Result<()> {
        let line = format!("[{}] [{}] {}\n", now_iso(), level.to_uppercase(), message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_file())?;
        file.write_all(line.as_bytes())?;

        match level {
            "error" => tracing::error!(target: "deploy", "{}", message),
            "warn" => tracing::warn!(target: "deploy", "{}", message),
            _ => tracing::info!(target: "deploy", "{}", message),
        }
        Ok(())
    }

    /// Append an info line.
    pub fn info(&self, message: &str) {
        if let Err(e) = self.append("info", message) {
            tracing::error!("Failed to write deploy log: {}", e);
        }
    }

    /// Append an error line.
    pub fn error(&self, message: &str) {
        if let Err(e) = self.append("error", message) {
            tracing::error!("Failed to write deploy log: {}", e);
        }
    }

    /// All log files, newest file first, lines within each file newest first.
    pub fn read_all(&self) -> Result<Vec<LogFile>> {
        let mut filenames: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".log"))
            .collect();
        // Date-stamped names sort chronologically; descending = newest first
        filenames.sort_by(|a, b| b.cmp(a));

        let mut files = Vec::with_capacity(filenames.len());
        for filename in filenames {
            let content = fs::read_to_string(self.dir.join(&filename))?;
            let mut lines: Vec<String> = content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| l.to_string())
                .collect();
            lines.reverse();
            files.push(LogFile { filename, content: lines });
        }
        Ok(files)
    }

    /// The last [`LATEST_LINES`] lines of today's file, newest first.
    /// An absent file yields an empty list, not an error.
    pub fn read_latest(&self) -> Result<Vec<String>> {
        let path = self.current_file();
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let lines: Vec<String> = content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect();
        let start = lines.len().saturating_sub(LATEST_LINES);
        let mut tail = lines[start..].to_vec();
        tail.reverse();
        Ok(tail)
    }
}
