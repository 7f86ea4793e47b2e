//! Scan History Log
//!
//! Append-only JSONL log of every completed scan, scheduled or manual.
//! One JSON object per line, flushed per write, rotated once past the
//! size cap so the live file stays bounded.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::fusion::ThreatBand;
use crate::error::AppResult;

/// Maximum file size before rotation (50 MB)
const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// What kicked off a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanTrigger {
    Scheduled,
    Manual,
}

/// One completed scan, as logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: Uuid,
    pub domain: String,
    pub similarity: u8,
    pub band: ThreatBand,
    pub timestamp: DateTime<Utc>,
    pub trigger: ScanTrigger,
}

impl ScanEvent {
    pub fn new(domain: &str, similarity: u8, band: ThreatBand, trigger: ScanTrigger) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: domain.to_string(),
            similarity,
            band,
            timestamp: Utc::now(),
            trigger,
        }
    }
}

struct LogInner {
    writer: BufWriter<File>,
    size: u64,
}

/// Append-only JSONL log with a single rotated archive.
pub struct HistoryLog {
    inner: Mutex<LogInner>,
    path: PathBuf,
}

impl HistoryLog {
    /// Open (or create) the log at `path`, picking up the existing size so
    /// rotation behaves across restarts.
    pub fn open(path: PathBuf) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            inner: Mutex::new(LogInner {
                writer: BufWriter::new(file),
                size,
            }),
            path,
        })
    }

    /// Append one event. Flushes per write for durability.
    pub fn record(&self, event: &ScanEvent) -> AppResult<()> {
        let line = serde_json::to_string(event)?;
        let bytes = line.as_bytes();

        let mut inner = self.inner.lock();

        if inner.size + bytes.len() as u64 > MAX_FILE_SIZE {
            self.rotate(&mut inner)?;
        }

        inner.writer.write_all(bytes)?;
        inner.writer.write_all(b"\n")?;
        inner.writer.flush()?;
        inner.size += bytes.len() as u64 + 1;

        Ok(())
    }

    /// Move the live file to the `.1` archive (replacing any previous
    /// archive) and start a fresh one.
    fn rotate(&self, inner: &mut LogInner) -> AppResult<()> {
        inner.writer.flush()?;

        let archive = archive_path(&self.path);
        std::fs::rename(&self.path, &archive)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        inner.writer = BufWriter::new(file);
        inner.size = 0;

        tracing::info!("Rotated scan history to {:?}", archive);
        Ok(())
    }

    /// The most recent `limit` events, newest first. Tops up from the
    /// archive when the live file alone cannot satisfy the limit.
    pub fn recent(&self, limit: usize) -> AppResult<Vec<ScanEvent>> {
        let mut events = read_events(&self.path)?;

        if events.len() < limit {
            let archive = archive_path(&self.path);
            if archive.exists() {
                let mut merged = read_events(&archive)?;
                merged.append(&mut events);
                events = merged;
            }
        }

        events.reverse();
        events.truncate(limit);
        Ok(events)
    }
}

fn archive_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".1");
    PathBuf::from(name)
}

/// Read every parseable event from a JSONL file. Unparseable lines
/// (a torn write at crash time) are skipped, not fatal.
fn read_events(path: &Path) -> AppResult<Vec<ScanEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if let Ok(event) = serde_json::from_str::<ScanEvent>(&line) {
            events.push(event);
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> HistoryLog {
        HistoryLog::open(dir.path().join("history.jsonl")).unwrap()
    }

    #[test]
    fn test_open_creates_file() {
        let dir = TempDir::new().unwrap();
        let _log = log_in(&dir);
        assert!(dir.path().join("history.jsonl").exists());
    }

    #[test]
    fn test_record_and_read_back() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        let event = ScanEvent::new("combank-secure.com", 90, ThreatBand::Critical, ScanTrigger::Manual);
        log.record(&event).unwrap();

        let events = log.recent(10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].domain, "combank-secure.com");
        assert_eq!(events[0].similarity, 90);
        assert_eq!(events[0].band, ThreatBand::Critical);
        assert_eq!(events[0].trigger, ScanTrigger::Manual);
    }

    #[test]
    fn test_jsonl_format() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        for i in 0..3 {
            let event = ScanEvent::new(
                &format!("fake{}.com", i),
                40,
                ThreatBand::Low,
                ScanTrigger::Scheduled,
            );
            log.record(&event).unwrap();
        }

        let content = std::fs::read_to_string(dir.path().join("history.jsonl")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        for line in lines {
            assert!(serde_json::from_str::<ScanEvent>(line).is_ok());
        }
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        for i in 0..5 {
            let event = ScanEvent::new(
                &format!("fake{}.com", i),
                10 * i,
                ThreatBand::Low,
                ScanTrigger::Scheduled,
            );
            log.record(&event).unwrap();
        }

        let events = log.recent(3).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].domain, "fake4.com");
        assert_eq!(events[1].domain, "fake3.com");
        assert_eq!(events[2].domain, "fake2.com");
    }

    #[test]
    fn test_recent_tops_up_from_archive() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        // Simulate a past rotation
        let older = [
            ScanEvent::new("old1.com", 20, ThreatBand::Low, ScanTrigger::Scheduled),
            ScanEvent::new("old2.com", 30, ThreatBand::Low, ScanTrigger::Scheduled),
        ];
        let archive: String = older
            .iter()
            .map(|e| serde_json::to_string(e).unwrap() + "\n")
            .collect();
        std::fs::write(dir.path().join("history.jsonl.1"), archive).unwrap();

        let event = ScanEvent::new("new.com", 90, ThreatBand::Critical, ScanTrigger::Manual);
        log.record(&event).unwrap();

        let events = log.recent(10).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].domain, "new.com");
        assert_eq!(events[1].domain, "old2.com");
        assert_eq!(events[2].domain, "old1.com");
    }

    #[test]
    fn test_recent_on_empty_log() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        assert!(log.recent(100).unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        let event = ScanEvent::new("fake.com", 50, ThreatBand::Low, ScanTrigger::Manual);
        log.record(&event).unwrap();

        // Torn write from a crashed process
        {
            use std::io::Write;
            let mut file = OpenOptions::new()
                .append(true)
                .open(dir.path().join("history.jsonl"))
                .unwrap();
            file.write_all(b"{\"id\":\"trunc").unwrap();
        }

        let events = log.recent(10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].domain, "fake.com");
    }

    #[test]
    fn test_trigger_serializes_lowercase() {
        let event = ScanEvent::new("fake.com", 10, ThreatBand::Low, ScanTrigger::Scheduled);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["trigger"], "scheduled");
        assert_eq!(json["band"], "LOW");
    }
}
