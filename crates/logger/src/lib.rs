/// Esports feed audit log
/// JSONL event stream, one file per UTC day

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event types ───────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ScrapeCompletedEvent {
    pub ts:               String,
    pub event:            &'static str,   // "SCRAPE_COMPLETED"
    pub source:           String,         // "hltv" | "vlr"
    pub cache_key:        String,
    pub live_matches:     usize,
    pub upcoming_matches: usize,
    pub elapsed_ms:       u64,
}

#[derive(Serialize, Debug)]
pub struct ScrapeFailedEvent {
    pub ts:          String,
    pub event:       &'static str,   // "SCRAPE_FAILED"
    pub source:      String,
    pub cache_key:   String,
    pub message:     String,
    pub elapsed_ms:  u64,
}

#[derive(Serialize, Debug)]
pub struct CacheClearedEvent {
    pub ts:              String,
    pub event:           &'static str,   // "CACHE_CLEARED"
    pub entries_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_json_line_per_event() {
        let dir = std::env::temp_dir().join(format!("esports-feed-logger-{}", std::process::id()));
        let logger = EventLogger::new(&dir);

        for removed in [1, 2] {
            logger
                .log(&CacheClearedEvent {
                    ts: now_iso(),
                    event: "CACHE_CLEARED",
                    entries_removed: removed,
                })
                .unwrap();
        }

        let date = Utc::now().format("%Y-%m-%d").to_string();
        let contents = fs::read_to_string(dir.join(format!("{date}.jsonl"))).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "CACHE_CLEARED");
        assert_eq!(lines[1]["entries_removed"], 2);

        fs::remove_dir_all(&dir).ok();
    }
}
