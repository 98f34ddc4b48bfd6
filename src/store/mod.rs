//! On-disk layout under the data directory:
//!
//! - `latest.json`: payload of the most recent run, rewritten every run
//! - `snapshots/<trade_date>.json`: one payload per published trade date
//! - `last_published_date.txt`: trade date of the newest snapshot
//!
//! A single writer is assumed; runs must not overlap.

use crate::core::Payload;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const LATEST_FILE: &str = "latest.json";
const SNAPSHOT_DIR: &str = "snapshots";
const MARKER_FILE: &str = "last_published_date.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    New {
        trade_date: NaiveDate,
        snapshot: PathBuf,
    },
    Unchanged {
        trade_date: NaiveDate,
    },
}

impl Display for PersistOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistOutcome::New {
                trade_date,
                snapshot,
            } => write!(f, "NEW {} -> {}", trade_date, snapshot.display()),
            PersistOutcome::Unchanged { trade_date } => write!(f, "UNCHANGED {trade_date}"),
        }
    }
}

pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        SnapshotStore {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn latest_path(&self) -> PathBuf {
        self.data_dir.join(LATEST_FILE)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_DIR)
    }

    pub fn snapshot_path(&self, trade_date: NaiveDate) -> PathBuf {
        self.snapshot_dir().join(format!("{trade_date}.json"))
    }

    pub fn marker_path(&self) -> PathBuf {
        self.data_dir.join(MARKER_FILE)
    }

    /// Creates the data and snapshot directories if missing.
    pub fn ensure_layout(&self) -> Result<()> {
        let dir = self.snapshot_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))
    }

    /// Most recently published trade date, or an empty string before the
    /// first publication.
    pub fn last_published(&self) -> Result<String> {
        let path = self.marker_path();
        if !path.exists() {
            return Ok(String::new());
        }
        let marker = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read marker file: {}", path.display()))?;
        Ok(marker.trim().to_string())
    }

    /// Rewrites `latest.json`, then snapshots the payload and advances the
    /// marker if its trade date differs from the last published one.
    pub fn persist(&self, payload: &Payload) -> Result<PersistOutcome> {
        self.ensure_layout()?;

        let trade_date = payload.trade_date;
        let last = self.last_published()?;
        let changed = trade_date.to_string() != last;

        let json = payload
            .to_json()
            .context("Failed to serialize payload")?;
        write_file(&self.latest_path(), &json)?;

        if !changed {
            debug!(%trade_date, "Trade date already published");
            return Ok(PersistOutcome::Unchanged { trade_date });
        }

        let snapshot = self.snapshot_path(trade_date);
        write_file(&snapshot, &json)?;
        write_file(&self.marker_path(), &format!("{trade_date}\n"))?;
        debug!(%trade_date, previous = %last, "Published new snapshot");

        Ok(PersistOutcome::New {
            trade_date,
            snapshot,
        })
    }

    /// Reads back `latest.json`, if a run has written it.
    pub fn load_latest(&self) -> Result<Option<Payload>> {
        let path = self.latest_path();
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let payload = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse payload in {}", path.display()))?;
        Ok(Some(payload))
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
