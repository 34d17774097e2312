//! Append-only event/manifest directory (spec §6 "Event log
//! (collaborator)"), grounded on
//! `examples/original_source/passive_radar/output/saver.py`'s three
//! responsibilities: writing an event, writing an optional patch
//! snapshot, and maintaining a manifest index.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RadarError, Result};
use crate::model::Detection;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub timestamp: f64,
    pub doppler_idx: usize,
    pub range_idx: usize,
    pub power: f32,
    /// Path to an optional `.npy`/`.png` RD-neighborhood snapshot. Core
    /// never populates this; it is part of the schema for completeness.
    pub patch_path: Option<PathBuf>,
}

impl EventRecord {
    pub fn from_detection(detection: &Detection, timestamp: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            doppler_idx: detection.doppler_idx,
            range_idx: detection.range_idx,
            power: detection.power,
            patch_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: Uuid,
    pub event_path: PathBuf,
    pub timestamp: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

/// Destination for persisted detection events.
pub trait EventSink {
    fn record(&mut self, event: EventRecord) -> Result<()>;
}

/// Writes `events/<uuid>.json` per event and maintains `manifest.json`.
pub struct DirEventSink {
    root: PathBuf,
    manifest: Manifest,
}

impl DirEventSink {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("events")).map_err(RadarError::SourceIo)?;
        fs::create_dir_all(root.join("patches")).map_err(RadarError::SourceIo)?;
        let manifest_path = root.join("manifest.json");
        let manifest = if manifest_path.exists() {
            let text = fs::read_to_string(&manifest_path).map_err(RadarError::SourceIo)?;
            serde_json::from_str(&text).unwrap_or_default()
        } else {
            Manifest::default()
        };
        Ok(Self { root, manifest })
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    fn write_manifest(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.manifest)
            .map_err(|e| RadarError::Downstream(format!("cannot serialize manifest: {e}")))?;
        fs::write(self.manifest_path(), text).map_err(RadarError::SourceIo)
    }

    pub fn manifest_index(&self) -> HashMap<Uuid, &ManifestEntry> {
        self.manifest.entries.iter().map(|e| (e.id, e)).collect()
    }
}

/// `{YYYYMMDD_HHMMSS}_{uuid}.json`, human-sortable by capture time.
fn event_filename(event: &EventRecord) -> String {
    let stamp = chrono::DateTime::from_timestamp(event.timestamp as i64, 0)
        .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).unwrap())
        .format("%Y%m%d_%H%M%S");
    format!("{stamp}_{}.json", event.id)
}

impl EventSink for DirEventSink {
    fn record(&mut self, event: EventRecord) -> Result<()> {
        let event_path = self.root.join("events").join(event_filename(&event));
        let text = serde_json::to_string_pretty(&event)
            .map_err(|e| RadarError::Downstream(format!("cannot serialize event: {e}")))?;
        fs::write(&event_path, text).map_err(RadarError::SourceIo)?;

        self.manifest.entries.push(ManifestEntry {
            id: event.id,
            event_path,
            timestamp: event.timestamp,
        });
        self.write_manifest()
    }
}
