//! HTTP fusion collaborator (spec §6 "Fusion collaborator"), grounded on
//! `examples/original_source/passive_radar/network/fusion_client.py`'s
//! `send_tracks`/`get_fused` pair, translated from try/except-return-false
//! to `Result`-returning calls. Fusion logic itself is external; only the
//! request/response schemas and this thin client are part of the core.

use serde::{Deserialize, Serialize};

use crate::error::{RadarError, Result};
use crate::model::Track;

#[derive(Debug, Clone, Serialize)]
pub struct FusionTrackEntry {
    pub id: u64,
    pub position: [f64; 3],
    pub snr: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FusionTrackPayload {
    pub tracks: Vec<FusionTrackEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FusedTarget {
    pub id: u64,
    pub position: [f64; 3],
    pub snr: f64,
}

impl FusionTrackPayload {
    pub fn from_tracks(tracks: &[Track]) -> Self {
        Self {
            tracks: tracks
                .iter()
                .map(|t| FusionTrackEntry { id: t.id, position: [t.range(), t.doppler(), 0.0], snr: 0.0 })
                .collect(),
        }
    }
}

/// Thin blocking client. Best-effort: failures are surfaced as `Err` so
/// the caller can log at `warn` and continue (spec §1: fusion is an
/// external collaborator, never a hard dependency of the core).
pub struct FusionClient {
    server_url: String,
    http: reqwest::blocking::Client,
}

impl FusionClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            http: reqwest::blocking::Client::builder()
                .timeout(std::time::Duration::from_secs(2))
                .build()
                .expect("reqwest client builder should not fail with default TLS config"),
        }
    }

    pub fn send_tracks(&self, payload: &FusionTrackPayload) -> Result<bool> {
        let url = format!("{}/data", self.server_url);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| RadarError::Downstream(format!("fusion send_tracks failed: {e}")))?;
        Ok(response.status().is_success())
    }

    pub fn get_fused(&self) -> Result<Vec<FusedTarget>> {
        let url = format!("{}/tracks", self.server_url);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| RadarError::Downstream(format!("fusion get_fused failed: {e}")))?;
        response
            .json()
            .map_err(|e| RadarError::Downstream(format!("fusion response decode failed: {e}")))
    }
}
