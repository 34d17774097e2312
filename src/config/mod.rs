//! Closed configuration struct tree (spec §6, §9).
//!
//! Unlike the source prototype's free-form dictionary, every recognized
//! option is a named field with an explicit default; unknown keys are
//! rejected at load time via `deny_unknown_fields`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RadarError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    File,
    Udp,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Udp
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub path: String,
    pub chunk_size: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self { path: String::new(), chunk_size: 4096 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UdpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 5000 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CafConfig {
    pub nfft: usize,
    pub overlap: f64,
    pub doppler_bins: usize,
}

impl Default for CafConfig {
    fn default() -> Self {
        Self { nfft: 2048, overlap: 0.5, doppler_bins: 128 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CfarConfig {
    pub guard: [usize; 2],
    pub train: [usize; 2],
    pub pfa: f64,
}

impl Default for CfarConfig {
    fn default() -> Self {
        Self { guard: [2, 2], train: [8, 8], pfa: 1e-3 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MorphConfig {
    pub min_size: usize,
    pub struct_size: usize,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self { min_size: 5, struct_size: 3 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterConfig {
    pub eps: f64,
    pub min_samples: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { eps: 3.0, min_samples: 3 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub dt: f64,
    pub dist_threshold: f64,
    pub max_missed: u32,
    pub process_var: f64,
    pub meas_var: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            dist_threshold: 12.0,
            max_missed: 5,
            process_var: 1.0,
            meas_var: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mode: Mode,
    pub file: FileConfig,
    pub udp: UdpConfig,
    pub sample_rate: f64,
    pub channels: usize,
    pub block_size: usize,
    pub ring_depth: usize,
    pub caf: CafConfig,
    pub cfar: CfarConfig,
    pub morph: MorphConfig,
    pub cluster: ClusterConfig,
    pub tracker: TrackerConfig,
    pub broadcast_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            file: FileConfig::default(),
            udp: UdpConfig::default(),
            sample_rate: 2_000_000.0,
            channels: 5,
            block_size: 32768,
            ring_depth: 8,
            caf: CafConfig::default(),
            cfar: CfarConfig::default(),
            morph: MorphConfig::default(),
            cluster: ClusterConfig::default(),
            tracker: TrackerConfig::default(),
            broadcast_addr: "0.0.0.0:9001".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| RadarError::Config(format!("cannot read {}: {e}", path.as_ref().display())))?;
        serde_json::from_str(&text).map_err(|e| RadarError::Config(format!("invalid config: {e}")))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| RadarError::Config(format!("cannot serialize config: {e}")))?;
        fs::write(path.as_ref(), text)
            .map_err(|e| RadarError::Config(format!("cannot write {}: {e}", path.as_ref().display())))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels < 2 {
            return Err(RadarError::Config("channels must be >= 2 (1 reference + >=1 surveillance)".into()));
        }
        if !self.block_size.is_power_of_two() {
            return Err(RadarError::Config("block_size must be a power of two".into()));
        }
        if self.mode == Mode::File && self.file.path.is_empty() {
            return Err(RadarError::Config("file.path is required when mode = file".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert_eq!(cfg.channels, 5);
        assert_eq!(cfg.block_size, 32768);
        assert_eq!(cfg.ring_depth, 8);
        assert_eq!(cfg.caf.nfft, 2048);
        assert_eq!(cfg.cfar.guard, [2, 2]);
        assert_eq!(cfg.cfar.train, [8, 8]);
        assert_eq!(cfg.cluster.min_samples, 3);
        assert_eq!(cfg.tracker.max_missed, 5);
    }

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cfg = Config::default();
        cfg.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.channels, cfg.channels);
        assert_eq!(loaded.caf.doppler_bins, cfg.caf.doppler_bins);
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"bogus_field": 1}"#).unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn validate_rejects_missing_file_path_in_file_mode() {
        let mut cfg = Config::default();
        cfg.mode = Mode::File;
        assert!(cfg.validate().is_err());
        cfg.file.path = "/tmp/iq.bin".to_string();
        assert!(cfg.validate().is_ok());
    }
}
