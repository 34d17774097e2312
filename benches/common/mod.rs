use pcl_radar::config::{CafConfig, CfarConfig, TrackerConfig};
use pcl_radar::model::{Cluster, Detection, RdMap};
use rustfft::num_complex::Complex32;

pub fn tone(n: usize, freq_norm: f64) -> Vec<Complex32> {
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * freq_norm * i as f64;
            Complex32::new(phase.cos() as f32, phase.sin() as f32)
        })
        .collect()
}

pub fn caf_config(nfft: usize, doppler_bins: usize) -> CafConfig {
    CafConfig { nfft, overlap: 0.5, doppler_bins }
}

pub fn pseudo_rd_map(size: usize) -> RdMap {
    let mut rd = RdMap::zeros(size, size);
    for ((i, j), v) in rd.data.indexed_iter_mut() {
        let x = (i * 48271 + j * 16807 + 1) % 2147483647;
        *v = (x as f64 / 2147483647.0) as f32;
    }
    rd
}

pub fn default_cfar_config() -> CfarConfig {
    CfarConfig { guard: [2, 2], train: [8, 8], pfa: 1e-3 }
}

pub fn synthetic_clusters(n: usize) -> Vec<Cluster> {
    (0..n)
        .map(|i| Cluster {
            label: i as i32,
            detections: vec![Detection {
                doppler_idx: (i * 17) % 200,
                range_idx: (i * 31) % 200,
                power: 1.0,
            }],
        })
        .collect()
}

pub fn default_tracker_config() -> TrackerConfig {
    TrackerConfig::default()
}
