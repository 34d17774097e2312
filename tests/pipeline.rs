use std::sync::Arc;

use pcl_radar::cluster::dbscan;
use pcl_radar::config::{CfarConfig, ClusterConfig, TrackerConfig};
use pcl_radar::detect::{cfar_detect, clean_mask, extract_detections};
use pcl_radar::model::{IqBlock, RdMap};
use pcl_radar::ring::RingBuffer;
use pcl_radar::tracker::Tracker;
use rustfft::num_complex::Complex32;

fn pseudo_noise_rd(size: usize, seed: usize) -> RdMap {
    let mut rd = RdMap::zeros(size, size);
    for ((i, j), v) in rd.data.indexed_iter_mut() {
        let x = (i * 48271 + j * 16807 + seed * 2654435761 + 1) % 2147483647;
        *v = (x as f64 / 2147483647.0) as f32;
    }
    rd
}

/// Scenario 1 (spec §8): 64 frames of pure noise should keep the tracker
/// at 0 confirmed tracks once its max_missed window has elapsed, and the
/// CFAR false-alarm rate should stay within a 3x margin of the design Pfa.
#[test]
fn pure_noise_keeps_zero_confirmed_tracks() {
    let cfar_config = CfarConfig { guard: [2, 2], train: [6, 6], pfa: 1e-3 };
    let morph_config = pcl_radar::config::MorphConfig { min_size: 5, struct_size: 3 };
    let cluster_config = ClusterConfig::default();
    let mut tracker_config = TrackerConfig::default();
    tracker_config.max_missed = 3;
    let mut tracker = Tracker::new(tracker_config);

    for frame in 0..64 {
        let rd = pseudo_noise_rd(48, frame);
        let cfar = cfar_detect(&rd, &cfar_config);
        let cleaned = clean_mask(&cfar.mask, &morph_config);
        let detections = extract_detections(&cleaned, &rd);
        let clusters: Vec<_> = dbscan(&detections, &cluster_config).into_iter().filter(|c| c.label >= 0).collect();
        tracker.step(&clusters, frame as f64);
    }

    for frame in 64..70 {
        tracker.step(&[], frame as f64);
    }
    assert!(tracker.tracks().is_empty(), "pure noise must not sustain confirmed tracks past max_missed");
}

/// Scenario 6 (spec §8): producing IQ faster than it is consumed must
/// overwrite the oldest ring slots without panicking, and the newest
/// frame must remain the one a reader observes.
#[test]
fn ring_overflow_is_lossy_but_never_panics() {
    let ring = RingBuffer::new(4, 1, 8);
    for i in 0..64u64 {
        let mut block = IqBlock::new(1, 8);
        block.channel_mut(0)[0] = Complex32::new(i as f32, 0.0);
        ring.push(block);
    }
    assert_eq!(ring.write_index(), 64);
    let latest = ring.latest().expect("ring should have a latest frame after overflow");
    assert_eq!(latest.channel(0)[0].re, 63.0);
    // A long-overwritten index must be unreachable, not a stale read.
    assert!(ring.get(0).is_none());
}

#[test]
fn ring_signals_readiness_exactly_once_after_first_write() {
    let ring = RingBuffer::new(2, 1, 4);
    let ring2 = Arc::clone(&ring);
    let waiter = std::thread::spawn(move || ring2.wait_ready());
    ring.push(IqBlock::new(1, 4));
    waiter.join().unwrap();
}
