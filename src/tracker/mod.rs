//! Constant-velocity Kalman filter + Hungarian assignment tracker
//! (spec §4.6).

mod assignment;
mod kalman;

pub use assignment::solve_assignment;
pub use kalman::{kalman_predict, kalman_update, KalmanUpdateOutcome};

use log::debug;
use nalgebra::Matrix4;

use crate::config::TrackerConfig;
use crate::model::{Cluster, Track, TrackState};

/// Owns the track table exclusively (spec §3 Ownership, spec §9).
pub struct Tracker {
    config: TrackerConfig,
    tracks: Vec<Track>,
    next_id: u64,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config, tracks: Vec::new(), next_id: 0 }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Runs one full per-frame protocol step: predict, gate+assign,
    /// update, spawn, prune (spec §4.6).
    pub fn step(&mut self, clusters: &[Cluster], timestamp: f64) {
        self.predict();

        let measurements: Vec<(f64, f64)> = clusters.iter().map(Cluster::centroid).collect();
        let assignments = self.gate_and_assign(&measurements);

        let mut assigned_measurements = vec![false; measurements.len()];
        for (track_idx, meas_idx) in &assignments {
            assigned_measurements[*meas_idx] = true;
            let track = &mut self.tracks[*track_idx];
            let (mr, md) = measurements[*meas_idx];
            match kalman_update(track, mr, md, self.config.meas_var) {
                KalmanUpdateOutcome::Updated => {
                    track.missed = 0;
                    track.lifecycle = TrackState::Updated;
                    track.last_update = timestamp;
                    track.push_history(timestamp);
                }
                KalmanUpdateOutcome::SingularCovariance => {
                    track.lifecycle = TrackState::Coasted;
                    debug!("track {} skipped update: singular innovation covariance", track.id);
                }
            }
        }

        for (idx, assigned) in assigned_measurements.iter().enumerate() {
            if !assigned {
                self.spawn(measurements[idx].0, measurements[idx].1, timestamp);
            }
        }

        for track in self.tracks.iter_mut() {
            let just_born = track.lifecycle == TrackState::Born && track.missed == 0;
            if track.lifecycle != TrackState::Updated && !just_born {
                track.lifecycle = TrackState::Coasted;
            }
        }

        let max_missed = self.config.max_missed;
        self.tracks.retain(|t| t.missed <= max_missed);
    }

    fn predict(&mut self) {
        for track in self.tracks.iter_mut() {
            kalman_predict(track, self.config.dt, self.config.process_var);
            track.missed += 1;
        }
    }

    fn gate_and_assign(&self, measurements: &[(f64, f64)]) -> Vec<(usize, usize)> {
        let predictions: Vec<(f64, f64)> = self.tracks.iter().map(|t| (t.range(), t.doppler())).collect();
        solve_assignment(&predictions, measurements, self.config.dist_threshold)
    }

    fn spawn(&mut self, range: f64, doppler: f64, timestamp: f64) {
        let covariance = Matrix4::from_diagonal(&nalgebra::Vector4::new(50.0, 50.0, 25.0, 25.0));
        let track = Track::new(self.next_id, range, doppler, timestamp, covariance);
        self.next_id += 1;
        self.tracks.push(track);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Detection;

    fn cluster_at(d: f64, r: f64) -> Cluster {
        Cluster {
            label: 0,
            detections: vec![Detection { doppler_idx: d as usize, range_idx: r as usize, power: 1.0 }],
        }
    }

    #[test]
    fn track_ids_are_strictly_increasing() {
        let mut tracker = Tracker::new(TrackerConfig::default());
        tracker.step(&[cluster_at(10.0, 10.0)], 0.0);
        tracker.step(&[cluster_at(80.0, 80.0)], 1.0);
        let ids: Vec<u64> = tracker.tracks().iter().map(|t| t.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids.len(), 2);
        assert_eq!(sorted, vec![0, 1]);
    }

    #[test]
    fn missed_resets_to_zero_after_assigned_update() {
        let mut tracker = Tracker::new(TrackerConfig::default());
        tracker.step(&[cluster_at(10.0, 10.0)], 0.0);
        tracker.step(&[cluster_at(10.0, 10.0)], 1.0);
        assert_eq!(tracker.tracks()[0].missed, 0);
    }

    #[test]
    fn freshly_spawned_track_stays_born_for_its_first_step() {
        let mut tracker = Tracker::new(TrackerConfig::default());
        tracker.step(&[cluster_at(10.0, 10.0)], 0.0);
        assert_eq!(tracker.tracks()[0].lifecycle, TrackState::Born);
    }

    #[test]
    fn track_without_reassignment_eventually_terminates() {
        let mut config = TrackerConfig::default();
        config.max_missed = 2;
        let mut tracker = Tracker::new(config);
        tracker.step(&[cluster_at(10.0, 10.0)], 0.0);
        tracker.step(&[], 1.0);
        tracker.step(&[], 2.0);
        tracker.step(&[], 3.0);
        assert!(tracker.tracks().is_empty());
    }
}
