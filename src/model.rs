//! Core data types shared across the pipeline (spec §3).

use std::collections::VecDeque;

use ndarray::Array2;
use rustfft::num_complex::Complex32;
use serde::Serialize;

/// A single complex-baseband sample.
pub type Sample = Complex32;

/// A multi-channel block of synchronized IQ samples, shape (C, N).
///
/// Channels are stored contiguously; all channels in one block are
/// assumed time-aligned to within one sample by the producer.
#[derive(Debug, Clone)]
pub struct IqBlock {
    pub channels: usize,
    pub samples_per_channel: usize,
    data: Vec<Sample>,
}

impl IqBlock {
    pub fn new(channels: usize, samples_per_channel: usize) -> Self {
        Self {
            channels,
            samples_per_channel,
            data: vec![Sample::new(0.0, 0.0); channels * samples_per_channel],
        }
    }

    pub fn from_channel_data(channels: usize, samples_per_channel: usize, data: Vec<Sample>) -> Self {
        assert_eq!(data.len(), channels * samples_per_channel);
        Self { channels, samples_per_channel, data }
    }

    pub fn channel(&self, idx: usize) -> &[Sample] {
        let start = idx * self.samples_per_channel;
        &self.data[start..start + self.samples_per_channel]
    }

    pub fn channel_mut(&mut self, idx: usize) -> &mut [Sample] {
        let start = idx * self.samples_per_channel;
        let len = self.samples_per_channel;
        &mut self.data[start..start + len]
    }

    pub fn set_channel(&mut self, idx: usize, data: &[Sample]) {
        self.channel_mut(idx).copy_from_slice(data);
    }
}

/// A real-valued range-Doppler magnitude map, shape (doppler_bins, range_bins).
#[derive(Debug, Clone)]
pub struct RdMap {
    pub data: Array2<f32>,
}

impl RdMap {
    pub fn zeros(doppler_bins: usize, range_bins: usize) -> Self {
        Self { data: Array2::zeros((doppler_bins, range_bins)) }
    }

    pub fn doppler_bins(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn range_bins(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::MIN, f32::max)
    }

    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::MAX, f32::min)
    }
}

/// A single CFAR detection: indices into the RD map plus the cell power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub doppler_idx: usize,
    pub range_idx: usize,
    pub power: f32,
}

/// A group of detections sharing an integer label (-1 = noise).
#[derive(Debug, Clone)]
pub struct Cluster {
    pub label: i32,
    pub detections: Vec<Detection>,
}

impl Cluster {
    /// Power-weighted centroid `(range, doppler)` of the cluster's
    /// detections, in that order to match the tracker's state vector
    /// layout `[r, d, vr, vd]`.
    pub fn centroid(&self) -> (f64, f64) {
        let total_power: f64 = self.detections.iter().map(|d| d.power as f64).sum();
        if total_power <= 0.0 || self.detections.is_empty() {
            let n = self.detections.len().max(1) as f64;
            let d = self.detections.iter().map(|x| x.doppler_idx as f64).sum::<f64>() / n;
            let r = self.detections.iter().map(|x| x.range_idx as f64).sum::<f64>() / n;
            return (r, d);
        }
        let d = self
            .detections
            .iter()
            .map(|x| x.doppler_idx as f64 * x.power as f64)
            .sum::<f64>()
            / total_power;
        let r = self
            .detections
            .iter()
            .map(|x| x.range_idx as f64 * x.power as f64)
            .sum::<f64>()
            / total_power;
        (r, d)
    }
}

/// Lifecycle state of a tracked target (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackState {
    Born,
    Updated,
    Coasted,
    Terminated,
}

const HISTORY_CAPACITY: usize = 64;

/// One tracked target: state vector [r, d, vr, vd], covariance, lifecycle.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u64,
    pub state: nalgebra::Vector4<f64>,
    pub covariance: nalgebra::Matrix4<f64>,
    pub missed: u32,
    pub last_update: f64,
    pub lifecycle: TrackState,
    pub history: VecDeque<(f64, f64, f64)>,
}

impl Track {
    pub fn new(id: u64, range: f64, doppler: f64, timestamp: f64, covariance: nalgebra::Matrix4<f64>) -> Self {
        let mut history = VecDeque::with_capacity(HISTORY_CAPACITY);
        history.push_back((timestamp, range, doppler));
        Self {
            id,
            state: nalgebra::Vector4::new(range, doppler, 0.0, 0.0),
            covariance,
            missed: 0,
            last_update: timestamp,
            lifecycle: TrackState::Born,
            history,
        }
    }

    pub fn range(&self) -> f64 {
        self.state[0]
    }

    pub fn doppler(&self) -> f64 {
        self.state[1]
    }

    pub fn vr(&self) -> f64 {
        self.state[2]
    }

    pub fn vd(&self) -> f64 {
        self.state[3]
    }

    pub fn push_history(&mut self, timestamp: f64) {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back((timestamp, self.range(), self.doppler()));
    }
}
