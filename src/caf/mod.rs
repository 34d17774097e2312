//! Cross-ambiguity function engine (spec §4.3).

mod fft_cache;

pub use fft_cache::FftPlanCache;

use rustfft::num_complex::Complex32;

use crate::config::CafConfig;
use crate::model::{IqBlock, RdMap};

pub struct CafEngine {
    cache: FftPlanCache,
    nfft: usize,
    overlap: f64,
    doppler_bins: usize,
}

impl CafEngine {
    pub fn new(config: &CafConfig) -> Self {
        Self {
            cache: FftPlanCache::new(),
            nfft: config.nfft,
            overlap: config.overlap,
            doppler_bins: config.doppler_bins,
        }
    }

    fn segment_count(&self, n: usize) -> usize {
        if n <= self.nfft {
            return 1;
        }
        let hop = (self.nfft as f64 * (1.0 - self.overlap)).max(1.0);
        (((n - self.nfft) as f64 / hop).floor() as usize + 1).max(1)
    }

    /// Computes the RD map for a single (reference, surveillance) pair.
    pub fn compute_pair(&self, reference: &[Complex32], surveillance: &[Complex32]) -> RdMap {
        let n = reference.len().min(surveillance.len());
        let reference = &reference[..n];
        let surveillance = &surveillance[..n];

        let nfft = self.nfft.min(n).max(1);
        let fwd = self.cache.forward(nfft);
        let inv = self.cache.inverse(nfft);

        let mut ref_spectrum = pad_to(&reference[..nfft.min(reference.len())], nfft);
        fwd.process(&mut ref_spectrum);
        for v in ref_spectrum.iter_mut() {
            *v = v.conj();
        }

        let segments = self.segment_count(n);
        let hop = ((nfft as f64) * (1.0 - self.overlap)).max(1.0) as usize;

        // delay_matrix[s] = magnitude delay vector (length nfft) for segment s.
        let mut delay_matrix: Vec<Vec<f32>> = Vec::with_capacity(segments);
        for s in 0..segments {
            let start = (s * hop).min(n.saturating_sub(1));
            let end = (start + nfft).min(n);
            let mut seg = pad_to(&surveillance[start..end], nfft);
            fwd.process(&mut seg);
            for (v, r) in seg.iter_mut().zip(ref_spectrum.iter()) {
                *v *= *r;
            }
            inv.process(&mut seg);
            let mag: Vec<f32> = seg.iter().map(|c| c.norm() / nfft as f32).collect();
            delay_matrix.push(mag);
        }

        let nr = nfft;
        let nd = self.doppler_bins;
        let mut rd = RdMap::zeros(nd, nr);

        let slow_fwd = self.cache.forward(nd);
        for range_bin in 0..nr {
            let mut column: Vec<Complex32> = (0..nd)
                .map(|s| {
                    if s < delay_matrix.len() {
                        Complex32::new(delay_matrix[s][range_bin], 0.0)
                    } else {
                        Complex32::new(0.0, 0.0)
                    }
                })
                .collect();
            slow_fwd.process(&mut column);
            let shifted = fftshift(&column);
            for (d, v) in shifted.iter().enumerate() {
                rd.data[[d, range_bin]] = v.norm();
            }
        }

        let max = rd.max().max(0.0) + 1e-12;
        rd.data.mapv_inplace(|v| v / max);
        rd
    }

    /// Multi-channel variant: channel 0 is reference, every other channel
    /// is a surveillance channel; the resulting RD maps are averaged
    /// (spec §4.3, and the Open Question resolution in spec §9).
    pub fn compute_block(&self, block: &IqBlock) -> RdMap {
        assert!(block.channels >= 2, "CAF requires at least one surveillance channel");
        let reference = block.channel(0);
        let surveillance_channels = block.channels - 1;

        let mut accum = RdMap::zeros(self.doppler_bins, self.nfft.min(block.samples_per_channel));
        for c in 1..block.channels {
            let rd = self.compute_pair(reference, block.channel(c));
            accum.data += &rd.data;
        }
        accum.data.mapv_inplace(|v| v / surveillance_channels as f32);
        let max = accum.max().max(0.0) + 1e-12;
        accum.data.mapv_inplace(|v| v / max);
        accum
    }
}

fn pad_to(data: &[Complex32], len: usize) -> Vec<Complex32> {
    let mut out = vec![Complex32::new(0.0, 0.0); len];
    let n = data.len().min(len);
    out[..n].copy_from_slice(&data[..n]);
    out
}

fn fftshift(data: &[Complex32]) -> Vec<Complex32> {
    let n = data.len();
    let mid = n / 2;
    let mut out = Vec::with_capacity(n);
    out.extend_from_slice(&data[mid..]);
    out.extend_from_slice(&data[..mid]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CafConfig;

    fn tone(n: usize, freq_norm: f64) -> Vec<Complex32> {
        (0..n)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * freq_norm * i as f64;
                Complex32::new(phase.cos() as f32, phase.sin() as f32)
            })
            .collect()
    }

    #[test]
    fn rd_map_values_are_nonnegative_and_normalized() {
        let cfg = CafConfig { nfft: 256, overlap: 0.5, doppler_bins: 16 };
        let engine = CafEngine::new(&cfg);
        let reference = tone(4096, 0.01);
        let surveillance = tone(4096, 0.01);
        let rd = engine.compute_pair(&reference, &surveillance);
        assert!(rd.min() >= 0.0);
        assert!(rd.max() <= 1.0 + 1e-6);
    }

    #[test]
    fn delayed_reference_produces_peak_near_expected_range_bin() {
        let cfg = CafConfig { nfft: 256, overlap: 0.5, doppler_bins: 16 };
        let engine = CafEngine::new(&cfg);
        let n = 4096;
        let reference = tone(n, 0.02);
        let delay = 20usize;
        let mut surveillance = vec![Complex32::new(0.0, 0.0); n];
        surveillance[delay..].copy_from_slice(&reference[..n - delay]);
        let rd = engine.compute_pair(&reference, &surveillance);

        let mut best_range = 0;
        let mut best_val = f32::MIN;
        for r in 0..rd.range_bins() {
            let col_max = (0..rd.doppler_bins()).map(|d| rd.data[[d, r]]).fold(f32::MIN, f32::max);
            if col_max > best_val {
                best_val = col_max;
                best_range = r;
            }
        }
        assert!((best_range as i64 - delay as i64).unsigned_abs() <= 2);
    }
}
