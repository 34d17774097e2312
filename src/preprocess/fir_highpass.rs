use rustfft::num_complex::Complex32;

use crate::preprocess::IqStage;

/// Windowed-sinc FIR high-pass filter, applied as a causal convolution
/// along the time axis (spec §4.2 step 4). Taps are built once at
/// construction from `order` and the normalized cutoff `fc / (fs / 2)`.
pub struct FirHighpass {
    taps: Vec<f32>,
}

impl FirHighpass {
    /// `order`: number of taps (spec default 101, must be odd for a
    /// type-I linear-phase design). `normalized_cutoff`: fc / (fs/2) in
    /// (0, 1).
    pub fn new(order: usize, normalized_cutoff: f64) -> Self {
        let taps = design_highpass_taps(order, normalized_cutoff);
        Self { taps }
    }
}

impl IqStage for FirHighpass {
    fn process(&self, samples: &mut [Complex32]) {
        let taps = &self.taps;
        let n = samples.len();
        let m = taps.len();
        if n == 0 || m == 0 {
            return;
        }
        let input = samples.to_vec();
        for i in 0..n {
            let mut acc = Complex32::new(0.0, 0.0);
            for (k, &h) in taps.iter().enumerate() {
                if k > i {
                    break;
                }
                acc += input[i - k] * h;
            }
            samples[i] = acc;
        }
    }
}

/// Windowed-sinc low-pass design (Hamming window) followed by spectral
/// inversion to obtain a high-pass response (pass_zero = false).
fn design_highpass_taps(order: usize, normalized_cutoff: f64) -> Vec<f32> {
    let m = order.max(1);
    let center = (m - 1) as f64 / 2.0;
    let fc = normalized_cutoff.clamp(1e-6, 0.999) / 2.0; // sinc() uses fc in cycles/sample

    let mut lowpass = vec![0.0f64; m];
    for n in 0..m {
        let x = n as f64 - center;
        let sinc = if x.abs() < 1e-12 { 2.0 * fc } else { (2.0 * std::f64::consts::PI * fc * x).sin() / (std::f64::consts::PI * x) };
        let window = 0.54 - 0.46 * (2.0 * std::f64::consts::PI * n as f64 / (m - 1).max(1) as f64).cos();
        lowpass[n] = sinc * window;
    }
    let sum: f64 = lowpass.iter().sum();
    if sum.abs() > 1e-12 {
        for v in lowpass.iter_mut() {
            *v /= sum;
        }
    }

    let mut highpass = lowpass.iter().map(|v| -v).collect::<Vec<_>>();
    let mid = (m - 1) / 2;
    highpass[mid] += 1.0;

    highpass.into_iter().map(|v| v as f32).collect()
}
