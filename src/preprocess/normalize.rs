use rustfft::num_complex::Complex32;

use crate::preprocess::IqStage;

const EPSILON: f32 = 1e-9;

/// Divides the channel by sqrt(mean|x|^2 + eps) (spec §4.2 step 1).
pub struct Normalize;

impl IqStage for Normalize {
    fn process(&self, samples: &mut [Complex32]) {
        if samples.is_empty() {
            return;
        }
        let mean_power: f32 =
            samples.iter().map(|s| s.norm_sqr()).sum::<f32>() / samples.len() as f32;
        let scale = (mean_power + EPSILON).sqrt();
        for s in samples.iter_mut() {
            *s /= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizing_constant_signal_yields_unit_rms() {
        let mut samples = vec![Complex32::new(2.0, 0.0); 1024];
        Normalize.process(&mut samples);
        let rms: f32 = (samples.iter().map(|s| s.norm_sqr()).sum::<f32>() / samples.len() as f32).sqrt();
        assert!((rms - 1.0).abs() < 1e-4);
    }

    #[test]
    fn round_trip_recovers_original_to_float_precision() {
        let original = vec![Complex32::new(3.0, -1.5), Complex32::new(0.5, 2.0), Complex32::new(-4.0, 1.0)];
        let mut samples = original.clone();
        let mean_power: f32 = samples.iter().map(|s| s.norm_sqr()).sum::<f32>() / samples.len() as f32;
        let scale = (mean_power + EPSILON).sqrt();
        Normalize.process(&mut samples);
        for s in samples.iter_mut() {
            *s *= scale;
        }
        for (a, b) in samples.iter().zip(original.iter()) {
            assert!((a - b).norm() < 1e-4);
        }
    }
}
