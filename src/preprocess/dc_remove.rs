use rustfft::num_complex::Complex32;

use crate::preprocess::IqStage;

/// Subtracts the per-channel mean (spec §4.2 step 2).
pub struct DcRemove;

impl IqStage for DcRemove {
    fn process(&self, samples: &mut [Complex32]) {
        if samples.is_empty() {
            return;
        }
        let mean: Complex32 =
            samples.iter().fold(Complex32::new(0.0, 0.0), |acc, s| acc + s) / samples.len() as f32;
        for s in samples.iter_mut() {
            *s -= mean;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_constant_offset() {
        let mut samples = vec![Complex32::new(5.0, -3.0); 8];
        samples[0] = Complex32::new(9.0, -3.0);
        DcRemove.process(&mut samples);
        let mean: Complex32 = samples.iter().fold(Complex32::new(0.0, 0.0), |a, s| a + s) / samples.len() as f32;
        assert!(mean.norm() < 1e-5);
    }
}
