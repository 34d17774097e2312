use rustfft::num_complex::Complex32;

use crate::preprocess::IqStageWithRef;

/// For each non-reference channel, rotates by e^{-i*phase(<ref, x>)}
/// (spec §4.2 step 3).
pub struct PhaseCalibration;

impl IqStageWithRef for PhaseCalibration {
    fn process(&self, reference: &[Complex32], samples: &mut [Complex32]) {
        let n = reference.len().min(samples.len());
        if n == 0 {
            return;
        }
        let inner: Complex32 = (0..n).map(|i| reference[i].conj() * samples[i]).sum();
        if inner.norm() < 1e-12 {
            return;
        }
        let phase = inner.arg();
        let rotation = Complex32::new(0.0, -phase).exp();
        for s in samples.iter_mut() {
            *s *= rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn removes_a_known_phase_offset() {
        let n = 256;
        let reference: Vec<Complex32> = (0..n).map(|i| Complex32::new((i as f32 * 0.1).sin(), 0.0)).collect();
        let applied_phase = 0.7_f32;
        let rotated: Vec<Complex32> = reference.iter().map(|r| r * Complex32::new(0.0, applied_phase).exp()).collect();
        let mut samples = rotated;
        PhaseCalibration.process(&reference, &mut samples);
        let inner: Complex32 = reference.iter().zip(samples.iter()).map(|(r, s)| r * s.conj()).sum();
        assert!(inner.arg().abs() < 1e-3 || (inner.arg().abs() - 2.0 * PI).abs() < 1e-3);
    }
}
