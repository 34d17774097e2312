use rustfft::num_complex::Complex32;

use crate::preprocess::IqStage;

/// Lagged-difference moving-target-indicator filter: `output[n] = x[n] -
/// x[n-delta]` for `n >= delta`, zero below (spec §4.2 step 5).
pub struct Mti {
    pub delta: usize,
}

impl IqStage for Mti {
    fn process(&self, samples: &mut [Complex32]) {
        let n = samples.len();
        if self.delta == 0 || self.delta >= n {
            return;
        }
        let input = samples.to_vec();
        for i in (self.delta..n).rev() {
            samples[i] = input[i] - input[i - self.delta];
        }
        for i in 0..self.delta {
            samples[i] = Complex32::new(0.0, 0.0);
        }
    }
}
