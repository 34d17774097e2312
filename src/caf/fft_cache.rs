use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rustfft::{Fft, FftPlanner};

/// Process-wide cache of FFT plans keyed by size, so CAF segments of a
/// given length re-use the same planned transform instead of re-planning
/// every frame (spec §4.3 performance contract, spec §9 "global FFT plan
/// cache").
pub struct FftPlanCache {
    planner: Mutex<FftPlanner<f32>>,
    forward: Mutex<HashMap<usize, Arc<dyn Fft<f32>>>>,
    inverse: Mutex<HashMap<usize, Arc<dyn Fft<f32>>>>,
}

impl FftPlanCache {
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
            forward: Mutex::new(HashMap::new()),
            inverse: Mutex::new(HashMap::new()),
        }
    }

    pub fn forward(&self, len: usize) -> Arc<dyn Fft<f32>> {
        let mut cache = self.forward.lock().unwrap();
        cache
            .entry(len)
            .or_insert_with(|| self.planner.lock().unwrap().plan_fft_forward(len))
            .clone()
    }

    pub fn inverse(&self, len: usize) -> Arc<dyn Fft<f32>> {
        let mut cache = self.inverse.lock().unwrap();
        cache
            .entry(len)
            .or_insert_with(|| self.planner.lock().unwrap().plan_fft_inverse(len))
            .clone()
    }
}

impl Default for FftPlanCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_plans_per_size() {
        let cache = FftPlanCache::new();
        let a = cache.forward(64);
        let b = cache.forward(64);
        assert!(Arc::ptr_eq(&a, &b));
        let c = cache.forward(128);
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
