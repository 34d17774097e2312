use ndarray::Array2;

use crate::config::CfarConfig;
use crate::model::RdMap;

pub struct CfarResult {
    pub mask: Array2<u8>,
    pub threshold: Array2<f32>,
}

/// 2-D cell-averaging CFAR detector (spec §4.4).
pub fn cfar_detect(rd: &RdMap, config: &CfarConfig) -> CfarResult {
    let (gd, gr) = (config.guard[0], config.guard[1]);
    let (td, tr) = (config.train[0], config.train[1]);
    let half_d = gd + td;
    let half_r = gr + tr;

    let nd = rd.doppler_bins();
    let nr = rd.range_bins();

    let mut mask = Array2::<u8>::zeros((nd, nr));
    let mut threshold = Array2::<f32>::zeros((nd, nr));

    let window_cells = (2 * half_d + 1) * (2 * half_r + 1);
    let guard_cells = (2 * gd + 1) * (2 * gr + 1);
    let k = window_cells.saturating_sub(guard_cells).max(1) as f64;
    let alpha = (k * ((config.pfa.powf(-1.0 / k)) - 1.0)) as f32;

    if nd <= 2 * half_d || nr <= 2 * half_r {
        return CfarResult { mask, threshold };
    }

    for i in half_d..nd - half_d {
        for j in half_r..nr - half_r {
            let mut sum = 0.0f32;
            for di in i - half_d..=i + half_d {
                for dj in j - half_r..=j + half_r {
                    let in_guard = di.abs_diff(i) <= gd && dj.abs_diff(j) <= gr;
                    if in_guard {
                        continue;
                    }
                    sum += rd.data[[di, dj]];
                }
            }
            let mu = sum / k as f32;
            let tau = alpha * mu;
            threshold[[i, j]] = tau;
            if rd.data[[i, j]] > tau {
                mask[[i, j]] = 1;
            }
        }
    }

    CfarResult { mask, threshold }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RdMap;

    #[test]
    fn border_is_always_zero() {
        let mut rd = RdMap::zeros(32, 32);
        rd.data.fill(1.0);
        let cfg = CfarConfig { guard: [2, 2], train: [4, 4], pfa: 1e-3 };
        let result = cfar_detect(&rd, &cfg);
        let half_d = cfg.guard[0] + cfg.train[0];
        let half_r = cfg.guard[1] + cfg.train[1];
        for i in 0..half_d {
            for j in 0..result.mask.shape()[1] {
                assert_eq!(result.mask[[i, j]], 0);
            }
        }
        for j in 0..half_r {
            for i in 0..result.mask.shape()[0] {
                assert_eq!(result.mask[[i, j]], 0);
            }
        }
    }

    #[test]
    fn uniform_noise_floor_produces_no_detections() {
        let mut rd = RdMap::zeros(40, 40);
        rd.data.fill(0.1);
        let cfg = CfarConfig { guard: [1, 1], train: [3, 3], pfa: 1e-3 };
        let result = cfar_detect(&rd, &cfg);
        assert!(result.mask.iter().all(|&v| v == 0));
    }

    #[test]
    fn strong_isolated_peak_is_detected() {
        let mut rd = RdMap::zeros(40, 40);
        rd.data.fill(0.01);
        rd.data[[20, 20]] = 1.0;
        let cfg = CfarConfig { guard: [1, 1], train: [3, 3], pfa: 1e-3 };
        let result = cfar_detect(&rd, &cfg);
        assert_eq!(result.mask[[20, 20]], 1);
    }
}
