use ndarray::Array2;

use crate::config::MorphConfig;

/// Binary opening, closing, and small-object removal, in that order
/// (spec §4.4). Uses 4-connectivity for the component-size filter and a
/// square structuring element of side `struct_size` for opening/closing.
pub fn clean_mask(mask: &Array2<u8>, config: &MorphConfig) -> Array2<u8> {
    let radius = config.struct_size / 2;
    let opened = dilate(&erode(mask, radius), radius);
    let closed = erode(&dilate(&opened, radius), radius);
    remove_small_components(&closed, config.min_size)
}

fn erode(mask: &Array2<u8>, radius: usize) -> Array2<u8> {
    if radius == 0 {
        return mask.clone();
    }
    let (h, w) = (mask.shape()[0], mask.shape()[1]);
    let mut out = Array2::<u8>::zeros((h, w));
    for i in 0..h {
        for j in 0..w {
            let mut all_set = true;
            'scan: for di in i.saturating_sub(radius)..=(i + radius).min(h - 1) {
                for dj in j.saturating_sub(radius)..=(j + radius).min(w - 1) {
                    if mask[[di, dj]] == 0 {
                        all_set = false;
                        break 'scan;
                    }
                }
            }
            let within_full_window =
                i >= radius && j >= radius && i + radius < h && j + radius < w;
            out[[i, j]] = if within_full_window && all_set { 1 } else { 0 };
        }
    }
    out
}

fn dilate(mask: &Array2<u8>, radius: usize) -> Array2<u8> {
    if radius == 0 {
        return mask.clone();
    }
    let (h, w) = (mask.shape()[0], mask.shape()[1]);
    let mut out = Array2::<u8>::zeros((h, w));
    for i in 0..h {
        for j in 0..w {
            let mut any_set = false;
            'scan: for di in i.saturating_sub(radius)..=(i + radius).min(h - 1) {
                for dj in j.saturating_sub(radius)..=(j + radius).min(w - 1) {
                    if mask[[di, dj]] == 1 {
                        any_set = true;
                        break 'scan;
                    }
                }
            }
            out[[i, j]] = any_set as u8;
        }
    }
    out
}

fn remove_small_components(mask: &Array2<u8>, min_size: usize) -> Array2<u8> {
    let (h, w) = (mask.shape()[0], mask.shape()[1]);
    let mut visited = Array2::<bool>::from_elem((h, w), false);
    let mut out = mask.clone();

    for i in 0..h {
        for j in 0..w {
            if mask[[i, j]] == 0 || visited[[i, j]] {
                continue;
            }
            let mut stack = vec![(i, j)];
            let mut component = Vec::new();
            visited[[i, j]] = true;
            while let Some((ci, cj)) = stack.pop() {
                component.push((ci, cj));
                let neighbors = [
                    (ci.checked_sub(1), Some(cj)),
                    (Some(ci + 1), Some(cj)),
                    (Some(ci), cj.checked_sub(1)),
                    (Some(ci), Some(cj + 1)),
                ];
                for (ni, nj) in neighbors {
                    if let (Some(ni), Some(nj)) = (ni, nj) {
                        if ni < h && nj < w && mask[[ni, nj]] == 1 && !visited[[ni, nj]] {
                            visited[[ni, nj]] = true;
                            stack.push((ni, nj));
                        }
                    }
                }
            }
            if component.len() < min_size {
                for (ci, cj) in component {
                    out[[ci, cj]] = 0;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_isolated_single_pixel() {
        let mut mask = Array2::<u8>::zeros((10, 10));
        mask[[5, 5]] = 1;
        let cfg = MorphConfig { min_size: 5, struct_size: 1 };
        let cleaned = clean_mask(&mask, &cfg);
        assert_eq!(cleaned[[5, 5]], 0);
    }

    #[test]
    fn keeps_a_large_blob() {
        let mut mask = Array2::<u8>::zeros((20, 20));
        for i in 5..12 {
            for j in 5..12 {
                mask[[i, j]] = 1;
            }
        }
        let cfg = MorphConfig { min_size: 5, struct_size: 3 };
        let cleaned = clean_mask(&mask, &cfg);
        assert!(cleaned.iter().filter(|&&v| v == 1).count() > 0);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut mask = Array2::<u8>::zeros((20, 20));
        for i in 5..12 {
            for j in 5..12 {
                mask[[i, j]] = 1;
            }
        }
        mask[[0, 0]] = 1;
        let cfg = MorphConfig { min_size: 5, struct_size: 3 };
        let once = clean_mask(&mask, &cfg);
        let twice = clean_mask(&once, &cfg);
        assert_eq!(once, twice);
    }
}
