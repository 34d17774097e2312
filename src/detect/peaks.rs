use ndarray::Array2;

use crate::model::{Detection, RdMap};

/// Enumerates set pixels of a cleaned mask into `Detection`s (spec §4.4).
pub fn extract_detections(mask: &Array2<u8>, rd: &RdMap) -> Vec<Detection> {
    let mut out = Vec::new();
    for i in 0..mask.shape()[0] {
        for j in 0..mask.shape()[1] {
            if mask[[i, j]] != 0 {
                out.push(Detection { doppler_idx: i, range_idx: j, power: rd.data[[i, j]] });
            }
        }
    }
    out
}
