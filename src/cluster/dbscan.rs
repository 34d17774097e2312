use crate::config::ClusterConfig;
use crate::model::{Cluster, Detection};

/// DBSCAN over detection coordinates (spec §4.5). Returns one `Cluster`
/// per non-noise label plus, if any detections were unassigned, a single
/// `Cluster { label: -1, .. }` collecting the noise points.
pub fn dbscan(detections: &[Detection], config: &ClusterConfig) -> Vec<Cluster> {
    let n = detections.len();
    if n == 0 {
        return Vec::new();
    }

    const UNVISITED: i32 = -2;
    const NOISE: i32 = -1;
    let mut labels = vec![UNVISITED; n];
    let mut next_label = 0i32;

    let neighbors = |idx: usize| -> Vec<usize> {
        (0..n)
            .filter(|&j| j != idx && distance(detections, idx, j) <= config.eps)
            .collect()
    };

    for i in 0..n {
        if labels[i] != UNVISITED {
            continue;
        }
        let neigh = neighbors(i);
        if neigh.len() + 1 < config.min_samples {
            labels[i] = NOISE;
            continue;
        }
        labels[i] = next_label;
        let mut queue = neigh;
        let mut qi = 0;
        while qi < queue.len() {
            let j = queue[qi];
            qi += 1;
            if labels[j] == NOISE {
                labels[j] = next_label;
            }
            if labels[j] != UNVISITED {
                continue;
            }
            labels[j] = next_label;
            let j_neighbors = neighbors(j);
            if j_neighbors.len() + 1 >= config.min_samples {
                for &k in &j_neighbors {
                    if !queue.contains(&k) {
                        queue.push(k);
                    }
                }
            }
        }
        next_label += 1;
    }

    let mut clusters: Vec<Cluster> = (0..next_label)
        .map(|label| Cluster { label, detections: Vec::new() })
        .collect();
    let mut noise = Cluster { label: NOISE, detections: Vec::new() };

    for (idx, &label) in labels.iter().enumerate() {
        if label == NOISE {
            noise.detections.push(detections[idx]);
        } else {
            clusters[label as usize].detections.push(detections[idx]);
        }
    }
    if !noise.detections.is_empty() {
        clusters.push(noise);
    }
    clusters
}

fn distance(detections: &[Detection], a: usize, b: usize) -> f64 {
    let da = &detections[a];
    let db = &detections[b];
    let dd = da.doppler_idx as f64 - db.doppler_idx as f64;
    let dr = da.range_idx as f64 - db.range_idx as f64;
    (dd * dd + dr * dr).sqrt()
}
