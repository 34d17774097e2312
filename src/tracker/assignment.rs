//! Hand-rolled Hungarian (Jonker-Volgenant-equivalent) assignment, since
//! no assignment-problem crate is grounded anywhere in the example pack.

const INF: f64 = f64::INFINITY;

/// Solves the rectangular linear assignment minimizing total Euclidean
/// cost between `predictions` (tracks) and `measurements` (cluster
/// centroids), gated at `dist_threshold` (spec §4.6 step 2). Returns
/// `(track_index, measurement_index)` pairs for finite-cost assignments
/// only. Tie-breaking: lower track index wins, then lower measurement
/// index (enforced by iteration order below, since the core algorithm is
/// itself deterministic given a fixed cost matrix).
pub fn solve_assignment(predictions: &[(f64, f64)], measurements: &[(f64, f64)], dist_threshold: f64) -> Vec<(usize, usize)> {
    let n = predictions.len();
    let m = measurements.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let mut cost = vec![vec![0.0f64; m]; n];
    for (i, p) in predictions.iter().enumerate() {
        for (j, q) in measurements.iter().enumerate() {
            let d = ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt();
            cost[i][j] = if d > dist_threshold { INF } else { d };
        }
    }

    let assignment = hungarian(&cost);

    let mut pairs: Vec<(usize, usize)> = assignment
        .into_iter()
        .enumerate()
        .filter_map(|(i, j)| j.filter(|&j| cost[i][j].is_finite()).map(|j| (i, j)))
        .collect();
    pairs.sort_by_key(|&(i, j)| (i, j));
    pairs
}

/// Returns, for each row, the assigned column index (or `None` if the
/// optimal solution leaves it unmatched because the padded dummy cost
/// dominates). Pads the rectangular matrix to square with a large finite
/// sentinel so +inf never enters the potential arithmetic.
fn hungarian(cost: &[Vec<f64>]) -> Vec<Option<usize>> {
    let n = cost.len();
    let m = if n > 0 { cost[0].len() } else { 0 };
    let size = n.max(m);

    let finite_max = cost
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    let big = finite_max * 4.0 + 1e6;

    let mut a = vec![vec![big; size]; size];
    for i in 0..n {
        for j in 0..m {
            a[i][j] = if cost[i][j].is_finite() { cost[i][j] } else { big };
        }
    }

    // Classic O(n^3) Hungarian algorithm (Kuhn-Munkres with potentials),
    // 1-indexed internally to match the textbook formulation.
    let nn = size;
    let mut u = vec![0.0f64; nn + 1];
    let mut v = vec![0.0f64; nn + 1];
    let mut p = vec![0usize; nn + 1]; // p[j] = row assigned to column j (1-indexed), 0 = none
    let mut way = vec![0usize; nn + 1];

    for i in 1..=nn {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; nn + 1];
        let mut used = vec![false; nn + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=nn {
                if used[j] {
                    continue;
                }
                let cur = a[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=nn {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut result = vec![None; n];
    for j in 1..=nn {
        if p[j] != 0 && p[j] <= n && j <= m {
            result[p[j] - 1] = Some(j - 1);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_closest_pair_when_unambiguous() {
        let predictions = vec![(0.0, 0.0), (100.0, 100.0)];
        let measurements = vec![(1.0, 1.0), (99.0, 101.0)];
        let result = solve_assignment(&predictions, &measurements, 12.0);
        assert_eq!(result, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn drops_pairs_beyond_gate_threshold() {
        let predictions = vec![(0.0, 0.0)];
        let measurements = vec![(50.0, 50.0)];
        let result = solve_assignment(&predictions, &measurements, 12.0);
        assert!(result.is_empty());
    }

    #[test]
    fn handles_more_measurements_than_tracks() {
        let predictions = vec![(0.0, 0.0)];
        let measurements = vec![(1.0, 0.0), (40.0, 40.0)];
        let result = solve_assignment(&predictions, &measurements, 12.0);
        assert_eq!(result, vec![(0, 0)]);
    }
}
