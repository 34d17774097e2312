use nalgebra::{Matrix2, Matrix2x4, Matrix4, Vector2, Vector4};

use crate::model::Track;

pub enum KalmanUpdateOutcome {
    Updated,
    SingularCovariance,
}

fn transition(dt: f64) -> Matrix4<f64> {
    Matrix4::new(
        1.0, 0.0, dt, 0.0,
        0.0, 1.0, 0.0, dt,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

fn process_noise(dt: f64, q: f64) -> Matrix4<f64> {
    let dt2 = dt * dt;
    let dt3 = dt2 * dt;
    Matrix4::new(
        dt3 / 3.0, 0.0, dt2 / 2.0, 0.0,
        0.0, dt3 / 3.0, 0.0, dt2 / 2.0,
        dt2 / 2.0, 0.0, dt, 0.0,
        0.0, dt2 / 2.0, 0.0, dt,
    ) * q
}

fn measurement_matrix() -> Matrix2x4<f64> {
    Matrix2x4::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0)
}

/// Predict step: x <- F*x, P <- F*P*F^T + Q (spec §4.6 step 1, missed
/// counter is incremented by the caller).
pub fn kalman_predict(track: &mut Track, dt: f64, process_var: f64) {
    let f = transition(dt);
    let q = process_noise(dt, process_var);
    track.state = f * track.state;
    track.covariance = f * track.covariance * f.transpose() + q;
}

/// Standard Kalman update against measurement (range, doppler) (spec
/// §4.6 step 3). Returns `SingularCovariance` if `S` cannot be inverted,
/// in which case the track is left untouched (caller marks it coasted).
pub fn kalman_update(track: &mut Track, meas_range: f64, meas_doppler: f64, meas_var: f64) -> KalmanUpdateOutcome {
    let h = measurement_matrix();
    let r = Matrix2::identity() * meas_var;
    let z = Vector2::new(meas_range, meas_doppler);

    let y = z - h * track.state;
    let s = h * track.covariance * h.transpose() + r;

    let s_inv = match s.try_inverse() {
        Some(inv) => inv,
        None => return KalmanUpdateOutcome::SingularCovariance,
    };

    let k = track.covariance * h.transpose() * s_inv;
    track.state += k * y;
    let identity = Matrix4::identity();
    track.covariance = (identity - k * h) * track.covariance;
    KalmanUpdateOutcome::Updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_track() -> Track {
        Track::new(0, 10.0, 20.0, 0.0, Matrix4::from_diagonal(&Vector4::new(50.0, 50.0, 25.0, 25.0)))
    }

    #[test]
    fn update_with_exact_measurement_shrinks_covariance_and_keeps_state() {
        let mut track = new_track();
        let prior_diag: Vec<f64> = (0..4).map(|i| track.covariance[(i, i)]).collect();
        let prior_state = track.state;
        let outcome = kalman_update(&mut track, prior_state[0], prior_state[1], 10.0);
        assert!(matches!(outcome, KalmanUpdateOutcome::Updated));
        assert!((track.state - prior_state).norm() < 1e-9);
        for i in 0..4 {
            assert!(track.covariance[(i, i)] <= prior_diag[i] + 1e-9);
        }
        assert!(track.covariance[(0, 0)] < prior_diag[0]);
    }

    #[test]
    fn predict_advances_position_by_velocity_times_dt() {
        let mut track = new_track();
        track.state[2] = 2.0;
        track.state[3] = -1.0;
        kalman_predict(&mut track, 1.0, 1.0);
        assert!((track.state[0] - 12.0).abs() < 1e-9);
        assert!((track.state[1] - 19.0).abs() < 1e-9);
    }
}
