//! Tilt and azimuth correction relative to an optimally oriented plane.

/// Tilt rows of [`FACTORS`] (degrees, relative to a 30° optimum).
const TILT_ROWS_DEG: [f64; 8] = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 90.0];

/// Azimuth deviation columns of [`FACTORS`] (degrees away from equator-facing).
const AZIMUTH_COLS_DEG: [f64; 5] = [0.0, 45.0, 90.0, 135.0, 180.0];

/// Annual yield relative to the optimum for a site whose optimal tilt is 30°.
const FACTORS: [[f64; 5]; 8] = [
    [0.89, 0.89, 0.89, 0.89, 0.89],
    [0.95, 0.94, 0.90, 0.86, 0.84],
    [0.99, 0.97, 0.90, 0.82, 0.78],
    [1.00, 0.97, 0.88, 0.77, 0.71],
    [0.99, 0.95, 0.85, 0.71, 0.63],
    [0.96, 0.92, 0.81, 0.65, 0.55],
    [0.91, 0.87, 0.76, 0.59, 0.48],
    [0.67, 0.65, 0.56, 0.41, 0.30],
];

const TABLE_OPTIMUM_DEG: f64 = 30.0;

/// Optimal fixed tilt for a latitude, capped at 60°.
pub fn optimal_tilt_deg(latitude: f64) -> f64 {
    (0.76 * latitude.abs() + 3.1).min(60.0)
}

/// Angular distance between the array azimuth and the equator-facing
/// direction, in `[0, 180]`.
pub fn azimuth_deviation_deg(latitude: f64, azimuth_deg: f64) -> f64 {
    let equator_facing = if latitude >= 0.0 { 180.0 } else { 0.0 };
    let diff = (azimuth_deg - equator_facing).rem_euclid(360.0);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Yield multiplier for an array at `tilt_deg`/`azimuth_deg` relative to
/// the optimally oriented plane at `latitude`.
///
/// The tabulated factors are shifted so the table optimum lines up with the
/// latitude's optimal tilt, then bilinearly interpolated. A flat array is
/// insensitive to azimuth.
pub fn orientation_factor(latitude: f64, tilt_deg: f64, azimuth_deg: f64) -> f64 {
    let tilt = tilt_deg.clamp(0.0, 90.0);
    let deviation = if tilt <= f64::EPSILON {
        0.0
    } else {
        azimuth_deviation_deg(latitude, azimuth_deg)
    };
    let effective_tilt =
        (tilt - optimal_tilt_deg(latitude) + TABLE_OPTIMUM_DEG).clamp(0.0, 90.0);
    bilinear(effective_tilt, deviation)
}

fn bracket(axis: &[f64], x: f64) -> (usize, f64) {
    for i in 0..axis.len() - 1 {
        if x <= axis[i + 1] {
            let t = (x - axis[i]) / (axis[i + 1] - axis[i]);
            return (i, t.clamp(0.0, 1.0));
        }
    }
    (axis.len() - 2, 1.0)
}

fn bilinear(tilt: f64, deviation: f64) -> f64 {
    let (r, tr) = bracket(&TILT_ROWS_DEG, tilt);
    let (c, tc) = bracket(&AZIMUTH_COLS_DEG, deviation);
    let top = FACTORS[r][c] + (FACTORS[r][c + 1] - FACTORS[r][c]) * tc;
    let bottom = FACTORS[r + 1][c] + (FACTORS[r + 1][c + 1] - FACTORS[r + 1][c]) * tc;
    top + (bottom - top) * tr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimal_orientation_is_unity() {
        let lat = 35.0;
        let f = orientation_factor(lat, optimal_tilt_deg(lat), 180.0);
        assert!((f - 1.0).abs() < 1e-9);
    }

    #[test]
    fn southern_hemisphere_faces_north() {
        let lat = -23.5;
        let north = orientation_factor(lat, optimal_tilt_deg(lat), 0.0);
        let south = orientation_factor(lat, optimal_tilt_deg(lat), 180.0);
        assert!((north - 1.0).abs() < 1e-9);
        assert!(south < north);
    }

    #[test]
    fn azimuth_deviation_wraps() {
        assert_eq!(azimuth_deviation_deg(45.0, 180.0), 0.0);
        assert_eq!(azimuth_deviation_deg(45.0, 90.0), 90.0);
        assert_eq!(azimuth_deviation_deg(45.0, 270.0), 90.0);
        assert_eq!(azimuth_deviation_deg(-10.0, 350.0), 10.0);
        assert_eq!(azimuth_deviation_deg(45.0, 0.0), 180.0);
    }

    #[test]
    fn flat_array_ignores_azimuth() {
        let east = orientation_factor(50.0, 0.0, 90.0);
        let north = orientation_factor(50.0, 0.0, 0.0);
        assert_eq!(east, north);
    }

    #[test]
    fn factor_stays_in_table_range() {
        for tilt in [0.0, 15.0, 45.0, 75.0, 90.0] {
            for az in [0.0, 60.0, 120.0, 180.0, 240.0, 300.0] {
                let f = orientation_factor(30.0, tilt, az);
                assert!((0.30..=1.0).contains(&f), "tilt={tilt} az={az} f={f}");
            }
        }
    }

    #[test]
    fn interpolates_between_rows() {
        // Table optimum at latitude where optimal tilt is exactly 30°.
        let lat = (30.0 - 3.1) / 0.76;
        let f = orientation_factor(lat, 35.0, 180.0);
        assert!((f - 0.995).abs() < 1e-9);
    }
}
