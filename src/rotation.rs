//! Small fixed-size rotation math for orientation integration.

use crate::types::Matrix3;

/// Seed orientation `diag(-1, 1, -1)`.
pub const SEED_ROTATION: Matrix3 = [[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]];

pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Rotation of `angle` radians about a unit `axis` (Rodrigues' formula).
#[rustfmt::skip]
pub fn axis_angle(angle: f64, axis: [f64; 3]) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let [x, y, z] = axis;
    [
        [t * x * x + c,     t * x * y - s * z, t * x * z + s * y],
        [t * x * y + s * z, t * y * y + c,     t * y * z - s * x],
        [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
    ]
}

pub fn mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// Incremental rotation for one sample: `Rx(pitch) · Ry(roll) · Rz(yaw)`.
///
/// Axis assignment and multiplication order are a wire-level convention
/// that consumers depend on; do not reorder.
pub fn incremental(roll: f64, pitch: f64, yaw: f64) -> Matrix3 {
    let drot1 = axis_angle(pitch, [1.0, 0.0, 0.0]);
    let drot2 = axis_angle(roll, [0.0, 1.0, 0.0]);
    let drot3 = axis_angle(yaw, [0.0, 0.0, 1.0]);
    mul(&drot1, &mul(&drot2, &drot3))
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn column(m: &Matrix3, j: usize) -> [f64; 3] {
    [m[0][j], m[1][j], m[2][j]]
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let n = dot(v, v).sqrt();
    [v[0] / n, v[1] / n, v[2] / n]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Gram-Schmidt on the columns; removes drift accumulated by repeated products.
///
/// The third column is rebuilt as `c0 × c1`, which keeps the handedness of a
/// proper rotation. The seed is a proper rotation (det = +1), so this holds
/// for every accumulated orientation.
pub fn orthonormalize(m: &Matrix3) -> Matrix3 {
    let c0 = normalize(column(m, 0));
    let c1 = column(m, 1);
    let d = dot(c0, c1);
    let c1 = normalize([c1[0] - d * c0[0], c1[1] - d * c0[1], c1[2] - d * c0[2]]);
    let c2 = cross(c0, c1);
    [
        [c0[0], c1[0], c2[0]],
        [c0[1], c1[1], c2[1]],
        [c0[2], c1[2], c2[2]],
    ]
}

/// True if every column is unit length and the columns are mutually orthogonal.
pub fn is_orthonormal(m: &Matrix3, tolerance: f64) -> bool {
    (0..3).all(|i| {
        (0..3).all(|j| {
            let expected = if i == j { 1.0 } else { 0.0 };
            (dot(column(m, i), column(m, j)) - expected).abs() <= tolerance
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: &Matrix3, b: &Matrix3) {
        for i in 0..3 {
            for j in 0..3 {
                assert!((a[i][j] - b[i][j]).abs() < 1e-12, "{:?} != {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_axis_angle_quarter_turns() {
        let rx = axis_angle(FRAC_PI_2, [1.0, 0.0, 0.0]);
        assert_close(&rx, &[[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]]);

        let ry = axis_angle(FRAC_PI_2, [0.0, 1.0, 0.0]);
        assert_close(&ry, &[[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]]);

        let rz = axis_angle(FRAC_PI_2, [0.0, 0.0, 1.0]);
        assert_close(&rz, &[[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_incremental_zero_is_identity() {
        assert_close(&incremental(0.0, 0.0, 0.0), &IDENTITY);
    }

    #[test]
    fn test_incremental_order() {
        let expected = mul(
            &axis_angle(0.3, [1.0, 0.0, 0.0]),
            &mul(&axis_angle(0.2, [0.0, 1.0, 0.0]), &axis_angle(0.1, [0.0, 0.0, 1.0])),
        );
        assert_close(&incremental(0.2, 0.3, 0.1), &expected);
    }

    #[test]
    fn test_seed_is_orthonormal() {
        assert!(is_orthonormal(&SEED_ROTATION, 0.0));
        assert_close(&orthonormalize(&SEED_ROTATION), &SEED_ROTATION);
    }

    #[test]
    fn test_orthonormalize_repairs_drift() {
        let mut m = incremental(0.4, -1.1, 2.0);
        m[0][0] += 1e-3;
        m[2][1] -= 2e-3;
        assert!(!is_orthonormal(&m, 1e-6));
        assert!(is_orthonormal(&orthonormalize(&m), 1e-12));
    }
}
