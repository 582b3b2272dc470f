#![allow(non_snake_case)]
use nalgebra::DMatrix;

/// Discretized bending stiffness operator of the rod.
///
/// The bending energy is a 4th derivative along the rod, discretized on the
/// N+1 nodes with the classical 5-point stencil [1, -4, 6, -4, 1] in the
/// interior and fixed-free rows at both ends:
///
///   row 0:   [ 1, -2,  1]
///   row 1:   [-2,  5, -4,  1]
///   ...interior...
///   row N-1: [ 1, -4,  5, -2]
///   row N:   [ 1, -2,  1]
///
/// The whole stencil matrix is pre-scaled by -mu^4, so A*r already carries the
/// sign and magnitude of the elastic force. The scalar stencil acts on each of
/// the x, y, z coordinate families independently; with the interleaved state
/// layout this means A[3i+c, 3j+c] = B[i, j] and zero between families.
///
/// Pure function of (N, mu); the evaluator builds it once and caches it.
/// Requires N >= 3 so that the four boundary rows are distinct.
pub fn bending_stiffness(n_segments: usize, mu: f64) -> DMatrix<f64> {
    let B = bending_stencil(n_segments, mu);
    interleave_blockwise(&B)
}

/// The scalar (N+1)x(N+1) stencil matrix, already scaled by -mu^4.
pub fn bending_stencil(n_segments: usize, mu: f64) -> DMatrix<f64> {
    assert!(
        n_segments >= 3,
        "bending stencil needs at least 3 segments, got {}",
        n_segments
    );
    let m = n_segments + 1;
    let mut B = DMatrix::zeros(m, m);
    for i in 2..m - 2 {
        B[(i, i - 2)] = 1.0;
        B[(i, i - 1)] = -4.0;
        B[(i, i)] = 6.0;
        B[(i, i + 1)] = -4.0;
        B[(i, i + 2)] = 1.0;
    }
    B[(0, 0)] = 1.0;
    B[(0, 1)] = -2.0;
    B[(0, 2)] = 1.0;

    B[(1, 0)] = -2.0;
    B[(1, 1)] = 5.0;
    B[(1, 2)] = -4.0;
    B[(1, 3)] = 1.0;

    B[(m - 2, m - 4)] = 1.0;
    B[(m - 2, m - 3)] = -4.0;
    B[(m - 2, m - 2)] = 5.0;
    B[(m - 2, m - 1)] = -2.0;

    B[(m - 1, m - 3)] = 1.0;
    B[(m - 1, m - 2)] = -2.0;
    B[(m - 1, m - 1)] = 1.0;

    B.scale_mut(-mu.powi(4));
    B
}

/// Expands the scalar stencil into the interleaved 3(N+1) layout.
fn interleave_blockwise(B: &DMatrix<f64>) -> DMatrix<f64> {
    let m = B.nrows();
    let mut A = DMatrix::zeros(3 * m, 3 * m);
    for i in 0..m {
        for j in 0..m {
            let b = B[(i, j)];
            if b != 0.0 {
                for c in 0..3 {
                    A[(3 * i + c, 3 * j + c)] = b;
                }
            }
        }
    }
    A
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::relative_eq;
    use nalgebra::DVector;

    #[test]
    fn stencil_is_symmetric() {
        for n in [3, 4, 5, 10, 20] {
            let B = bending_stencil(n, 1.3);
            let diff = (&B - B.transpose()).norm();
            assert!(
                relative_eq!(diff, 0.0, epsilon = 1e-14),
                "stencil asymmetric for N = {}",
                n
            );
        }
    }

    #[test]
    fn stiffness_is_symmetric() {
        for n in [3, 7, 20] {
            let A = bending_stiffness(n, 0.7);
            let diff = (&A - A.transpose()).norm();
            assert!(
                relative_eq!(diff, 0.0, epsilon = 1e-14),
                "stiffness asymmetric for N = {}",
                n
            );
        }
    }

    #[test]
    fn smallest_stencil_values() {
        // N = 3: only the four boundary rows, scaled by -mu^4 with mu = 1
        let B = bending_stencil(3, 1.0);
        #[rustfmt::skip]
        let expected = DMatrix::from_row_slice(4, 4, &[
            -1.0,  2.0, -1.0,  0.0,
             2.0, -5.0,  4.0, -1.0,
            -1.0,  4.0, -5.0,  2.0,
             0.0, -1.0,  2.0, -1.0,
        ]);
        assert!(relative_eq!((B - expected).norm(), 0.0, epsilon = 1e-14));
    }

    #[test]
    fn straight_configurations_carry_no_bending_force() {
        // every row of the stencil annihilates affine node sequences
        let n = 12;
        let B = bending_stencil(n, 2.0);
        let affine = DVector::from_iterator(n + 1, (0..=n).map(|i| 0.25 + 0.7 * i as f64));
        let force = &B * affine;
        assert!(relative_eq!(force.norm(), 0.0, epsilon = 1e-10));
    }

    #[test]
    fn interleaved_layout_keeps_families_decoupled() {
        let n = 5;
        let A = bending_stiffness(n, 1.0);
        assert_eq!(A.nrows(), 3 * (n + 1));
        for i in 0..3 * (n + 1) {
            for j in 0..3 * (n + 1) {
                if i % 3 != j % 3 {
                    assert_eq!(A[(i, j)], 0.0, "coupling between coordinate families");
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "at least 3 segments")]
    fn too_few_segments_panics() {
        bending_stencil(2, 1.0);
    }
}
