#![allow(non_snake_case)]
use nalgebra::{DMatrix, DVector};

/// Inextensibility constraint jacobian and its Gram matrix.
///
/// Segment i connects nodes i and i+1; its squared-length constraint is
/// g_i(r) = |r_{i+1} - r_i|^2 - l_i^2 = const. Differentiating gives the row
/// pattern of J (N rows, 3(N+1) columns): -2*Delta at node i's coordinate
/// triple, +2*Delta at node (i+1)'s, Delta = r_{i+1} - r_i. Exactly 6
/// nonzeros per row; the pattern is fixed, only the values change with r, so
/// the fill overwrites the 6 slots and leaves the structural zeros alone.

/// Fills J in place from the current rod state. J must be N x 3(N+1) and
/// have been zero outside the stencil slots (it is, if it was created with
/// `DMatrix::zeros` and only ever touched by this function).
pub fn fill_constraint_jacobian(J: &mut DMatrix<f64>, r: &DVector<f64>) {
    let n = J.nrows();
    assert_eq!(J.ncols(), 3 * (n + 1), "constraint jacobian shape mismatch");
    assert_eq!(r.len(), 3 * (n + 1), "rod state length mismatch");
    for i in 0..n {
        for c in 0..3 {
            let delta = r[3 * (i + 1) + c] - r[3 * i + c];
            J[(i, 3 * i + c)] = -2.0 * delta;
            J[(i, 3 * (i + 1) + c)] = 2.0 * delta;
        }
    }
}

/// Fills the tridiagonal Gram matrix G = J*J^T of the constraint jacobian,
/// stored as main diagonal and subdiagonal. Adjacent segment rows overlap in
/// exactly one node triple, so
///
///   G[i, i]   = 8 |Delta_i|^2
///   G[i+1, i] = -4 Delta_i . Delta_{i+1}
///
/// and every farther pair of rows is orthogonal - G is exactly tridiagonal
/// for this discretization (this is what makes the LDL^T path valid).
pub fn fill_gram_tridiagonal(diag: &mut DVector<f64>, sub: &mut DVector<f64>, r: &DVector<f64>) {
    let n = diag.len();
    assert_eq!(sub.len(), n.saturating_sub(1), "Gram subdiagonal length mismatch");
    assert_eq!(r.len(), 3 * (n + 1), "rod state length mismatch");
    for i in 0..n {
        let mut norm2 = 0.0;
        for c in 0..3 {
            let delta = r[3 * (i + 1) + c] - r[3 * i + c];
            norm2 += delta * delta;
        }
        diag[i] = 8.0 * norm2;
    }
    for i in 0..n.saturating_sub(1) {
        let mut dot = 0.0;
        for c in 0..3 {
            let d0 = r[3 * (i + 1) + c] - r[3 * i + c];
            let d1 = r[3 * (i + 2) + c] - r[3 * (i + 1) + c];
            dot += d0 * d1;
        }
        sub[i] = -4.0 * dot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::relative_eq;

    fn bent_state(n: usize) -> DVector<f64> {
        // non-trivial configuration with well-separated nodes
        DVector::from_iterator(
            3 * (n + 1),
            (0..=n).flat_map(|i| {
                let s = i as f64 / n as f64;
                [s, 0.3 * (3.0 * s).sin(), 0.1 * (2.0 * s).cos()]
            }),
        )
    }

    #[test]
    fn six_nonzeros_per_row() {
        let n = 7;
        let mut J = DMatrix::zeros(n, 3 * (n + 1));
        fill_constraint_jacobian(&mut J, &bent_state(n));
        for i in 0..n {
            let nonzeros = J.row(i).iter().filter(|&&v| v != 0.0).count();
            assert_eq!(nonzeros, 6, "row {} has {} nonzeros", i, nonzeros);
        }
    }

    #[test]
    fn row_values_match_segment_differences() {
        let n = 4;
        let r = bent_state(n);
        let mut J = DMatrix::zeros(n, 3 * (n + 1));
        fill_constraint_jacobian(&mut J, &r);
        for i in 0..n {
            for c in 0..3 {
                let delta = r[3 * (i + 1) + c] - r[3 * i + c];
                assert!(relative_eq!(J[(i, 3 * i + c)], -2.0 * delta, epsilon = 1e-14));
                assert!(relative_eq!(
                    J[(i, 3 * (i + 1) + c)],
                    2.0 * delta,
                    epsilon = 1e-14
                ));
            }
        }
    }

    #[test]
    fn gram_fill_matches_dense_product() {
        let n = 9;
        let r = bent_state(n);
        let mut J = DMatrix::zeros(n, 3 * (n + 1));
        fill_constraint_jacobian(&mut J, &r);
        let G_dense = &J * J.transpose();

        let mut diag = DVector::zeros(n);
        let mut sub = DVector::zeros(n - 1);
        fill_gram_tridiagonal(&mut diag, &mut sub, &r);

        for i in 0..n {
            assert!(relative_eq!(G_dense[(i, i)], diag[i], epsilon = 1e-12));
            if i + 1 < n {
                assert!(relative_eq!(G_dense[(i + 1, i)], sub[i], epsilon = 1e-12));
            }
        }
        // off-tridiagonal entries of J*J^T really are zero
        for i in 0..n {
            for j in 0..n {
                if i.abs_diff(j) > 1 {
                    assert!(relative_eq!(G_dense[(i, j)], 0.0, epsilon = 1e-13));
                }
            }
        }
    }

    #[test]
    fn refill_overwrites_previous_values() {
        let n = 5;
        let mut J = DMatrix::zeros(n, 3 * (n + 1));
        fill_constraint_jacobian(&mut J, &bent_state(n));
        let straight =
            DVector::from_iterator(3 * (n + 1), (0..=n).flat_map(|i| [i as f64 / n as f64, 0.0, 0.0]));
        fill_constraint_jacobian(&mut J, &straight);
        let mut J_fresh = DMatrix::zeros(n, 3 * (n + 1));
        fill_constraint_jacobian(&mut J_fresh, &straight);
        assert!(relative_eq!((J - J_fresh).norm(), 0.0, epsilon = 1e-14));
    }
}
