#![allow(non_snake_case)]
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// LDL^T decomposition of a symmetric tridiagonal matrix. The matrix is never
/// stored densely, only its main diagonal and subdiagonal are passed in, and the
/// factor buffers are owned by the struct so repeated factorizations allocate
/// nothing.
///
/// For a symmetric tridiagonal G the factorization G = L*D*L^T costs O(n):
/// d[0] = G[0,0];  l[i] = G[i+1,i]/d[i];  d[i+1] = G[i+1,i+1] - l[i]^2 * d[i]
/// and each solve is a forward sweep, a diagonal scaling and a backward sweep.
/// faster than a general dense factorization by a factor of ~n^2; the factorization
/// and solves here are the dominant cost of the constraint projection, hence the
/// special case.

#[derive(Debug)]
pub enum LdlError {
    /// pivot d[index] fell below the relative degeneracy threshold
    NearZeroPivot { index: usize, pivot: f64 },
    DimensionMismatch { expected: usize, found: usize },
}

impl fmt::Display for LdlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LdlError::NearZeroPivot { index, pivot } => {
                write!(f, "near-zero pivot {} at row {}", pivot, index)
            }
            LdlError::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for LdlError {}

pub struct LDLTridiag {
    n: usize,
    d: DVector<f64>,
    l: DVector<f64>,
    factorized: bool,
}

impl LDLTridiag {
    pub fn new(n: usize) -> LDLTridiag {
        let sub_len = n.saturating_sub(1);
        LDLTridiag {
            n,
            d: DVector::zeros(n),
            l: DVector::zeros(sub_len),
            factorized: false,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Factorizes G given its main diagonal and subdiagonal. Pivots are checked
    /// against a relative threshold n * eps * max|diag| (with an absolute floor
    /// so an all-zero matrix is still rejected); a failing pivot means the
    /// matrix is singular or numerically indistinguishable from singular.
    pub fn factorize(&mut self, diag: &DVector<f64>, sub: &DVector<f64>) -> Result<(), LdlError> {
        let n = self.n;
        if diag.len() != n {
            return Err(LdlError::DimensionMismatch {
                expected: n,
                found: diag.len(),
            });
        }
        if sub.len() != n.saturating_sub(1) {
            return Err(LdlError::DimensionMismatch {
                expected: n.saturating_sub(1),
                found: sub.len(),
            });
        }
        self.factorized = false;
        if n == 0 {
            self.factorized = true;
            return Ok(());
        }
        let tol = (n as f64 * f64::EPSILON * diag.amax()).max(f64::MIN_POSITIVE);

        self.d[0] = diag[0];
        if !(self.d[0] > tol) {
            return Err(LdlError::NearZeroPivot {
                index: 0,
                pivot: self.d[0],
            });
        }
        for i in 1..n {
            let m = sub[i - 1] / self.d[i - 1];
            self.l[i - 1] = m;
            self.d[i] = diag[i] - m * m * self.d[i - 1];
            if !(self.d[i] > tol) {
                return Err(LdlError::NearZeroPivot {
                    index: i,
                    pivot: self.d[i],
                });
            }
        }
        self.factorized = true;
        Ok(())
    }

    /// Solves G*x = b in place. Must be called after a successful `factorize`.
    pub fn solve_mut(&self, b: &mut DVector<f64>) {
        assert!(self.factorized, "LDLTridiag: solve before factorize");
        assert_eq!(b.len(), self.n, "LDLTridiag solve dimension mismatch");
        let n = self.n;
        // forward sweep L*y = b
        for i in 1..n {
            b[i] -= self.l[i - 1] * b[i - 1];
        }
        // diagonal D*z = y
        for i in 0..n {
            b[i] /= self.d[i];
        }
        // backward sweep L^T*x = z
        for i in (0..n.saturating_sub(1)).rev() {
            b[i] -= self.l[i] * b[i + 1];
        }
    }

    /// Solves G*X = B column by column, in place. B has n rows and any number
    /// of columns; this is the shape used by the constraint projection, where
    /// B is the constraint jacobian itself.
    pub fn solve_matrix_mut(&self, b: &mut DMatrix<f64>) {
        assert!(self.factorized, "LDLTridiag: solve before factorize");
        assert_eq!(b.nrows(), self.n, "LDLTridiag solve dimension mismatch");
        let n = self.n;
        for j in 0..b.ncols() {
            for i in 1..n {
                let m = self.l[i - 1];
                b[(i, j)] -= m * b[(i - 1, j)];
            }
            for i in 0..n {
                b[(i, j)] /= self.d[i];
            }
            for i in (0..n.saturating_sub(1)).rev() {
                let m = self.l[i];
                b[(i, j)] -= m * b[(i + 1, j)];
            }
        }
    }

    /// Reassembles the dense matrix L*D*L^T, for tests and diagnostics only.
    pub fn reconstruct(&self) -> DMatrix<f64> {
        assert!(self.factorized, "LDLTridiag: reconstruct before factorize");
        let n = self.n;
        let mut L = DMatrix::identity(n, n);
        for i in 0..n.saturating_sub(1) {
            L[(i + 1, i)] = self.l[i];
        }
        let D = DMatrix::from_diagonal(&self.d);
        &L * D * L.transpose()
    }
}
