#![allow(non_snake_case)]
use crate::filament::FilamentError;
use crate::somelinalg::ldl_tridiag::{LDLTridiag, LdlError};
use nalgebra::DMatrix;
use nalgebra::DVector;

/// Projector onto the constraint tangent space, P = I - J^T (J J^T)^-1 J.
///
/// Computed as: factor the tridiagonal Gram matrix G = J*J^T with LDL^T,
/// solve G*X = J column by column into the preallocated workspace X, then
/// P = I - X^T*J via one in-place gemm_tr. P is applied to vectors
/// downstream, never inverted further. A failing pivot in the factorization
/// means a segment with (numerically) coincident endpoints and is surfaced
/// as `DegenerateConfiguration`; NaNs never propagate silently.
pub fn refresh_projector(
    P: &mut DMatrix<f64>,
    X: &mut DMatrix<f64>,
    ldl: &mut LDLTridiag,
    J: &DMatrix<f64>,
    g_diag: &DVector<f64>,
    g_sub: &DVector<f64>,
) -> Result<(), FilamentError> {
    let n = J.nrows();
    let dim = J.ncols();
    assert_eq!(P.shape(), (dim, dim), "projector shape mismatch");
    assert_eq!(X.shape(), (n, dim), "solve workspace shape mismatch");
    assert_eq!(ldl.n(), n, "LDL^T size mismatch");

    ldl.factorize(g_diag, g_sub).map_err(|e| match e {
        LdlError::NearZeroPivot { index, .. } => {
            FilamentError::DegenerateConfiguration { segment: index }
        }
        LdlError::DimensionMismatch { expected, found } => FilamentError::ConfigurationError(
            format!("Gram storage sized {} for {} segments", found, expected),
        ),
    })?;

    X.copy_from(J);
    ldl.solve_matrix_mut(X);

    P.fill_with_identity();
    // P <- P - X^T * J
    P.gemm_tr(-1.0, X, J, 1.0);
    Ok(())
}
