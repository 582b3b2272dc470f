#![allow(non_snake_case)]
use core::fmt::Display;

use crate::filament::FilamentError;
use crate::filament::constraint::{fill_constraint_jacobian, fill_gram_tridiagonal};
use crate::filament::magnetic_force::{ForceModel, RotatingDipolePair};
use crate::filament::projection::refresh_projector;
use crate::filament::stiffness::bending_stiffness;
use crate::somelinalg::ldl_tridiag::LDLTridiag;
use log::info;
use nalgebra::{DMatrix, DVector};

/// Right-hand-side evaluator of the constrained filament dynamics
///
///   dr/dt = P(r) * (A*r + F(t))
///
/// built for consumption by an external ODE integrator: the integrator owns
/// the time stepping, error control and step-size logic and calls
/// `evaluate_into` (and, for implicit schemes, `analytic_jacobian_into`)
/// repeatedly, possibly at non-monotonic trial times. All mutable state is
/// scratch owned by this instance; given the same (r, t) the produced
/// derivative is identical, and no allocation happens after construction.
/// One evaluator instance per integration run - instances are not shared.
pub struct FilamentEvaluator {
    n_segments: usize,
    mu: f64,
    cm: f64,
    omega: f64,
    force_model: Box<dyn ForceModel>,
    /// constant bending stiffness operator, pre-scaled by -mu^4
    A: DMatrix<f64>,
    /// constraint jacobian of the last seen configuration
    J: DMatrix<f64>,
    /// projector onto the constraint tangent space of the last seen configuration
    P: DMatrix<f64>,
    g_diag: DVector<f64>,
    g_sub: DVector<f64>,
    ldl: LDLTridiag,
    /// workspace for the Gram solve G*X = J
    X: DMatrix<f64>,
    F: DVector<f64>,
    /// scratch: unconstrained dynamics u = A*r + F
    S1: DVector<f64>,
    /// scratch: projected derivative P*u
    S2: DVector<f64>,
}

impl Display for FilamentEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FilamentEvaluator {{ N: {}, mu: {}, Cm: {}, omega: {} }}",
            self.n_segments, self.mu, self.cm, self.omega
        )
    }
}

impl FilamentEvaluator {
    /// Builds the evaluator: validates the parameters, assembles the
    /// stiffness operator once and sizes every buffer to N. Fails with
    /// `ConfigurationError` on N < 3 (the bending stencil needs the four
    /// boundary rows to be distinct) or on negative / non-finite physics.
    pub fn new(
        n_segments: usize,
        mu: f64,
        cm: f64,
        omega: f64,
    ) -> Result<FilamentEvaluator, FilamentError> {
        if n_segments < 3 {
            return Err(FilamentError::ConfigurationError(format!(
                "N must be >= 3, got {}",
                n_segments
            )));
        }
        for (name, value) in [("mu", mu), ("Cm", cm), ("omega", omega)] {
            if !value.is_finite() || value < 0.0 {
                return Err(FilamentError::ConfigurationError(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        let dim = 3 * (n_segments + 1);
        let evaluator = FilamentEvaluator {
            n_segments,
            mu,
            cm,
            omega,
            force_model: Box::new(RotatingDipolePair::new(n_segments, mu, cm, omega)),
            A: bending_stiffness(n_segments, mu),
            J: DMatrix::zeros(n_segments, dim),
            P: DMatrix::zeros(dim, dim),
            g_diag: DVector::zeros(n_segments),
            g_sub: DVector::zeros(n_segments - 1),
            ldl: LDLTridiag::new(n_segments),
            X: DMatrix::zeros(n_segments, dim),
            F: DVector::zeros(dim),
            S1: DVector::zeros(dim),
            S2: DVector::zeros(dim),
        };
        info!(
            "FilamentEvaluator created: N = {}, state dimension = {}",
            n_segments, dim
        );
        Ok(evaluator)
    }

    /// Swaps in a different force model (same dimensioning rules as the
    /// default rotating dipole pair).
    pub fn with_force_model(mut self, force_model: Box<dyn ForceModel>) -> FilamentEvaluator {
        self.force_model = force_model;
        self
    }

    pub fn n_segments(&self) -> usize {
        self.n_segments
    }

    /// State vector length 3*(N+1).
    pub fn dim(&self) -> usize {
        3 * (self.n_segments + 1)
    }

    /// Straight-line initial rod along the x axis, unit total length:
    /// node i sits at (i/N, 0, 0).
    pub fn initial_configuration(n_segments: usize) -> DVector<f64> {
        let h = 1.0 / n_segments as f64;
        DVector::from_iterator(
            3 * (n_segments + 1),
            (0..=n_segments).flat_map(|i| [i as f64 * h, 0.0, 0.0]),
        )
    }

    /// Refreshes J, G and P from the given configuration. Fails with
    /// `DegenerateConfiguration` when a segment has (near-)coincident
    /// endpoints - a genuine modeling failure, terminal for the run.
    fn refresh_constraint_state(&mut self, r: &DVector<f64>) -> Result<(), FilamentError> {
        fill_constraint_jacobian(&mut self.J, r);
        fill_gram_tridiagonal(&mut self.g_diag, &mut self.g_sub, r);
        refresh_projector(
            &mut self.P,
            &mut self.X,
            &mut self.ldl,
            &self.J,
            &self.g_diag,
            &self.g_sub,
        )
    }

    /// Computes dr/dt = P*(A*r + F(t)) into `drdt`. Allocation-free: every
    /// intermediate lives in the scratch buffers owned by this instance. The
    /// state is borrowed for the duration of the call only.
    pub fn evaluate_into(
        &mut self,
        r: &DVector<f64>,
        t: f64,
        drdt: &mut DVector<f64>,
    ) -> Result<(), FilamentError> {
        assert_eq!(r.len(), self.dim(), "rod state length mismatch");
        assert_eq!(drdt.len(), self.dim(), "derivative length mismatch");
        self.refresh_constraint_state(r)?;
        self.force_model.apply(&mut self.F, t);
        // u = A*r + F
        self.S1.gemv(1.0, &self.A, r, 0.0);
        self.S1.axpy(1.0, &self.F, 1.0);
        // dr/dt = P*u
        self.S2.gemv(1.0, &self.P, &self.S1, 0.0);
        drdt.copy_from(&self.S2);
        Ok(())
    }

    /// Convenience wrapper returning an owned derivative vector.
    pub fn evaluate(&mut self, r: &DVector<f64>, t: f64) -> Result<DVector<f64>, FilamentError> {
        let mut drdt = DVector::zeros(self.dim());
        self.evaluate_into(r, t, &mut drdt)?;
        Ok(drdt)
    }

    /// Analytic jacobian of the dynamics with the projector frozen at the
    /// current configuration: d(dr/dt)/dr = P*A. Exposed so an implicit
    /// integrator can run its Newton solver without finite differencing the
    /// right-hand side. `t` is accepted for signature compatibility with the
    /// derivative callback; the jacobian does not depend on it.
    pub fn analytic_jacobian_into(
        &mut self,
        r: &DVector<f64>,
        _t: f64,
        jac: &mut DMatrix<f64>,
    ) -> Result<(), FilamentError> {
        assert_eq!(r.len(), self.dim(), "rod state length mismatch");
        assert_eq!(jac.shape(), (self.dim(), self.dim()), "jacobian shape mismatch");
        self.refresh_constraint_state(r)?;
        jac.gemm(1.0, &self.P, &self.A, 0.0);
        Ok(())
    }

    /// Convenience wrapper returning an owned jacobian matrix.
    pub fn analytic_jacobian(
        &mut self,
        r: &DVector<f64>,
        t: f64,
    ) -> Result<DMatrix<f64>, FilamentError> {
        let mut jac = DMatrix::zeros(self.dim(), self.dim());
        self.analytic_jacobian_into(r, t, &mut jac)?;
        Ok(jac)
    }
}
