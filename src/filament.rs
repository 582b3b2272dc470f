#![allow(non_snake_case)]
//! Constrained Kirchhoff rod (magnetic filament) model.
//!
//! The filament is discretized into N inextensible segments joined at N+1
//! nodes; the state vector holds the interleaved (x, y, z) coordinates of the
//! nodes, 3*(N+1) numbers in total. The dynamics are
//!
//!   dr/dt = P * (A*r + F(t))
//!
//! where A is the (constant) discretized bending stiffness operator, F(t) is a
//! rotating magnetic force pair applied at the two endpoints and P is the
//! orthogonal projector onto the tangent space of the segment-length
//! constraints, P = I - J^T (J J^T)^-1 J with J the constraint jacobian of the
//! current configuration. The time stepping itself belongs to an external ODE
//! integrator; this module only provides the derivative evaluation (and the
//! analytic jacobian P*A for implicit schemes).
//!
//! Submodules, leaf first:
//! - `stiffness` - the bending stiffness matrix A (built once),
//! - `magnetic_force` - the endpoint force pair F(t),
//! - `constraint` - the constraint jacobian J and the tridiagonal Gram matrix J*J^T,
//! - `projection` - the projector refresh via the LDL^T solve in `somelinalg`,
//! - `evaluator` - the `FilamentEvaluator` tying it all together.

use std::fmt;

pub mod constraint;
pub mod evaluator;
pub mod magnetic_force;
pub mod projection;
pub mod stiffness;

pub use evaluator::FilamentEvaluator;
pub use magnetic_force::{ForceModel, RotatingDipolePair};

#[derive(Debug)]
pub enum FilamentError {
    /// invalid construction parameters: N < 3, negative or non-finite physics
    ConfigurationError(String),
    /// (near-)singular Gram matrix during projection: segment `segment` has
    /// (numerically) coincident endpoints. Terminal for the run - retrying at
    /// the same state cannot help.
    DegenerateConfiguration { segment: usize },
}

impl fmt::Display for FilamentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FilamentError::ConfigurationError(msg) => {
                write!(f, "invalid filament configuration: {}", msg)
            }
            FilamentError::DegenerateConfiguration { segment } => {
                write!(
                    f,
                    "degenerate rod configuration: segment {} has (near-)zero length",
                    segment
                )
            }
        }
    }
}

impl std::error::Error for FilamentError {}
