#![allow(non_snake_case)]
use nalgebra::DVector;

/// External force model seam. The evaluator only needs "fill the force vector
/// for time t"; anything satisfying that can be plugged in, the default being
/// the rotating magnetic dipole pair of the filament benchmark problem.
pub trait ForceModel {
    fn apply(&self, force: &mut DVector<f64>, t: f64);
}

/// Rotating magnetic dipole pair: equal and opposite forces of magnitude
/// mu*Cm applied at the two rod endpoints, rotating in the (x, y) plane at
/// angular rate omega. Node 0 carries the negative lobe, node N the positive
/// one, so the pair exerts a pure torque on the rod. Pure and stateless
/// given t.
#[derive(Debug, Clone)]
pub struct RotatingDipolePair {
    n_segments: usize,
    magnitude: f64,
    omega: f64,
}

impl RotatingDipolePair {
    pub fn new(n_segments: usize, mu: f64, cm: f64, omega: f64) -> RotatingDipolePair {
        RotatingDipolePair {
            n_segments,
            magnitude: mu * cm,
            omega,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }
}

impl ForceModel for RotatingDipolePair {
    fn apply(&self, force: &mut DVector<f64>, t: f64) {
        debug_assert_eq!(force.len(), 3 * (self.n_segments + 1));
        force.fill(0.0);
        let phase = self.omega * t;
        let fx = self.magnitude * phase.cos();
        let fy = self.magnitude * phase.sin();
        let far = 3 * self.n_segments;
        force[0] = -fx;
        force[1] = -fy;
        force[far] = fx;
        force[far + 1] = fy;
    }
}
