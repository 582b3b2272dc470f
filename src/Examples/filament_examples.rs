#![allow(non_snake_case)]
//! Runnable demonstrations of the filament evaluator. The fixed-step RK4 loop
//! here is a stand-in for the external ODE integrator that owns the time
//! stepping in real use; it exists so the examples are self-contained.
use crate::Utils::logger::{node_headers, save_trajectory_to_csv};
use crate::filament::{FilamentError, FilamentEvaluator};
use log::info;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// One classical RK4 step with the evaluator as the derivative callback.
fn rk4_step(
    evaluator: &mut FilamentEvaluator,
    r: &DVector<f64>,
    t: f64,
    h: f64,
) -> Result<DVector<f64>, FilamentError> {
    let k1 = evaluator.evaluate(r, t)?;
    let k2 = evaluator.evaluate(&(r + 0.5 * h * &k1), t + 0.5 * h)?;
    let k3 = evaluator.evaluate(&(r + 0.5 * h * &k2), t + 0.5 * h)?;
    let k4 = evaluator.evaluate(&(r + h * &k3), t + h)?;
    Ok(r + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4))
}

/// Single derivative evaluation on the straight initial rod.
pub fn single_evaluation_example() {
    let n = 20;
    let mut evaluator = FilamentEvaluator::new(n, 0.57, 32.0, 2.0 * std::f64::consts::PI)
        .expect("valid parameters");
    let r = FilamentEvaluator::initial_configuration(n);
    let drdt = evaluator.evaluate(&r, 0.0).expect("regular configuration");
    info!("{}", evaluator);
    info!("|dr/dt| at t = 0: {}", drdt.norm());
    info!(
        "endpoint transverse velocities: y0' = {}, yN' = {}",
        drdt[1],
        drdt[3 * n + 1]
    );
}

/// Short fixed-step RK4 run dumping the node trajectory to csv.
pub fn rk4_trajectory_example(filename: &str) -> Result<(), FilamentError> {
    let n = 20;
    let h = 1e-4;
    let steps = 200;
    let mut evaluator = FilamentEvaluator::new(n, 0.57, 32.0, 2.0 * std::f64::consts::PI)?;
    let mut r = FilamentEvaluator::initial_configuration(n);

    let mut times = Vec::with_capacity(steps + 1);
    let mut snapshots: Vec<DVector<f64>> = Vec::with_capacity(steps + 1);
    times.push(0.0);
    snapshots.push(r.clone());
    for k in 0..steps {
        let t = k as f64 * h;
        r = rk4_step(&mut evaluator, &r, t, h)?;
        times.push(t + h);
        snapshots.push(r.clone());
    }

    let mut flat: Vec<f64> = Vec::with_capacity(snapshots.len() * evaluator.dim());
    for snapshot in snapshots.iter() {
        flat.extend(snapshot.iter());
    }
    let trajectory =
        DMatrix::from_vec(evaluator.dim(), snapshots.len(), flat).transpose();
    let t_mesh = DVector::from_vec(times);
    let headers = node_headers(n);
    if let Err(e) = save_trajectory_to_csv(&trajectory, &headers, filename, &t_mesh, &"t".to_string())
    {
        info!("trajectory dump failed: {}", e);
    } else {
        info!("trajectory written to {}", filename);
    }
    info!("tip deflection y_N({}) = {}", steps as f64 * h, r[3 * n + 1]);
    Ok(())
}

/// Parallel parameter sweep over the driving frequency. One evaluator
/// instance per run - no shared mutable state between the rayon workers.
pub fn omega_sweep_example() -> Vec<(f64, f64)> {
    let n = 20;
    let h = 1e-4;
    let steps = 100;
    let omegas: Vec<f64> = (1..=6).map(|k| k as f64 * std::f64::consts::PI).collect();

    let results: Vec<(f64, f64)> = omegas
        .par_iter()
        .map(|&omega| {
            let mut evaluator =
                FilamentEvaluator::new(n, 0.57, 32.0, omega).expect("valid parameters");
            let mut r = FilamentEvaluator::initial_configuration(n);
            for k in 0..steps {
                let t = k as f64 * h;
                r = rk4_step(&mut evaluator, &r, t, h).expect("regular configuration");
            }
            (omega, r[3 * n + 1])
        })
        .collect();

    for (omega, tip_y) in results.iter() {
        info!("omega = {:>8.4}: tip deflection y_N = {:>12.5e}", omega, tip_y);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rk4_preserves_segment_lengths_over_a_short_run() {
        let n = 10;
        let h = 1e-5;
        let mut evaluator =
            FilamentEvaluator::new(n, 0.57, 32.0, 2.0 * std::f64::consts::PI).unwrap();
        let mut r = FilamentEvaluator::initial_configuration(n);
        let segment_length = 1.0 / n as f64;
        for k in 0..50 {
            let t = k as f64 * h;
            r = rk4_step(&mut evaluator, &r, t, h).unwrap();
        }
        for i in 0..n {
            let mut len2 = 0.0;
            for c in 0..3 {
                let d = r[3 * (i + 1) + c] - r[3 * i + c];
                len2 += d * d;
            }
            let drift = (len2.sqrt() - segment_length).abs() / segment_length;
            assert!(
                drift < 1e-6,
                "segment {} stretched by relative {}",
                i,
                drift
            );
        }
    }

    #[test]
    fn sweep_returns_one_result_per_omega() {
        let results = omega_sweep_example();
        assert_eq!(results.len(), 6);
        for (omega, tip_y) in results {
            assert!(omega > 0.0);
            assert!(tip_y.is_finite());
        }
    }
}
