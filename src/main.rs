#![allow(non_snake_case)]
use RustedFilament::Examples::filament_examples::{
    omega_sweep_example, rk4_trajectory_example, single_evaluation_example,
};
use RustedFilament::Utils::logger::init_logger;

fn main() {
    init_logger(Some("info"));
    let example = 0;
    match example {
        0 => {
            // one derivative evaluation on the straight rod
            single_evaluation_example();
        }
        1 => {
            // short fixed-step run, trajectory dumped to csv
            rk4_trajectory_example("filament_trajectory.csv").expect("run failed");
        }
        2 => {
            // parallel sweep over the driving frequency
            let _ = omega_sweep_example();
        }
        _ => {
            println!("no such example: {}", example);
        }
    }
}
