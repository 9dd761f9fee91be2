//! Orchestration: runs the lab phase then the lecture phase in strict order
//! (§5), threading solver parameters and structured logging through both.
//!
//! Grounded on `bc-ross-ross/src/model/two_stage_schedule.rs`'s `SatParameters`
//! setup and `original_source`'s staged `main()` sequencing.

use crate::assignment::{LabAssignment, LectureAssignment};
use crate::error::Result;
use crate::model::lab::solve_lab_phase;
use crate::model::lecture::solve_lecture_phase;
use crate::resources::Catalog;
use crate::time::TimeModel;
use cp_sat::proto::SatParameters;

/// Solver budget and search tuning, threaded from the CLI down to
/// `SatParameters` for both phases (§5, §9).
#[derive(Debug, Clone)]
pub struct SolverParams {
    pub timeout_secs: f64,
    pub workers: u32,
    pub seed: i64,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            timeout_secs: 120.0,
            workers: 16,
            seed: 42,
        }
    }
}

impl SolverParams {
    pub fn to_sat_parameters(&self) -> SatParameters {
        let mut params = SatParameters::default();
        params.max_time_in_seconds = Some(self.timeout_secs);
        params.num_search_workers = Some(self.workers as i32);
        params.random_seed = Some(self.seed as i32);
        params.randomize_search = Some(false);
        params.log_search_progress = Some(false);
        params
    }
}

/// The complete solved output of both phases (§4.4 consumes this pair).
pub struct SolvedSchedule {
    pub labs: Vec<LabAssignment>,
    pub lectures: Vec<LectureAssignment>,
}

/// Runs the lab phase, then the lecture phase over its output. The lecture
/// phase never runs unless the lab phase succeeds (§5 ordering).
pub fn solve(time_model: &TimeModel, catalog: &Catalog, params: &SolverParams) -> Result<SolvedSchedule> {
    tracing::info!("starting lab phase");
    let labs = solve_lab_phase(time_model, catalog, params)?;

    tracing::info!(labs = labs.len(), "starting lecture phase");
    let lectures = solve_lecture_phase(time_model, catalog, &labs, params)?;

    Ok(SolvedSchedule { labs, lectures })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_map_onto_sat_parameters() {
        let params = SolverParams::default();
        let sat = params.to_sat_parameters();
        assert_eq!(sat.max_time_in_seconds, Some(120.0));
        assert_eq!(sat.num_search_workers, Some(16));
        assert_eq!(sat.random_seed, Some(42));
        assert_eq!(sat.randomize_search, Some(false));
        assert_eq!(sat.log_search_progress, Some(false));
    }

    #[test]
    fn custom_params_carry_through() {
        let params = SolverParams {
            timeout_secs: 30.0,
            workers: 4,
            seed: 7,
        };
        let sat = params.to_sat_parameters();
        assert_eq!(sat.max_time_in_seconds, Some(30.0));
        assert_eq!(sat.num_search_workers, Some(4));
        assert_eq!(sat.random_seed, Some(7));
    }
}
