//! Lab phase (§4.2): assigns each batch-subject lab to a pair of consecutive
//! slots on some day, in some lab room, with its designated teacher.
//!
//! Grounded on `original_source/Lab_Generator.py`: `create_lab_variables`,
//! `add_lab_constraints`, `add_optimization_objective`, `solve`,
//! `_extract_timetables`.

use crate::assignment::LabAssignment;
use crate::error::{SchedulerError, Result};
use crate::model::reify::{
    at_most_one, exactly, force_zero, reify_conjunction, reify_or_upper_bound,
    reify_overflow_past_one, weighted_sum,
};
use crate::model::varkey::VarStore;
use crate::resources::{batches_for_class, BatchId, Catalog, ClassId, Year};
use crate::solve::SolverParams;
use crate::time::{Day, SlotId, TimeModel};
use cp_sat::builder::CpModelBuilder;
use cp_sat::proto::CpSolverStatus;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LabVarKey {
    class: ClassId,
    subject: String,
    batch: BatchId,
    day: Day,
    slot: SlotId,
    teacher: String,
    room: String,
}

/// Subject-specific lab start slots (§4.2). `AJP` always gets the evening pair
/// regardless of year; otherwise Third Year clusters in the morning block and
/// Second Year in the midday block; everything else may start at any valid lab
/// start.
fn allowed_lab_starts(tm: &TimeModel, year: Year, subject: &str) -> Vec<SlotId> {
    let candidates: Vec<SlotId> = if subject == "AJP" {
        tm.find_by_label("3:30-4:30").into_iter().collect()
    } else if year == Year::Third {
        tm.find_by_label("8:15-9:15").into_iter().collect()
    } else if year == Year::Second {
        tm.find_by_label("10:30-11:30").into_iter().collect()
    } else {
        tm.teaching_slots().to_vec()
    };
    candidates
        .into_iter()
        .filter(|&s| tm.consecutive(s).is_some())
        .collect()
}

/// Subject-specific fixed lab rooms (§4.2): ADE/DC pin to room 501, MNA pins to
/// 504, everything else may use any configured lab room.
fn allowed_lab_rooms(subject: &str, lab_rooms: &[String]) -> Vec<String> {
    match subject {
        "ADE" | "DC" => lab_rooms
            .iter()
            .filter(|r| r.as_str() == "501")
            .cloned()
            .collect(),
        "MNA" => lab_rooms
            .iter()
            .filter(|r| r.as_str() == "504")
            .cloned()
            .collect(),
        _ => lab_rooms.to_vec(),
    }
}

struct LabModel {
    vars: VarStore<LabVarKey>,
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn ajp_is_pinned_to_the_evening_slot_regardless_of_year() {
        let tm = TimeModel::default_grid();
        let starts = allowed_lab_starts(&tm, Year::Fourth, "AJP");
        assert_eq!(starts, vec![tm.find_by_label("3:30-4:30").unwrap()]);
    }

    #[test]
    fn third_year_clusters_in_the_morning_block() {
        let tm = TimeModel::default_grid();
        let starts = allowed_lab_starts(&tm, Year::Third, "DBMS");
        assert_eq!(starts, vec![tm.find_by_label("8:15-9:15").unwrap()]);
    }

    #[test]
    fn second_year_clusters_in_the_midday_block() {
        let tm = TimeModel::default_grid();
        let starts = allowed_lab_starts(&tm, Year::Second, "DBMS");
        assert_eq!(starts, vec![tm.find_by_label("10:30-11:30").unwrap()]);
    }

    #[test]
    fn fourth_year_may_start_at_any_valid_lab_start() {
        let tm = TimeModel::default_grid();
        let starts = allowed_lab_starts(&tm, Year::Fourth, "DBMS");
        assert_eq!(starts.len(), 4);
    }

    #[test]
    fn ade_and_dc_pin_to_room_501() {
        let rooms = vec!["501".to_string(), "502".to_string(), "504".to_string()];
        assert_eq!(allowed_lab_rooms("ADE", &rooms), vec!["501".to_string()]);
        assert_eq!(allowed_lab_rooms("DC", &rooms), vec!["501".to_string()]);
    }

    #[test]
    fn mna_pins_to_room_504() {
        let rooms = vec!["501".to_string(), "504".to_string()];
        assert_eq!(allowed_lab_rooms("MNA", &rooms), vec!["504".to_string()]);
    }

    #[test]
    fn other_subjects_may_use_any_lab_room() {
        let rooms = vec!["501".to_string(), "504".to_string()];
        assert_eq!(allowed_lab_rooms("DSA", &rooms), rooms);
    }
}

fn build_variables(model: &mut CpModelBuilder, tm: &TimeModel, catalog: &Catalog) -> LabModel {
    let mut vars = VarStore::new();
    for class in &catalog.classes {
        let year = catalog.year_of(class);
        let batches = batches_for_class(class);
        for subject in catalog.subjects_for(year) {
            let Some(structure) = catalog.course_structure.get(subject) else {
                continue;
            };
            if structure.labs == 0 {
                continue;
            }
            let Some(teacher) = catalog.lab_teacher(year, subject) else {
                continue;
            };
            let starts = allowed_lab_starts(tm, year, subject);
            let rooms = allowed_lab_rooms(subject, &catalog.lab_rooms);
            for &day in &Day::ALL {
                for &slot in &starts {
                    for batch in &batches {
                        for room in &rooms {
                            let key = LabVarKey {
                                class: class.clone(),
                                subject: subject.clone(),
                                batch: batch.clone(),
                                day,
                                slot,
                                teacher: teacher.to_string(),
                                room: room.clone(),
                            };
                            let var = model.new_bool_var();
                            vars.insert(key, var);
                        }
                    }
                }
            }
        }
    }
    LabModel { vars }
}

fn post_constraints(model: &mut CpModelBuilder, tm: &TimeModel, catalog: &Catalog, lm: &LabModel) {
    // I1: exact lab count per (class, subject, batch).
    for class in &catalog.classes {
        let year = catalog.year_of(class);
        let batches = batches_for_class(class);
        for subject in catalog.subjects_for(year) {
            let Some(structure) = catalog.course_structure.get(subject) else {
                continue;
            };
            if structure.labs == 0 {
                continue;
            }
            let Some(teacher) = catalog.lab_teacher(year, subject) else {
                continue;
            };
            let starts = allowed_lab_starts(tm, year, subject);
            let rooms = allowed_lab_rooms(subject, &catalog.lab_rooms);
            for batch in &batches {
                let mut batch_vars = Vec::new();
                for &day in &Day::ALL {
                    for &slot in &starts {
                        for room in &rooms {
                            let key = LabVarKey {
                                class: class.clone(),
                                subject: subject.clone(),
                                batch: batch.clone(),
                                day,
                                slot,
                                teacher: teacher.to_string(),
                                room: room.clone(),
                            };
                            if let Some(v) = lm.vars.get(&key) {
                                batch_vars.push(v.clone());

                                // I2/I4: continuation implication into the twin
                                // variable at the second slot of the 2-hour lab.
                                if let Some(next) = tm.consecutive(slot) {
                                    let twin_key = LabVarKey {
                                        slot: next,
                                        ..key.clone()
                                    };
                                    if let Some(twin) = lm.vars.get(&twin_key) {
                                        crate::model::reify::implies(model, v, twin);
                                    }
                                }
                            }
                        }
                    }
                }
                if !batch_vars.is_empty() {
                    exactly(model, &batch_vars, structure.labs as i64);
                }
            }
        }
    }

    // I3/I6: teacher exclusivity and availability.
    for teacher in &catalog.teachers {
        for &day in &Day::ALL {
            for &slot in tm.teaching_slots() {
                let vars_here: Vec<_> = lm
                    .vars
                    .iter()
                    .filter(|(k, _)| k.teacher == *teacher && k.day == day && k.slot == slot)
                    .map(|(_, v)| v.clone())
                    .collect();
                if vars_here.is_empty() {
                    continue;
                }
                if !catalog.is_available(teacher, day, slot) {
                    force_zero(model, &vars_here);
                }
                at_most_one(model, &vars_here);
            }
        }
    }

    // I2: lab room exclusivity.
    for room in &catalog.lab_rooms {
        for &day in &Day::ALL {
            for &slot in tm.teaching_slots() {
                let vars_here: Vec<_> = lm
                    .vars
                    .iter()
                    .filter(|(k, _)| k.room == *room && k.day == day && k.slot == slot)
                    .map(|(_, v)| v.clone())
                    .collect();
                at_most_one(model, &vars_here);
            }
        }
    }

    // I4: batch exclusivity.
    for class in &catalog.classes {
        for batch in batches_for_class(class) {
            for &day in &Day::ALL {
                for &slot in tm.teaching_slots() {
                    let vars_here: Vec<_> = lm
                        .vars
                        .iter()
                        .filter(|(k, _)| {
                            k.class == *class && k.batch == batch && k.day == day && k.slot == slot
                        })
                        .map(|(_, v)| v.clone())
                        .collect();
                    at_most_one(model, &vars_here);
                }
            }
        }
    }
}

fn post_objective(model: &mut CpModelBuilder, tm: &TimeModel, catalog: &Catalog, lm: &LabModel) {
    let teaching = tm.teaching_slots();

    // Gap penalty x10: per (class, batch, day), interior empty slot flanked by
    // busy neighbours.
    let mut gap_vars = Vec::new();
    for class in &catalog.classes {
        for batch in batches_for_class(class) {
            for &day in &Day::ALL {
                let slot_vars: Vec<Option<cp_sat::builder::BoolVar>> = teaching
                    .iter()
                    .map(|&slot| {
                        lm.vars
                            .iter()
                            .find(|(k, _)| {
                                k.class == *class && k.batch == batch && k.day == day && k.slot == slot
                            })
                            .map(|(_, v)| v.clone())
                    })
                    .collect();
                for i in 1..teaching.len().saturating_sub(1) {
                    if let (Some(prev), Some(curr), Some(next)) =
                        (&slot_vars[i - 1], &slot_vars[i], &slot_vars[i + 1])
                    {
                        let gap = reify_conjunction(model, &[prev.clone(), next.clone()], &[curr.clone()]);
                        gap_vars.push(gap);
                    }
                }
            }
        }
    }

    // Room-diversity reward x(-5): reward using each lab room at all.
    let mut used_room_vars = Vec::new();
    for room in &catalog.lab_rooms {
        let vars_here: Vec<_> = lm
            .vars
            .iter()
            .filter(|(k, _)| k.room == *room)
            .map(|(_, v)| v.clone())
            .collect();
        if !vars_here.is_empty() {
            used_room_vars.push(reify_or_upper_bound(model, &vars_here));
        }
    }

    // Duplicate-room conflict penalty x100 (defensive, always 0 under I2).
    let mut conflict_vars = Vec::new();
    for room in &catalog.lab_rooms {
        for &day in &Day::ALL {
            for &slot in teaching {
                let vars_here: Vec<_> = lm
                    .vars
                    .iter()
                    .filter(|(k, _)| k.room == *room && k.day == day && k.slot == slot)
                    .map(|(_, v)| v.clone())
                    .collect();
                if vars_here.len() > 1 {
                    conflict_vars.push(reify_overflow_past_one(model, &vars_here));
                }
            }
        }
    }

    // Every weighted group collapses into one signed-coefficient sum so the
    // objective is a single `LinearExpr` built by one `FromIterator` pass,
    // rather than adding several `LinearExpr` values together.
    let mut objective_terms: Vec<(i64, cp_sat::builder::BoolVar)> = Vec::new();
    for g in &gap_vars {
        objective_terms.push((10, g.clone()));
    }
    // Late-slot penalty x2: replicate each selected variable by 2*index.
    for (key, var) in lm.vars.iter() {
        let idx = tm.teaching_index(key.slot) as i64;
        if idx > 0 {
            objective_terms.push((2 * idx, var.clone()));
        }
    }
    for r in &used_room_vars {
        objective_terms.push((-5, r.clone()));
    }
    for c in &conflict_vars {
        objective_terms.push((100, c.clone()));
    }
    model.minimize(weighted_sum(&objective_terms));
}

fn extract(
    lm: &LabModel,
    response: &cp_sat::proto::CpSolverResponse,
) -> Vec<LabAssignment> {
    let mut out = Vec::new();
    for (key, var) in lm.vars.iter() {
        if var.solution_value(response) {
            out.push(LabAssignment {
                class: key.class.clone(),
                subject: key.subject.clone(),
                batch: key.batch.clone(),
                day: key.day,
                start_slot: key.slot,
                teacher: key.teacher.clone(),
                lab_room: key.room.clone(),
            });
        }
    }
    out
}

/// Builds, solves and extracts the lab phase. Returns `InfeasibleLab` if the
/// solver finds neither an optimal nor a feasible solution within the budget.
pub fn solve_lab_phase(
    tm: &TimeModel,
    catalog: &Catalog,
    params: &SolverParams,
) -> Result<Vec<LabAssignment>> {
    let mut model = CpModelBuilder::default();
    let lm = build_variables(&mut model, tm, catalog);
    tracing::info!(variables = lm.vars.len(), "lab phase: variables created");

    post_constraints(&mut model, tm, catalog, &lm);
    post_objective(&mut model, tm, catalog, &lm);

    let sat_params = params.to_sat_parameters();
    tracing::info!("lab phase: solving");
    let response = model.solve_with_parameters(&sat_params);

    match response.status() {
        CpSolverStatus::Optimal | CpSolverStatus::Feasible => {
            let assignments = extract(&lm, &response);
            tracing::info!(assignments = assignments.len(), "lab phase: solved");
            Ok(assignments)
        }
        _ => {
            tracing::warn!(status = ?response.status(), "lab phase: infeasible");
            Err(SchedulerError::InfeasibleLab)
        }
    }
}
