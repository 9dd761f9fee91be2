//! Lecture phase (§4.3): assigns each required lecture of each class-subject to
//! a slot and lecture room, treating the lab phase's output as a hard
//! constraint.
//!
//! Grounded on `original_source/Lecture_Generator.py`: `create_lecture_variables`,
//! `add_lecture_constraints`, `add_optimization_objective`, `solve`,
//! `_extract_timetables`.

use crate::assignment::{blocked_slots_by_class, blocked_slots_by_teacher, LabAssignment, LectureAssignment};
use crate::error::{Result, SchedulerError};
use crate::model::reify::{
    at_most_one, exactly, force_one, force_zero, reify_conjunction, reify_or, weighted_sum,
};
use crate::model::varkey::VarStore;
use crate::resources::{Catalog, ClassId, Year};
use crate::solve::SolverParams;
use crate::time::{Day, SlotId, TimeModel};
use cp_sat::builder::{BoolVar, CpModelBuilder};
use cp_sat::proto::CpSolverStatus;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LectureVarKey {
    class: ClassId,
    subject: String,
    lecture_index: u32,
    day: Day,
    slot: SlotId,
    teacher: String,
    room: String,
}

/// Year-specific allowed lecture slots (§4.3): Third Year stops before the
/// evening's last slot, Second Year and everything else spans the full
/// teaching range.
fn allowed_lecture_slots(tm: &TimeModel, year: Year) -> Vec<SlotId> {
    let all = tm.teaching_slots().to_vec();
    if year == Year::Third {
        let cutoff = tm.find_by_label("4:30-5:30");
        all.into_iter().filter(|&s| Some(s) != cutoff).collect()
    } else {
        all
    }
}

/// Year-pinned lecture rooms (§3, §4.3): Third Year pins to room 507, Second
/// Year to 506, everything else may use any configured lecture room.
fn pinned_lecture_rooms(year: Year, rooms: &[String]) -> Vec<String> {
    match year {
        Year::Third => rooms.iter().filter(|r| r.as_str() == "507").cloned().collect(),
        Year::Second => rooms.iter().filter(|r| r.as_str() == "506").cloned().collect(),
        Year::Fourth => rooms.to_vec(),
    }
}

struct LectureModel {
    vars: VarStore<LectureVarKey>,
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn third_year_excludes_the_last_evening_slot() {
        let tm = TimeModel::default_grid();
        let slots = allowed_lecture_slots(&tm, Year::Third);
        assert!(!slots.contains(&tm.find_by_label("4:30-5:30").unwrap()));
        assert_eq!(slots.len(), tm.teaching_slots().len() - 1);
    }

    #[test]
    fn second_and_fourth_year_span_the_full_teaching_range() {
        let tm = TimeModel::default_grid();
        assert_eq!(
            allowed_lecture_slots(&tm, Year::Second).len(),
            tm.teaching_slots().len()
        );
        assert_eq!(
            allowed_lecture_slots(&tm, Year::Fourth).len(),
            tm.teaching_slots().len()
        );
    }

    #[test]
    fn third_year_pins_to_room_507() {
        let rooms = vec!["506".to_string(), "507".to_string()];
        assert_eq!(pinned_lecture_rooms(Year::Third, &rooms), vec!["507".to_string()]);
    }

    #[test]
    fn second_year_pins_to_room_506() {
        let rooms = vec!["506".to_string(), "507".to_string()];
        assert_eq!(pinned_lecture_rooms(Year::Second, &rooms), vec!["506".to_string()]);
    }

    #[test]
    fn fourth_year_may_use_any_lecture_room() {
        let rooms = vec!["506".to_string(), "507".to_string(), "601".to_string()];
        assert_eq!(pinned_lecture_rooms(Year::Fourth, &rooms), rooms);
    }
}

fn build_variables(
    model: &mut CpModelBuilder,
    tm: &TimeModel,
    catalog: &Catalog,
) -> LectureModel {
    let mut vars = VarStore::new();
    for class in &catalog.classes {
        let year = catalog.year_of(class);
        let slots = allowed_lecture_slots(tm, year);
        let rooms = pinned_lecture_rooms(year, &catalog.rooms);
        for subject in catalog.subjects_for(year) {
            let Some(structure) = catalog.course_structure.get(subject) else {
                continue;
            };
            if structure.lectures == 0 {
                continue;
            }
            let Some(teacher) = catalog.lecture_teacher(year, subject) else {
                continue;
            };
            for lecture_index in 0..structure.lectures {
                for &day in &Day::ALL {
                    for &slot in &slots {
                        for room in &rooms {
                            let key = LectureVarKey {
                                class: class.clone(),
                                subject: subject.clone(),
                                lecture_index,
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
    LectureModel { vars }
}

fn post_constraints(
    model: &mut CpModelBuilder,
    tm: &TimeModel,
    catalog: &Catalog,
    lm: &LectureModel,
    blocked_class: &std::collections::HashMap<ClassId, HashSet<(Day, SlotId)>>,
    blocked_teacher: &std::collections::HashMap<String, HashSet<(Day, SlotId)>>,
) {
    // I5: exact placement, one variable set per (class, subject, lecture_index).
    for class in &catalog.classes {
        let year = catalog.year_of(class);
        for subject in catalog.subjects_for(year) {
            let Some(structure) = catalog.course_structure.get(subject) else {
                continue;
            };
            if structure.lectures == 0 {
                continue;
            }
            for lecture_index in 0..structure.lectures {
                let vars_here: Vec<_> = lm
                    .vars
                    .iter()
                    .filter(|(k, _)| {
                        k.class == *class && k.subject == *subject && k.lecture_index == lecture_index
                    })
                    .map(|(_, v)| v.clone())
                    .collect();
                if !vars_here.is_empty() {
                    exactly(model, &vars_here, 1);
                }
            }

            // I5: at most one lecture of this subject per day, for this class.
            for &day in &Day::ALL {
                let vars_here: Vec<_> = lm
                    .vars
                    .iter()
                    .filter(|(k, _)| k.class == *class && k.subject == *subject && k.day == day)
                    .map(|(_, v)| v.clone())
                    .collect();
                at_most_one(model, &vars_here);
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

                // I3/I4: lab/lecture disjointness for this teacher.
                if blocked_teacher
                    .get(teacher)
                    .map(|s| s.contains(&(day, slot)))
                    .unwrap_or(false)
                {
                    force_zero(model, &vars_here);
                }
            }
        }
    }

    // Room exclusivity.
    for room in &catalog.rooms {
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

    // I4: class exclusivity and lab/lecture disjointness for the class.
    for class in &catalog.classes {
        for &day in &Day::ALL {
            for &slot in tm.teaching_slots() {
                let vars_here: Vec<_> = lm
                    .vars
                    .iter()
                    .filter(|(k, _)| k.class == *class && k.day == day && k.slot == slot)
                    .map(|(_, v)| v.clone())
                    .collect();
                at_most_one(model, &vars_here);

                if blocked_class
                    .get(class)
                    .map(|s| s.contains(&(day, slot)))
                    .unwrap_or(false)
                {
                    force_zero(model, &vars_here);
                }
            }
        }
    }
}

/// Builds the per-(class, day, slot) combined-activity indicator described in
/// §4.3: constant-true where a lab already occupies the slot, a full
/// bidirectional OR of the lecture variables there otherwise, constant-false
/// when neither exists.
fn build_activity_indicators(
    model: &mut CpModelBuilder,
    tm: &TimeModel,
    catalog: &Catalog,
    lm: &LectureModel,
    blocked_class: &std::collections::HashMap<ClassId, HashSet<(Day, SlotId)>>,
) -> std::collections::HashMap<(ClassId, Day, SlotId), BoolVar> {
    let mut activity = std::collections::HashMap::new();
    for class in &catalog.classes {
        let blocked = blocked_class.get(class);
        for &day in &Day::ALL {
            for &slot in tm.teaching_slots() {
                let has_lab = blocked.map(|s| s.contains(&(day, slot))).unwrap_or(false);
                let var = if has_lab {
                    let v = model.new_bool_var();
                    force_one(model, &v);
                    v
                } else {
                    let lecture_vars: Vec<_> = lm
                        .vars
                        .iter()
                        .filter(|(k, _)| k.class == *class && k.day == day && k.slot == slot)
                        .map(|(_, v)| v.clone())
                        .collect();
                    if lecture_vars.is_empty() {
                        let v = model.new_bool_var();
                        force_zero(model, std::slice::from_ref(&v));
                        v
                    } else {
                        reify_or(model, &lecture_vars)
                    }
                };
                activity.insert((class.clone(), day, slot), var);
            }
        }
    }
    activity
}

fn post_objective(
    model: &mut CpModelBuilder,
    tm: &TimeModel,
    catalog: &Catalog,
    lm: &LectureModel,
    activity: &std::collections::HashMap<(ClassId, Day, SlotId), BoolVar>,
) {
    let teaching = tm.teaching_slots();
    let post_break = tm.post_break_slots();

    // Every weighted group collapses into one signed-coefficient sum (see
    // `model::reify::weighted_sum`): a single `FromIterator` pass builds the
    // whole objective rather than adding several `LinearExpr` values
    // together. The post-break term `100*(1-a_i)` drops its constant part —
    // minimizing `-100*a_i` picks the same minimizer up to an additive
    // constant that doesn't affect the arg-min.
    let mut objective_terms: Vec<(i64, BoolVar)> = Vec::new();

    for class in &catalog.classes {
        for &day in &Day::ALL {
            let a: Vec<&BoolVar> = teaching
                .iter()
                .map(|&slot| &activity[&(class.clone(), day, slot)])
                .collect();

            for i in 1..teaching.len().saturating_sub(1) {
                let gap = reify_conjunction(
                    model,
                    &[a[i - 1].clone(), a[i + 1].clone()],
                    &[a[i].clone()],
                );
                objective_terms.push((50, gap));
            }

            for (i, &slot) in teaching.iter().enumerate() {
                if post_break.contains(&slot) {
                    objective_terms.push((-100, a[i].clone()));
                }
            }

            for i in 0..teaching.len() {
                for j in (i + 4)..teaching.len().min(i + 7) {
                    let spread = reify_conjunction(model, &[a[i].clone(), a[j].clone()], &[]);
                    objective_terms.push((20, spread));
                }
            }
        }
    }

    for (key, var) in lm.vars.iter() {
        let idx = tm.teaching_index(key.slot) as i64;
        if idx > 0 {
            objective_terms.push((2 * idx, var.clone()));
        }
    }

    model.minimize(weighted_sum(&objective_terms));
}

fn extract(lm: &LectureModel, response: &cp_sat::proto::CpSolverResponse) -> Vec<LectureAssignment> {
    let mut out = Vec::new();
    for (key, var) in lm.vars.iter() {
        if var.solution_value(response) {
            out.push(LectureAssignment {
                class: key.class.clone(),
                subject: key.subject.clone(),
                lecture_index: key.lecture_index,
                day: key.day,
                slot: key.slot,
                teacher: key.teacher.clone(),
                room: key.room.clone(),
            });
        }
    }
    out
}

/// Builds, solves and extracts the lecture phase. Returns `InfeasibleLecture`
/// (carrying `labs` so a caller may retain the feasible lab phase output) if
/// the solver finds neither an optimal nor a feasible solution.
pub fn solve_lecture_phase(
    tm: &TimeModel,
    catalog: &Catalog,
    labs: &[LabAssignment],
    params: &SolverParams,
) -> Result<Vec<LectureAssignment>> {
    let blocked_class = blocked_slots_by_class(tm, labs);
    let blocked_teacher = blocked_slots_by_teacher(tm, labs);

    let mut model = CpModelBuilder::default();
    let lm = build_variables(&mut model, tm, catalog);
    tracing::info!(variables = lm.vars.len(), "lecture phase: variables created");

    post_constraints(&mut model, tm, catalog, &lm, &blocked_class, &blocked_teacher);
    let activity = build_activity_indicators(&mut model, tm, catalog, &lm, &blocked_class);
    post_objective(&mut model, tm, catalog, &lm, &activity);

    let sat_params = params.to_sat_parameters();
    tracing::info!("lecture phase: solving");
    let response = model.solve_with_parameters(&sat_params);

    match response.status() {
        CpSolverStatus::Optimal | CpSolverStatus::Feasible => {
            let assignments = extract(&lm, &response);
            tracing::info!(assignments = assignments.len(), "lecture phase: solved");
            Ok(assignments)
        }
        _ => {
            tracing::warn!(status = ?response.status(), "lecture phase: infeasible");
            Err(SchedulerError::InfeasibleLecture {
                lab_assignments: labs.to_vec(),
            })
        }
    }
}
