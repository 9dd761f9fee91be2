//! Combined per-class and per-teacher timetable grids (§4.4): pure functions
//! of the two assignment sets, consumed by the xlsx report layer.

use crate::assignment::{LabAssignment, LectureAssignment};
use crate::resources::{BatchId, ClassId};
use crate::time::{Day, SlotId, TimeModel};
use std::collections::HashMap;

/// One cell of a combined grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Break,
    Empty,
    Lecture {
        subject: String,
        teacher: String,
        room: String,
    },
    Lab {
        subject: String,
        teacher: String,
        batch: BatchId,
        room: String,
        continued: bool,
    },
}

/// A 5-day x `all_slots` grid for a single class or teacher, indexed by
/// `(day, slot)`.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: HashMap<(Day, SlotId), Cell>,
}

impl Grid {
    fn empty(time_model: &TimeModel) -> Self {
        let mut cells = HashMap::new();
        for &day in &Day::ALL {
            for slot in time_model.all_slots() {
                let cell = if time_model.is_break(slot) {
                    Cell::Break
                } else {
                    Cell::Empty
                };
                cells.insert((day, slot), cell);
            }
        }
        Grid { cells }
    }

    pub fn cell(&self, day: Day, slot: SlotId) -> &Cell {
        self.cells.get(&(day, slot)).unwrap_or(&Cell::Empty)
    }

    fn set(&mut self, day: Day, slot: SlotId, cell: Cell) {
        self.cells.insert((day, slot), cell);
    }
}

/// Builds one combined grid per class: both phases' sessions overlaid on the
/// same day/slot axis. Deterministic given identical assignment sets
/// (ambient property 12).
pub fn build_class_grids(
    time_model: &TimeModel,
    labs: &[LabAssignment],
    lectures: &[LectureAssignment],
) -> HashMap<ClassId, Grid> {
    let mut grids: HashMap<ClassId, Grid> = HashMap::new();

    for lab in labs {
        let grid = grids
            .entry(lab.class.clone())
            .or_insert_with(|| Grid::empty(time_model));
        grid.set(
            lab.day,
            lab.start_slot,
            Cell::Lab {
                subject: lab.subject.clone(),
                teacher: lab.teacher.clone(),
                batch: lab.batch.clone(),
                room: lab.lab_room.clone(),
                continued: false,
            },
        );
        if let Some(next) = time_model.consecutive(lab.start_slot) {
            grid.set(
                lab.day,
                next,
                Cell::Lab {
                    subject: lab.subject.clone(),
                    teacher: lab.teacher.clone(),
                    batch: lab.batch.clone(),
                    room: lab.lab_room.clone(),
                    continued: true,
                },
            );
        }
    }

    for lecture in lectures {
        let grid = grids
            .entry(lecture.class.clone())
            .or_insert_with(|| Grid::empty(time_model));
        grid.set(
            lecture.day,
            lecture.slot,
            Cell::Lecture {
                subject: lecture.subject.clone(),
                teacher: lecture.teacher.clone(),
                room: lecture.room.clone(),
            },
        );
    }

    grids
}

/// Builds one grid per teacher, symmetric to [`build_class_grids`].
pub fn build_teacher_grids(
    time_model: &TimeModel,
    labs: &[LabAssignment],
    lectures: &[LectureAssignment],
) -> HashMap<String, Grid> {
    let mut grids: HashMap<String, Grid> = HashMap::new();

    for lab in labs {
        let grid = grids
            .entry(lab.teacher.clone())
            .or_insert_with(|| Grid::empty(time_model));
        grid.set(
            lab.day,
            lab.start_slot,
            Cell::Lab {
                subject: lab.subject.clone(),
                teacher: lab.teacher.clone(),
                batch: lab.batch.clone(),
                room: lab.lab_room.clone(),
                continued: false,
            },
        );
        if let Some(next) = time_model.consecutive(lab.start_slot) {
            grid.set(
                lab.day,
                next,
                Cell::Lab {
                    subject: lab.subject.clone(),
                    teacher: lab.teacher.clone(),
                    batch: lab.batch.clone(),
                    room: lab.lab_room.clone(),
                    continued: true,
                },
            );
        }
    }

    for lecture in lectures {
        let grid = grids
            .entry(lecture.teacher.clone())
            .or_insert_with(|| Grid::empty(time_model));
        grid.set(
            lecture.day,
            lecture.slot,
            Cell::Lecture {
                subject: lecture.subject.clone(),
                teacher: lecture.teacher.clone(),
                room: lecture.room.clone(),
            },
        );
    }

    grids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ClassId;

    #[test]
    fn class_grid_marks_continuation_slot() {
        let tm = TimeModel::default_grid();
        let labs = vec![LabAssignment {
            class: ClassId("TE1".into()),
            subject: "DBMS".into(),
            batch: BatchId("TE11".into()),
            day: Day::Monday,
            start_slot: tm.find_by_label("8:15-9:15").unwrap(),
            teacher: "T1".into(),
            lab_room: "501".into(),
        }];
        let grids = build_class_grids(&tm, &labs, &[]);
        let grid = &grids[&ClassId("TE1".into())];
        let first = tm.find_by_label("8:15-9:15").unwrap();
        let second = tm.find_by_label("9:15-10:15").unwrap();
        match grid.cell(Day::Monday, first) {
            Cell::Lab { continued, .. } => assert!(!continued),
            other => panic!("expected lab cell, got {other:?}"),
        }
        match grid.cell(Day::Monday, second) {
            Cell::Lab { continued, .. } => assert!(*continued),
            other => panic!("expected continued lab cell, got {other:?}"),
        }
    }

    #[test]
    fn build_is_deterministic() {
        let tm = TimeModel::default_grid();
        let labs = vec![LabAssignment {
            class: ClassId("SE1".into()),
            subject: "ADE".into(),
            batch: BatchId("SE11".into()),
            day: Day::Tuesday,
            start_slot: tm.find_by_label("10:30-11:30").unwrap(),
            teacher: "T2".into(),
            lab_room: "501".into(),
        }];
        let a = build_class_grids(&tm, &labs, &[]);
        let b = build_class_grids(&tm, &labs, &[]);
        let ca = &a[&ClassId("SE1".into())];
        let cb = &b[&ClassId("SE1".into())];
        for &day in &Day::ALL {
            for slot in tm.all_slots() {
                assert_eq!(ca.cell(day, slot), cb.cell(day, slot));
            }
        }
    }
}
