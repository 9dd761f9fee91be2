//! The data contract between the lab and lecture phases (§3, §4.3 "derived
//! blocking sets").

use crate::resources::{BatchId, ClassId};
use crate::time::{Day, SlotId, TimeModel};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// `(class, subject, batch, day, start_slot, teacher, lab_room)`. Occupies both
/// `start_slot` and `consecutive(start_slot)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabAssignment {
    pub class: ClassId,
    pub subject: String,
    pub batch: BatchId,
    pub day: Day,
    pub start_slot: SlotId,
    pub teacher: String,
    pub lab_room: String,
}

/// `(class, subject, lecture_index, day, slot, teacher, lecture_room)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureAssignment {
    pub class: ClassId,
    pub subject: String,
    pub lecture_index: u32,
    pub day: Day,
    pub slot: SlotId,
    pub teacher: String,
    pub room: String,
}

/// Every (day, slot) occupied by a lab, per class, counting both slots of each
/// 2-slot occupancy. Grounded on `Lecture_Generator.py`'s `get_lab_slots_for_class`.
pub fn blocked_slots_by_class(
    time_model: &TimeModel,
    labs: &[LabAssignment],
) -> HashMap<ClassId, HashSet<(Day, SlotId)>> {
    let mut out: HashMap<ClassId, HashSet<(Day, SlotId)>> = HashMap::new();
    for lab in labs {
        let entry = out.entry(lab.class.clone()).or_default();
        entry.insert((lab.day, lab.start_slot));
        if let Some(next) = time_model.consecutive(lab.start_slot) {
            entry.insert((lab.day, next));
        }
    }
    out
}

/// Every (day, slot) at which a teacher is occupied by a lab, counting both
/// slots of each 2-slot occupancy.
pub fn blocked_slots_by_teacher(
    time_model: &TimeModel,
    labs: &[LabAssignment],
) -> HashMap<String, HashSet<(Day, SlotId)>> {
    let mut out: HashMap<String, HashSet<(Day, SlotId)>> = HashMap::new();
    for lab in labs {
        let entry = out.entry(lab.teacher.clone()).or_default();
        entry.insert((lab.day, lab.start_slot));
        if let Some(next) = time_model.consecutive(lab.start_slot) {
            entry.insert((lab.day, next));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{BatchId, ClassId};
    use crate::time::TimeModel;

    fn sample_lab(tm: &TimeModel) -> LabAssignment {
        LabAssignment {
            class: ClassId("TE1".into()),
            subject: "DBMS".into(),
            batch: BatchId("TE11".into()),
            day: Day::Monday,
            start_slot: tm.find_by_label("8:15-9:15").unwrap(),
            teacher: "T1".into(),
            lab_room: "501".into(),
        }
    }

    #[test]
    fn blocked_slots_by_class_covers_both_slots_of_the_lab() {
        let tm = TimeModel::default_grid();
        let labs = vec![sample_lab(&tm)];
        let blocked = blocked_slots_by_class(&tm, &labs);
        let class_blocked = &blocked[&ClassId("TE1".into())];
        assert!(class_blocked.contains(&(Day::Monday, tm.find_by_label("8:15-9:15").unwrap())));
        assert!(class_blocked.contains(&(Day::Monday, tm.find_by_label("9:15-10:15").unwrap())));
        assert_eq!(class_blocked.len(), 2);
    }

    #[test]
    fn blocked_slots_by_teacher_mirrors_class_blocking() {
        let tm = TimeModel::default_grid();
        let labs = vec![sample_lab(&tm)];
        let blocked = blocked_slots_by_teacher(&tm, &labs);
        assert_eq!(blocked["T1"].len(), 2);
    }
}
