//! Resource catalog: classes, batches, subjects, teachers and rooms derived from
//! a validated `DepartmentData` configuration record (§6).

use crate::time::{Day, SlotId, TimeModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NUM_BATCHES_PER_CLASS: u32 = 4;

/// Academic year, one of the three the department schedules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Year {
    Second,
    Third,
    Fourth,
}

impl Year {
    pub fn prefix(self) -> &'static str {
        match self {
            Year::Second => "SE",
            Year::Third => "TE",
            Year::Fourth => "BE",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Year::Second => "Second Year",
            Year::Third => "Third Year",
            Year::Fourth => "Fourth Year",
        }
    }

    pub fn from_display_name(name: &str) -> Option<Year> {
        match name {
            "Second Year" => Some(Year::Second),
            "Third Year" => Some(Year::Third),
            "Fourth Year" => Some(Year::Fourth),
            _ => None,
        }
    }
}

/// Per-subject structure counts: how many lab sessions and lecture sessions a
/// subject requires per week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseStructure {
    #[serde(default)]
    pub lectures: u32,
    #[serde(default)]
    pub labs: u32,
    #[serde(default)]
    pub lab_duration: f64,
    #[serde(default)]
    pub lecture_duration: f64,
}

/// A scheduled class: `<year-prefix><index>`, e.g. `TE1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub String);

impl ClassId {
    pub fn new(year: Year, index: u32) -> Self {
        ClassId(format!("{}{}", year.prefix(), index))
    }
}

/// A lab sub-group of a class: `<year-prefix><class-index><batch-index>`, e.g. `TE11`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub String);

/// The validated, derived resource catalog the two solver phases build against.
/// Construction (in `crate::config`) is where §7's `InputInvalid` checks live;
/// once built, every field here is assumed internally consistent.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub years: Vec<Year>,
    pub classes: Vec<ClassId>,
    pub class_year: HashMap<ClassId, Year>,
    pub batches_by_class: HashMap<ClassId, Vec<BatchId>>,
    pub teachers: Vec<String>,
    pub rooms: Vec<String>,
    pub lab_rooms: Vec<String>,
    pub subjects_by_year: HashMap<Year, Vec<String>>,
    pub course_structure: HashMap<String, CourseStructure>,
    pub teacher_assignments: HashMap<Year, HashMap<String, String>>,
    pub lab_teacher_assignments: HashMap<Year, HashMap<String, String>>,
    pub teacher_availability: HashMap<String, HashMap<Day, Vec<SlotId>>>,
}

impl Catalog {
    pub fn year_of(&self, class: &ClassId) -> Year {
        self.class_year[class]
    }

    pub fn subjects_for(&self, year: Year) -> &[String] {
        self.subjects_by_year
            .get(&year)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_available(&self, teacher: &str, day: Day, slot: SlotId) -> bool {
        self.teacher_availability
            .get(teacher)
            .and_then(|by_day| by_day.get(&day))
            .map(|slots| slots.contains(&slot))
            .unwrap_or(false)
    }

    pub fn lab_teacher(&self, year: Year, subject: &str) -> Option<&str> {
        self.lab_teacher_assignments
            .get(&year)
            .and_then(|m| m.get(subject))
            .map(|s| s.as_str())
    }

    pub fn lecture_teacher(&self, year: Year, subject: &str) -> Option<&str> {
        self.teacher_assignments
            .get(&year)
            .and_then(|m| m.get(subject))
            .map(|s| s.as_str())
    }
}

/// Builds the fixed, ordered batch names for a class: four batches, numbered 1-4.
pub fn batches_for_class(class: &ClassId) -> Vec<BatchId> {
    (1..=NUM_BATCHES_PER_CLASS)
        .map(|b| BatchId(format!("{}{}", class.0, b)))
        .collect()
}

pub fn day_from_str(s: &str) -> Option<Day> {
    match s {
        "Monday" => Some(Day::Monday),
        "Tuesday" => Some(Day::Tuesday),
        "Wednesday" => Some(Day::Wednesday),
        "Thursday" => Some(Day::Thursday),
        "Friday" => Some(Day::Friday),
        _ => None,
    }
}

pub fn resolve_slots(time_model: &TimeModel, labels: &[String]) -> Vec<SlotId> {
    labels
        .iter()
        .filter_map(|l| time_model.find_by_label(l))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_id_uses_year_prefix() {
        assert_eq!(ClassId::new(Year::Third, 1).0, "TE1");
        assert_eq!(ClassId::new(Year::Second, 3).0, "SE3");
        assert_eq!(ClassId::new(Year::Fourth, 2).0, "BE2");
    }

    #[test]
    fn batches_for_class_yields_four_in_order() {
        let class = ClassId::new(Year::Third, 1);
        let batches = batches_for_class(&class);
        assert_eq!(
            batches.into_iter().map(|b| b.0).collect::<Vec<_>>(),
            vec!["TE11", "TE12", "TE13", "TE14"]
        );
    }

    #[test]
    fn resolve_slots_drops_unknown_labels() {
        let tm = TimeModel::default_grid();
        let slots = resolve_slots(
            &tm,
            &["8:15-9:15".to_string(), "not-a-slot".to_string()],
        );
        assert_eq!(slots.len(), 1);
        assert_eq!(tm.label(slots[0]), "8:15-9:15");
    }
}
