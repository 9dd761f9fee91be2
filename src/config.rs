//! Configuration loading and validation (§6, §7): deserializes a
//! `DepartmentData` JSON document and validates it into a [`Catalog`] before
//! any model is built.

use crate::error::{Result, SchedulerError};
use crate::resources::{batches_for_class, CourseStructure, Catalog, ClassId, Year};
use crate::time::{day_from_str, resolve_slots, Day, SlotId, TimeModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The raw, on-disk shape of the configuration record described in §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentData {
    pub years: Vec<String>,
    pub classes_per_year: u32,
    pub teachers: Vec<String>,
    pub rooms: Vec<String>,
    pub lab_rooms: Vec<String>,
    pub subjects_by_year: HashMap<String, Vec<String>>,
    pub course_structure: HashMap<String, CourseStructure>,
    pub teacher_assignments: HashMap<String, HashMap<String, String>>,
    pub lab_teacher_assignments: HashMap<String, HashMap<String, String>>,
    pub teacher_availability: HashMap<String, HashMap<String, Vec<String>>>,
}

/// Reads and parses a `DepartmentData` JSON document from `path`.
pub fn load_department_data(path: &Path) -> anyhow::Result<DepartmentData> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
    let data: DepartmentData = serde_json::from_str(&text)
        .map_err(|e| anyhow::anyhow!("parsing config file {}: {e}", path.display()))?;
    Ok(data)
}

/// Validates `data` against §7's `InputInvalid` checks and builds the
/// [`Catalog`] the two solver phases run against.
pub fn build_catalog(time_model: &TimeModel, data: &DepartmentData) -> Result<Catalog> {
    let years: Vec<Year> = data
        .years
        .iter()
        .filter_map(|y| Year::from_display_name(y))
        .collect();

    let mut classes = Vec::new();
    let mut class_year = HashMap::new();
    let mut batches_by_class = HashMap::new();
    for &year in &years {
        for idx in 1..=data.classes_per_year {
            let class = ClassId::new(year, idx);
            class_year.insert(class.clone(), year);
            batches_by_class.insert(class.clone(), batches_for_class(&class));
            classes.push(class);
        }
    }

    let mut subjects_by_year = HashMap::new();
    for (year_name, subjects) in &data.subjects_by_year {
        let year = Year::from_display_name(year_name).ok_or_else(|| {
            SchedulerError::UnknownYearPrefix {
                class: year_name.clone(),
                prefix: year_name.clone(),
            }
        })?;
        subjects_by_year.insert(year, subjects.clone());
    }

    for (year_name, by_subject) in &data.teacher_assignments {
        validate_assignment_map(year_name, by_subject, &data.course_structure)?;
    }
    for (year_name, by_subject) in &data.lab_teacher_assignments {
        validate_assignment_map(year_name, by_subject, &data.course_structure)?;
    }

    for teacher in &data.teachers {
        if !data.teacher_availability.contains_key(teacher) {
            return Err(SchedulerError::UnknownTeacher {
                teacher: teacher.clone(),
            });
        }
    }

    validate_room_restriction(&subjects_by_year, "ADE", &data.lab_rooms, "501")?;
    validate_room_restriction(&subjects_by_year, "DC", &data.lab_rooms, "501")?;
    validate_room_restriction(&subjects_by_year, "MNA", &data.lab_rooms, "504")?;
    validate_lecture_room(Year::Third, &data.rooms, "507")?;
    validate_lecture_room(Year::Second, &data.rooms, "506")?;

    let mut teacher_assignments = HashMap::new();
    for (year_name, by_subject) in &data.teacher_assignments {
        if let Some(year) = Year::from_display_name(year_name) {
            teacher_assignments.insert(year, by_subject.clone());
        }
    }
    let mut lab_teacher_assignments = HashMap::new();
    for (year_name, by_subject) in &data.lab_teacher_assignments {
        if let Some(year) = Year::from_display_name(year_name) {
            lab_teacher_assignments.insert(year, by_subject.clone());
        }
    }

    let mut teacher_availability: HashMap<String, HashMap<Day, Vec<SlotId>>> = HashMap::new();
    for (teacher, by_day) in &data.teacher_availability {
        let mut days = HashMap::new();
        for (day_name, labels) in by_day {
            let Some(day) = day_from_str(day_name) else {
                continue;
            };
            days.insert(day, resolve_slots(time_model, labels));
        }
        teacher_availability.insert(teacher.clone(), days);
    }

    Ok(Catalog {
        years,
        classes,
        class_year,
        batches_by_class,
        teachers: data.teachers.clone(),
        rooms: data.rooms.clone(),
        lab_rooms: data.lab_rooms.clone(),
        subjects_by_year,
        course_structure: data.course_structure.clone(),
        teacher_assignments,
        lab_teacher_assignments,
        teacher_availability,
    })
}

fn validate_assignment_map(
    year_name: &str,
    by_subject: &HashMap<String, String>,
    course_structure: &HashMap<String, CourseStructure>,
) -> Result<()> {
    for subject in by_subject.keys() {
        if !course_structure.contains_key(subject) {
            return Err(SchedulerError::UnknownSubject {
                year: year_name.to_string(),
                subject: subject.clone(),
            });
        }
    }
    Ok(())
}

fn validate_room_restriction(
    subjects_by_year: &HashMap<Year, Vec<String>>,
    subject: &str,
    lab_rooms: &[String],
    required_room: &str,
) -> Result<()> {
    let subject_present = subjects_by_year.values().any(|list| list.iter().any(|s| s == subject));
    if subject_present && !lab_rooms.iter().any(|r| r == required_room) {
        return Err(SchedulerError::UnknownRoom {
            subject: subject.to_string(),
            room: required_room.to_string(),
        });
    }
    Ok(())
}

fn validate_lecture_room(year: Year, rooms: &[String], required_room: &str) -> Result<()> {
    if !rooms.iter().any(|r| r == required_room) {
        return Err(SchedulerError::UnknownLectureRoom {
            year: year.display_name().to_string(),
            room: required_room.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DepartmentData {
        let mut course_structure = HashMap::new();
        course_structure.insert(
            "DBMS".to_string(),
            CourseStructure {
                lectures: 2,
                labs: 1,
                lab_duration: 2.0,
                lecture_duration: 1.0,
            },
        );
        let mut subjects_by_year = HashMap::new();
        subjects_by_year.insert("Third Year".to_string(), vec!["DBMS".to_string()]);

        let mut lab_teacher = HashMap::new();
        lab_teacher.insert("DBMS".to_string(), "T1".to_string());
        let mut lab_teacher_assignments = HashMap::new();
        lab_teacher_assignments.insert("Third Year".to_string(), lab_teacher);

        let mut availability = HashMap::new();
        availability.insert(
            "Monday".to_string(),
            vec!["8:15-9:15".to_string(), "9:15-10:15".to_string()],
        );
        let mut teacher_availability = HashMap::new();
        teacher_availability.insert("T1".to_string(), availability);

        DepartmentData {
            years: vec!["Third Year".to_string()],
            classes_per_year: 1,
            teachers: vec!["T1".to_string()],
            rooms: vec!["507".to_string()],
            lab_rooms: vec!["501".to_string()],
            subjects_by_year,
            course_structure,
            teacher_assignments: HashMap::new(),
            lab_teacher_assignments,
            teacher_availability,
        }
    }

    #[test]
    fn valid_config_builds_catalog() {
        let tm = TimeModel::default_grid();
        let data = sample();
        let catalog = build_catalog(&tm, &data).expect("valid config should build");
        assert_eq!(catalog.classes.len(), 1);
        assert_eq!(catalog.classes[0], ClassId::new(Year::Third, 1));
    }

    #[test]
    fn unknown_subject_in_teacher_assignments_is_rejected() {
        let tm = TimeModel::default_grid();
        let mut data = sample();
        let mut bogus = HashMap::new();
        bogus.insert("GHOST101".to_string(), "T1".to_string());
        data.teacher_assignments.insert("Third Year".to_string(), bogus);

        let err = build_catalog(&tm, &data).expect_err("unknown subject should be rejected");
        assert!(matches!(err, SchedulerError::UnknownSubject { .. }));
    }

    #[test]
    fn teacher_missing_from_availability_is_rejected() {
        let tm = TimeModel::default_grid();
        let mut data = sample();
        data.teachers.push("Ghost".to_string());

        let err = build_catalog(&tm, &data).expect_err("missing teacher availability should be rejected");
        assert!(matches!(err, SchedulerError::UnknownTeacher { .. }));
    }

    #[test]
    fn missing_pinned_lecture_room_is_rejected() {
        let tm = TimeModel::default_grid();
        let mut data = sample();
        data.rooms = vec!["999".to_string()];

        let err = build_catalog(&tm, &data).expect_err("missing TE pinned room should be rejected");
        assert!(matches!(err, SchedulerError::UnknownLectureRoom { .. }));
    }
}
