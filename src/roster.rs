//! Roster CSV: one row per student and course, carrying that semester's
//! attendance and behavior figures alongside.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AcademicRecord, AttendanceRecord, BehaviorRecord, Student};
use crate::store::MemoryStore;

#[derive(Debug, Clone, Deserialize)]
pub struct RosterRow {
    pub student_id: Uuid,
    pub full_name: String,
    pub grade_level: Option<String>,
    pub semester: String,
    pub course: String,
    pub grade: Option<f64>,
    pub ela_score: Option<i32>,
    pub math_score: Option<i32>,
    pub attendance_rate: Option<f64>,
    pub absent_days: Option<i32>,
    pub tardy_days: Option<i32>,
    pub disciplinary_actions: Option<i32>,
    pub suspensions: Option<i32>,
}

impl RosterRow {
    pub fn student(&self) -> Student {
        Student {
            id: self.student_id,
            name: self.full_name.clone(),
            grade: self.grade_level.clone(),
        }
    }

    pub fn academic(&self) -> AcademicRecord {
        AcademicRecord {
            student_id: self.student_id,
            semester: self.semester.clone(),
            course: self.course.clone(),
            grade: self.grade,
            ela_score: self.ela_score,
            math_score: self.math_score,
        }
    }

    /// `None` when the row carries no attendance columns at all.
    pub fn attendance(&self) -> Option<AttendanceRecord> {
        if self.attendance_rate.is_none() && self.absent_days.is_none() && self.tardy_days.is_none()
        {
            return None;
        }
        Some(AttendanceRecord {
            student_id: self.student_id,
            semester: self.semester.clone(),
            attendance_rate: self.attendance_rate,
            absent_days: self.absent_days,
            tardy_days: self.tardy_days,
        })
    }

    pub fn behavior(&self) -> Option<BehaviorRecord> {
        if self.disciplinary_actions.is_none() && self.suspensions.is_none() {
            return None;
        }
        Some(BehaviorRecord {
            student_id: self.student_id,
            semester: self.semester.clone(),
            disciplinary_actions: self.disciplinary_actions.unwrap_or(0),
            suspensions: self.suspensions.unwrap_or(0),
        })
    }
}

pub fn read_roster<R: Read>(reader: R) -> Result<Vec<RosterRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RosterRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn read_roster_file(path: &Path) -> Result<Vec<RosterRow>> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_roster(file)
}

impl MemoryStore {
    pub fn load_roster(&mut self, rows: &[RosterRow]) {
        for row in rows {
            self.add_student(row.student());
            self.add_academic_record(row.academic());
            if let Some(attendance) = row.attendance() {
                self.set_attendance_record(attendance);
            }
            if let Some(behavior) = row.behavior() {
                self.set_behavior_record(behavior);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RiskRecords;
    use std::io::Write;

    const ROSTER: &str = "\
student_id,full_name,grade_level,semester,course,grade,ela_score,math_score,attendance_rate,absent_days,tardy_days,disciplinary_actions,suspensions
3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2,Avery Lee,10,2024-Fall,Algebra II,58,,450,80,15,9,5,2
3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2,Avery Lee,10,2024-Fall,English 10,74,480,,80,15,9,5,2
0c22f1f1-9184-4fd4-9b21-28c68a6a89dc,Jules Moreno,11,2024-Fall,Chemistry,68,,,,,,,
";

    #[test]
    fn blank_cells_become_absent_fields() {
        let rows = read_roster(ROSTER.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        let jules = &rows[2];
        assert_eq!(jules.grade, Some(68.0));
        assert_eq!(jules.ela_score, None);
        assert!(jules.attendance().is_none());
        assert!(jules.behavior().is_none());

        let avery = &rows[0];
        assert_eq!(avery.math_score, Some(450));
        assert_eq!(avery.behavior().unwrap().suspensions, 2);
    }

    #[test]
    fn roster_file_loads_into_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ROSTER.as_bytes()).unwrap();

        let rows = read_roster_file(file.path()).unwrap();
        let mut store = MemoryStore::new();
        store.load_roster(&rows);

        let students = store.list_students();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].name, "Avery Lee");
        assert_eq!(store.find_academic_records(students[0].id, "2024-Fall").len(), 2);
        assert!(store.find_attendance_record(students[1].id, "2024-Fall").is_none());
    }

    #[test]
    fn malformed_row_is_an_error() {
        let broken = "student_id,full_name,grade_level,semester,course,grade,ela_score,math_score,attendance_rate,absent_days,tardy_days,disciplinary_actions,suspensions\nnot-a-uuid,X,,2024,Art,,,,,,,,\n";
        assert!(read_roster(broken.as_bytes()).is_err());
    }
}
