use std::collections::HashMap;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::models::{
    AcademicRecord, AttendanceRecord, BehaviorRecord, Intervention, NewIntervention, Student,
};

pub trait RiskRecords {
    fn find_student(&self, id: Uuid) -> Option<Student>;

    /// All known students in enumeration order.
    fn list_students(&self) -> Vec<Student>;

    fn find_academic_records(&self, student_id: Uuid, semester: &str) -> Vec<AcademicRecord>;

    fn find_attendance_record(&self, student_id: Uuid, semester: &str)
        -> Option<AttendanceRecord>;

    fn find_behavior_record(&self, student_id: Uuid, semester: &str) -> Option<BehaviorRecord>;
}

pub trait InterventionStore {
    fn find_intervention(&self, id: Uuid) -> Option<Intervention>;

    /// Stores a freshly opened plan, assigning its id and creation timestamp.
    fn insert_intervention(&mut self, request: NewIntervention) -> Intervention;

    /// Overwrites a stored plan. Last write wins.
    fn save_intervention(&mut self, intervention: Intervention) -> Intervention;

    fn find_interventions_by_student(&self, student_id: Uuid) -> Vec<Intervention>;

    /// Plans whose start date falls in `year`.
    fn find_interventions_by_year(&self, year: i32) -> Vec<Intervention>;
}

type SemesterKey = (Uuid, String);

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    students: Vec<Student>,
    student_index: HashMap<Uuid, usize>,
    academics: HashMap<SemesterKey, Vec<AcademicRecord>>,
    attendance: HashMap<SemesterKey, AttendanceRecord>,
    behavior: HashMap<SemesterKey, BehaviorRecord>,
    interventions: Vec<Intervention>,
    intervention_index: HashMap<Uuid, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a student, replacing any existing entry with the same id in place.
    pub fn add_student(&mut self, student: Student) {
        match self.student_index.get(&student.id) {
            Some(&slot) => self.students[slot] = student,
            None => {
                self.student_index.insert(student.id, self.students.len());
                self.students.push(student);
            }
        }
    }

    pub fn add_academic_record(&mut self, record: AcademicRecord) {
        self.academics
            .entry((record.student_id, record.semester.clone()))
            .or_default()
            .push(record);
    }

    /// At most one attendance record per student and semester; later wins.
    pub fn set_attendance_record(&mut self, record: AttendanceRecord) {
        self.attendance
            .insert((record.student_id, record.semester.clone()), record);
    }

    pub fn set_behavior_record(&mut self, record: BehaviorRecord) {
        self.behavior
            .insert((record.student_id, record.semester.clone()), record);
    }

    /// Loads a plan that already has an identity, e.g. one read from Postgres.
    pub fn restore_intervention(&mut self, intervention: Intervention) {
        self.save_intervention(intervention);
    }

    pub fn interventions(&self) -> &[Intervention] {
        &self.interventions
    }
}

impl RiskRecords for MemoryStore {
    fn find_student(&self, id: Uuid) -> Option<Student> {
        self.student_index
            .get(&id)
            .map(|&slot| self.students[slot].clone())
    }

    fn list_students(&self) -> Vec<Student> {
        self.students.clone()
    }

    fn find_academic_records(&self, student_id: Uuid, semester: &str) -> Vec<AcademicRecord> {
        self.academics
            .get(&(student_id, semester.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn find_attendance_record(
        &self,
        student_id: Uuid,
        semester: &str,
    ) -> Option<AttendanceRecord> {
        self.attendance
            .get(&(student_id, semester.to_string()))
            .cloned()
    }

    fn find_behavior_record(&self, student_id: Uuid, semester: &str) -> Option<BehaviorRecord> {
        self.behavior.get(&(student_id, semester.to_string())).cloned()
    }
}

impl InterventionStore for MemoryStore {
    fn find_intervention(&self, id: Uuid) -> Option<Intervention> {
        self.intervention_index
            .get(&id)
            .map(|&slot| self.interventions[slot].clone())
    }

    fn insert_intervention(&mut self, request: NewIntervention) -> Intervention {
        let intervention = Intervention::open(request, Uuid::new_v4(), Utc::now());
        self.save_intervention(intervention)
    }

    fn save_intervention(&mut self, intervention: Intervention) -> Intervention {
        match self.intervention_index.get(&intervention.id) {
            Some(&slot) => self.interventions[slot] = intervention.clone(),
            None => {
                self.intervention_index
                    .insert(intervention.id, self.interventions.len());
                self.interventions.push(intervention.clone());
            }
        }
        intervention
    }

    fn find_interventions_by_student(&self, student_id: Uuid) -> Vec<Intervention> {
        self.interventions
            .iter()
            .filter(|i| i.student_id == student_id)
            .cloned()
            .collect()
    }

    fn find_interventions_by_year(&self, year: i32) -> Vec<Intervention> {
        self.interventions
            .iter()
            .filter(|i| i.start_date.year() == year)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn student(name: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            name: name.to_string(),
            grade: Some("9".to_string()),
        }
    }

    fn request(student_id: Uuid, start: NaiveDate) -> NewIntervention {
        NewIntervention {
            student_id,
            intervention_type: "Reading".to_string(),
            start_date: start,
            target_completion_date: start + chrono::Duration::days(60),
            start_score: 40.0,
            goal_score: 70.0,
        }
    }

    #[test]
    fn students_keep_insertion_order() {
        let mut store = MemoryStore::new();
        let names = ["Kiara Patel", "Avery Lee", "Jules Moreno"];
        for name in names {
            store.add_student(student(name));
        }
        let listed: Vec<String> = store.list_students().into_iter().map(|s| s.name).collect();
        assert_eq!(listed, names);
    }

    #[test]
    fn re_adding_a_student_replaces_in_place() {
        let mut store = MemoryStore::new();
        let avery = student("Avery Lee");
        store.add_student(avery.clone());
        store.add_student(student("Jules Moreno"));
        store.add_student(Student {
            grade: Some("10".to_string()),
            ..avery.clone()
        });

        let listed = store.list_students();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, avery.id);
        assert_eq!(listed[0].grade.as_deref(), Some("10"));
        assert_eq!(store.find_student(avery.id).unwrap().grade.as_deref(), Some("10"));
        assert!(store.find_student(Uuid::new_v4()).is_none());
    }

    #[test]
    fn records_are_scoped_by_semester() {
        let mut store = MemoryStore::new();
        let avery = student("Avery Lee");
        store.add_student(avery.clone());
        store.add_academic_record(AcademicRecord {
            student_id: avery.id,
            semester: "2024-Fall".to_string(),
            course: "Algebra".to_string(),
            grade: Some(65.0),
            ela_score: None,
            math_score: None,
        });
        store.set_attendance_record(AttendanceRecord {
            student_id: avery.id,
            semester: "2024-Fall".to_string(),
            attendance_rate: Some(85.0),
            absent_days: Some(3),
            tardy_days: None,
        });

        assert_eq!(store.find_academic_records(avery.id, "2024-Fall").len(), 1);
        assert!(store.find_academic_records(avery.id, "2025-Spring").is_empty());
        assert!(store.find_attendance_record(avery.id, "2025-Spring").is_none());
        assert!(store.find_behavior_record(avery.id, "2024-Fall").is_none());
    }

    #[test]
    fn insert_assigns_identity_and_initial_state() {
        let mut store = MemoryStore::new();
        let start = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let created = store.insert_intervention(request(Uuid::new_v4(), start));

        assert_eq!(created.current_score, created.start_score);
        assert_eq!(store.find_intervention(created.id), Some(created));
    }

    #[test]
    fn saving_a_known_plan_overwrites_without_reordering() {
        let mut store = MemoryStore::new();
        let start = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let first = store.insert_intervention(request(Uuid::new_v4(), start));
        let second = store.insert_intervention(request(Uuid::new_v4(), start));

        let mut updated = first.clone();
        updated.current_score = 55.0;
        store.save_intervention(updated);

        let ids: Vec<Uuid> = store.interventions().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(store.find_intervention(first.id).unwrap().current_score, 55.0);
        assert_eq!(store.find_intervention(second.id).unwrap().current_score, 40.0);
    }

    #[test]
    fn year_filter_uses_start_date() {
        let mut store = MemoryStore::new();
        let student_id = Uuid::new_v4();
        store.insert_intervention(request(student_id, NaiveDate::from_ymd_opt(2024, 12, 20).unwrap()));
        store.insert_intervention(request(student_id, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()));

        assert_eq!(store.find_interventions_by_year(2024).len(), 1);
        assert_eq!(store.find_interventions_by_year(2025).len(), 1);
        assert_eq!(store.find_interventions_by_student(student_id).len(), 2);
    }
}
