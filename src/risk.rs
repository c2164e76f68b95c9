use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    AcademicRecord, AtRiskStudent, AttendanceRecord, BehaviorRecord, RiskAssessment, RiskTier,
};
use crate::numeric::cap;
use crate::store::RiskRecords;

pub const ACADEMIC_CAP: f64 = 40.0;
pub const ATTENDANCE_CAP: f64 = 30.0;
pub const BEHAVIOR_CAP: f64 = 20.0;
pub const TARDINESS_CAP: f64 = 10.0;

pub const HIGH_THRESHOLD: f64 = 70.0;
pub const MEDIUM_THRESHOLD: f64 = 40.0;

pub fn academic_score(records: &[AcademicRecord]) -> f64 {
    let mut score = 0.0;

    for record in records {
        if record.grade.is_some_and(|grade| grade < 70.0) {
            score += 25.0;
        }
        if record.ela_score.is_some_and(|ela| ela < 500) {
            score += 15.0;
        }
        if record.math_score.is_some_and(|math| math < 500) {
            score += 15.0;
        }
    }

    cap(score, ACADEMIC_CAP)
}

pub fn attendance_score(record: Option<&AttendanceRecord>) -> f64 {
    let Some(record) = record else {
        return 0.0;
    };

    let mut score = 0.0;
    if record.attendance_rate.is_some_and(|rate| rate < 90.0) {
        score += 20.0;
    }
    if record.absent_days.is_some_and(|days| days > 10) {
        score += 10.0;
    }

    cap(score, ATTENDANCE_CAP)
}

pub fn behavior_score(record: Option<&BehaviorRecord>) -> f64 {
    let Some(record) = record else {
        return 0.0;
    };

    let mut score = 0.0;
    if record.disciplinary_actions > 2 {
        score += 15.0;
    }
    if record.suspensions > 0 {
        score += 5.0;
    }

    cap(score, BEHAVIOR_CAP)
}

pub fn tardiness_score(record: Option<&AttendanceRecord>) -> f64 {
    let Some(record) = record else {
        return 0.0;
    };

    let mut score = 0.0;
    if record.tardy_days.is_some_and(|days| days > 5) {
        score += 10.0;
    }

    cap(score, TARDINESS_CAP)
}

/// Lower bounds are inclusive: 70 is HIGH, 40 is MEDIUM.
pub fn tier_for(total: f64) -> RiskTier {
    if total >= HIGH_THRESHOLD {
        RiskTier::High
    } else if total >= MEDIUM_THRESHOLD {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

pub fn meets_minimum(tier: RiskTier, minimum: Option<RiskTier>) -> bool {
    match minimum {
        Some(minimum) => tier.priority() >= minimum.priority(),
        None => true,
    }
}

/// Highest score first; ties keep enumeration order.
pub fn sort_by_risk(students: &mut [AtRiskStudent]) {
    students.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

pub struct RiskScorer<'a, R: RiskRecords> {
    records: &'a R,
}

impl<'a, R: RiskRecords> RiskScorer<'a, R> {
    pub fn new(records: &'a R) -> Self {
        Self { records }
    }

    pub fn calculate_risk_score(&self, student_id: Uuid, semester: &str) -> Result<RiskAssessment> {
        let student = self
            .records
            .find_student(student_id)
            .ok_or_else(|| Error::student_not_found(student_id))?;

        let academics = self.records.find_academic_records(student_id, semester);
        let attendance = self.records.find_attendance_record(student_id, semester);
        let behavior = self.records.find_behavior_record(student_id, semester);

        let academic_score = academic_score(&academics);
        let attendance_score = attendance_score(attendance.as_ref());
        let behavior_score = behavior_score(behavior.as_ref());
        let tardiness_score = tardiness_score(attendance.as_ref());
        let total_score = academic_score + attendance_score + behavior_score + tardiness_score;
        let tier = tier_for(total_score);

        debug!(
            %student_id,
            semester,
            academic_score,
            attendance_score,
            behavior_score,
            tardiness_score,
            total_score,
            %tier,
            "scored student"
        );

        Ok(RiskAssessment {
            student_id,
            student_name: student.name,
            semester: semester.to_string(),
            academic_score,
            attendance_score,
            behavior_score,
            tardiness_score,
            total_score,
            tier,
        })
    }

    /// Scores every known student and keeps those at or above `minimum`.
    /// Results follow student enumeration order; use [`sort_by_risk`] for a ranking.
    pub fn identify_at_risk_students(
        &self,
        semester: &str,
        minimum: Option<RiskTier>,
    ) -> Result<Vec<AtRiskStudent>> {
        let mut at_risk = Vec::new();

        for student in self.records.list_students() {
            let assessment = self.calculate_risk_score(student.id, semester)?;
            if !meets_minimum(assessment.tier, minimum) {
                continue;
            }

            at_risk.push(AtRiskStudent {
                student_id: student.id,
                student_name: student.name,
                grade: student.grade,
                risk_score: assessment.total_score,
                tier: assessment.tier,
                semester: semester.to_string(),
            });
        }

        debug!(semester, matched = at_risk.len(), "identified at-risk students");
        Ok(at_risk)
    }
}
