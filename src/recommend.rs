//! Turns a risk breakdown into an ordered list of suggested supports.
//!
//! The tier baseline always comes first. Component add-ons follow in a fixed
//! order and fire independently of each other and of the tier.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Recommendation, RiskAssessment, RiskTier};
use crate::risk::RiskScorer;
use crate::store::RiskRecords;

const ACADEMIC_TRIGGER: f64 = 20.0;
const ATTENDANCE_TRIGGER: f64 = 10.0;
const TARDINESS_TRIGGER: f64 = 5.0;
const BEHAVIOR_TRIGGER: f64 = 10.0;

fn baseline(tier: RiskTier) -> Vec<Recommendation> {
    match tier {
        RiskTier::High => vec![
            Recommendation::new(
                "Intensive Academic Support",
                "Enroll student in tutoring and after-school remedial programs.",
            ),
            Recommendation::new(
                "Parental Engagement",
                "Arrange urgent meeting with parents or guardians.",
            ),
            Recommendation::new(
                "Social Worker Referral",
                "Consider referral to school social worker for additional support.",
            ),
        ],
        RiskTier::Medium => vec![
            Recommendation::new(
                "Regular Teacher Check-ins",
                "Schedule weekly progress reviews with the student.",
            ),
            Recommendation::new(
                "Attendance Monitoring",
                "Send attendance report to parents monthly.",
            ),
        ],
        RiskTier::Low => vec![Recommendation::new(
            "Standard Classroom Support",
            "Maintain current supports; monitor quarterly.",
        )],
    }
}

pub fn recommend_for(assessment: &RiskAssessment) -> Vec<Recommendation> {
    let mut recommendations = baseline(assessment.tier);

    if assessment.academic_score >= ACADEMIC_TRIGGER {
        recommendations.push(Recommendation::new(
            "Subject-Specific Tutoring",
            "Provide extra help in subjects where grades are low.",
        ));
    }
    if assessment.attendance_score >= ATTENDANCE_TRIGGER {
        recommendations.push(Recommendation::new(
            "Attendance Counseling",
            "Schedule session to address absenteeism.",
        ));
    }
    if assessment.tardiness_score >= TARDINESS_TRIGGER {
        recommendations.push(Recommendation::new(
            "Time Management Workshop",
            "Encourage student participation in time-management programs.",
        ));
    }
    if assessment.behavior_score >= BEHAVIOR_TRIGGER {
        recommendations.push(Recommendation::new(
            "Behavioral Coaching",
            "Enroll student in behavioral improvement programs.",
        ));
    }

    recommendations
}

impl<R: RiskRecords> RiskScorer<'_, R> {
    pub fn recommend_interventions(
        &self,
        student_id: Uuid,
        semester: &str,
    ) -> Result<Vec<Recommendation>> {
        let assessment = self.calculate_risk_score(student_id, semester)?;
        Ok(recommend_for(&assessment))
    }
}
