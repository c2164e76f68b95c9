use tracing::{info, warn};

use crate::models::AtRiskStudent;

/// Delivery channel for at-risk alerts.
pub trait Notifier {
    fn notify(&mut self, student: &AtRiskStudent);
}

/// Writes alerts to the tracing log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, student: &AtRiskStudent) {
        warn!(
            student_id = %student.student_id,
            semester = %student.semester,
            "ALERT: Student {} is at {} risk (Score: {:.2})",
            student.student_name,
            student.tier,
            student.risk_score
        );
    }
}

/// Sends one alert per student and returns how many were sent.
pub fn notify_stakeholders(notifier: &mut impl Notifier, at_risk: &[AtRiskStudent]) -> usize {
    info!("Notifying stakeholders about {} at-risk students", at_risk.len());
    for student in at_risk {
        notifier.notify(student);
    }
    at_risk.len()
}
