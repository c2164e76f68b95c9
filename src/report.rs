use std::fmt::Write;

use crate::models::{AtRiskStudent, InterventionSummary, RiskTier, TierSummary};
use crate::risk;

pub fn summarize_by_tier(students: &[AtRiskStudent]) -> Vec<TierSummary> {
    RiskTier::ALL
        .into_iter()
        .map(|tier| {
            let scores: Vec<f64> = students
                .iter()
                .filter(|s| s.tier == tier)
                .map(|s| s.risk_score)
                .collect();
            TierSummary {
                tier,
                count: scores.len(),
                avg_score: if scores.is_empty() {
                    0.0
                } else {
                    scores.iter().sum::<f64>() / scores.len() as f64
                },
            }
        })
        .filter(|summary| summary.count > 0)
        .collect()
}

pub fn build_report(
    semester: &str,
    students: &[AtRiskStudent],
    summary: Option<&InterventionSummary>,
) -> String {
    let tiers = summarize_by_tier(students);
    let mut ranked = students.to_vec();
    risk::sort_by_risk(&mut ranked);

    let mut output = String::new();

    let _ = writeln!(output, "# Student Risk Report");
    let _ = writeln!(output, "Generated for semester {semester}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Tier Mix");

    if tiers.is_empty() {
        let _ = writeln!(output, "No students scored for this semester.");
    } else {
        for tier in tiers.iter() {
            let _ = writeln!(
                output,
                "- {}: {} students (avg score {:.1})",
                tier.tier, tier.count, tier.avg_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Students");

    let flagged: Vec<&AtRiskStudent> = ranked
        .iter()
        .filter(|s| risk::meets_minimum(s.tier, Some(RiskTier::Medium)))
        .collect();

    if flagged.is_empty() {
        let _ = writeln!(output, "No students at MEDIUM risk or above.");
    } else {
        for student in flagged.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} (grade {}) score {:.2} [{}]",
                student.student_name,
                student.grade.as_deref().unwrap_or("n/a"),
                student.risk_score,
                student.tier
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Interventions");

    match summary {
        Some(summary) if summary.total_interventions > 0 => {
            let _ = writeln!(
                output,
                "- {} total for {}: {} completed, {} on track, {} not on track",
                summary.total_interventions,
                summary.semester,
                summary.completed_interventions,
                summary.on_track_interventions,
                summary.not_on_track_interventions
            );
            let _ = writeln!(
                output,
                "- Average progress rate {:.2}%",
                summary.average_progress_rate
            );
        }
        _ => {
            let _ = writeln!(output, "No interventions recorded for this period.");
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn student(name: &str, score: f64) -> AtRiskStudent {
        AtRiskStudent {
            student_id: Uuid::new_v4(),
            student_name: name.to_string(),
            grade: Some("9".to_string()),
            risk_score: score,
            tier: risk::tier_for(score),
            semester: "2024-Fall".to_string(),
        }
    }

    #[test]
    fn tier_mix_skips_empty_tiers() {
        let tiers = summarize_by_tier(&[student("A", 80.0), student("B", 90.0), student("C", 10.0)]);
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].tier, RiskTier::High);
        assert_eq!(tiers[0].count, 2);
        assert_eq!(tiers[0].avg_score, 85.0);
        assert_eq!(tiers[1].tier, RiskTier::Low);
    }

    #[test]
    fn report_ranks_flagged_students_and_lists_summary() {
        let students = vec![
            student("Jules Moreno", 45.0),
            student("Avery Lee", 20.0),
            student("Kiara Patel", 85.0),
        ];
        let summary = InterventionSummary {
            semester: "2024".to_string(),
            total_interventions: 3,
            completed_interventions: 1,
            on_track_interventions: 1,
            not_on_track_interventions: 1,
            average_progress_rate: 50.0,
        };

        let report = build_report("2024-Fall", &students, Some(&summary));

        let kiara = report.find("Kiara Patel").unwrap();
        let jules = report.find("Jules Moreno").unwrap();
        assert!(kiara < jules);
        assert!(!report.contains("Avery Lee"));
        assert!(report.contains("- LOW: 1 students"));
        assert!(report.contains("Average progress rate 50.00%"));
    }

    #[test]
    fn empty_report_has_placeholders() {
        let report = build_report("2024-Fall", &[], None);
        assert!(report.contains("No students scored for this semester."));
        assert!(report.contains("No interventions recorded for this period."));
    }
}
