use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use student_risk::interventions::{is_on_track, progress_rate, InterventionTracker};
use student_risk::models::{
    AcademicRecord, AttendanceRecord, BehaviorRecord, InterventionStatus, NewIntervention,
    ProgressUpdate, RiskTier, Student,
};
use student_risk::recommend::recommend_for;
use student_risk::risk::{sort_by_risk, RiskScorer};
use student_risk::store::MemoryStore;
use student_risk::Error;

const SEMESTER: &str = "2024-Fall";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()
}

fn add_student(store: &mut MemoryStore, name: &str, grade: &str) -> Uuid {
    let id = Uuid::new_v4();
    store.add_student(Student {
        id,
        name: name.to_string(),
        grade: Some(grade.to_string()),
    });
    id
}

fn roster() -> (MemoryStore, Uuid, Uuid, Uuid) {
    let mut store = MemoryStore::new();

    let low = add_student(&mut store, "Kiara Patel", "10");
    store.add_academic_record(AcademicRecord {
        student_id: low,
        semester: SEMESTER.to_string(),
        course: "Geometry".to_string(),
        grade: Some(68.0),
        ela_score: None,
        math_score: None,
    });
    store.set_attendance_record(AttendanceRecord {
        student_id: low,
        semester: SEMESTER.to_string(),
        attendance_rate: Some(95.0),
        absent_days: Some(4),
        tardy_days: Some(2),
    });

    let high = add_student(&mut store, "Avery Lee", "10");
    store.add_academic_record(AcademicRecord {
        student_id: high,
        semester: SEMESTER.to_string(),
        course: "Algebra II".to_string(),
        grade: Some(58.0),
        ela_score: None,
        math_score: Some(450),
    });
    store.set_attendance_record(AttendanceRecord {
        student_id: high,
        semester: SEMESTER.to_string(),
        attendance_rate: Some(80.0),
        absent_days: Some(15),
        tardy_days: Some(9),
    });
    store.set_behavior_record(BehaviorRecord {
        student_id: high,
        semester: SEMESTER.to_string(),
        disciplinary_actions: 5,
        suspensions: 2,
    });

    let medium = add_student(&mut store, "Jules Moreno", "11");
    store.add_academic_record(AcademicRecord {
        student_id: medium,
        semester: SEMESTER.to_string(),
        course: "Chemistry".to_string(),
        grade: Some(66.0),
        ela_score: Some(480),
        math_score: None,
    });

    (store, low, high, medium)
}

#[test]
fn scores_rank_and_recommend_across_a_roster() {
    let (store, low, high, medium) = roster();
    let scorer = RiskScorer::new(&store);

    let avery = scorer.calculate_risk_score(high, SEMESTER).unwrap();
    assert_eq!(
        (avery.academic_score, avery.attendance_score, avery.behavior_score, avery.tardiness_score),
        (40.0, 30.0, 20.0, 10.0)
    );
    assert_eq!(avery.total_score, 100.0);
    assert_eq!(avery.tier, RiskTier::High);

    let jules = scorer.calculate_risk_score(medium, SEMESTER).unwrap();
    assert_eq!(jules.total_score, 40.0);
    assert_eq!(jules.tier, RiskTier::Medium);

    let kiara = scorer.calculate_risk_score(low, SEMESTER).unwrap();
    assert_eq!(kiara.total_score, 25.0);
    assert_eq!(kiara.tier, RiskTier::Low);

    let flagged = scorer
        .identify_at_risk_students(SEMESTER, Some(RiskTier::Medium))
        .unwrap();
    let order: Vec<&str> = flagged.iter().map(|s| s.student_name.as_str()).collect();
    assert_eq!(order, vec!["Avery Lee", "Jules Moreno"]);

    let mut everyone = scorer.identify_at_risk_students(SEMESTER, None).unwrap();
    assert_eq!(everyone[0].student_name, "Kiara Patel");
    sort_by_risk(&mut everyone);
    let ranked: Vec<f64> = everyone.iter().map(|s| s.risk_score).collect();
    assert_eq!(ranked, vec![100.0, 40.0, 25.0]);

    let titles: Vec<String> = recommend_for(&jules).into_iter().map(|r| r.title).collect();
    assert_eq!(
        titles,
        vec![
            "Regular Teacher Check-ins".to_string(),
            "Attendance Monitoring".to_string(),
            "Subject-Specific Tutoring".to_string(),
        ]
    );
}

#[test]
fn other_semesters_contribute_nothing() {
    let (store, _, high, _) = roster();
    let assessment = RiskScorer::new(&store)
        .calculate_risk_score(high, "2025-Spring")
        .unwrap();
    assert_eq!(assessment.total_score, 0.0);
    assert_eq!(assessment.tier, RiskTier::Low);
}

#[test]
fn intervention_lifecycle_and_summary() {
    let (mut store, _, high, medium) = roster();
    let mut tracker = InterventionTracker::new(&mut store).with_clock(today);
    let start = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

    let tutoring = tracker
        .create_intervention(NewIntervention {
            student_id: high,
            intervention_type: "Math Tutoring".to_string(),
            start_date: start,
            target_completion_date: start + Duration::days(120),
            start_score: 45.0,
            goal_score: 75.0,
        })
        .unwrap();
    assert_eq!(tutoring.status, InterventionStatus::OnTrack);
    assert!(is_on_track(&tutoring, start));
    assert_eq!(progress_rate(&tutoring), 0.0);

    let counseling = tracker
        .create_intervention(NewIntervention {
            student_id: medium,
            intervention_type: "Attendance Counseling".to_string(),
            start_date: start,
            target_completion_date: start + Duration::days(90),
            start_score: 20.0,
            goal_score: 60.0,
        })
        .unwrap();

    let halfway = tracker
        .update_progress(
            tutoring.id,
            ProgressUpdate {
                current_score: 60.0,
                updated_on: today(),
            },
        )
        .unwrap();
    assert_eq!(halfway.status, InterventionStatus::OnTrack);
    assert_eq!(progress_rate(&halfway), 50.0);

    let done = tracker
        .update_progress(
            counseling.id,
            ProgressUpdate {
                current_score: 60.0,
                updated_on: today(),
            },
        )
        .unwrap();
    assert_eq!(done.status, InterventionStatus::Completed);

    let rejected = tracker.create_intervention(NewIntervention {
        student_id: medium,
        intervention_type: "Backdated".to_string(),
        start_date: start,
        target_completion_date: start - Duration::days(1),
        start_score: 20.0,
        goal_score: 60.0,
    });
    assert!(matches!(rejected, Err(Error::InvalidArgument(_))));

    assert_eq!(tracker.interventions_for_student(high).unwrap().len(), 1);

    let summary = tracker.summarize("2024").unwrap();
    assert_eq!(summary.total_interventions, 2);
    assert_eq!(summary.completed_interventions, 1);
    assert_eq!(summary.on_track_interventions, 1);
    assert_eq!(summary.not_on_track_interventions, 0);
    assert_eq!(summary.average_progress_rate, 75.0);

    assert!(matches!(tracker.summarize("Fall"), Err(Error::InvalidArgument(_))));
    assert_eq!(tracker.summarize("2023").unwrap().total_interventions, 0);
}
