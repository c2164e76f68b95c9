use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub grade: Option<String>,
}

/// One course result for a student in a semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub student_id: Uuid,
    pub semester: String,
    pub course: String,
    pub grade: Option<f64>,
    pub ela_score: Option<i32>,
    pub math_score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: Uuid,
    pub semester: String,
    pub attendance_rate: Option<f64>,
    pub absent_days: Option<i32>,
    pub tardy_days: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    pub student_id: Uuid,
    pub semester: String,
    #[serde(default)]
    pub disciplinary_actions: i32,
    #[serde(default)]
    pub suspensions: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::High, RiskTier::Medium, RiskTier::Low];

    /// Ordering used for minimum-tier filtering: HIGH > MEDIUM > LOW.
    pub fn priority(self) -> u8 {
        match self {
            RiskTier::High => 3,
            RiskTier::Medium => 2,
            RiskTier::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::High => "HIGH",
            RiskTier::Medium => "MEDIUM",
            RiskTier::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(RiskTier::High),
            "MEDIUM" => Ok(RiskTier::Medium),
            "LOW" => Ok(RiskTier::Low),
            other => Err(format!("unknown risk tier '{other}' (expected HIGH, MEDIUM or LOW)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub student_id: Uuid,
    pub student_name: String,
    pub semester: String,
    pub academic_score: f64,
    pub attendance_score: f64,
    pub behavior_score: f64,
    pub tardiness_score: f64,
    pub total_score: f64,
    pub tier: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRiskStudent {
    pub student_id: Uuid,
    pub student_name: String,
    pub grade: Option<String>,
    pub risk_score: f64,
    pub tier: RiskTier,
    pub semester: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
}

impl Recommendation {
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionStatus {
    OnTrack,
    NotOnTrack,
    Completed,
}

impl InterventionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InterventionStatus::OnTrack => "ON_TRACK",
            InterventionStatus::NotOnTrack => "NOT_ON_TRACK",
            InterventionStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterventionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_TRACK" => Ok(InterventionStatus::OnTrack),
            "NOT_ON_TRACK" => Ok(InterventionStatus::NotOnTrack),
            "COMPLETED" => Ok(InterventionStatus::Completed),
            other => Err(format!("unknown intervention status '{other}'")),
        }
    }
}

/// Request to open a new intervention plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIntervention {
    pub student_id: Uuid,
    pub intervention_type: String,
    pub start_date: NaiveDate,
    pub target_completion_date: NaiveDate,
    pub start_score: f64,
    pub goal_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: Uuid,
    pub student_id: Uuid,
    pub intervention_type: String,
    pub start_date: NaiveDate,
    pub target_completion_date: NaiveDate,
    pub start_score: f64,
    pub current_score: f64,
    pub goal_score: f64,
    pub status: InterventionStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated_on: Option<NaiveDate>,
}

impl Intervention {
    /// Builds the initial state of a plan: no progress yet, on track.
    pub fn open(request: NewIntervention, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            student_id: request.student_id,
            intervention_type: request.intervention_type,
            start_date: request.start_date,
            target_completion_date: request.target_completion_date,
            start_score: request.start_score,
            current_score: request.start_score,
            goal_score: request.goal_score,
            status: InterventionStatus::OnTrack,
            created_at,
            last_updated_on: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub current_score: f64,
    pub updated_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionSummary {
    pub semester: String,
    pub total_interventions: usize,
    pub completed_interventions: usize,
    pub on_track_interventions: usize,
    pub not_on_track_interventions: usize,
    pub average_progress_rate: f64,
}

#[derive(Debug, Clone)]
pub struct TierSummary {
    pub tier: RiskTier,
    pub count: usize,
    pub avg_score: f64,
}
