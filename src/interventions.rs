//! Intervention plans and their pacing state machine.
//!
//! A plan starts ON_TRACK. Each progress update re-derives ON_TRACK or
//! NOT_ON_TRACK from the current snapshot, and reaching the goal score forces
//! COMPLETED. COMPLETED is terminal: later updates still record the score but
//! keep the status.
//!
//! Two progress measures exist with opposite sign conventions: pacing treats a
//! *drop* toward the goal as improvement, while the progress rate treats a
//! *rise* as improvement. Both are kept as-is so stored statuses and reported
//! rates stay comparable with existing data.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    Intervention, InterventionStatus, InterventionSummary, NewIntervention, ProgressUpdate,
};
use crate::numeric::{div_half_up, from_scaled, ratio, to_scaled};
use crate::store::{InterventionStore, RiskRecords};

/// Fraction of elapsed time the score progress must keep up with.
pub const PACING_TOLERANCE: f64 = 0.8;

pub fn is_on_track(intervention: &Intervention, as_of: NaiveDate) -> bool {
    let total_days = (intervention.target_completion_date - intervention.start_date).num_days();
    let elapsed_days = (as_of - intervention.start_date).num_days();

    if total_days <= 0 {
        return false;
    }

    let time_progress = elapsed_days as f64 / total_days as f64;

    let needed_improvement = intervention.start_score - intervention.goal_score;
    let actual_improvement = intervention.start_score - intervention.current_score;

    if needed_improvement <= 0.0 {
        return true;
    }

    let score_progress = ratio(actual_improvement, needed_improvement, 4);
    score_progress >= time_progress * PACING_TOLERANCE
}

/// Share of the start-to-goal range covered, in hundredths of a percent.
/// A plan with no range counts as fully covered.
pub fn progress_basis_points(intervention: &Intervention) -> i64 {
    let score_range = intervention.goal_score - intervention.start_score;

    if score_range <= 0.0 {
        return 10_000;
    }

    let actual_progress = intervention.current_score - intervention.start_score;
    to_scaled(actual_progress / score_range, 4)
}

pub fn progress_rate(intervention: &Intervention) -> f64 {
    from_scaled(progress_basis_points(intervention), 2)
}

/// Applies a new score and re-derives status as of `today`.
pub fn apply_progress(
    intervention: &mut Intervention,
    update: &ProgressUpdate,
    today: NaiveDate,
) {
    intervention.current_score = update.current_score;
    intervention.last_updated_on = Some(update.updated_on);

    if intervention.status == InterventionStatus::Completed {
        return;
    }

    intervention.status = if is_on_track(intervention, today) {
        InterventionStatus::OnTrack
    } else {
        InterventionStatus::NotOnTrack
    };

    if update.current_score >= intervention.goal_score {
        intervention.status = InterventionStatus::Completed;
    }
}

pub fn parse_year(semester: &str) -> Result<i32> {
    semester.parse::<i32>().map_err(|_| {
        Error::InvalidArgument(format!(
            "Invalid semester format '{semester}'. Expected year format like '2024'"
        ))
    })
}

pub fn summarize_interventions(semester: &str, interventions: &[Intervention]) -> InterventionSummary {
    let mut completed = 0;
    let mut on_track = 0;
    let mut not_on_track = 0;
    let mut total_progress: i64 = 0;

    for intervention in interventions {
        match intervention.status {
            InterventionStatus::Completed => completed += 1,
            InterventionStatus::OnTrack => on_track += 1,
            InterventionStatus::NotOnTrack => not_on_track += 1,
        }
        total_progress += progress_basis_points(intervention);
    }

    let average_progress_rate = if interventions.is_empty() {
        0.0
    } else {
        from_scaled(div_half_up(total_progress, interventions.len() as i64), 2)
    };

    InterventionSummary {
        semester: semester.to_string(),
        total_interventions: interventions.len(),
        completed_interventions: completed,
        on_track_interventions: on_track,
        not_on_track_interventions: not_on_track,
        average_progress_rate,
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct InterventionTracker<'a, S> {
    store: &'a mut S,
    today: fn() -> NaiveDate,
}

impl<'a, S> InterventionTracker<'a, S>
where
    S: InterventionStore + RiskRecords,
{
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            today: local_today,
        }
    }

    /// Overrides the date source used to pace progress updates.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn create_intervention(&mut self, request: NewIntervention) -> Result<Intervention> {
        if self.store.find_student(request.student_id).is_none() {
            return Err(Error::student_not_found(request.student_id));
        }

        if request.target_completion_date < request.start_date {
            warn!(
                student_id = %request.student_id,
                start = %request.start_date,
                target = %request.target_completion_date,
                "rejected intervention with target before start"
            );
            return Err(Error::InvalidArgument(
                "Target completion date cannot be before start date".to_string(),
            ));
        }

        let intervention = self.store.insert_intervention(request);
        info!(
            intervention_id = %intervention.id,
            student_id = %intervention.student_id,
            kind = %intervention.intervention_type,
            "opened intervention"
        );
        Ok(intervention)
    }

    pub fn update_progress(
        &mut self,
        intervention_id: Uuid,
        update: ProgressUpdate,
    ) -> Result<Intervention> {
        let mut intervention = self
            .store
            .find_intervention(intervention_id)
            .ok_or_else(|| Error::intervention_not_found(intervention_id))?;

        let previous = intervention.status;
        apply_progress(&mut intervention, &update, (self.today)());

        info!(
            %intervention_id,
            current_score = intervention.current_score,
            from = %previous,
            to = %intervention.status,
            "recorded intervention progress"
        );
        Ok(self.store.save_intervention(intervention))
    }

    pub fn interventions_for_student(&self, student_id: Uuid) -> Result<Vec<Intervention>> {
        if self.store.find_student(student_id).is_none() {
            return Err(Error::student_not_found(student_id));
        }
        Ok(self.store.find_interventions_by_student(student_id))
    }

    pub fn summarize(&self, semester: &str) -> Result<InterventionSummary> {
        let year = parse_year(semester)?;
        let interventions = self.store.find_interventions_by_year(year);
        Ok(summarize_interventions(semester, &interventions))
    }
}
