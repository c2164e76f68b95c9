use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use student_risk::access::{ensure_can_view_student, Principal, Role, RolePolicy};
use student_risk::interventions::InterventionTracker;
use student_risk::models::{NewIntervention, ProgressUpdate, RiskTier};
use student_risk::notify::{notify_stakeholders, LogNotifier};
use student_risk::risk::{sort_by_risk, RiskScorer};
use student_risk::{db, report};

#[derive(Parser)]
#[command(name = "student-risk")]
#[command(about = "Student risk scoring and intervention tracking", long_about = None)]
struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    #[arg(long, env = "STUDENT_RISK_MAX_CONNECTIONS", default_value_t = 5, global = true)]
    max_connections: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import a roster CSV (one row per student and course)
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Score one student for a semester
    Score {
        #[arg(long)]
        student: Uuid,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        json: bool,
    },
    /// List students at or above a risk tier
    AtRisk {
        #[arg(long)]
        semester: String,
        /// HIGH, MEDIUM or LOW; omit to list everyone
        #[arg(long)]
        min_tier: Option<RiskTier>,
        /// Rank by score instead of roster order
        #[arg(long)]
        sorted: bool,
        /// Send an alert for every listed student
        #[arg(long)]
        notify: bool,
        #[arg(long)]
        json: bool,
    },
    /// Suggest supports for one student
    Recommend {
        #[arg(long)]
        student: Uuid,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        json: bool,
    },
    /// Manage intervention plans
    Intervention {
        #[command(subcommand)]
        action: InterventionCommand,
    },
    /// Summarize interventions started in a year
    Summary {
        /// Four digit year, e.g. 2024
        #[arg(long)]
        semester: String,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        semester: String,
        /// Year whose interventions to include
        #[arg(long)]
        year: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum InterventionCommand {
    /// Open a new plan for a student
    Create {
        #[arg(long)]
        student: Uuid,
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        target: NaiveDate,
        #[arg(long)]
        start_score: f64,
        #[arg(long)]
        goal_score: f64,
    },
    /// Record a new current score
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        score: f64,
        /// Date the score was measured; defaults to today
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// List a student's plans
    List {
        #[arg(long)]
        student: Uuid,
        /// Role of the person asking: admin, teacher, parent or student
        #[arg(long)]
        role: Role,
        #[arg(long)]
        user: String,
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn check_score(label: &str, value: f64) -> anyhow::Result<()> {
    if !(0.0..=100.0).contains(&value) {
        anyhow::bail!("{label} must be between 0 and 100, got {value}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let database_url = cli
        .database_url
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(cli.max_connections)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let written = db::import_csv(&pool, &csv).await?;
            println!("Wrote {written} course records from {}.", csv.display());
        }
        Commands::Score {
            student,
            semester,
            json,
        } => {
            let store = db::load_store(&pool, Some(&semester)).await?;
            let assessment = RiskScorer::new(&store).calculate_risk_score(student, &semester)?;

            if json {
                return print_json(&assessment);
            }
            println!(
                "{} ({}) {} risk, score {:.2}",
                assessment.student_name, assessment.semester, assessment.tier, assessment.total_score
            );
            println!(
                "  academic {:.2} / attendance {:.2} / behavior {:.2} / tardiness {:.2}",
                assessment.academic_score,
                assessment.attendance_score,
                assessment.behavior_score,
                assessment.tardiness_score
            );
        }
        Commands::AtRisk {
            semester,
            min_tier,
            sorted,
            notify,
            json,
        } => {
            let store = db::load_store(&pool, Some(&semester)).await?;
            let mut students =
                RiskScorer::new(&store).identify_at_risk_students(&semester, min_tier)?;
            if sorted {
                sort_by_risk(&mut students);
            }
            if notify {
                notify_stakeholders(&mut LogNotifier, &students);
            }

            if json {
                return print_json(&students);
            }
            if students.is_empty() {
                println!("No students match this tier for {semester}.");
                return Ok(());
            }
            for student in &students {
                println!(
                    "- {} (grade {}) score {:.2} [{}]",
                    student.student_name,
                    student.grade.as_deref().unwrap_or("n/a"),
                    student.risk_score,
                    student.tier
                );
            }
        }
        Commands::Recommend {
            student,
            semester,
            json,
        } => {
            let store = db::load_store(&pool, Some(&semester)).await?;
            let recommendations =
                RiskScorer::new(&store).recommend_interventions(student, &semester)?;

            if json {
                return print_json(&recommendations);
            }
            for (rank, recommendation) in recommendations.iter().enumerate() {
                println!(
                    "{}. {}: {}",
                    rank + 1,
                    recommendation.title,
                    recommendation.description
                );
            }
        }
        Commands::Intervention { action } => {
            let mut store = db::load_store(&pool, None).await?;
            let mut tracker = InterventionTracker::new(&mut store);

            match action {
                InterventionCommand::Create {
                    student,
                    kind,
                    start,
                    target,
                    start_score,
                    goal_score,
                } => {
                    check_score("start score", start_score)?;
                    check_score("goal score", goal_score)?;
                    let intervention = tracker.create_intervention(NewIntervention {
                        student_id: student,
                        intervention_type: kind,
                        start_date: start,
                        target_completion_date: target,
                        start_score,
                        goal_score,
                    })?;
                    db::save_intervention(&pool, &intervention).await?;
                    println!("Created intervention {}.", intervention.id);
                }
                InterventionCommand::Update { id, score, on } => {
                    check_score("score", score)?;
                    let intervention = tracker.update_progress(
                        id,
                        ProgressUpdate {
                            current_score: score,
                            updated_on: on.unwrap_or_else(|| Local::now().date_naive()),
                        },
                    )?;
                    db::save_intervention(&pool, &intervention).await?;
                    println!(
                        "Intervention {} is now {} at score {:.2}.",
                        intervention.id, intervention.status, intervention.current_score
                    );
                }
                InterventionCommand::List {
                    student,
                    role,
                    user,
                    json,
                } => {
                    ensure_can_view_student(&RolePolicy, &Principal::new(user, role), student)?;
                    let interventions = tracker.interventions_for_student(student)?;

                    if json {
                        return print_json(&interventions);
                    }
                    if interventions.is_empty() {
                        println!("No interventions recorded for {student}.");
                    }
                    for intervention in &interventions {
                        println!(
                            "- {} {} ({} to {}): {:.2} -> {:.2}, now {:.2} [{}]",
                            intervention.id,
                            intervention.intervention_type,
                            intervention.start_date,
                            intervention.target_completion_date,
                            intervention.start_score,
                            intervention.goal_score,
                            intervention.current_score,
                            intervention.status
                        );
                    }
                }
            }
        }
        Commands::Summary { semester, json } => {
            let mut store = db::load_store(&pool, None).await?;
            let summary = InterventionTracker::new(&mut store).summarize(&semester)?;

            if json {
                return print_json(&summary);
            }
            println!(
                "{}: {} interventions ({} completed, {} on track, {} not on track), average progress {:.2}%",
                summary.semester,
                summary.total_interventions,
                summary.completed_interventions,
                summary.on_track_interventions,
                summary.not_on_track_interventions,
                summary.average_progress_rate
            );
        }
        Commands::Report {
            semester,
            year,
            out,
        } => {
            let mut store = db::load_store(&pool, Some(&semester)).await?;
            let students = RiskScorer::new(&store).identify_at_risk_students(&semester, None)?;
            let summary = match year.as_deref() {
                Some(year) => Some(InterventionTracker::new(&mut store).summarize(year)?),
                None => None,
            };
            let report = report::build_report(&semester, &students, summary.as_ref());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
