//! Postgres persistence. The scoring core never touches the pool: commands load
//! a [`MemoryStore`] snapshot, run the synchronous core over it, and write
//! changed interventions back with [`save_intervention`].

use chrono::{Duration, Local, NaiveDate};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    AcademicRecord, AttendanceRecord, BehaviorRecord, Intervention, InterventionStatus,
    NewIntervention, Student,
};
use crate::roster::RosterRow;
use crate::store::MemoryStore;

pub async fn init_db(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_student(pool: &PgPool, student: &Student) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO student_risk.students (id, full_name, grade_level)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
        SET full_name = EXCLUDED.full_name, grade_level = EXCLUDED.grade_level
        "#,
    )
    .bind(student.id)
    .bind(&student.name)
    .bind(&student.grade)
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_academic(pool: &PgPool, record: &AcademicRecord) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO student_risk.academic_records
        (id, student_id, semester, course, grade, ela_score, math_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (student_id, semester, course) DO UPDATE
        SET grade = EXCLUDED.grade,
            ela_score = EXCLUDED.ela_score,
            math_score = EXCLUDED.math_score
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(record.student_id)
    .bind(&record.semester)
    .bind(&record.course)
    .bind(record.grade)
    .bind(record.ela_score)
    .bind(record.math_score)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

async fn upsert_attendance(pool: &PgPool, record: &AttendanceRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO student_risk.attendance_records
        (student_id, semester, attendance_rate, absent_days, tardy_days)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (student_id, semester) DO UPDATE
        SET attendance_rate = EXCLUDED.attendance_rate,
            absent_days = EXCLUDED.absent_days,
            tardy_days = EXCLUDED.tardy_days
        "#,
    )
    .bind(record.student_id)
    .bind(&record.semester)
    .bind(record.attendance_rate)
    .bind(record.absent_days)
    .bind(record.tardy_days)
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_behavior(pool: &PgPool, record: &BehaviorRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO student_risk.behavior_records
        (student_id, semester, disciplinary_actions, suspensions)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (student_id, semester) DO UPDATE
        SET disciplinary_actions = EXCLUDED.disciplinary_actions,
            suspensions = EXCLUDED.suspensions
        "#,
    )
    .bind(record.student_id)
    .bind(&record.semester)
    .bind(record.disciplinary_actions)
    .bind(record.suspensions)
    .execute(pool)
    .await?;
    Ok(())
}

/// Writes one roster row. Returns how many course rows were inserted or updated.
async fn upsert_roster_row(pool: &PgPool, row: &RosterRow) -> Result<u64> {
    upsert_student(pool, &row.student()).await?;
    let written = upsert_academic(pool, &row.academic()).await?;
    if let Some(attendance) = row.attendance() {
        upsert_attendance(pool, &attendance).await?;
    }
    if let Some(behavior) = row.behavior() {
        upsert_behavior(pool, &behavior).await?;
    }
    Ok(written)
}

pub async fn seed(pool: &PgPool) -> Result<()> {
    let avery = Uuid::from_u128(0x3d7f5d6f_24f7_4e8e_8b4b_3e7e44b4a7b2);
    let jules = Uuid::from_u128(0x0c22f1f1_9184_4fd4_9b21_28c68a6a89dc);
    let kiara = Uuid::from_u128(0xd5a0a1a2_2a3c_44c2_8f73_60b7897a9dd2);

    let rows = vec![
        // HIGH: every component fires
        seed_row(avery, "Avery Lee", "10", "Algebra II", Some(58.0), None, Some(450))
            .with_attendance(Some(80.0), Some(15), Some(9))
            .with_behavior(5, 2),
        // MEDIUM: one failing course plus a low attendance rate
        seed_row(jules, "Jules Moreno", "11", "Chemistry", Some(66.0), Some(520), None)
            .with_attendance(Some(87.5), Some(6), Some(3))
            .with_behavior(1, 0),
        // LOW
        seed_row(kiara, "Kiara Patel", "10", "World History", Some(91.0), Some(610), Some(588))
            .with_attendance(Some(97.0), Some(2), Some(1)),
    ];

    for row in &rows {
        upsert_roster_row(pool, row).await?;
    }

    let start = Local::now().date_naive() - Duration::days(30);
    let attendance_plan = Intervention::open(
        NewIntervention {
            student_id: avery,
            intervention_type: "Attendance Recovery".to_string(),
            start_date: start,
            target_completion_date: start + Duration::days(90),
            start_score: 15.0,
            goal_score: 5.0,
        },
        Uuid::from_u128(0x9b1c2f40_7a55_4c1e_9d0e_5f3a6b7c8d90),
        chrono::Utc::now(),
    );
    save_intervention(pool, &attendance_plan).await?;

    info!(students = rows.len(), "seeded demo roster");
    Ok(())
}

fn seed_row(
    student_id: Uuid,
    name: &str,
    grade_level: &str,
    course: &str,
    grade: Option<f64>,
    ela_score: Option<i32>,
    math_score: Option<i32>,
) -> RosterRow {
    RosterRow {
        student_id,
        full_name: name.to_string(),
        grade_level: Some(grade_level.to_string()),
        semester: "2026-Spring".to_string(),
        course: course.to_string(),
        grade,
        ela_score,
        math_score,
        attendance_rate: None,
        absent_days: None,
        tardy_days: None,
        disciplinary_actions: None,
        suspensions: None,
    }
}

impl RosterRow {
    fn with_attendance(mut self, rate: Option<f64>, absent: Option<i32>, tardy: Option<i32>) -> Self {
        self.attendance_rate = rate;
        self.absent_days = absent;
        self.tardy_days = tardy;
        self
    }

    fn with_behavior(mut self, actions: i32, suspensions: i32) -> Self {
        self.disciplinary_actions = Some(actions);
        self.suspensions = Some(suspensions);
        self
    }
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> Result<usize> {
    let rows = crate::roster::read_roster_file(csv_path)?;
    let mut written = 0usize;

    for row in &rows {
        if upsert_roster_row(pool, row).await? > 0 {
            written += 1;
        }
    }

    info!(rows = rows.len(), written, path = %csv_path.display(), "imported roster");
    Ok(written)
}

fn intervention_from_row(row: &PgRow) -> Result<Intervention> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<InterventionStatus>()
        .map_err(|e| Error::Database(sqlx::Error::Decode(e.into())))?;

    Ok(Intervention {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        intervention_type: row.try_get("intervention_type")?,
        start_date: row.try_get("start_date")?,
        target_completion_date: row.try_get("target_completion_date")?,
        start_score: row.try_get("start_score")?,
        current_score: row.try_get("current_score")?,
        goal_score: row.try_get("goal_score")?,
        status,
        created_at: row.try_get("created_at")?,
        last_updated_on: row.try_get::<Option<NaiveDate>, _>("last_updated_on")?,
    })
}

/// Loads students and interventions, plus the records for `semester` when given.
pub async fn load_store(pool: &PgPool, semester: Option<&str>) -> Result<MemoryStore> {
    let mut store = MemoryStore::new();

    let students = sqlx::query(
        "SELECT id, full_name, grade_level FROM student_risk.students ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;
    for row in students {
        store.add_student(Student {
            id: row.try_get("id")?,
            name: row.try_get("full_name")?,
            grade: row.try_get("grade_level")?,
        });
    }

    if let Some(semester) = semester {
        let academics = sqlx::query(
            "SELECT student_id, semester, course, grade, ela_score, math_score \
             FROM student_risk.academic_records WHERE semester = $1 ORDER BY course",
        )
        .bind(semester)
        .fetch_all(pool)
        .await?;
        for row in academics {
            store.add_academic_record(AcademicRecord {
                student_id: row.try_get("student_id")?,
                semester: row.try_get("semester")?,
                course: row.try_get("course")?,
                grade: row.try_get("grade")?,
                ela_score: row.try_get("ela_score")?,
                math_score: row.try_get("math_score")?,
            });
        }

        let attendance = sqlx::query(
            "SELECT student_id, semester, attendance_rate, absent_days, tardy_days \
             FROM student_risk.attendance_records WHERE semester = $1",
        )
        .bind(semester)
        .fetch_all(pool)
        .await?;
        for row in attendance {
            store.set_attendance_record(AttendanceRecord {
                student_id: row.try_get("student_id")?,
                semester: row.try_get("semester")?,
                attendance_rate: row.try_get("attendance_rate")?,
                absent_days: row.try_get("absent_days")?,
                tardy_days: row.try_get("tardy_days")?,
            });
        }

        let behavior = sqlx::query(
            "SELECT student_id, semester, disciplinary_actions, suspensions \
             FROM student_risk.behavior_records WHERE semester = $1",
        )
        .bind(semester)
        .fetch_all(pool)
        .await?;
        for row in behavior {
            store.set_behavior_record(BehaviorRecord {
                student_id: row.try_get("student_id")?,
                semester: row.try_get("semester")?,
                disciplinary_actions: row.try_get("disciplinary_actions")?,
                suspensions: row.try_get("suspensions")?,
            });
        }
    }

    let interventions = sqlx::query(
        "SELECT id, student_id, intervention_type, start_date, target_completion_date, \
         start_score, current_score, goal_score, status, created_at, last_updated_on \
         FROM student_risk.interventions ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;
    for row in interventions {
        store.restore_intervention(intervention_from_row(&row)?);
    }

    Ok(store)
}

pub async fn save_intervention(pool: &PgPool, intervention: &Intervention) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO student_risk.interventions
        (id, student_id, intervention_type, start_date, target_completion_date,
         start_score, current_score, goal_score, status, created_at, last_updated_on)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE
        SET current_score = EXCLUDED.current_score,
            status = EXCLUDED.status,
            last_updated_on = EXCLUDED.last_updated_on
        "#,
    )
    .bind(intervention.id)
    .bind(intervention.student_id)
    .bind(&intervention.intervention_type)
    .bind(intervention.start_date)
    .bind(intervention.target_completion_date)
    .bind(intervention.start_score)
    .bind(intervention.current_score)
    .bind(intervention.goal_score)
    .bind(intervention.status.as_str())
    .bind(intervention.created_at)
    .bind(intervention.last_updated_on)
    .execute(pool)
    .await?;

    info!(intervention_id = %intervention.id, status = %intervention.status, "saved intervention");
    Ok(())
}
