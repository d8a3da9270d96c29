use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::submission::models::{StoredRecord, Submission};

/// Durably stores a canonical submission, returning the record with its
/// server-generated id and creation timestamp.
///
/// CRITICAL: the applications table is append-only. Records are never
/// updated or deleted; the table is the audit trail downstream consumers
/// (including the offline resume-extraction job) read from. Persistence must
/// complete before any notification sink is invoked.
pub async fn persist(pool: &PgPool, submission: Submission) -> Result<StoredRecord, sqlx::Error> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO applications
            (id, created_at, first_name, last_name, email, phone, profession,
             address, education, experience, skills, resume, job_position)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(id)
    .bind(created_at)
    .bind(&submission.first_name)
    .bind(&submission.last_name)
    .bind(&submission.email)
    .bind(&submission.phone)
    .bind(&submission.profession)
    .bind(&submission.address)
    .bind(Json(&submission.education))
    .bind(Json(&submission.experience))
    .bind(&submission.skills)
    .bind(submission.resume.as_ref().map(Json))
    .bind(&submission.job_position)
    .execute(pool)
    .await?;

    info!("stored application {id} for {}", submission.email);

    Ok(StoredRecord {
        id,
        created_at,
        submission,
    })
}
