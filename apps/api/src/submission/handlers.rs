//! Submission endpoint — collects the multipart payload and drives one pass
//! through normalize → resume → persist → fanout.

use axum::extract::{Multipart, State};
use tracing::info;

use crate::errors::AppError;
use crate::notify;
use crate::state::AppState;
use crate::submission::normalize::{canonical_field_name, normalize, FormFields};
use crate::submission::persistence::persist;
use crate::submission::resume::{process_upload, UploadedFile};

const SUCCESS_MESSAGE: &str = "Application submitted successfully.";

/// Everything read out of the multipart body: the ordered field map plus the
/// optional resume file.
struct RawForm {
    fields: FormFields,
    resume: Option<UploadedFile>,
}

/// Drains the multipart stream. Repeated field names aggregate into ordered
/// value lists, which is what resolves the form encoding's scalar-vs-array
/// ambiguity before the normalizer runs. An empty file part counts as no
/// resume (browsers send one when the file input is left blank).
async fn collect_form(multipart: &mut Multipart) -> Result<RawForm, AppError> {
    let mut fields = FormFields::new();
    let mut resume = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = canonical_field_name(field.name().unwrap_or("")).to_string();
        if name == "resume" {
            let filename = field.file_name().unwrap_or("resume").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("failed to read resume upload: {e}")))?;
            if !bytes.is_empty() {
                resume = Some(UploadedFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("failed to read field '{name}': {e}")))?;
            fields.entry(name).or_default().push(text);
        }
    }

    Ok(RawForm { fields, resume })
}

/// POST /submit-form
///
/// Responds 200 once persistence succeeds; the notification fanout runs on a
/// spawned task and never affects the response. Persistence itself also runs
/// on the spawned task so a client disconnect cannot cancel the audit-trail
/// write mid-request.
pub async fn handle_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<&'static str, AppError> {
    let raw = collect_form(&mut multipart).await?;
    let mut submission = normalize(&raw.fields)?;

    if let Some(file) = raw.resume {
        submission.resume = Some(process_upload(state.resume_store.as_deref(), file).await);
    }

    let db = state.db.clone();
    let sinks = state.sinks.clone();
    let stored = tokio::spawn(async move {
        let record = persist(&db, submission).await?;
        let fanout_record = record.clone();
        tokio::spawn(async move {
            notify::fan_out_and_log(&sinks, &fanout_record).await;
        });
        Ok::<_, sqlx::Error>(record)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("submission task failed: {e}")))?
    .map_err(AppError::Database)?;

    info!(
        "application {} accepted for {} {}",
        stored.id, stored.submission.first_name, stored.submission.last_name
    );
    Ok(SUCCESS_MESSAGE)
}
