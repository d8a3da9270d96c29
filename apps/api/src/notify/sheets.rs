//! Spreadsheet sink — appends one row per stored application through the
//! Google Sheets `values:append` endpoint.
//!
//! ARCHITECTURAL RULE: this client is the single point of entry for all
//! Sheets API calls; no other module talks to the API directly. Delivery is
//! one attempt with no retry, matching the fanout contract. Rows vary in
//! width with the number of education/experience entries; the column order
//! itself is fixed and documented on `build_row`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::config::SheetsConfig;
use crate::notify::{NotificationSink, SinkError};
use crate::submission::models::StoredRecord;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("sheets http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sheets api error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Thin client over the Sheets REST API, constructed once at startup and
/// shared via `AppState`. Token provisioning is an external concern; the
/// client only carries the bearer token it is given.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    token: String,
}

impl SheetsClient {
    pub fn new(token: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { client, token })
    }

    /// Appends one row of cells to the configured range. Single attempt.
    pub async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: &[String],
    ) -> Result<(), SheetsError> {
        let url = format!(
            "{SHEETS_API_BASE}/{spreadsheet_id}/values/{range}:append?valueInputOption=RAW"
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

pub struct SheetSink {
    client: SheetsClient,
    spreadsheet_id: String,
    range: String,
}

impl SheetSink {
    pub fn new(client: SheetsClient, config: &SheetsConfig) -> Self {
        Self {
            client,
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
        }
    }
}

#[async_trait]
impl NotificationSink for SheetSink {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn deliver(&self, record: &StoredRecord) -> Result<(), SinkError> {
        let row = build_row(record);
        self.client
            .append_row(&self.spreadsheet_id, &self.range, &row)
            .await?;
        Ok(())
    }
}

/// Flattens a stored record into one spreadsheet row. Column order is fixed:
/// `firstName, lastName, email, phone, profession, address`, then the
/// education triples in submission order, then the experience triples, then
/// skills as one `", "`-joined cell, then the resume's external link when
/// present. Absent optional scalars become empty cells.
pub fn build_row(record: &StoredRecord) -> Vec<String> {
    let s = &record.submission;
    let mut row = vec![
        s.first_name.clone(),
        s.last_name.clone(),
        s.email.clone(),
        s.phone.clone(),
        s.profession.clone().unwrap_or_default(),
        s.address.clone().unwrap_or_default(),
    ];
    for e in &s.education {
        row.push(e.highest_education.clone());
        row.push(e.field_of_study.clone());
        row.push(e.institute.clone());
    }
    for e in &s.experience {
        row.push(e.company_name.clone());
        row.push(e.position_title.clone());
        row.push(e.years_of_experience.to_string());
    }
    row.push(s.skills.join(", "));
    if let Some(link) = s.resume.as_ref().and_then(|r| r.external_link.as_deref()) {
        row.push(link.to_string());
    }
    row
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::submission::models::{
        EducationEntry, ExperienceEntry, ResumeBlob, Submission,
    };

    fn record(resume: Option<ResumeBlob>) -> StoredRecord {
        StoredRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            submission: Submission {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "jane@x.com".into(),
                phone: "555".into(),
                profession: None,
                address: Some("12 Main St".into()),
                education: vec![
                    EducationEntry {
                        highest_education: "BSc".into(),
                        field_of_study: "CS".into(),
                        institute: "X".into(),
                    },
                    EducationEntry {
                        highest_education: "MSc".into(),
                        field_of_study: "AI".into(),
                        institute: "Y".into(),
                    },
                ],
                experience: vec![ExperienceEntry {
                    company_name: "Co1".into(),
                    position_title: "Eng".into(),
                    years_of_experience: 3.0,
                }],
                skills: vec!["JS".into(), "SQL".into()],
                resume,
                job_position: None,
            },
        }
    }

    #[test]
    fn test_row_column_order_is_fixed() {
        let mut resume = ResumeBlob::new("cv.pdf".into(), b"%PDF".to_vec());
        resume.external_link = Some("https://files.example.com/cv.pdf".into());

        let row = build_row(&record(Some(resume)));

        assert_eq!(
            row,
            vec![
                "Jane",
                "Doe",
                "jane@x.com",
                "555",
                "",
                "12 Main St",
                "BSc",
                "CS",
                "X",
                "MSc",
                "AI",
                "Y",
                "Co1",
                "Eng",
                "3",
                "JS, SQL",
                "https://files.example.com/cv.pdf",
            ]
        );
    }

    #[test]
    fn test_row_without_link_omits_trailing_cell() {
        let row = build_row(&record(None));
        assert_eq!(row.last().unwrap(), "JS, SQL");
    }

    #[test]
    fn test_row_width_tracks_group_sizes() {
        let mut r = record(None);
        r.submission.education.clear();
        r.submission.experience.clear();
        let row = build_row(&r);
        // 6 scalar columns + 1 skills column.
        assert_eq!(row.len(), 7);
    }
}
