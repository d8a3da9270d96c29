use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the repeated education group, composed positionally from the
/// form's parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub highest_education: String,
    pub field_of_study: String,
    pub institute: String,
}

/// One row of the repeated experience group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub company_name: String,
    pub position_title: String,
    pub years_of_experience: f64,
}

/// An uploaded resume. The raw bytes and original filename live only in
/// memory for the duration of the request (the email sink attaches them);
/// the persisted shape is `{encoded, externalLink?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeBlob {
    #[serde(skip)]
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub encoded: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}

impl ResumeBlob {
    /// Builds a blob from uploaded bytes. The base64 encoding round-trips
    /// exactly to the original bytes, including for empty files.
    pub fn new(filename: String, bytes: Vec<u8>) -> Self {
        let encoded = BASE64.encode(&bytes);
        Self {
            filename,
            bytes,
            encoded,
            external_link: None,
        }
    }
}

/// The canonical, array-shape-resolved submission. Constructed per-request by
/// the normalizer and discarded once a `StoredRecord` exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeBlob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_position: Option<String>,
}

/// A durably stored submission. Immutable once created; the applications
/// table is an append-only audit trail with no update or delete path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub submission: Submission,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_submission() -> Submission {
        Submission {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            phone: "555".into(),
            profession: None,
            address: Some("12 Main St".into()),
            education: vec![EducationEntry {
                highest_education: "BSc".into(),
                field_of_study: "CS".into(),
                institute: "X".into(),
            }],
            experience: vec![],
            skills: vec!["JS".into(), "SQL".into()],
            resume: Some(ResumeBlob::new("cv.pdf".into(), b"%PDF-1.4".to_vec())),
            job_position: None,
        }
    }

    #[test]
    fn test_resume_encoding_round_trips() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let blob = ResumeBlob::new("cv.pdf".into(), bytes.clone());
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&blob.encoded)
            .unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_resume_encoding_round_trips_empty_file() {
        let blob = ResumeBlob::new("empty.pdf".into(), Vec::new());
        assert_eq!(blob.encoded, "");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&blob.encoded)
            .unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_stored_record_serializes_camel_case() {
        let record = StoredRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            submission: sample_submission(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("firstName").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("jobPosition").is_none());
        assert_eq!(
            json["education"][0]["highestEducation"],
            serde_json::json!("BSc")
        );
    }

    #[test]
    fn test_resume_serialization_omits_raw_bytes_and_filename() {
        let blob = ResumeBlob::new("cv.pdf".into(), b"hello".to_vec());
        let json = serde_json::to_value(&blob).unwrap();
        assert!(json.get("bytes").is_none());
        assert!(json.get("filename").is_none());
        assert!(json.get("encoded").is_some());
        assert!(json.get("externalLink").is_none());
    }
}
