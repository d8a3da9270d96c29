//! Email sink — renders a stored application and sends it to the configured
//! recipient over SMTP, with the resume attached when one was uploaded.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::config::EmailConfig;
use crate::notify::{NotificationSink, SinkError};
use crate::submission::models::StoredRecord;
use crate::submission::resume::content_type_for;

const SUBJECT: &str = "New Application Submission";

pub struct EmailSink {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: String,
    html: bool,
}

impl EmailSink {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let credentials = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();
        Ok(Self {
            mailer,
            from: config.from.clone(),
            to: config.to.clone(),
            html: config.html,
        })
    }

    fn build_message(&self, record: &StoredRecord) -> Result<Message, SinkError> {
        let from: Mailbox = self.from.parse()?;
        let to: Mailbox = self.to.parse()?;
        let builder = Message::builder().from(from).to(to).subject(SUBJECT);

        let (body, body_type) = if self.html {
            (render_html(record), ContentType::TEXT_HTML)
        } else {
            (render_text(record), ContentType::TEXT_PLAIN)
        };

        let message = match &record.submission.resume {
            Some(blob) => {
                let attachment_type = ContentType::parse(content_type_for(&blob.filename))
                    .map_err(|e| SinkError::ContentType(e.to_string()))?;
                let body_part = SinglePart::builder().header(body_type).body(body);
                let attachment =
                    Attachment::new(blob.filename.clone()).body(blob.bytes.clone(), attachment_type);
                builder.multipart(MultiPart::mixed().singlepart(body_part).singlepart(attachment))?
            }
            None => builder.header(body_type).body(body)?,
        };
        Ok(message)
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, record: &StoredRecord) -> Result<(), SinkError> {
        let message = self.build_message(record)?;
        self.mailer.send(message).await?;
        Ok(())
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

/// Plain-text rendering of a stored application, one field per line with the
/// repeated groups flattened in submission order.
pub fn render_text(record: &StoredRecord) -> String {
    let s = &record.submission;
    let mut out = String::new();
    out.push_str(&format!("New application {}\n", record.id));
    out.push_str(&format!("Received: {}\n\n", record.created_at.to_rfc3339()));
    out.push_str(&format!("Name: {} {}\n", s.first_name, s.last_name));
    out.push_str(&format!("Email: {}\n", s.email));
    out.push_str(&format!("Phone: {}\n", s.phone));
    out.push_str(&format!("Profession: {}\n", or_dash(&s.profession)));
    out.push_str(&format!("Address: {}\n", or_dash(&s.address)));
    out.push_str(&format!("Position: {}\n", or_dash(&s.job_position)));

    out.push_str("\nEducation:\n");
    for (i, e) in s.education.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} in {} at {}\n",
            i + 1,
            e.highest_education,
            e.field_of_study,
            e.institute
        ));
    }

    out.push_str("\nExperience:\n");
    for (i, e) in s.experience.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} at {} ({} years)\n",
            i + 1,
            e.position_title,
            e.company_name,
            e.years_of_experience
        ));
    }

    out.push_str(&format!("\nSkills: {}\n", s.skills.join(", ")));

    if let Some(link) = s.resume.as_ref().and_then(|r| r.external_link.as_deref()) {
        out.push_str(&format!("Resume link: {link}\n"));
    }
    out
}

/// HTML table rendering of a stored application.
pub fn render_html(record: &StoredRecord) -> String {
    let s = &record.submission;

    let mut rows = String::new();
    let mut row = |label: &str, value: &str| {
        rows.push_str(&format!(
            "<tr><th align=\"left\">{label}</th><td>{value}</td></tr>\n"
        ));
    };
    row("Name", &format!("{} {}", s.first_name, s.last_name));
    row("Email", &s.email);
    row("Phone", &s.phone);
    row("Profession", or_dash(&s.profession));
    row("Address", or_dash(&s.address));
    row("Position", or_dash(&s.job_position));
    for e in &s.education {
        row(
            "Education",
            &format!(
                "{} in {} at {}",
                e.highest_education, e.field_of_study, e.institute
            ),
        );
    }
    for e in &s.experience {
        row(
            "Experience",
            &format!(
                "{} at {} ({} years)",
                e.position_title, e.company_name, e.years_of_experience
            ),
        );
    }
    row("Skills", &s.skills.join(", "));
    if let Some(link) = s.resume.as_ref().and_then(|r| r.external_link.as_deref()) {
        row("Resume", &format!("<a href=\"{link}\">{link}</a>"));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<body>
<h2>New Application Submission</h2>
<p>Application {} received {}.</p>
<table border="1" cellpadding="6" cellspacing="0">
{rows}</table>
</body>
</html>"#,
        record.id,
        record.created_at.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::submission::models::{
        EducationEntry, ExperienceEntry, ResumeBlob, Submission,
    };

    fn record() -> StoredRecord {
        let mut resume = ResumeBlob::new("cv.pdf".into(), b"%PDF".to_vec());
        resume.external_link = Some("https://files.example.com/cv.pdf".into());
        StoredRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            submission: Submission {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "jane@x.com".into(),
                phone: "555".into(),
                profession: Some("Engineer".into()),
                address: None,
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
                resume: Some(resume),
                job_position: None,
            },
        }
    }

    #[test]
    fn test_render_text_flattens_groups_in_order() {
        let text = render_text(&record());
        assert!(text.contains("Name: Jane Doe"));
        assert!(text.contains("1. BSc in CS at X"));
        assert!(text.contains("2. MSc in AI at Y"));
        assert!(text.contains("1. Eng at Co1 (3 years)"));
        assert!(text.contains("Skills: JS, SQL"));
        assert!(text.contains("Resume link: https://files.example.com/cv.pdf"));
        let bsc = text.find("BSc").unwrap();
        let msc = text.find("MSc").unwrap();
        assert!(bsc < msc);
    }

    #[test]
    fn test_render_text_without_optionals() {
        let mut r = record();
        r.submission.profession = None;
        r.submission.resume = None;
        let text = render_text(&r);
        assert!(text.contains("Profession: -"));
        assert!(!text.contains("Resume link"));
    }

    #[test]
    fn test_render_html_contains_table_rows() {
        let html = render_html(&record());
        assert!(html.contains("<td>BSc in CS at X</td>"));
        assert!(html.contains("<td>Eng at Co1 (3 years)</td>"));
        assert!(html.contains("<td>JS, SQL</td>"));
        assert!(html.contains("https://files.example.com/cv.pdf"));
    }
}
