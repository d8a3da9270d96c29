use anyhow::{Context, Result};

/// Application configuration loaded from environment variables at startup.
/// Each notification sink and the resume upload are independently enabled;
/// a sink's settings are only required when that sink is on.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Single allowed CORS origin; permissive when unset.
    pub allowed_origin: Option<String>,
    pub max_upload_bytes: usize,
    pub email: Option<EmailConfig>,
    pub sheets: Option<SheetsConfig>,
    pub upload: Option<UploadConfig>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from: String,
    pub to: String,
    /// Render the HTML table body instead of plain text.
    pub html: bool,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub access_token: String,
    pub spreadsheet_id: String,
    pub range: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Public base URL used to build shareable resume links.
    pub public_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let email = if env_flag("EMAIL_SINK_ENABLED") {
            Some(EmailConfig {
                smtp_host: require_env("SMTP_HOST")?,
                smtp_port: std::env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse::<u16>()
                    .context("SMTP_PORT must be a valid port number")?,
                smtp_user: require_env("SMTP_USER")?,
                smtp_pass: require_env("SMTP_PASS")?,
                from: require_env("MAIL_FROM")?,
                to: require_env("MAIL_TO")?,
                html: env_flag("MAIL_HTML_BODY"),
            })
        } else {
            None
        };

        let sheets = if env_flag("SHEETS_SINK_ENABLED") {
            Some(SheetsConfig {
                access_token: require_env("SHEETS_ACCESS_TOKEN")?,
                spreadsheet_id: require_env("SHEETS_SPREADSHEET_ID")?,
                range: std::env::var("SHEETS_RANGE").unwrap_or_else(|_| "Sheet1!A1".to_string()),
            })
        } else {
            None
        };

        let upload = if env_flag("RESUME_UPLOAD_ENABLED") {
            let s3_endpoint = require_env("S3_ENDPOINT")?;
            Some(UploadConfig {
                s3_bucket: require_env("S3_BUCKET")?,
                public_base: std::env::var("S3_PUBLIC_BASE")
                    .unwrap_or_else(|_| s3_endpoint.clone()),
                s3_endpoint,
                aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            })
        } else {
            None
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            allowed_origin: std::env::var("ALLOWED_ORIGIN").ok().filter(|v| !v.is_empty()),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            email,
            sheets,
            upload,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
