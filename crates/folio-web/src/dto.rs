use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Record timestamps. Serialized as RFC3339 strings.
pub type Timestamp = DateTime<Utc>;

/// Converts clock seconds to a record timestamp. Out-of-range values clamp
/// to the epoch.
pub fn timestamp(unix_secs: u64) -> Timestamp {
    i64::try_from(unix_secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
}

pub fn rfc3339(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub expires_at: u64,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl NewContact {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        if !looks_like_email(&self.email) {
            return Err("email is not a valid address".to_string());
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: Timestamp,
    pub read: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub live_url: String,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub featured: bool,
}

impl ProjectInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub live_url: String,
    pub github_url: String,
    pub technologies: Vec<String>,
    pub category: String,
    pub featured: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
