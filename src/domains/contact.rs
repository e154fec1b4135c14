use crate::error::{FieldError, PortalError, Result};
use crate::pipeline::stats::percent;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Storage key the in-progress form is saved under.
pub const DRAFT_KEY: &str = "contactFormData";

pub const REQUIRED: [&str; 5] = ["firstName", "lastName", "email", "subject", "message"];

const MIN_MESSAGE_CHARS: usize = 10;
const MIN_NAME_CHARS: usize = 2;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern"))
}

fn phone_noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\-\(\)]").expect("phone noise pattern"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email)
}

/// Spaces, dashes and parentheses are ignored before matching.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone_noise_re().replace_all(phone, "");
    phone_re().is_match(&digits)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn from_params(params: &serde_json::Value) -> Result<Self> {
        let fields = params.get("fields").cloned().unwrap_or_else(|| serde_json::json!({}));
        let form: ContactForm = serde_json::from_value(fields)
            .map_err(|e| PortalError::BadParams(format!("invalid contact fields: {e}")))?;
        Ok(form.trimmed())
    }

    pub fn trimmed(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    fn value(&self, field: &str) -> Option<&str> {
        match field {
            "firstName" => Some(&self.first_name),
            "lastName" => Some(&self.last_name),
            "email" => Some(&self.email),
            "phone" => Some(&self.phone),
            "subject" => Some(&self.subject),
            "message" => Some(&self.message),
            _ => None,
        }
    }

    /// Whole-form check run on submit. At most one message per field.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = REQUIRED
            .iter()
            .filter(|f| self.value(f).is_some_and(str::is_empty))
            .map(|f| FieldError::new(f, "This field is required"))
            .collect();

        if !self.email.is_empty() && !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }
        if !self.phone.is_empty() && !is_valid_phone(&self.phone) {
            errors.push(FieldError::new("phone", "Please enter a valid phone number"));
        }
        if !self.message.is_empty() && self.message.chars().count() < MIN_MESSAGE_CHARS {
            errors.push(FieldError::new(
                "message",
                "Message must be at least 10 characters long",
            ));
        }
        errors
    }

    /// Check for a single field as it loses focus. Other fields are not
    /// looked at.
    pub fn validate_field(&self, field: &str) -> Result<Option<FieldError>> {
        let value = self
            .value(field)
            .ok_or_else(|| PortalError::BadParams(format!("unknown contact field: {field}")))?;
        let message = match field {
            "firstName" | "lastName" if value.is_empty() => Some("This field is required"),
            "firstName" | "lastName" if value.chars().count() < MIN_NAME_CHARS => {
                Some("Must be at least 2 characters")
            }
            "email" if value.is_empty() => Some("Email is required"),
            "email" if !is_valid_email(value) => Some("Please enter a valid email address"),
            "phone" if !value.is_empty() && !is_valid_phone(value) => {
                Some("Please enter a valid phone number")
            }
            "subject" if value.is_empty() => Some("Please select a subject"),
            "message" if value.is_empty() => Some("Message is required"),
            "message" if value.chars().count() < MIN_MESSAGE_CHARS => {
                Some("Message must be at least 10 characters long")
            }
            _ => None,
        };
        Ok(message.map(|m| FieldError::new(field, m)))
    }

    /// Share of required fields that are filled, 0..=100.
    pub fn progress(&self) -> u32 {
        let filled = REQUIRED
            .iter()
            .filter(|f| self.value(f).is_some_and(|v| !v.is_empty()))
            .count();
        percent(filled as u64, REQUIRED.len() as u64)
    }

    /// Auto-save only kicks in once one of the free-text fields has content.
    pub fn worth_saving(&self) -> bool {
        !(self.first_name.is_empty()
            && self.last_name.is_empty()
            && self.email.is_empty()
            && self.message.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(flatten)]
    pub form: ContactForm,
    pub submitted_at: DateTime<Utc>,
}

/// Where drafts and the submission log live: the workspace database once
/// one is selected, memory before that.
pub trait DraftStore {
    fn load_draft(&self, key: &str) -> Result<Option<String>>;
    fn save_draft(&mut self, key: &str, payload: &str) -> Result<()>;
    fn clear_draft(&mut self, key: &str) -> Result<()>;
    fn append_submission(&mut self, submission: &Submission) -> Result<()>;
    fn submission_count(&self) -> Result<usize>;
}

#[derive(Debug, Default)]
pub struct MemoryDrafts {
    drafts: std::collections::HashMap<String, String>,
    submissions: Vec<Submission>,
}

impl MemoryDrafts {
    pub fn take_draft(&mut self, key: &str) -> Option<String> {
        self.drafts.remove(key)
    }
}

impl DraftStore for MemoryDrafts {
    fn load_draft(&self, key: &str) -> Result<Option<String>> {
        Ok(self.drafts.get(key).cloned())
    }

    fn save_draft(&mut self, key: &str, payload: &str) -> Result<()> {
        self.drafts.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn clear_draft(&mut self, key: &str) -> Result<()> {
        self.drafts.remove(key);
        Ok(())
    }

    fn append_submission(&mut self, submission: &Submission) -> Result<()> {
        self.submissions.push(submission.clone());
        Ok(())
    }

    fn submission_count(&self) -> Result<usize> {
        Ok(self.submissions.len())
    }
}

/// Reads the saved draft. A payload that no longer parses is treated as
/// absent.
pub fn load_draft(store: &dyn DraftStore) -> Result<Option<ContactForm>> {
    let Some(raw) = store.load_draft(DRAFT_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<ContactForm>(&raw) {
        Ok(form) => Ok(Some(form)),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable contact draft");
            Ok(None)
        }
    }
}

/// Returns whether anything was written.
pub fn autosave(store: &mut dyn DraftStore, form: &ContactForm) -> Result<bool> {
    if !form.worth_saving() {
        return Ok(false);
    }
    let payload =
        serde_json::to_string(form).map_err(|e| PortalError::Io(format!("encode draft: {e}")))?;
    store.save_draft(DRAFT_KEY, &payload)?;
    Ok(true)
}
