use crate::domains::contact::is_valid_email;
use crate::error::{FieldError, PortalError, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub office_location: String,
    #[serde(default)]
    pub office_hours: String,
    #[serde(default)]
    pub office_phone: String,
    #[serde(default)]
    pub emergency_contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub school: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Academic {
    pub position: String,
    pub department: String,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub research_interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginActivity {
    pub device: String,
    pub location: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub two_factor_enabled: bool,
    #[serde(default)]
    pub last_password_change: String,
    #[serde(default)]
    pub login_activity: Vec<LoginActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub notifications: Value,
    pub display: Value,
    pub privacy: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub personal: Personal,
    pub academic: Academic,
    pub security: Security,
    pub preferences: Preferences,
}

/// Overlays the keys of `patch` onto `current` and reads the result back.
fn merge<T: Serialize + DeserializeOwned>(current: &T, patch: &Value) -> Result<T> {
    let Some(fields) = patch.as_object() else {
        return Err(PortalError::BadParams("fields must be an object".into()));
    };
    let mut merged =
        serde_json::to_value(current).map_err(|e| PortalError::BadParams(e.to_string()))?;
    if let Some(obj) = merged.as_object_mut() {
        for (k, v) in fields {
            obj.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(merged).map_err(|e| PortalError::BadParams(format!("invalid fields: {e}")))
}

/// Preference groups are merged one level deep so toggling one switch
/// leaves its siblings alone.
fn merge_group(current: &mut Value, patch: &Value) {
    match (current.as_object_mut(), patch.as_object()) {
        (Some(cur), Some(p)) => {
            for (k, v) in p {
                cur.insert(k.clone(), v.clone());
            }
        }
        _ => *current = patch.clone(),
    }
}

impl Profile {
    pub fn update_personal(&mut self, patch: &Value) -> Result<&Personal> {
        let next: Personal = merge(&self.personal, patch)?;
        let mut errors = Vec::new();
        if next.full_name.trim().is_empty() {
            errors.push(FieldError::new("fullName", "This field is required"));
        }
        if next.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !is_valid_email(next.email.trim()) {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }
        if !errors.is_empty() {
            return Err(PortalError::Validation(errors));
        }
        self.personal = next;
        Ok(&self.personal)
    }

    pub fn update_academic(&mut self, patch: &Value) -> Result<&Academic> {
        let next: Academic = merge(&self.academic, patch)?;
        if next.position.trim().is_empty() {
            return Err(PortalError::Validation(vec![FieldError::new(
                "position",
                "This field is required",
            )]));
        }
        self.academic = next;
        Ok(&self.academic)
    }

    pub fn update_preferences(&mut self, patch: &Value) -> Result<&Preferences> {
        let Some(fields) = patch.as_object() else {
            return Err(PortalError::BadParams("fields must be an object".into()));
        };
        for (group, value) in fields {
            let slot = match group.as_str() {
                "notifications" => &mut self.preferences.notifications,
                "display" => &mut self.preferences.display,
                "privacy" => &mut self.preferences.privacy,
                other => {
                    return Err(PortalError::BadParams(format!(
                        "unknown preference group: {other}"
                    )))
                }
            };
            merge_group(slot, value);
        }
        Ok(&self.preferences)
    }

    /// Toggles two-factor sign-in and applies an optional password change.
    /// Passwords are checked and dropped; only the change date is kept.
    pub fn update_security(&mut self, patch: &Value, today: NaiveDate) -> Result<&Security> {
        let Some(fields) = patch.as_object() else {
            return Err(PortalError::BadParams("fields must be an object".into()));
        };
        let text = |key: &str| fields.get(key).and_then(Value::as_str).unwrap_or("");

        let mut next = self.security.clone();
        if let Some(v) = fields.get("twoFactorEnabled") {
            next.two_factor_enabled = v
                .as_bool()
                .ok_or_else(|| PortalError::BadParams("twoFactorEnabled must be a boolean".into()))?;
        }

        let new_password = text("newPassword");
        if !new_password.is_empty() || fields.contains_key("currentPassword") {
            let mut errors = Vec::new();
            if text("currentPassword").is_empty() {
                errors.push(FieldError::new("currentPassword", "This field is required"));
            }
            if new_password.chars().count() < MIN_PASSWORD_LEN {
                errors.push(FieldError::new(
                    "newPassword",
                    "Password must be at least 8 characters long",
                ));
            }
            if text("confirmPassword") != new_password {
                errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
            }
            if !errors.is_empty() {
                return Err(PortalError::Validation(errors));
            }
            next.last_password_change = today.format("%Y-%m-%d").to_string();
        }

        self.security = next;
        Ok(&self.security)
    }
}

const MIN_PASSWORD_LEN: usize = 8;
