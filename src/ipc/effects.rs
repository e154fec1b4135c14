use std::path::PathBuf;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use crate::actions::{Outcome, Pending, Ticket};
use crate::domains::announcements::{self, Announcement, Priority};
use crate::domains::contact::{ContactForm, Submission, DRAFT_KEY};
use crate::domains::{Domain, Portal};
use crate::error::{FieldError, PortalError, Result};
use crate::export::export_bundle;
use crate::ipc::types::AppState;
use crate::pipeline::render::title_case;
use crate::pipeline::{Record, Renderable, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSection {
    Personal,
    Academic,
    Preferences,
    Security,
}

impl ProfileSection {
    fn method(&self) -> &'static str {
        match self {
            ProfileSection::Personal => "profile.updatePersonal",
            ProfileSection::Academic => "profile.updateAcademic",
            ProfileSection::Preferences => "profile.updatePreferences",
            ProfileSection::Security => "profile.updateSecurity",
        }
    }
}

/// Bulk send to one or more courses.
#[derive(Debug, Clone)]
pub struct BulkSend {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub courses: Vec<String>,
}

/// Work performed when a simulated action's delay has elapsed.
#[derive(Debug, Clone)]
pub enum Effect {
    CreateAnnouncement {
        draft: announcements::Draft,
        status: announcements::Status,
    },
    BulkAnnouncement(BulkSend),
    CreateRecord { domain: Domain, fields: Value },
    Export { domain: Domain, out_path: PathBuf },
    UpdateProfile {
        section: ProfileSection,
        patch: Value,
        today: NaiveDate,
    },
    SubmitContact(ContactForm),
}

fn singular(domain: Domain) -> &'static str {
    match domain {
        Domain::Publications => "publication",
        Domain::Projects => "project",
        Domain::Awards => "award",
        Domain::Collaborations => "collaboration",
        Domain::Announcements => "announcement",
        Domain::Attendance => "student",
        Domain::Grades => "grade",
        Domain::Courses => "course",
        Domain::Profile => "profile",
    }
}

impl Effect {
    pub fn key(&self) -> String {
        match self {
            Effect::CreateAnnouncement { status, .. } => match status {
                announcements::Status::Scheduled => "announcements.schedule".into(),
                _ => "announcements.create".into(),
            },
            Effect::BulkAnnouncement(_) => "announcements.bulk".into(),
            Effect::CreateRecord { domain, .. } => format!("{}.create", domain.as_str()),
            Effect::Export { domain, .. } => format!("{}.export", domain.as_str()),
            Effect::UpdateProfile { section, .. } => section.method().into(),
            Effect::SubmitContact(_) => "contact.submit".into(),
        }
    }

    pub fn default_delay_ms(&self) -> u64 {
        match self {
            Effect::BulkAnnouncement(_) | Effect::SubmitContact(_) => 2000,
            Effect::Export {
                domain: Domain::Attendance,
                ..
            } => 2000,
            _ => 1500,
        }
    }

    pub fn pending_message(&self) -> String {
        match self {
            Effect::CreateAnnouncement { status, .. } => match status {
                announcements::Status::Scheduled => "Scheduling announcement...".into(),
                _ => "Creating announcement...".into(),
            },
            Effect::BulkAnnouncement(_) => "Sending bulk announcements...".into(),
            Effect::CreateRecord { domain, .. } => match domain {
                Domain::Projects => "Creating project...".into(),
                other => format!("Adding {}...", singular(*other)),
            },
            Effect::Export {
                domain: Domain::Attendance,
                ..
            } => "Generating report...".into(),
            Effect::Export { domain, .. } => format!("Exporting {}...", domain.as_str()),
            Effect::UpdateProfile { section, .. } => match section {
                ProfileSection::Personal => "Updating personal information...".into(),
                ProfileSection::Academic => "Updating academic information...".into(),
                ProfileSection::Preferences => "Saving preferences...".into(),
                ProfileSection::Security => "Updating security settings...".into(),
            },
            Effect::SubmitContact(_) => "Sending message...".into(),
        }
    }

    fn success_messages(&self) -> Vec<String> {
        match self {
            Effect::CreateAnnouncement { status, .. } => match status {
                announcements::Status::Scheduled => vec!["Announcement scheduled successfully!".into()],
                _ => vec!["Announcement created successfully!".into()],
            },
            Effect::BulkAnnouncement(_) => vec!["Bulk announcements sent successfully!".into()],
            Effect::CreateRecord { domain, .. } => match domain {
                Domain::Projects => vec!["Project created successfully!".into()],
                other => vec![format!("{} added successfully!", title_case(singular(*other)))],
            },
            Effect::Export {
                domain: Domain::Attendance,
                ..
            } => vec!["Report exported successfully!".into()],
            Effect::Export { domain, .. } => {
                vec![format!("{} exported successfully!", title_case(domain.as_str()))]
            }
            Effect::UpdateProfile { section, .. } => match section {
                ProfileSection::Personal => vec!["Personal information updated successfully!".into()],
                ProfileSection::Academic => vec!["Academic information updated successfully!".into()],
                ProfileSection::Preferences => vec!["Preferences saved successfully!".into()],
                ProfileSection::Security => vec!["Security settings updated successfully!".into()],
            },
            Effect::SubmitContact(_) => vec![
                "Thank you for your message! We will get back to you within 24 hours.".into(),
                "Email notification sent to university staff.".into(),
            ],
        }
    }

    /// Checks that the effect would apply to the current state, without
    /// changing anything. Run when the action starts so bad input is
    /// rejected immediately instead of after the delay.
    pub fn preflight(&self, portal: &Portal) -> Result<()> {
        match self {
            Effect::CreateAnnouncement { draft, .. } => draft.validate(),
            Effect::BulkAnnouncement(bulk) => {
                let mut errors = Vec::new();
                if bulk.title.trim().is_empty() {
                    errors.push(FieldError::new("title", "This field is required"));
                }
                if bulk.content.trim().is_empty() {
                    errors.push(FieldError::new("content", "This field is required"));
                }
                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(PortalError::Validation(errors))
                }
            }
            Effect::CreateRecord { domain, fields } => {
                require_title(fields)?;
                match domain {
                    Domain::Publications => portal.publications.from_fields(fields).map(drop),
                    Domain::Projects => portal.projects.from_fields(fields).map(drop),
                    Domain::Awards => portal.awards.from_fields(fields).map(drop),
                    Domain::Collaborations => portal.collaborations.from_fields(fields).map(drop),
                    other => Err(PortalError::BadParams(format!(
                        "{} does not support create",
                        other.as_str()
                    ))),
                }
            }
            Effect::Export { .. } => Ok(()),
            Effect::UpdateProfile {
                section,
                patch,
                today,
            } => {
                let Some(profile) = portal.profile.as_ref() else {
                    return Ok(());
                };
                let mut scratch = profile.clone();
                apply_profile(&mut scratch, *section, patch, *today).map(drop)
            }
            Effect::SubmitContact(form) => {
                let errors = form.validate();
                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(PortalError::Validation(errors))
                }
            }
        }
    }

    fn apply(self, state: &mut AppState) -> Result<Value> {
        match self {
            Effect::CreateAnnouncement { draft, status } => {
                let portal = &mut state.portal;
                portal.require(Domain::Announcements)?;
                let today = chrono::Local::now().date_naive();
                let course_name = portal.course_name(draft.course.trim());
                let id = portal.announcements.mint_id();
                let ann = draft.into_announcement(id, course_name, status, today);
                portal.announcements.add_front(ann.clone())?;
                Ok(ann.render_item())
            }
            Effect::BulkAnnouncement(bulk) => send_bulk(&mut state.portal, bulk),
            Effect::CreateRecord { domain, fields } => {
                let portal = &mut state.portal;
                portal.require(domain)?;
                match domain {
                    Domain::Publications => add_new(&mut portal.publications, &fields),
                    Domain::Projects => add_new(&mut portal.projects, &fields),
                    Domain::Awards => add_new(&mut portal.awards, &fields),
                    Domain::Collaborations => add_new(&mut portal.collaborations, &fields),
                    other => Err(PortalError::BadParams(format!(
                        "{} does not support create",
                        other.as_str()
                    ))),
                }
            }
            Effect::Export { domain, out_path } => {
                state.portal.require(domain)?;
                let (records, count) = state.portal.records_value(domain)?;
                let manifest = export_bundle(domain.as_str(), &records, count, &out_path)?;
                Ok(json!({
                    "path": out_path.to_string_lossy(),
                    "manifest": manifest,
                }))
            }
            Effect::UpdateProfile {
                section,
                patch,
                today,
            } => {
                let profile = state.portal.profile_mut()?;
                apply_profile(profile, section, &patch, today)
            }
            Effect::SubmitContact(form) => {
                let submission = Submission {
                    form,
                    submitted_at: Utc::now(),
                };
                let drafts = state.drafts_mut();
                drafts.append_submission(&submission)?;
                drafts.clear_draft(DRAFT_KEY)?;
                tracing::info!(
                    subject = %submission.form.subject,
                    email = %submission.form.email,
                    "contact form submitted"
                );
                Ok(json!({
                    "submittedAt": submission.submitted_at,
                    "progress": 0,
                }))
            }
        }
    }
}

fn require_title(fields: &Value) -> Result<()> {
    let title = fields.get("title").and_then(|v| v.as_str()).unwrap_or("");
    if title.trim().is_empty() {
        return Err(PortalError::Validation(vec![FieldError::new(
            "title",
            "This field is required",
        )]));
    }
    Ok(())
}

fn add_new<R: Record + Renderable>(store: &mut Store<R>, fields: &Value) -> Result<Value> {
    let record = store.from_fields(fields)?;
    store.add_front(record.clone())?;
    Ok(record.render_item())
}

fn apply_profile(
    profile: &mut crate::domains::profile::Profile,
    section: ProfileSection,
    patch: &Value,
    today: NaiveDate,
) -> Result<Value> {
    let updated = match section {
        ProfileSection::Personal => serde_json::to_value(profile.update_personal(patch)?),
        ProfileSection::Academic => serde_json::to_value(profile.update_academic(patch)?),
        ProfileSection::Preferences => serde_json::to_value(profile.update_preferences(patch)?),
        ProfileSection::Security => serde_json::to_value(profile.update_security(patch, today)?),
    };
    updated.map_err(|e| PortalError::Io(format!("encode profile: {e}")))
}

/// One sent announcement per target course, addressed to its enrolled
/// students. No courses means every course in the catalog.
fn send_bulk(portal: &mut Portal, bulk: BulkSend) -> Result<Value> {
    portal.require(Domain::Announcements)?;
    portal.require(Domain::Courses)?;

    let targets: Vec<_> = if bulk.courses.is_empty() {
        portal.courses.records().to_vec()
    } else {
        bulk.courses
            .iter()
            .map(|code| {
                portal
                    .courses
                    .records()
                    .iter()
                    .find(|c| &c.code == code)
                    .cloned()
                    .ok_or_else(|| PortalError::not_found("course", code.as_str()))
            })
            .collect::<Result<_>>()?
    };

    let now = chrono::Local::now();
    let mut created = Vec::new();
    for course in targets {
        let ann = Announcement {
            id: portal.announcements.mint_id(),
            title: bulk.title.trim().to_string(),
            content: bulk.content.trim().to_string(),
            course: course.code.clone(),
            course_name: course.title.clone(),
            status: announcements::Status::Sent,
            priority: bulk.priority,
            date: now.date_naive(),
            time: now.format("%-I:%M %p").to_string(),
            recipients: course.students as u64,
            opened: 0,
            clicked: 0,
            replied: 0,
        };
        created.push(ann.id.clone());
        portal.announcements.add_front(ann)?;
    }
    Ok(json!({ "created": created }))
}

/// Validates and queues an action, announcing that it has started.
pub fn begin(state: &mut AppState, effect: Effect) -> Result<Value> {
    effect.preflight(&state.portal)?;
    let key = effect.key();
    let pending = effect.pending_message();
    let default_ms = effect.default_delay_ms();
    let Ticket { ticket, delay_ms } = state.actions.begin(&key, default_ms, effect, Instant::now())?;
    state.outbox.info(pending);
    Ok(json!({ "ticket": ticket, "key": key, "delayMs": delay_ms }))
}

fn resolve(state: &mut AppState, pending: Pending<Effect>) {
    let Pending {
        ticket, key, effect, ..
    } = pending;
    let successes = effect.success_messages();
    let result = effect.apply(state);
    match &result {
        Ok(_) => {
            tracing::info!(ticket, key = %key, "action completed");
            for msg in successes {
                state.outbox.success(msg);
            }
        }
        Err(e) => {
            tracing::warn!(ticket, key = %key, code = e.code(), error = %e, "action failed");
            state.outbox.error(e.to_string());
        }
    }
    state.actions.record(Outcome::from_result(ticket, &key, &result));
}

/// Resolves every action whose delay has elapsed, in deadline order.
pub fn resolve_due(state: &mut AppState) {
    for pending in state.actions.take_due(Instant::now()) {
        resolve(state, pending);
    }
}

/// Blocks until `ticket` is due, then resolves it (and anything else due).
pub fn await_ticket(state: &mut AppState, ticket: u64) -> Result<Value> {
    if let Some(ready_at) = state.actions.ready_at(ticket) {
        let now = Instant::now();
        if ready_at > now {
            std::thread::sleep(ready_at - now);
        }
        resolve_due(state);
    }
    match state.actions.take_outcome(ticket) {
        Some(outcome) => serde_json::to_value(&outcome)
            .map_err(|e| PortalError::Io(format!("encode outcome: {e}"))),
        None => Err(PortalError::not_found("ticket", ticket.to_string())),
    }
}
