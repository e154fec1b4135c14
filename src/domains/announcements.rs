use crate::error::{FieldError, PortalError, Result};
use crate::pipeline::render::display_date;
use crate::pipeline::stats::percent;
use crate::pipeline::{Filterable, Record, Renderable, Store};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Sent,
    Scheduled,
    Draft,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Sent => "sent",
            Status::Scheduled => "scheduled",
            Status::Draft => "draft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub course: String,
    #[serde(default)]
    pub course_name: String,
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub recipients: u64,
    #[serde(default)]
    pub opened: u64,
    #[serde(default)]
    pub clicked: u64,
    #[serde(default)]
    pub replied: u64,
}

impl Record for Announcement {
    const KIND: &'static str = "announcement";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Filterable for Announcement {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.content]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.course)
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl Announcement {
    pub fn open_rate(&self) -> u32 {
        percent(self.opened, self.recipients)
    }

    pub fn click_rate(&self) -> u32 {
        percent(self.clicked, self.opened)
    }

    pub fn reply_rate(&self) -> u32 {
        percent(self.replied, self.opened)
    }
}

impl Renderable for Announcement {
    fn render_item(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "title": self.title,
            "content": self.content,
            "course": self.course,
            "courseName": self.course_name,
            "status": self.status,
            "priority": self.priority,
            "date": self.date,
            "displayDate": display_date_time(self.date, &self.time),
            "recipients": self.recipients,
            "opened": self.opened,
            "clicked": self.clicked,
            "replied": self.replied,
            "openRate": self.open_rate(),
            "clickRate": self.click_rate(),
            "replyRate": self.reply_rate(),
            "actions": ["view", "edit", "duplicate", "delete"],
        })
    }
}

/// "Jan 15, 2024 at 10:30 AM", or just the date when no time was given.
fn display_date_time(date: NaiveDate, time: &str) -> String {
    let time = time.trim();
    if time.is_empty() {
        display_date(date)
    } else {
        format!("{} at {}", display_date(date), time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub read_rate: u32,
    pub scheduled: usize,
    pub total_recipients: u64,
}

/// Computed over the full store. The read rate only counts sent records.
pub fn summary(records: &[Announcement]) -> Summary {
    let sent = records.iter().filter(|a| a.status == Status::Sent);
    let (recipients, opened) = sent.fold((0u64, 0u64), |(r, o), a| {
        (r.saturating_add(a.recipients), o.saturating_add(a.opened))
    });
    Summary {
        total: records.len(),
        read_rate: percent(opened, recipients),
        scheduled: records
            .iter()
            .filter(|a| a.status == Status::Scheduled)
            .count(),
        total_recipients: recipients,
    }
}

/// Copies `id` under a fresh identifier as a zero-count draft dated `today`,
/// placed at the front of the store.
pub fn duplicate(store: &mut Store<Announcement>, id: &str, today: NaiveDate) -> Result<Announcement> {
    let source = store.find(id)?;
    let copy = Announcement {
        id: store.mint_id(),
        title: format!("{} (Copy)", source.title),
        status: Status::Draft,
        date: today,
        recipients: 0,
        opened: 0,
        clicked: 0,
        replied: 0,
        ..source.clone()
    };
    store.add_front(copy.clone())?;
    Ok(copy)
}

/// Fields submitted by the create and schedule forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub recipients: u64,
}

impl Draft {
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "This field is required"));
        }
        if self.content.trim().is_empty() {
            errors.push(FieldError::new("content", "This field is required"));
        }
        if self.course.trim().is_empty() {
            errors.push(FieldError::new("course", "This field is required"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(errors))
        }
    }

    pub fn into_announcement(
        self,
        id: String,
        course_name: String,
        default_status: Status,
        today: NaiveDate,
    ) -> Announcement {
        Announcement {
            id,
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            course: self.course.trim().to_string(),
            course_name,
            status: self.status.unwrap_or(default_status),
            priority: self.priority,
            date: self.date.unwrap_or(today),
            time: self.time.unwrap_or_default(),
            recipients: self.recipients,
            opened: 0,
            clicked: 0,
            replied: 0,
        }
    }
}
