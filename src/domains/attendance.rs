use crate::pipeline::render::display_date;
use crate::pipeline::stats::percent;
use crate::pipeline::{Filterable, Record, Renderable, Store};
use crate::error::{PortalError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Students below this attendance percentage are flagged as low.
pub const LOW_ATTENDANCE: u8 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Present,
    Absent,
    Excused,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Present => "present",
            Mark::Absent => "absent",
            Mark::Excused => "excused",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "present" => Ok(Mark::Present),
            "absent" => Ok(Mark::Absent),
            "excused" => Ok(Mark::Excused),
            other => Err(PortalError::BadParams(format!(
                "status must be present, absent or excused (got {other})"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendance {
    pub id: String,
    pub name: String,
    pub email: String,
    pub course: String,
    #[serde(default)]
    pub course_name: String,
    pub status: Mark,
    pub attendance: u8,
    pub last_present: NaiveDate,
}

impl Record for StudentAttendance {
    const KIND: &'static str = "student";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Filterable for StudentAttendance {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.id, &self.email]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.course)
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn matches_status(&self, token: &str) -> bool {
        match token {
            "low" => self.attendance < LOW_ATTENDANCE,
            other => self.status.as_str() == other,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.last_present)
    }
}

impl StudentAttendance {
    pub fn tier(&self) -> &'static str {
        if self.attendance >= 90 {
            "high"
        } else if self.attendance >= LOW_ATTENDANCE {
            "medium"
        } else {
            "low"
        }
    }

    /// Present moves the percentage up by one and stamps `last_present`;
    /// absent moves it down by one; excused only changes the status. The
    /// percentage stays within 0..=100.
    pub fn apply_mark(&mut self, mark: Mark, on: NaiveDate) {
        self.status = mark;
        match mark {
            Mark::Present => {
                self.last_present = on;
                self.attendance = self.attendance.saturating_add(1).min(100);
            }
            Mark::Absent => {
                self.attendance = self.attendance.saturating_sub(1);
            }
            Mark::Excused => {}
        }
    }
}

impl Renderable for StudentAttendance {
    fn render_item(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "course": self.course,
            "courseName": self.course_name,
            "status": self.status,
            "attendance": self.attendance,
            "tier": self.tier(),
            "lastPresent": self.last_present,
            "displayLastPresent": display_date(self.last_present),
            "actions": ["markPresent", "markAbsent", "markExcused"],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_students: usize,
    pub overall_attendance: u32,
    pub low_attendance: usize,
}

pub fn summary(records: &[StudentAttendance]) -> Summary {
    let present = records.iter().filter(|s| s.status == Mark::Present).count();
    Summary {
        total_students: records.len(),
        overall_attendance: percent(present as u64, records.len() as u64),
        low_attendance: records
            .iter()
            .filter(|s| s.attendance < LOW_ATTENDANCE)
            .count(),
    }
}

pub fn mark(
    store: &mut Store<StudentAttendance>,
    id: &str,
    mark: Mark,
    on: NaiveDate,
) -> Result<StudentAttendance> {
    store.modify(id, |s| s.apply_mark(mark, on)).cloned()
}

/// Result of a bulk mark: which ids were updated and which were unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub updated: Vec<String>,
    pub missing: Vec<String>,
}

pub fn mark_selected(
    store: &mut Store<StudentAttendance>,
    ids: &[String],
    mark_as: Mark,
    on: NaiveDate,
) -> BulkOutcome {
    let mut out = BulkOutcome::default();
    for id in ids {
        match mark(store, id, mark_as, on) {
            Ok(_) => out.updated.push(id.clone()),
            Err(_) => out.missing.push(id.clone()),
        }
    }
    out
}
