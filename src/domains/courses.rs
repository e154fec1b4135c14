use crate::pipeline::render::{display_date, title_case};
use crate::pipeline::stats::{mean, round0};
use crate::pipeline::{Filterable, Record, Renderable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Completed,
    Upcoming,
    Paused,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Completed => "completed",
            Status::Upcoming => "upcoming",
            Status::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub duration: String,
    pub students: u32,
    pub progress: u8,
    pub status: Status,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub credits: u8,
    #[serde(default)]
    pub attendance: u8,
    #[serde(default)]
    pub assignments: u32,
    #[serde(default)]
    pub materials: u32,
    #[serde(default)]
    pub announcements: u32,
    #[serde(default)]
    pub next_class: Option<NaiveDate>,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
}

impl Record for Course {
    const KIND: &'static str = "course";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Filterable for Course {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.code, &self.description]
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn date(&self) -> Option<NaiveDate> {
        self.next_class
    }
}

pub fn progress_tier(progress: u8) -> &'static str {
    match progress {
        0..=29 => "low",
        30..=59 => "medium",
        60..=79 => "good",
        _ => "high",
    }
}

impl Renderable for Course {
    fn render_item(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "title": self.title,
            "code": self.code,
            "description": self.description,
            "status": self.status,
            "statusLabel": title_case(self.status.as_str()),
            "students": self.students,
            "schedule": self.schedule,
            "room": self.room,
            "credits": self.credits,
            "progress": self.progress,
            "progressTier": progress_tier(self.progress),
            "attendance": self.attendance,
            "assignments": self.assignments,
            "materials": self.materials,
            "nextClass": self.next_class.map(display_date),
            "actions": ["view", "manage", "upload"],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_courses: usize,
    pub active_courses: usize,
    pub total_students: u32,
    pub average_attendance: i64,
}

pub fn summary(records: &[Course]) -> Summary {
    Summary {
        total_courses: records.len(),
        active_courses: records.iter().filter(|c| c.status == Status::Active).count(),
        total_students: records
            .iter()
            .fold(0, |acc, c| acc.saturating_add(c.students)),
        average_attendance: mean(records.iter().map(|c| c.attendance as f64))
            .map(round0)
            .unwrap_or(0),
    }
}

/// Display name for a course code, falling back to the code itself.
pub fn course_name(records: &[Course], code: &str) -> String {
    records
        .iter()
        .find(|c| c.code == code)
        .map(|c| c.title.clone())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::filter::{apply, Predicates, Selector};

    fn course(id: &str, code: &str, status: Status, students: u32, attendance: u8) -> Course {
        Course {
            id: id.into(),
            title: format!("Course {code}"),
            code: code.into(),
            description: "Learn things".into(),
            duration: "12 weeks".into(),
            students,
            progress: 45,
            status,
            instructor: "Prof. Williams".into(),
            schedule: String::new(),
            room: String::new(),
            credits: 3,
            attendance,
            assignments: 0,
            materials: 0,
            announcements: 0,
            next_class: None,
            difficulty: String::new(),
            prerequisites: vec![],
            objectives: vec![],
        }
    }

    #[test]
    fn summary_over_catalog() {
        let all = vec![
            course("1", "CS101", Status::Active, 120, 92),
            course("2", "CS201", Status::Active, 90, 88),
            course("3", "CS301", Status::Completed, 75, 95),
        ];
        let s = summary(&all);
        assert_eq!(s.total_courses, 3);
        assert_eq!(s.active_courses, 2);
        assert_eq!(s.total_students, 285);
        assert_eq!(s.average_attendance, 92);
    }

    #[test]
    fn status_filter_and_code_search() {
        let all = vec![
            course("1", "CS101", Status::Active, 120, 92),
            course("2", "CS201", Status::Paused, 90, 88),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let p = Predicates { status: Selector::Exact("paused".into()), ..Default::default() };
        assert_eq!(apply(&all, &p, today).len(), 1);
        let p = Predicates { query: "cs1".into(), ..Default::default() };
        assert_eq!(apply(&all, &p, today)[0].id, "1");
    }

    #[test]
    fn tiers_and_names() {
        assert_eq!(progress_tier(29), "low");
        assert_eq!(progress_tier(30), "medium");
        assert_eq!(progress_tier(100), "high");
        let all = vec![course("1", "CS101", Status::Active, 1, 1)];
        assert_eq!(course_name(&all, "CS101"), "Course CS101");
        assert_eq!(course_name(&all, "CS999"), "CS999");
    }
}
