use crate::pipeline::render::display_date;
use crate::pipeline::{Filterable, Record, Renderable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

macro_rules! impl_record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub journal: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub citations: u64,
    #[serde(default)]
    pub doi: String,
    #[serde(default, rename = "abstract")]
    pub summary: String,
    #[serde(default)]
    pub area: String,
}

impl_record!(Publication, "publication");

impl Filterable for Publication {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.authors, &self.journal, &self.summary]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.kind)
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl Renderable for Publication {
    fn render_item(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "title": self.title,
            "authors": self.authors,
            "journal": self.journal,
            "type": self.kind,
            "date": self.date,
            "displayDate": display_date(self.date),
            "citations": self.citations,
            "doi": self.doi,
            "abstract": self.summary,
            "area": self.area,
            "actions": ["view", "edit", "delete"],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Planned,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Planned => "planned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProjectStatus,
    #[serde(default)]
    pub funding: String,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub progress: u8,
}

impl_record!(Project, "project");

impl Filterable for Project {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.description, &self.team]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.funding)
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.start_date)
    }
}

/// "$250,000"
pub fn format_budget(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}

impl Renderable for Project {
    fn render_item(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "status": self.status,
            "startDate": display_date(self.start_date),
            "endDate": display_date(self.end_date),
            "funding": self.funding,
            "budget": format_budget(self.budget),
            "team": self.team,
            "progress": self.progress,
            "actions": ["view", "edit", "delete"],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

impl_record!(Award, "award");

impl Filterable for Award {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.organization, &self.description]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.kind)
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

impl Renderable for Award {
    fn render_item(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "title": self.title,
            "organization": self.organization,
            "type": self.kind,
            "displayDate": display_date(self.date),
            "description": self.description,
            "actions": ["view", "delete"],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub id: String,
    pub title: String,
    pub partner: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl_record!(Collaboration, "collaboration");

impl Filterable for Collaboration {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.partner, &self.description]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.kind)
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.start_date)
    }
}

impl Renderable for Collaboration {
    fn render_item(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "title": self.title,
            "partner": self.partner,
            "type": self.kind,
            "description": self.description,
            "duration": format!("{} - {}", display_date(self.start_date), display_date(self.end_date)),
            "actions": ["view", "delete"],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_publications: usize,
    pub active_projects: usize,
    pub total_citations: u64,
    pub total_awards: usize,
}

pub fn summary(
    publications: &[Publication],
    projects: &[Project],
    awards: &[Award],
) -> Summary {
    Summary {
        total_publications: publications.len(),
        active_projects: projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
        total_citations: publications
            .iter()
            .fold(0, |acc, p| acc.saturating_add(p.citations)),
        total_awards: awards.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn budget_has_thousands_separators() {
        assert_eq!(format_budget(250000), "$250,000");
        assert_eq!(format_budget(1500), "$1,500");
        assert_eq!(format_budget(999), "$999");
        assert_eq!(format_budget(1234567), "$1,234,567");
    }

    #[test]
    fn publication_wire_names() {
        let p: Publication = serde_json::from_value(json!({
            "id": "1",
            "title": "ML in Healthcare",
            "authors": "Dr. Williams",
            "journal": "Journal of Medical AI",
            "date": "2024-01-15",
            "type": "Journal Article",
            "citations": 45,
            "abstract": "This paper explores"
        }))
        .unwrap();
        assert_eq!(p.kind, "Journal Article");
        assert_eq!(p.summary, "This paper explores");
        assert_eq!(p.date, d("2024-01-15"));
    }

    #[test]
    fn citation_total_saturates() {
        let huge = |id: &str| Publication { id: id.into(), title: "a".into(), authors: "x".into(), journal: "j".into(), date: d("2024-01-15"), kind: "Journal Article".into(), citations: u64::MAX, doi: String::new(), summary: String::new(), area: String::new() };
        let s = summary(&[huge("1"), huge("2")], &[], &[]);
        assert_eq!(s.total_citations, u64::MAX);
    }

    #[test]
    fn summary_counts_active_projects_and_citations() {
        let pubs = vec![
            Publication { id: "1".into(), title: "a".into(), authors: "x".into(), journal: "j".into(), date: d("2024-01-15"), kind: "Journal Article".into(), citations: 45, doi: String::new(), summary: String::new(), area: String::new() },
            Publication { id: "2".into(), title: "b".into(), authors: "x".into(), journal: "j".into(), date: d("2023-11-20"), kind: "Conference Paper".into(), citations: 32, doi: String::new(), summary: String::new(), area: String::new() },
        ];
        let projects = vec![
            Project { id: "1".into(), title: "p".into(), description: String::new(), start_date: d("2023-01-01"), end_date: d("2024-12-31"), status: ProjectStatus::Active, funding: "NSF Grant".into(), budget: 250000, team: String::new(), progress: 65 },
            Project { id: "2".into(), title: "q".into(), description: String::new(), start_date: d("2021-09-01"), end_date: d("2023-08-31"), status: ProjectStatus::Completed, funding: "Industry".into(), budget: 150000, team: String::new(), progress: 100 },
        ];
        let s = summary(&pubs, &projects, &[]);
        assert_eq!(s.total_publications, 2);
        assert_eq!(s.active_projects, 1);
        assert_eq!(s.total_citations, 77);
        assert_eq!(s.total_awards, 0);
    }
}
