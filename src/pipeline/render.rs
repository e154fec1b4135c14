use chrono::NaiveDate;
use serde::Serialize;

/// Projects one record into the display model the UI draws.
pub trait Renderable {
    fn render_item(&self) -> serde_json::Value;
}

/// Shown instead of an empty container when nothing matches.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub title: String,
    pub hint: String,
}

/// Full replacement content for one list container.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    pub domain: String,
    pub total: usize,
    pub shown: usize,
    pub items: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Placeholder>,
    pub generation: u64,
}

pub fn placeholder(noun: &str) -> Placeholder {
    Placeholder {
        title: format!("No {noun} found"),
        hint: "Try adjusting your search or filter criteria".to_string(),
    }
}

pub fn render_list<R: Renderable>(
    domain: &str,
    noun: &str,
    view: &[&R],
    total: usize,
    generation: u64,
) -> ListView {
    let items: Vec<serde_json::Value> = view.iter().map(|r| r.render_item()).collect();
    from_items(domain, noun, items, total, generation)
}

/// Builds a view from already rendered rows (grouped tables render rows
/// that are not one-to-one with records).
pub fn from_items(
    domain: &str,
    noun: &str,
    items: Vec<serde_json::Value>,
    total: usize,
    generation: u64,
) -> ListView {
    let placeholder = if items.is_empty() {
        Some(placeholder(noun))
    } else {
        None
    };
    ListView {
        domain: domain.to_string(),
        total,
        shown: items.len(),
        items,
        placeholder,
        generation,
    }
}

/// "Jan 15, 2024"
pub fn display_date(d: NaiveDate) -> String {
    d.format("%b %-d, %Y").to_string()
}

/// Capitalizes the first character ("active" -> "Active").
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
