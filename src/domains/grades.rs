use crate::error::{FieldError, PortalError, Result};
use crate::pipeline::filter::{Predicates, Selector};
use crate::pipeline::stats::{mean, round0, round1};
use crate::pipeline::{Filterable, Record, Store};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStudent {
    pub id: String,
    pub name: String,
    pub course: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub name: String,
    pub course: String,
    pub max_points: u32,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntry {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub assignment_id: String,
    pub grade: u8,
    #[serde(default)]
    pub comments: String,
}

impl GradeEntry {
    pub fn key(student_id: &str, assignment_id: &str) -> String {
        format!("{student_id}:{assignment_id}")
    }
}

impl Record for GradeEntry {
    const KIND: &'static str = "grade";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Score band, also used as the status filter token.
pub fn band(grade: f64) -> &'static str {
    if grade >= 90.0 {
        "excellent"
    } else if grade >= 80.0 {
        "good"
    } else if grade >= 70.0 {
        "average"
    } else if grade >= 60.0 {
        "poor"
    } else {
        "failing"
    }
}

pub fn letter(grade: f64) -> &'static str {
    if grade >= 90.0 {
        "A"
    } else if grade >= 80.0 {
        "B"
    } else if grade >= 70.0 {
        "C"
    } else if grade >= 60.0 {
        "D"
    } else {
        "F"
    }
}

/// Roster, assignments and the grade entries joining them.
#[derive(Debug, Clone, Default)]
pub struct GradeBook {
    pub students: Vec<RosterStudent>,
    pub assignments: Vec<Assignment>,
    pub entries: Store<GradeEntry>,
}

/// A grade entry joined with its student and assignment.
pub struct GradeRow<'a> {
    pub entry: &'a GradeEntry,
    pub student: &'a RosterStudent,
    pub assignment: &'a Assignment,
}

impl Filterable for GradeRow<'_> {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.student.name, &self.student.id, &self.student.email]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.assignment.course)
    }

    fn status(&self) -> Option<&str> {
        Some(band(self.entry.grade as f64))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_students: usize,
    pub average_grade: f64,
    pub total_grades: usize,
    pub failing_students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDetail {
    pub assignment_id: String,
    pub assignment: String,
    pub grade: u8,
    pub comments: String,
}

impl GradeBook {
    pub fn new(
        students: Vec<RosterStudent>,
        assignments: Vec<Assignment>,
        mut entries: Vec<GradeEntry>,
    ) -> Result<Self> {
        for e in entries.iter_mut() {
            e.id = GradeEntry::key(&e.student_id, &e.assignment_id);
        }
        let mut store = Store::new();
        store.load(entries)?;
        Ok(Self {
            students,
            assignments,
            entries: store,
        })
    }

    pub fn student(&self, id: &str) -> Option<&RosterStudent> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// Entries with a known student and assignment, in store order.
    pub fn rows(&self) -> Vec<GradeRow<'_>> {
        self.entries
            .records()
            .iter()
            .filter_map(|entry| {
                Some(GradeRow {
                    entry,
                    student: self.student(&entry.student_id)?,
                    assignment: self.assignment(&entry.assignment_id)?,
                })
            })
            .collect()
    }

    /// Derived view over grade entries. `assignment` narrows to a single
    /// assignment on top of the common predicates.
    pub fn filter(
        &self,
        predicates: &Predicates,
        assignment: &Selector,
        today: NaiveDate,
    ) -> Vec<GradeRow<'_>> {
        self.rows()
            .into_iter()
            .filter(|r| predicates.matches(r, today))
            .filter(|r| assignment.admits(Some(&r.entry.assignment_id)))
            .collect()
    }

    /// One row per student. With no active restriction every roster student
    /// is listed, otherwise only students with at least one matching entry.
    pub fn render_rows(&self, view: &[GradeRow<'_>], unrestricted: bool) -> Vec<serde_json::Value> {
        let mut by_student: BTreeMap<&str, Vec<&GradeEntry>> = BTreeMap::new();
        for r in view {
            by_student
                .entry(r.student.id.as_str())
                .or_default()
                .push(r.entry);
        }

        self.students
            .iter()
            .filter(|s| unrestricted || by_student.contains_key(s.id.as_str()))
            .map(|s| {
                let entries = by_student.get(s.id.as_str()).cloned().unwrap_or_default();
                let mut cells = serde_json::Map::new();
                for e in &entries {
                    cells.insert(
                        e.assignment_id.clone(),
                        json!({ "grade": e.grade, "band": band(e.grade as f64) }),
                    );
                }
                let avg = mean(entries.iter().map(|e| e.grade as f64)).map(|m| round0(m) as f64);
                json!({
                    "studentId": s.id,
                    "name": s.name,
                    "email": s.email,
                    "course": s.course,
                    "grades": cells,
                    "average": avg,
                    "letter": avg.map(letter),
                    "band": avg.map(band),
                    "actions": ["edit", "view", "delete"],
                })
            })
            .collect()
    }

    pub fn summary(&self) -> Summary {
        let all = self.entries.records();
        let average_grade = mean(all.iter().map(|e| e.grade as f64))
            .map(round1)
            .unwrap_or(0.0);
        let failing_students = self
            .students
            .iter()
            .filter(|s| {
                mean(
                    all.iter()
                        .filter(|e| e.student_id == s.id)
                        .map(|e| e.grade as f64),
                )
                .map(|m| m < 60.0)
                .unwrap_or(false)
            })
            .count();
        Summary {
            total_students: self.students.len(),
            average_grade,
            total_grades: all.len(),
            failing_students,
        }
    }

    /// Inserts or replaces the grade for one student and assignment.
    pub fn assign(
        &mut self,
        student_id: &str,
        assignment_id: &str,
        grade: i64,
        comments: &str,
    ) -> Result<GradeEntry> {
        let mut errors = Vec::new();
        if self.student(student_id).is_none() {
            errors.push(FieldError::new("studentId", "Unknown student"));
        }
        if self.assignment(assignment_id).is_none() {
            errors.push(FieldError::new("assignmentId", "Unknown assignment"));
        }
        if !(0..=100).contains(&grade) {
            errors.push(FieldError::new("grade", "Grade must be between 0 and 100"));
        }
        if !errors.is_empty() {
            return Err(PortalError::Validation(errors));
        }

        let entry = GradeEntry {
            id: GradeEntry::key(student_id, assignment_id),
            student_id: student_id.to_string(),
            assignment_id: assignment_id.to_string(),
            grade: grade as u8,
            comments: comments.to_string(),
        };
        if self.entries.contains(&entry.id) {
            let replacement = entry.clone();
            self.entries.modify(&entry.id, move |e| *e = replacement)?;
        } else {
            self.entries.add(entry.clone())?;
        }
        Ok(entry)
    }

    /// Removes every grade of a student. Returns how many were removed.
    pub fn delete_student_grades(&mut self, student_id: &str) -> Result<usize> {
        if self.student(student_id).is_none() {
            return Err(PortalError::not_found("student", student_id));
        }
        let ids: Vec<String> = self
            .entries
            .records()
            .iter()
            .filter(|e| e.student_id == student_id)
            .map(|e| e.id.clone())
            .collect();
        for id in &ids {
            self.entries.remove(id)?;
        }
        Ok(ids.len())
    }

    pub fn details(&self, student_id: &str) -> Result<Vec<GradeDetail>> {
        if self.student(student_id).is_none() {
            return Err(PortalError::not_found("student", student_id));
        }
        Ok(self
            .entries
            .records()
            .iter()
            .filter(|e| e.student_id == student_id)
            .filter_map(|e| {
                let a = self.assignment(&e.assignment_id)?;
                Some(GradeDetail {
                    assignment_id: a.id.clone(),
                    assignment: a.name.clone(),
                    grade: e.grade,
                    comments: e.comments.clone(),
                })
            })
            .collect())
    }

    /// Distinct courses that have assignments, in first-seen order.
    pub fn courses(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.assignments
            .iter()
            .map(|a| a.course.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}
