pub mod announcements;
pub mod attendance;
pub mod contact;
pub mod courses;
pub mod grades;
pub mod profile;
pub mod research;

use crate::error::{PortalError, Result};
use crate::pipeline::{Record, Store};
use announcements::Announcement;
use attendance::StudentAttendance;
use courses::Course;
use grades::{Assignment, GradeBook, GradeEntry, RosterStudent};
use profile::Profile;
use research::{Award, Collaboration, Project, Publication};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// One page of the portal, each backed by its own data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Announcements,
    Attendance,
    Grades,
    Courses,
    Publications,
    Projects,
    Awards,
    Collaborations,
    Profile,
}

impl Domain {
    pub const ALL: [Domain; 9] = [
        Domain::Announcements,
        Domain::Attendance,
        Domain::Grades,
        Domain::Courses,
        Domain::Publications,
        Domain::Projects,
        Domain::Awards,
        Domain::Collaborations,
        Domain::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Announcements => "announcements",
            Domain::Attendance => "attendance",
            Domain::Grades => "grades",
            Domain::Courses => "courses",
            Domain::Publications => "publications",
            Domain::Projects => "projects",
            Domain::Awards => "awards",
            Domain::Collaborations => "collaborations",
            Domain::Profile => "profile",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == raw.trim())
            .ok_or_else(|| PortalError::BadParams(format!("unknown domain: {raw}")))
    }

    /// Plural noun used in the empty-view placeholder.
    pub fn noun(&self) -> &'static str {
        match self {
            Domain::Attendance | Domain::Grades => "students",
            other => other.as_str(),
        }
    }
}

/// Records for one domain as produced by a data source.
#[derive(Debug, Clone)]
pub enum DomainData {
    Announcements(Vec<Announcement>),
    Attendance(Vec<StudentAttendance>),
    Grades {
        students: Vec<RosterStudent>,
        assignments: Vec<Assignment>,
        entries: Vec<GradeEntry>,
    },
    Courses(Vec<Course>),
    Publications(Vec<Publication>),
    Projects(Vec<Project>),
    Awards(Vec<Award>),
    Collaborations(Vec<Collaboration>),
    Profile(Profile),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradesPayload {
    students: Vec<RosterStudent>,
    assignments: Vec<Assignment>,
    entries: Vec<GradeEntry>,
}

fn decode<T: serde::de::DeserializeOwned>(domain: Domain, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| PortalError::BadParams(format!("invalid {} records: {e}", domain.as_str())))
}

impl DomainData {
    pub fn domain(&self) -> Domain {
        match self {
            DomainData::Announcements(_) => Domain::Announcements,
            DomainData::Attendance(_) => Domain::Attendance,
            DomainData::Grades { .. } => Domain::Grades,
            DomainData::Courses(_) => Domain::Courses,
            DomainData::Publications(_) => Domain::Publications,
            DomainData::Projects(_) => Domain::Projects,
            DomainData::Awards(_) => Domain::Awards,
            DomainData::Collaborations(_) => Domain::Collaborations,
            DomainData::Profile(_) => Domain::Profile,
        }
    }

    /// Parses the JSON shape written by `Portal::records_value`.
    pub fn from_value(domain: Domain, value: Value) -> Result<Self> {
        Ok(match domain {
            Domain::Announcements => DomainData::Announcements(decode(domain, value)?),
            Domain::Attendance => DomainData::Attendance(decode(domain, value)?),
            Domain::Grades => {
                let p: GradesPayload = decode(domain, value)?;
                DomainData::Grades {
                    students: p.students,
                    assignments: p.assignments,
                    entries: p.entries,
                }
            }
            Domain::Courses => DomainData::Courses(decode(domain, value)?),
            Domain::Publications => DomainData::Publications(decode(domain, value)?),
            Domain::Projects => DomainData::Projects(decode(domain, value)?),
            Domain::Awards => DomainData::Awards(decode(domain, value)?),
            Domain::Collaborations => DomainData::Collaborations(decode(domain, value)?),
            Domain::Profile => DomainData::Profile(decode(domain, value)?),
        })
    }
}

/// Every store the portal renders from, plus which domains have been loaded.
#[derive(Debug, Default)]
pub struct Portal {
    pub announcements: Store<Announcement>,
    pub attendance: Store<StudentAttendance>,
    pub grades: GradeBook,
    pub courses: Store<Course>,
    pub publications: Store<Publication>,
    pub projects: Store<Project>,
    pub awards: Store<Award>,
    pub collaborations: Store<Collaboration>,
    pub profile: Option<Profile>,
    loaded: BTreeSet<Domain>,
}

fn to_value<T: Serialize + ?Sized>(v: &T) -> Result<Value> {
    serde_json::to_value(v).map_err(|e| PortalError::Io(format!("encode records: {e}")))
}

impl Portal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a domain's contents. Returns the number of records loaded.
    pub fn install(&mut self, data: DomainData) -> Result<usize> {
        let domain = data.domain();
        let count = match data {
            DomainData::Announcements(v) => load_into(&mut self.announcements, v)?,
            DomainData::Attendance(v) => load_into(&mut self.attendance, v)?,
            DomainData::Grades {
                students,
                assignments,
                entries,
            } => {
                self.grades = GradeBook::new(students, assignments, entries)?;
                self.grades.entries.len()
            }
            DomainData::Courses(v) => load_into(&mut self.courses, v)?,
            DomainData::Publications(v) => load_into(&mut self.publications, v)?,
            DomainData::Projects(v) => load_into(&mut self.projects, v)?,
            DomainData::Awards(v) => load_into(&mut self.awards, v)?,
            DomainData::Collaborations(v) => load_into(&mut self.collaborations, v)?,
            DomainData::Profile(p) => {
                self.profile = Some(p);
                1
            }
        };
        self.loaded.insert(domain);
        tracing::info!(domain = domain.as_str(), count, "domain loaded");
        Ok(count)
    }

    pub fn is_loaded(&self, domain: Domain) -> bool {
        self.loaded.contains(&domain)
    }

    pub fn loaded(&self) -> impl Iterator<Item = Domain> + '_ {
        self.loaded.iter().copied()
    }

    pub fn require(&self, domain: Domain) -> Result<()> {
        if self.is_loaded(domain) {
            Ok(())
        } else {
            Err(PortalError::NoDataSource(domain.as_str().to_string()))
        }
    }

    pub fn profile_mut(&mut self) -> Result<&mut Profile> {
        self.profile
            .as_mut()
            .ok_or_else(|| PortalError::NoDataSource(Domain::Profile.as_str().to_string()))
    }

    /// Store contents as written into an export bundle, with the record count.
    pub fn records_value(&self, domain: Domain) -> Result<(Value, usize)> {
        Ok(match domain {
            Domain::Announcements => (to_value(self.announcements.records())?, self.announcements.len()),
            Domain::Attendance => (to_value(self.attendance.records())?, self.attendance.len()),
            Domain::Grades => (
                json!({
                    "students": to_value(&self.grades.students)?,
                    "assignments": to_value(&self.grades.assignments)?,
                    "entries": to_value(self.grades.entries.records())?,
                }),
                self.grades.entries.len(),
            ),
            Domain::Courses => (to_value(self.courses.records())?, self.courses.len()),
            Domain::Publications => (to_value(self.publications.records())?, self.publications.len()),
            Domain::Projects => (to_value(self.projects.records())?, self.projects.len()),
            Domain::Awards => (to_value(self.awards.records())?, self.awards.len()),
            Domain::Collaborations => (to_value(self.collaborations.records())?, self.collaborations.len()),
            Domain::Profile => {
                let p = self
                    .profile
                    .as_ref()
                    .ok_or_else(|| PortalError::NoDataSource("profile".into()))?;
                (to_value(p)?, 1)
            }
        })
    }

    /// Summary statistics for one domain, computed over its full store.
    /// Research domains share a single summary.
    pub fn summary(&self, domain: Domain) -> Result<Value> {
        match domain {
            Domain::Announcements => to_value(&announcements::summary(self.announcements.records())),
            Domain::Attendance => to_value(&attendance::summary(self.attendance.records())),
            Domain::Grades => to_value(&self.grades.summary()),
            Domain::Courses => to_value(&courses::summary(self.courses.records())),
            Domain::Publications | Domain::Projects | Domain::Awards | Domain::Collaborations => {
                to_value(&self.research_summary())
            }
            Domain::Profile => Err(PortalError::BadParams("profile has no summary".into())),
        }
    }

    pub fn research_summary(&self) -> research::Summary {
        research::summary(
            self.publications.records(),
            self.projects.records(),
            self.awards.records(),
        )
    }

    pub fn course_name(&self, code: &str) -> String {
        courses::course_name(self.courses.records(), code)
    }
}

fn load_into<R: Record>(store: &mut Store<R>, records: Vec<R>) -> Result<usize> {
    let n = records.len();
    store.load(records)?;
    Ok(n)
}
