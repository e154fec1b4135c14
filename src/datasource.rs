use crate::domains::{Domain, DomainData};
use crate::error::{PortalError, Result};
use crate::export::read_bundle;
use std::path::PathBuf;

/// Where a domain's records come from.
pub trait DataSource {
    fn name(&self) -> &'static str;
    fn load(&self, domain: Domain) -> Result<DomainData>;
}

/// The dataset shipped with the binary.
pub struct FixtureSource;

impl FixtureSource {
    fn raw(domain: Domain) -> &'static str {
        match domain {
            Domain::Announcements => include_str!("fixtures/announcements.json"),
            Domain::Attendance => include_str!("fixtures/attendance.json"),
            Domain::Grades => include_str!("fixtures/grades.json"),
            Domain::Courses => include_str!("fixtures/courses.json"),
            Domain::Publications => include_str!("fixtures/publications.json"),
            Domain::Projects => include_str!("fixtures/projects.json"),
            Domain::Awards => include_str!("fixtures/awards.json"),
            Domain::Collaborations => include_str!("fixtures/collaborations.json"),
            Domain::Profile => include_str!("fixtures/profile.json"),
        }
    }
}

impl DataSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixtures"
    }

    fn load(&self, domain: Domain) -> Result<DomainData> {
        let value = serde_json::from_str(Self::raw(domain)).map_err(|e| {
            PortalError::NoDataSource(format!("{}: fixture unreadable: {e}", domain.as_str()))
        })?;
        DomainData::from_value(domain, value)
    }
}

/// Records read back from a previously exported bundle.
pub struct BundleSource {
    pub path: PathBuf,
}

impl DataSource for BundleSource {
    fn name(&self) -> &'static str {
        "bundle"
    }

    fn load(&self, domain: Domain) -> Result<DomainData> {
        let bundle = read_bundle(&self.path)?;
        if bundle.manifest.domain != domain.as_str() {
            return Err(PortalError::BadParams(format!(
                "bundle holds {} records, not {}",
                bundle.manifest.domain,
                domain.as_str()
            )));
        }
        DomainData::from_value(domain, bundle.records)
    }
}
