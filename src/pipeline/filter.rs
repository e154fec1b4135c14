use crate::error::{PortalError, Result};
use chrono::{Days, Months, NaiveDate};

/// What a record exposes to the view filter.
pub trait Filterable {
    /// Fields searched by the free-text query, in no particular order.
    fn search_fields(&self) -> Vec<&str>;

    fn category(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    /// Whether the record satisfies a status token. Domains override this
    /// when a token selects something other than the literal status
    /// (e.g. an attendance band).
    fn matches_status(&self, token: &str) -> bool {
        self.status() == Some(token)
    }

    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Equality selector where `all` never restricts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    All,
    Exact(String),
}

impl Selector {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Selector::All,
            Some(v) => Selector::Exact(v.to_string()),
        }
    }

    pub fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Selector::All => true,
            Selector::Exact(want) => value == Some(want.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    Any,
    Today,
    Week,
    Month,
}

impl DateRange {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") | Some("any") => Ok(DateRange::Any),
            Some("today") => Ok(DateRange::Today),
            Some("week") => Ok(DateRange::Week),
            Some("month") => Ok(DateRange::Month),
            Some(other) => Err(PortalError::BadParams(format!(
                "dateRange must be one of all, today, week, month (got {other})"
            ))),
        }
    }

    /// "today" is exact calendar-day equality; "week" and "month" are
    /// inclusive lower bounds measured in calendar days and months.
    pub fn admits(&self, date: Option<NaiveDate>, today: NaiveDate) -> bool {
        let lower = match self {
            DateRange::Any => return true,
            DateRange::Today => return date == Some(today),
            DateRange::Week => today.checked_sub_days(Days::new(7)),
            DateRange::Month => today.checked_sub_months(Months::new(1)),
        };
        match (date, lower) {
            (Some(d), Some(lo)) => d >= lo,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Active filter criteria. Every field defaults to "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicates {
    pub query: String,
    pub category: Selector,
    pub status: Selector,
    pub date_range: DateRange,
}

impl Predicates {
    /// Reads `query`, `category` (or `course`), `status` and `dateRange`
    /// from request params.
    pub fn from_params(params: &serde_json::Value) -> Result<Self> {
        let s = |k: &str| params.get(k).and_then(|v| v.as_str());
        Ok(Predicates {
            query: s("query").unwrap_or("").trim().to_string(),
            category: Selector::parse(s("category").or_else(|| s("course"))),
            status: Selector::parse(s("status")),
            date_range: DateRange::parse(s("dateRange"))?,
        })
    }

    pub fn is_unrestricted(&self) -> bool {
        self.query.is_empty()
            && self.category == Selector::All
            && self.status == Selector::All
            && self.date_range == DateRange::Any
    }

    pub fn matches<R: Filterable>(&self, record: &R, today: NaiveDate) -> bool {
        self.matches_text(record)
            && self.category.admits(record.category())
            && match &self.status {
                Selector::All => true,
                Selector::Exact(token) => record.matches_status(token),
            }
            && self.date_range.admits(record.date(), today)
    }

    fn matches_text<R: Filterable>(&self, record: &R) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        record
            .search_fields()
            .iter()
            .any(|f| f.to_lowercase().contains(&needle))
    }
}

/// Derived view: the records satisfying every predicate, in store order.
pub fn apply<'a, R: Filterable>(
    records: &'a [R],
    predicates: &Predicates,
    today: NaiveDate,
) -> Vec<&'a R> {
    records
        .iter()
        .filter(|r| predicates.matches(*r, today))
        .collect()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| PortalError::BadParams(format!("date must be YYYY-MM-DD (got {raw})")))
}
