use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Saved,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Applied,
        Status::Interviewing,
        Status::Offer,
        Status::Rejected,
        Status::Saved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::Interviewing => "interviewing",
            Status::Offer => "offer",
            Status::Rejected => "rejected",
            Status::Saved => "saved",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Applied => "Applied",
            Status::Interviewing => "Interviewing",
            Status::Offer => "Offer",
            Status::Rejected => "Rejected",
            Status::Saved => "Saved",
        }
    }

    /// Applied or interviewing: still waiting on an outcome.
    pub fn is_in_progress(self) -> bool {
        matches!(self, Status::Applied | Status::Interviewing)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}' (expected applied, interviewing, offer, rejected or saved)")]
pub struct ParseStatusError(String);

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == lower)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Transient list filter: everything, or a single status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }

    /// Next filter in chip order: all, applied, ..., saved, all.
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(Status::ALL[0]),
            StatusFilter::Only(status) => {
                let idx = Status::ALL.iter().position(|s| *s == status).unwrap_or(0);
                Status::ALL
                    .get(idx + 1)
                    .map(|next| StatusFilter::Only(*next))
                    .unwrap_or(StatusFilter::All)
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: String,
    pub company: String,
    pub position: String,
    pub status: Status,
    pub date_applied: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "non_empty")]
    pub link: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("company is required")]
    MissingCompany,
    #[error("position is required")]
    MissingPosition,
}

/// Checked form payload for creating or editing a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationInput {
    company: String,
    position: String,
    status: Status,
    link: Option<String>,
}

impl ApplicationInput {
    pub fn new(
        company: &str,
        position: &str,
        status: Status,
        link: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let company = company.trim();
        if company.is_empty() {
            return Err(ValidationError::MissingCompany);
        }
        let position = position.trim();
        if position.is_empty() {
            return Err(ValidationError::MissingPosition);
        }
        let link = link
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Ok(Self {
            company: company.to_string(),
            position: position.to_string(),
            status,
            link,
        })
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Starts an edit payload from an existing record.
    pub fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            company: record.company.clone(),
            position: record.position.clone(),
            status: record.status,
            link: record.link.clone(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}
