use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employer supplied posting before it is assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub salary: Option<u64>,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl JobDraft {
    /// Trim every field, reject blank required fields, and drop blank requirements.
    pub fn normalized(self) -> Result<Self, BoardValidationError> {
        let title = required("title", self.title)?;
        let company = required("company", self.company)?;
        let location = required("location", self.location)?;
        let description = required("description", self.description)?;
        let requirements = self
            .requirements
            .into_iter()
            .map(|requirement| requirement.trim().to_string())
            .filter(|requirement| !requirement.is_empty())
            .collect();

        Ok(Self {
            title,
            company,
            location,
            salary: self.salary,
            description,
            requirements,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, BoardValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(BoardValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Published posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub employer: Principal,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<u64>,
    pub description: String,
    pub requirements: Vec<String>,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInput {
    pub job_id: JobId,
    pub cover_letter: String,
}

/// Hiring pipeline stage of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
        ApplicationStatus::Hired,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Withdrawn => "Withdrawn",
            ApplicationStatus::Hired => "Hired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate: Principal,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Browse filter: case-insensitive substring matching, blank terms match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilter {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        let keyword_match = match normalized_term(&self.keyword) {
            Some(term) => [&job.title, &job.company, &job.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&term)),
            None => true,
        };

        let location_match = match normalized_term(&self.location) {
            Some(term) => job.location.to_lowercase().contains(&term),
            None => true,
        };

        keyword_match && location_match
    }
}

pub(crate) fn normalized_term(term: &Option<String>) -> Option<String> {
    term.as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("a cover letter is required")]
    MissingCoverLetter,
}
