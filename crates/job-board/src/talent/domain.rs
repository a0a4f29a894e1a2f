use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::domain::normalized_term;
use crate::identity::Principal;

/// Opaque directory handle for a candidate. Employers address candidates by
/// this id; the login principal never leaves the service for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Private contact block, released to an employer only after an unlock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub current_or_last_company: String,
    #[serde(default)]
    pub last_drawn_salary: Option<u64>,
}

/// Profile fields a job seeker submits for themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub full_name: String,
    pub job_role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub total_experience_years: u32,
    #[serde(default)]
    pub preferred_location: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub contact: ContactDetails,
}

impl ProfileInput {
    pub fn normalized(self) -> Result<Self, TalentValidationError> {
        let full_name = self.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(TalentValidationError::MissingField("full_name"));
        }
        let job_role = self.job_role.trim().to_string();
        if job_role.is_empty() {
            return Err(TalentValidationError::MissingField("job_role"));
        }

        let mut seen = BTreeSet::new();
        let skills = self
            .skills
            .into_iter()
            .map(|skill| skill.trim().to_string())
            .filter(|skill| !skill.is_empty() && seen.insert(skill.to_lowercase()))
            .collect();

        Ok(Self {
            full_name,
            job_role,
            bio: self.bio.trim().to_string(),
            skills,
            resume: self.resume.trim().to_string(),
            total_experience_years: self.total_experience_years,
            preferred_location: self.preferred_location.trim().to_string(),
            linkedin: self.linkedin.trim().to_string(),
            github: self.github.trim().to_string(),
            contact: ContactDetails {
                email: self.contact.email.trim().to_string(),
                mobile_number: self.contact.mobile_number.trim().to_string(),
                current_or_last_company: self.contact.current_or_last_company.trim().to_string(),
                last_drawn_salary: self.contact.last_drawn_salary,
            },
        })
    }
}

/// Stored job seeker profile, owned by `candidate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: CandidateId,
    pub candidate: Principal,
    pub full_name: String,
    pub job_role: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub resume: String,
    pub total_experience_years: u32,
    pub preferred_location: String,
    pub linkedin: String,
    pub github: String,
    pub contact: ContactDetails,
    pub updated_at: DateTime<Utc>,
}

impl CandidateProfile {
    pub fn from_input(
        id: CandidateId,
        candidate: Principal,
        input: ProfileInput,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            candidate,
            full_name: input.full_name,
            job_role: input.job_role,
            bio: input.bio,
            skills: input.skills,
            resume: input.resume,
            total_experience_years: input.total_experience_years,
            preferred_location: input.preferred_location,
            linkedin: input.linkedin,
            github: input.github,
            contact: input.contact,
            updated_at: now,
        }
    }
}

/// Directory view of a profile as seen by one employer.
///
/// `full_name` and `contact` are populated only when `unlocked` is true.
/// The candidate's login principal is never part of the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub candidate: CandidateId,
    pub job_role: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub resume: String,
    pub total_experience_years: u32,
    pub preferred_location: String,
    pub linkedin: String,
    pub github: String,
    pub unlocked: bool,
    pub full_name: Option<String>,
    pub contact: Option<ContactDetails>,
}

impl DirectoryEntry {
    pub fn project(profile: CandidateProfile, unlocked: bool) -> Self {
        let (full_name, contact) = if unlocked {
            (Some(profile.full_name), Some(profile.contact))
        } else {
            (None, None)
        };

        Self {
            candidate: profile.id,
            job_role: profile.job_role,
            bio: profile.bio,
            skills: profile.skills,
            resume: profile.resume,
            total_experience_years: profile.total_experience_years,
            preferred_location: profile.preferred_location,
            linkedin: profile.linkedin,
            github: profile.github,
            unlocked,
            full_name,
            contact,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryFilter {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
}

impl DirectoryFilter {
    /// Keyword covers bio and job role, plus the name once it has been unlocked.
    pub fn matches(&self, entry: &DirectoryEntry) -> bool {
        let keyword_match = match normalized_term(&self.keyword) {
            Some(term) => {
                entry.bio.to_lowercase().contains(&term)
                    || entry.job_role.to_lowercase().contains(&term)
                    || entry
                        .full_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&term))
            }
            None => true,
        };

        let skill_match = match normalized_term(&self.skill) {
            Some(term) => entry
                .skills
                .iter()
                .any(|skill| skill.to_lowercase().contains(&term)),
            None => true,
        };

        keyword_match && skill_match
    }
}

/// Sorted, de-duplicated skills across `entries`.
pub fn all_skills<'a>(entries: impl IntoIterator<Item = &'a DirectoryEntry>) -> Vec<String> {
    entries
        .into_iter()
        .flat_map(|entry| entry.skills.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerAccount {
    pub employer: Principal,
    pub credits: u64,
    pub credits_purchased: u64,
    pub created_at: DateTime<Utc>,
}

impl EmployerAccount {
    pub fn open(employer: Principal, now: DateTime<Utc>) -> Self {
        Self {
            employer,
            credits: 0,
            credits_purchased: 0,
            created_at: now,
        }
    }
}

/// Immutable proof that `employer` paid to see `candidate`'s private fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    pub employer: Principal,
    pub candidate: Principal,
    pub credits_used: u64,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockReceipt {
    pub status: String,
    pub remaining_credits: u64,
    #[serde(default)]
    pub already_unlocked: bool,
}

/// Unlock history for one candidate, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUnlocks {
    pub candidate: Principal,
    pub full_name: Option<String>,
    pub records: Vec<UnlockRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMetrics {
    pub employers: usize,
    pub jobseekers: usize,
    pub total_credits_purchased: u64,
    pub unlocks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TalentValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}
