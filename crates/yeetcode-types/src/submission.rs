//! Submissions reported by the external submission feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Judge verdict of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    RuntimeError,
    Other,
}

/// One entry of a member's recent-submission list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub problem_slug: String,
    pub timestamp: DateTime<Utc>,
    pub status: SubmissionStatus,
}

impl Submission {
    pub fn accepted(problem_slug: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            problem_slug: problem_slug.into(),
            timestamp,
            status: SubmissionStatus::Accepted,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == SubmissionStatus::Accepted
    }
}
