use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{FieldError, LoanError};

/// unique identifier for a submitted deal
pub type DealId = Uuid;

/// unique identifier for a produced document
pub type DocumentId = Uuid;

/// transaction being financed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Purchase,
    Refinance,
    CashOutRefinance,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Purchase,
        TransactionType::Refinance,
        TransactionType::CashOutRefinance,
    ];

    /// human label used on documents
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Purchase => "Purchase",
            TransactionType::Refinance => "Refinance",
            TransactionType::CashOutRefinance => "Cash-Out Refinance",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransactionType {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        TransactionType::ALL
            .into_iter()
            .find(|t| normalize_key(t.label()) == key)
            .ok_or_else(|| {
                LoanError::invalid_field(
                    "transaction_type",
                    format!("unknown transaction type '{}'", s.trim()),
                )
            })
    }
}

/// borrower track record, ordered from least to most experienced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    /// no completed projects
    Beginner,
    Intermediate,
    Experienced,
    /// full-time investor
    Professional,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Beginner,
        ExperienceLevel::Intermediate,
        ExperienceLevel::Experienced,
        ExperienceLevel::Professional,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Experienced => "Experienced",
            ExperienceLevel::Professional => "Professional",
        }
    }

    /// parse a tier name, falling back to beginner for anything unrecognized
    pub fn parse_lenient(s: &str) -> ExperienceLevel {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(tier = s, "unrecognized experience tier, using Beginner");
            ExperienceLevel::Beginner
        })
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExperienceLevel {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        ExperienceLevel::ALL
            .into_iter()
            .find(|level| normalize_key(level.label()) == key)
            .ok_or_else(|| {
                LoanError::InvalidInput {
                    errors: vec![FieldError::new(
                        "borrower_experience",
                        format!("unknown experience level '{}'", s.trim()),
                    )],
                }
            })
    }
}

/// approval outcome printed on the term sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Approved,
    PendingReview,
}

impl ApprovalStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::PendingReview => "Pending Review",
        }
    }

    pub fn is_approved(self) -> bool {
        matches!(self, ApprovalStatus::Approved)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// case, spaces, dashes and underscores are ignored when matching labels
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
