//! Project code model.
//!
//! A project code has the shape
//! `{business_unit}-{category}-{client_or_dept}-{yy}{seq}-{phase}`, for
//! example `BU1-D-C1-2501-T`. The `seq` fragment is `"00"` for annual
//! projects and a 1-based, zero-padded per-year counter otherwise.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Sequence literal reserved for annual projects.
pub const ANNUAL_SEQUENCE: &str = "00";

/// Longest accepted caller-supplied code fragment.
pub const MAX_FRAGMENT_LEN: usize = 32;

/// Phase letter used when the project type is absent.
pub const DEFAULT_CATEGORY_LETTER: char = 'D';

/// Valid values for `projects.status`.
pub const PROJECT_STATUS_ACTIVE: &str = "Active";
pub const PROJECT_STATUS_PAUSED: &str = "Paused";
pub const PROJECT_STATUS_COMPLETED: &str = "Completed";

pub const VALID_PROJECT_STATUSES: &[&str] = &[
    PROJECT_STATUS_ACTIVE,
    PROJECT_STATUS_PAUSED,
    PROJECT_STATUS_COMPLETED,
];

// ---------------------------------------------------------------------------
// Project type
// ---------------------------------------------------------------------------

/// Project type as stored in `projects.project_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    ExternalProject,
    ExternalDelivery,
    ExternalOther,
    Internal,
}

impl ProjectType {
    /// Numeric id used on the wire and in the database.
    pub fn id(self) -> i16 {
        match self {
            Self::ExternalProject => 1,
            Self::ExternalDelivery => 2,
            Self::ExternalOther => 3,
            Self::Internal => 4,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::ExternalProject),
            2 => Some(Self::ExternalDelivery),
            3 => Some(Self::ExternalOther),
            4 => Some(Self::Internal),
            _ => None,
        }
    }

    /// Parse either the numeric id (`"4"`) or the kebab-case name (`"internal"`).
    ///
    /// Unknown ids and names yield `None`, which falls back to
    /// [`DEFAULT_CATEGORY_LETTER`].
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(id) = trimmed.parse::<i16>() {
            return Self::from_id(id);
        }
        match trimmed {
            "external-project" => Some(Self::ExternalProject),
            "external-delivery" => Some(Self::ExternalDelivery),
            "external-other" => Some(Self::ExternalOther),
            "internal" => Some(Self::Internal),
            _ => None,
        }
    }

    /// Fixed category letter for this type.
    pub fn category_letter(self) -> char {
        match self {
            Self::ExternalProject => 'P',
            Self::ExternalDelivery => 'D',
            Self::ExternalOther => 'O',
            Self::Internal => 'T',
        }
    }
}

/// Phase letter appended to a project code.
///
/// `T` for internal projects, otherwise the category letter of the type,
/// falling back to [`DEFAULT_CATEGORY_LETTER`] when no type is known.
pub fn phase_type(project_type: Option<ProjectType>) -> char {
    match project_type {
        Some(ProjectType::Internal) => 'T',
        Some(t) => t.category_letter(),
        None => DEFAULT_CATEGORY_LETTER,
    }
}

/// Two-digit year suffix (`2025` -> `"25"`).
pub fn year_suffix(now: Timestamp) -> String {
    now.format("%y").to_string()
}

/// Validate a caller-supplied code fragment.
///
/// Fragments end up joined by `-`, so they may not contain one, nor any
/// whitespace.
pub fn validate_fragment(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.chars().count() > MAX_FRAGMENT_LEN {
        return Err(format!(
            "{field} must be at most {MAX_FRAGMENT_LEN} characters"
        ));
    }
    if value.contains('-') || value.chars().any(char::is_whitespace) {
        return Err(format!(
            "{field} may not contain '-' or whitespace (got '{value}')"
        ));
    }
    Ok(())
}

/// Validate that a project status is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_PROJECT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid project status '{status}'. Must be one of: {}",
            VALID_PROJECT_STATUSES.join(", ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Sequence fragment
// ---------------------------------------------------------------------------

/// The `seq` part following the year suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Annual,
    Numbered(u32),
}

impl Sequence {
    pub fn is_annual(self) -> bool {
        matches!(self, Self::Annual)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annual => f.write_str(ANNUAL_SEQUENCE),
            Self::Numbered(n) => write!(f, "{n:02}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Project code
// ---------------------------------------------------------------------------

/// A fully composed project code and the fragments it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCode {
    pub business_unit: String,
    pub category: String,
    pub client_or_dept: String,
    pub year_suffix: String,
    pub sequence: Sequence,
    pub phase_type: char,
}

impl ProjectCode {
    /// The zero-padded sequence fragment as stored in `projects.annual_seq`.
    pub fn annual_seq(&self) -> String {
        self.sequence.to_string()
    }
}

impl fmt::Display for ProjectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}{}-{}",
            self.business_unit,
            self.category,
            self.client_or_dept,
            self.year_suffix,
            self.sequence,
            self.phase_type
        )
    }
}

/// Error returned when a string is not a well-formed project code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed project code '{code}': {reason}")]
pub struct ParseProjectCodeError {
    pub code: String,
    pub reason: &'static str,
}

impl FromStr for ProjectCode {
    type Err = ParseProjectCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ParseProjectCodeError {
            code: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('-').collect();
        let [business_unit, category, client_or_dept, year_seq, phase] = parts.as_slice() else {
            return Err(fail("expected five '-'-separated fragments"));
        };

        if business_unit.is_empty() || category.is_empty() || client_or_dept.is_empty() {
            return Err(fail("empty fragment"));
        }
        if year_seq.len() < 4 || !year_seq.chars().all(|c| c.is_ascii_digit()) {
            return Err(fail("year/sequence fragment must be at least four digits"));
        }

        let mut phase_chars = phase.chars();
        let (Some(phase_type), None) = (phase_chars.next(), phase_chars.next()) else {
            return Err(fail("phase type must be a single letter"));
        };

        let (year_suffix, seq) = year_seq.split_at(2);
        if seq.len() > 2 && seq.starts_with('0') {
            return Err(fail("sequence is padded past two digits"));
        }
        let sequence = if seq == ANNUAL_SEQUENCE {
            Sequence::Annual
        } else {
            match seq.parse::<u32>() {
                Ok(0) | Err(_) => return Err(fail("invalid sequence number")),
                Ok(n) => Sequence::Numbered(n),
            }
        };

        Ok(Self {
            business_unit: business_unit.to_string(),
            category: category.to_string(),
            client_or_dept: client_or_dept.to_string(),
            year_suffix: year_suffix.to_string(),
            sequence,
            phase_type,
        })
    }
}
