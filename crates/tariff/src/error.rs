use std::fmt;

use crate::transit::RuleOrderConflict;

#[derive(Debug, Clone, PartialEq)]
pub enum TariffError {
    /// Region is not in the branch catalog. Never answered with a default price.
    NotFound { branch: String, region: String },
    /// Two-level catalog: subregion missing or not declared under the region.
    AmbiguousDestination {
        branch: String,
        region: String,
        subregion: Option<String>,
    },
    /// No catalog for this branch.
    UnknownBranch(String),
    /// Transit rules ordered so that a later rule can never match.
    /// Raised while loading a catalog, never while resolving a fee.
    RuleOrderConflict {
        branch: String,
        conflict: RuleOrderConflict,
    },
    /// Weight or fee outside its allowed range.
    InvalidCharge { field: &'static str, value: f64 },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Catalog validation error (bad price, duplicate zone, etc.).
    ConfigValidation(String),
}

impl fmt::Display for TariffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { branch, region } => {
                write!(f, "branch '{branch}': region '{region}' not found in catalog")
            }
            Self::AmbiguousDestination { branch, region, subregion: Some(sub) } => {
                write!(
                    f,
                    "branch '{branch}': subregion '{sub}' is not declared under region '{region}'"
                )
            }
            Self::AmbiguousDestination { branch, region, subregion: None } => {
                write!(f, "branch '{branch}': region '{region}' requires a subregion")
            }
            Self::UnknownBranch(branch) => write!(f, "unknown branch: {branch}"),
            Self::RuleOrderConflict { branch, conflict } => {
                write!(f, "branch '{branch}': {conflict}")
            }
            Self::InvalidCharge { field, value } => {
                write!(f, "invalid {field}: {value}")
            }
            Self::ConfigParse(msg) => write!(f, "catalog parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "catalog validation error: {msg}"),
        }
    }
}

impl std::error::Error for TariffError {}
