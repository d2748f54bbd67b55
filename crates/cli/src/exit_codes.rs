//! CLI Exit Code Registry
//!
//! Single source of truth for `waybill` exit codes. Scripts rely on them.
//!
//! | Range | Domain    | Description                                   |
//! |-------|-----------|-----------------------------------------------|
//! | 0     | Universal | Success                                       |
//! | 1     | recon     | Batch needs attention (mismatch/unclassified) |
//! | 2     | Universal | CLI usage error (bad args, missing file)      |
//! | 3-9   | tariff    | Catalog and destination resolution            |
//! | 10-19 | recon     | Record import and report output               |

use waybill_tariff::TariffError;

// =============================================================================
// Universal (0-2)
// =============================================================================

pub const EXIT_SUCCESS: u8 = 0;

/// Bad arguments, unreadable input file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Tariff (3-9)
// =============================================================================

/// Catalog failed to parse or validate (including rule-order conflicts).
pub const EXIT_CATALOG_INVALID: u8 = 3;

/// Destination region not in the branch catalog.
pub const EXIT_DESTINATION_NOT_FOUND: u8 = 4;

/// Two-level catalog and the subregion is missing or undeclared.
pub const EXIT_DESTINATION_AMBIGUOUS: u8 = 5;

/// No catalog for the requested branch.
pub const EXIT_UNKNOWN_BRANCH: u8 = 6;

/// Weight or fee out of range.
pub const EXIT_INVALID_CHARGE: u8 = 7;

// =============================================================================
// Recon (1, 10-19)
// =============================================================================

/// Payment mismatch or unclassified records. Like `diff(1)`, exit 1 means
/// "the batch differs from what it should be."
pub const EXIT_RECON_MISMATCH: u8 = 1;

/// Records CSV could not be parsed.
pub const EXIT_RECON_INPUT: u8 = 10;

/// Report or quote could not be serialized or written.
pub const EXIT_OUTPUT: u8 = 11;

pub fn tariff_exit_code(err: &TariffError) -> u8 {
    match err {
        TariffError::NotFound { .. } => EXIT_DESTINATION_NOT_FOUND,
        TariffError::AmbiguousDestination { .. } => EXIT_DESTINATION_AMBIGUOUS,
        TariffError::UnknownBranch(_) => EXIT_UNKNOWN_BRANCH,
        TariffError::InvalidCharge { .. } => EXIT_INVALID_CHARGE,
        TariffError::RuleOrderConflict { .. }
        | TariffError::ConfigParse(_)
        | TariffError::ConfigValidation(_) => EXIT_CATALOG_INVALID,
    }
}
