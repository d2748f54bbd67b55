use std::fmt;

/// Errors from importing a datastore export. The engine itself never fails.
#[derive(Debug)]
pub enum ReconError {
    /// Missing required column in input data.
    MissingColumn { column: String },
    /// Timestamp parse error.
    DateParse { line: u64, tracking_id: String, value: String },
    /// Numeric field parse error.
    AmountParse { line: u64, tracking_id: String, column: String, value: String },
    /// Paid flag parse error.
    FlagParse { line: u64, tracking_id: String, value: String },
    /// Malformed CSV.
    Csv(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::DateParse { line, tracking_id, value } => {
                write!(f, "line {line}, record '{tracking_id}': cannot parse date '{value}'")
            }
            Self::AmountParse { line, tracking_id, column, value } => {
                write!(f, "line {line}, record '{tracking_id}': cannot parse {column} '{value}'")
            }
            Self::FlagParse { line, tracking_id, value } => {
                write!(f, "line {line}, record '{tracking_id}': cannot parse paid flag '{value}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
