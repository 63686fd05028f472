use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a model from being assembled or evaluated.
///
/// Configuration problems are caller bugs, so none of these are recovered
/// from locally: assembly aborts on the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ThisError)]
pub enum Error {
    #[error("prior with name {0} not known")]
    UnknownOption(String),

    #[error("required option {0} is missing")]
    MissingOption(String),

    #[error("option {name} has an invalid value: {reason}")]
    InvalidOptionValue { name: String, reason: String },

    #[error("diff_data_sim ({diff_data_sim}) is too small compared to the prior delay (needs at least {required})")]
    InsufficientLeadTime { diff_data_sim: usize, required: f64 },

    #[error("simulation ends before the end of the data: num_days_sim is {num_days_sim}, needs at least {required}")]
    HorizonTooShort { num_days_sim: usize, required: usize },

    #[error("change point {index} ({date}) begins before the preceding change point ({previous})")]
    ChangePointOrdering { index: usize, date: NaiveDate, previous: NaiveDate },

    #[error("variable {0} declared twice")]
    DuplicateVariable(String),

    #[error("no variable named {0}")]
    UnknownVariable(String),

    #[error("invalid node {name}: {reason}")]
    InvalidNode { name: String, reason: String },

    #[error("point has {found} values, model has {expected} free variables")]
    PointDimension { expected: usize, found: usize },

    #[error("invalid input path {0}")]
    InvalidInputPath(String),

    #[error("could not open input file {0}")]
    InvalidInputFile(String),

    #[error("failed to read input")]
    InputReadFailure,

    #[error("invalid JSON: {0}")]
    InvalidJson(JsonError),

    #[error("database error: {0}")]
    Database(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonError {
    pub description: String,
    pub category: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {} column {}", self.description, self.line, self.column)
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(e: serde_json::error::Error) -> Self {
        Self::InvalidJson(JsonError {
            description: format!("{}", e),
            category: format!("{:?}", e.classify()),
            line: e.line(),
            column: e.column(),
        })
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(format!("{}", e))
    }
}
