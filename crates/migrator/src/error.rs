use std::fmt;

use db::models::execution::ExecutionError;
use legacy::LegacyStoreError;
use sea_orm::DbErr;
use secrets::SecretsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} record failed schema validation: {violations}")]
    SchemaValidation {
        entity: &'static str,
        violations: ViolationList,
    },
    /// Control-flow signal, not a failure: the orchestrator turns this
    /// into a skip.
    #[error("Record '{0}' was already migrated")]
    RecordAlreadyMigrated(String),
    #[error("{0}")]
    RecordDoesNotExist(String),
    /// The target schema is not ready for this step — an operational
    /// problem, not a data problem.
    #[error("Column '{column}' does not exist on table '{table}'")]
    ColumnDoesNotExist {
        table: &'static str,
        column: &'static str,
    },
    #[error("Execution ancestry of '{0}' contains a cycle")]
    Cycle(String),
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Missing or invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Legacy(#[from] LegacyStoreError),
    #[error(transparent)]
    Crypto(#[from] SecretsError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<ExecutionError> for Error {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::Database(db_err) => Error::Database(db_err),
            ExecutionError::NotFound => {
                Error::RecordDoesNotExist("Execution not found".to_string())
            }
            ExecutionError::InvalidPayload { field } => Error::InvalidField {
                field: field.to_string(),
                reason: "must be a JSON object".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub problem: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    MissingRequired,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            ViolationKind::MissingRequired => {
                write!(f, "'{}' is required but missing", self.field)
            }
            ViolationKind::WrongType { expected, found } => {
                write!(f, "'{}' expected {expected}, found {found}", self.field)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationList(pub Vec<Violation>);

impl fmt::Display for ViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, violation) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}
