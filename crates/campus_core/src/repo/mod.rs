//! Repository layer: the transactional entity store.
//!
//! # Responsibility
//! - Define per-entity data access contracts.
//! - Isolate SQLite query details from services and relationship logic.
//!
//! # Invariants
//! - Write paths validate entities before SQL mutations.
//! - Reads materialize both relation directions of the loaded entity.
//! - Student–Department is persisted only through `students.department_id`;
//!   join rows are replaced from whichever side is saved.

pub mod department_repo;
pub mod lecture_repo;
mod store;
pub mod student_repo;

use crate::db::DbError;
use crate::model::{EntityKind, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use department_repo::DepartmentRepository;
pub use lecture_repo::LectureRepository;
pub use store::SqliteStore;
pub use student_repo::StudentRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed validation before a write.
    Validation(ValidationError),
    /// SQLite failure, including constraint violations and busy conflicts.
    Db(DbError),
    /// Update/delete target row does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Persisted data cannot be converted to a valid entity.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "store requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Full store contract used by domain services.
pub trait UniversityStore: DepartmentRepository + StudentRepository + LectureRepository {
    /// Runs `f` inside one transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`.
    /// Calls must not nest.
    fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}
