//! Domain use-case services.
//!
//! # Responsibility
//! - Compose store calls with relationship-manager operations per use case.
//! - Keep the HTTP layer decoupled from storage details.
//!
//! # Invariants
//! - Every mutating operation runs inside one store transaction.
//! - Reads by id or name report absence as `Ok(None)`, never as an error.
//! - Referenced ids on create that do not exist are skipped.

pub mod department_service;
pub mod lecture_service;
pub mod student_service;

use crate::model::department::{Department, DepartmentId};
use crate::model::lecture::{Lecture, LectureId};
use crate::model::student::{Student, StudentId};
use crate::model::{EntityKind, ValidationError};
use crate::repo::{DepartmentRepository, LectureRepository, RepoError, StudentRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy surfaced to callers of the domain services.
#[derive(Debug)]
pub enum ServiceError {
    /// Lookup by id produced nothing.
    NotFound { kind: EntityKind, id: Uuid },
    /// Required input is missing or blank.
    Validation(ValidationError),
    /// Store-level failure (constraint violation, busy database, I/O).
    Repo(RepoError),
    /// Write succeeded but the read-back disagrees.
    InconsistentState(&'static str),
}

impl ServiceError {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} '{id}' not found"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent store state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

fn require_department<S: DepartmentRepository>(
    store: &S,
    id: DepartmentId,
) -> ServiceResult<Department> {
    store
        .get_department(id)?
        .ok_or(ServiceError::not_found(EntityKind::Department, id))
}

fn require_student<S: StudentRepository>(store: &S, id: StudentId) -> ServiceResult<Student> {
    store
        .get_student(id)?
        .ok_or(ServiceError::not_found(EntityKind::Student, id))
}

fn require_lecture<S: LectureRepository>(store: &S, id: LectureId) -> ServiceResult<Lecture> {
    store
        .get_lecture(id)?
        .ok_or(ServiceError::not_found(EntityKind::Lecture, id))
}

fn reload_department<S: DepartmentRepository>(
    store: &S,
    id: DepartmentId,
) -> ServiceResult<Department> {
    store
        .get_department(id)?
        .ok_or(ServiceError::InconsistentState(
            "department missing in read-back",
        ))
}

fn reload_student<S: StudentRepository>(store: &S, id: StudentId) -> ServiceResult<Student> {
    store
        .get_student(id)?
        .ok_or(ServiceError::InconsistentState("student missing in read-back"))
}

fn reload_lecture<S: LectureRepository>(store: &S, id: LectureId) -> ServiceResult<Lecture> {
    store
        .get_lecture(id)?
        .ok_or(ServiceError::InconsistentState("lecture missing in read-back"))
}
