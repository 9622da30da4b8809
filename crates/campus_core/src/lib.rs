//! Core domain logic for the campus records store.
//! This crate is the single source of truth for relationship invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod relations;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::department::{Department, DepartmentId, DepartmentRef};
pub use model::lecture::{Lecture, LectureId, LectureRef};
pub use model::student::{Student, StudentId, StudentRef};
pub use model::{EntityKind, ValidationError};
pub use repo::{
    DepartmentRepository, LectureRepository, RepoError, RepoResult, SqliteStore,
    StudentRepository, UniversityStore,
};
pub use service::department_service::{CreateDepartmentInput, DepartmentService};
pub use service::lecture_service::{CreateLectureInput, LectureService};
pub use service::student_service::{CreateStudentInput, StudentService};
pub use service::{ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
