//! Student entity.
//!
//! # Invariants
//! - `department` is `Some` exactly when `department_id` is `Some`, and both
//!   carry the same id.
//! - `lectures` mirrors the lecture side of the student/lecture join.

use super::department::{DepartmentId, DepartmentRef};
use super::lecture::LectureRef;
use super::{normalize_label, EntityKind, Identified, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type StudentId = Uuid;

/// Flat student view embedded in department and lecture payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub id: StudentId,
    pub name: String,
    pub department_id: Option<DepartmentId>,
}

impl Identified for StudentRef {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Student with department and lecture relations materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Foreign key to the owning department.
    pub department_id: Option<DepartmentId>,
    /// Denormalized view of `department_id`.
    pub department: Option<DepartmentRef>,
    pub lectures: Vec<LectureRef>,
}

impl Student {
    /// Creates an unassigned student with a generated id.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: StudentId, name: impl AsRef<str>) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: normalize_label(EntityKind::Student, name.as_ref())?,
            department_id: None,
            department: None,
            lectures: Vec::new(),
        })
    }

    /// Checks the label and the foreign-key/reference agreement.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankLabel(EntityKind::Student));
        }
        let reference_id = self.department.as_ref().map(|department| department.id);
        if reference_id != self.department_id {
            return Err(ValidationError::DepartmentMismatch {
                department_id: self.department_id,
                reference_id,
            });
        }
        Ok(())
    }

    pub fn to_ref(&self) -> StudentRef {
        StudentRef {
            id: self.id,
            name: self.name.clone(),
            department_id: self.department_id,
        }
    }

    pub fn has_lecture(&self, lecture_id: Uuid) -> bool {
        self.lectures.iter().any(|lecture| lecture.id == lecture_id)
    }

    /// Points both the foreign key and the reference at `department`.
    pub(crate) fn assign_department(&mut self, department: DepartmentRef) {
        self.department_id = Some(department.id);
        self.department = Some(department);
    }

    pub(crate) fn clear_department(&mut self) {
        self.department_id = None;
        self.department = None;
    }
}

impl Identified for Student {
    fn id(&self) -> Uuid {
        self.id
    }
}
