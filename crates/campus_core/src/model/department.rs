//! Department entity.
//!
//! # Invariants
//! - `students` lists exactly the students whose `department_id` equals `id`
//!   at load time.
//! - `lectures` mirrors the lecture side of the lecture/department join.

use super::lecture::LectureRef;
use super::student::StudentRef;
use super::{normalize_label, EntityKind, Identified, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DepartmentId = Uuid;

/// Flat department view embedded in student and lecture payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRef {
    pub id: DepartmentId,
    pub name: String,
}

impl Identified for DepartmentRef {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Department with both relation directions materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub students: Vec<StudentRef>,
    pub lectures: Vec<LectureRef>,
}

impl Department {
    /// Creates an empty department with a generated id.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates an empty department with a caller-provided id.
    pub fn with_id(id: DepartmentId, name: impl AsRef<str>) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: normalize_label(EntityKind::Department, name.as_ref())?,
            students: Vec::new(),
            lectures: Vec::new(),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankLabel(EntityKind::Department));
        }
        Ok(())
    }

    pub fn to_ref(&self) -> DepartmentRef {
        DepartmentRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn has_student(&self, student_id: Uuid) -> bool {
        self.students.iter().any(|student| student.id == student_id)
    }

    pub fn has_lecture(&self, lecture_id: Uuid) -> bool {
        self.lectures.iter().any(|lecture| lecture.id == lecture_id)
    }
}

impl Identified for Department {
    fn id(&self) -> Uuid {
        self.id
    }
}
