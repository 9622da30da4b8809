//! Lecture entity.

use super::department::DepartmentRef;
use super::student::StudentRef;
use super::{normalize_label, EntityKind, Identified, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LectureId = Uuid;

/// Flat lecture view embedded in department and student payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureRef {
    pub id: LectureId,
    pub title: String,
}

impl Identified for LectureRef {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Lecture with enrolled students and offering departments materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: LectureId,
    pub title: String,
    pub students: Vec<StudentRef>,
    pub departments: Vec<DepartmentRef>,
}

impl Lecture {
    pub fn new(title: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), title)
    }

    pub fn with_id(id: LectureId, title: impl AsRef<str>) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            title: normalize_label(EntityKind::Lecture, title.as_ref())?,
            students: Vec::new(),
            departments: Vec::new(),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankLabel(EntityKind::Lecture));
        }
        Ok(())
    }

    pub fn to_ref(&self) -> LectureRef {
        LectureRef {
            id: self.id,
            title: self.title.clone(),
        }
    }

    /// Number of enrolled students; the sort key for the sorted listing.
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn has_student(&self, student_id: Uuid) -> bool {
        self.students.iter().any(|student| student.id == student_id)
    }

    pub fn has_department(&self, department_id: Uuid) -> bool {
        self.departments
            .iter()
            .any(|department| department.id == department_id)
    }
}

impl Identified for Lecture {
    fn id(&self) -> Uuid {
        self.id
    }
}
