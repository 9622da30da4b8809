//! Department use-case service.
//!
//! # Invariants
//! - Deleting a department releases its students and detaches its lectures
//!   in the same transaction as the row removal.
//! - Adding a student already owned by another department leaves both
//!   departments unchanged.

use super::{
    reload_department, require_department, require_lecture, require_student, ServiceResult,
};
use crate::model::department::{Department, DepartmentId};
use crate::model::lecture::{LectureId, LectureRef};
use crate::model::student::{StudentId, StudentRef};
use crate::model::{normalize_label, EntityKind};
use crate::relations::{self, LinkOutcome};
use crate::repo::UniversityStore;
use log::info;
use serde::Deserialize;

/// Input for department creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentInput {
    /// Missing in a request body reads as blank and fails validation.
    #[serde(default)]
    pub name: String,
    /// Students to attach; unknown ids are skipped.
    #[serde(default)]
    pub student_ids: Vec<StudentId>,
    /// Lectures to attach; unknown ids are skipped.
    #[serde(default)]
    pub lecture_ids: Vec<LectureId>,
}

/// Department service facade over a store implementation.
pub struct DepartmentService<S: UniversityStore> {
    store: S,
}

impl<S: UniversityStore> DepartmentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a department and best-effort attaches existing students and
    /// lectures.
    pub fn create_department(&self, input: CreateDepartmentInput) -> ServiceResult<Department> {
        let department = Department::new(&input.name)?;
        self.store
            .in_transaction(|store| -> ServiceResult<Department> {
                let mut department = department;
                store.insert_department(&department)?;

                let mut attached_students = 0usize;
                for student_id in &input.student_ids {
                    let Some(mut student) = store.get_student(*student_id)? else {
                        continue;
                    };
                    if relations::link_student_to_department(&mut student, &mut department)
                        .changed()
                    {
                        store.save_student(&student)?;
                        attached_students += 1;
                    }
                }

                let mut attached_lectures = 0usize;
                for lecture_id in &input.lecture_ids {
                    let Some(mut lecture) = store.get_lecture(*lecture_id)? else {
                        continue;
                    };
                    if relations::link_lecture_to_department(&mut lecture, &mut department)
                        .changed()
                    {
                        store.save_lecture(&lecture)?;
                        attached_lectures += 1;
                    }
                }

                info!(
                    "event=department_create module=service status=ok department_id={} students={} lectures={} requested={}",
                    department.id,
                    attached_students,
                    attached_lectures,
                    input.student_ids.len() + input.lecture_ids.len()
                );
                reload_department(store, department.id)
            })
    }

    /// Lists all departments with both relation directions loaded.
    pub fn list_departments(&self) -> ServiceResult<Vec<Department>> {
        Ok(self.store.list_departments()?)
    }

    pub fn get_department(&self, id: DepartmentId) -> ServiceResult<Option<Department>> {
        Ok(self.store.get_department(id)?)
    }

    /// Finds a department by exact (whitespace-normalized) name.
    pub fn find_department_by_name(&self, name: &str) -> ServiceResult<Option<Department>> {
        match normalize_label(EntityKind::Department, name) {
            Ok(normalized) => Ok(self.store.find_department_by_name(&normalized)?),
            Err(_) => Ok(None),
        }
    }

    /// Returns `None` when the department does not exist.
    pub fn list_students_in_department(
        &self,
        id: DepartmentId,
    ) -> ServiceResult<Option<Vec<StudentRef>>> {
        Ok(self
            .store
            .get_department(id)?
            .map(|department| department.students))
    }

    /// Returns `None` when the department does not exist.
    pub fn list_lectures_in_department(
        &self,
        id: DepartmentId,
    ) -> ServiceResult<Option<Vec<LectureRef>>> {
        Ok(self
            .store
            .get_department(id)?
            .map(|department| department.lectures))
    }

    /// Assigns a student to the department; first assignment wins.
    pub fn add_student_to_department(
        &self,
        department_id: DepartmentId,
        student_id: StudentId,
    ) -> ServiceResult<Department> {
        self.store
            .in_transaction(|store| -> ServiceResult<Department> {
                let mut department = require_department(store, department_id)?;
                let mut student = require_student(store, student_id)?;

                let outcome = relations::link_student_to_department(&mut student, &mut department);
                if outcome.changed() {
                    store.save_student(&student)?;
                }
                if let LinkOutcome::AssignedElsewhere(current) = outcome {
                    info!(
                        "event=department_add_student module=service status=skipped department_id={} student_id={} current_department_id={}",
                        department_id, student_id, current
                    );
                } else {
                    info!(
                        "event=department_add_student module=service status=ok department_id={} student_id={} outcome={}",
                        department_id,
                        student_id,
                        outcome.as_str()
                    );
                }
                reload_department(store, department_id)
            })
    }

    /// Offers a lecture in the department.
    pub fn add_lecture_to_department(
        &self,
        department_id: DepartmentId,
        lecture_id: LectureId,
    ) -> ServiceResult<Department> {
        self.store
            .in_transaction(|store| -> ServiceResult<Department> {
                let mut department = require_department(store, department_id)?;
                let mut lecture = require_lecture(store, lecture_id)?;

                let outcome = relations::link_lecture_to_department(&mut lecture, &mut department);
                if outcome.changed() {
                    store.save_department(&department)?;
                }
                info!(
                    "event=department_add_lecture module=service status=ok department_id={} lecture_id={} outcome={}",
                    department_id,
                    lecture_id,
                    outcome.as_str()
                );
                reload_department(store, department_id)
            })
    }

    /// Withdraws a lecture from the department; absent links are a no-op.
    pub fn remove_lecture_from_department(
        &self,
        department_id: DepartmentId,
        lecture_id: LectureId,
    ) -> ServiceResult<Department> {
        self.store
            .in_transaction(|store| -> ServiceResult<Department> {
                let mut department = require_department(store, department_id)?;
                let Some(mut lecture) = store.get_lecture(lecture_id)? else {
                    return Ok(department);
                };

                let outcome =
                    relations::unlink_lecture_from_department(&mut lecture, &mut department);
                if outcome.changed() {
                    store.save_department(&department)?;
                }
                info!(
                    "event=department_remove_lecture module=service status=ok department_id={} lecture_id={} outcome={}",
                    department_id,
                    lecture_id,
                    outcome.as_str()
                );
                reload_department(store, department_id)
            })
    }

    pub fn rename_department(
        &self,
        department_id: DepartmentId,
        name: &str,
    ) -> ServiceResult<Department> {
        let name = normalize_label(EntityKind::Department, name)?;
        self.store
            .in_transaction(|store| -> ServiceResult<Department> {
                let mut department = require_department(store, department_id)?;
                department.name = name;
                store.save_department(&department)?;
                info!(
                    "event=department_rename module=service status=ok department_id={}",
                    department_id
                );
                reload_department(store, department_id)
            })
    }

    /// Deletes a department after severing every association to it.
    ///
    /// Returns the department as it was immediately before removal.
    pub fn delete_department(&self, department_id: DepartmentId) -> ServiceResult<Department> {
        self.store
            .in_transaction(|store| -> ServiceResult<Department> {
                let department = require_department(store, department_id)?;
                let mut students = department
                    .students
                    .iter()
                    .map(|student| require_student(store, student.id))
                    .collect::<ServiceResult<Vec<_>>>()?;
                let mut lectures = department
                    .lectures
                    .iter()
                    .map(|lecture| require_lecture(store, lecture.id))
                    .collect::<ServiceResult<Vec<_>>>()?;

                let detached =
                    relations::on_delete_department(&department, &mut students, &mut lectures);
                for student in &students {
                    store.save_student(student)?;
                }
                for lecture in &lectures {
                    store.save_lecture(lecture)?;
                }
                store.delete_department(department_id)?;

                info!(
                    "event=department_delete module=service status=ok department_id={} students={} lectures={}",
                    department_id, detached.students, detached.lectures
                );
                Ok(department)
            })
    }
}
