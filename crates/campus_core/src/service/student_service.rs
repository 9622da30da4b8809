//! Student use-case service.
//!
//! # Invariants
//! - Changing department always clears the student's lecture enrollment.
//! - Removing an enrollment that does not exist returns the student as is.

use super::{reload_student, require_department, require_lecture, require_student, ServiceResult};
use crate::model::department::DepartmentId;
use crate::model::lecture::LectureId;
use crate::model::student::{Student, StudentId};
use crate::model::{normalize_label, EntityKind};
use crate::relations;
use crate::repo::UniversityStore;
use log::info;
use serde::Deserialize;

/// Input for student creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentInput {
    #[serde(default)]
    pub name: String,
    /// Department to join; skipped when unknown.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    /// Lectures to enroll in; unknown ids are skipped.
    #[serde(default)]
    pub lecture_ids: Vec<LectureId>,
}

/// Student service facade over a store implementation.
pub struct StudentService<S: UniversityStore> {
    store: S,
}

impl<S: UniversityStore> StudentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a student, best-effort joining a department and lectures.
    pub fn create_student(&self, input: CreateStudentInput) -> ServiceResult<Student> {
        let student = Student::new(&input.name)?;
        self.store.in_transaction(|store| -> ServiceResult<Student> {
            let mut student = student;
            store.insert_student(&student)?;

            let mut changed = false;
            if let Some(department_id) = input.department_id {
                if let Some(mut department) = store.get_department(department_id)? {
                    changed |=
                        relations::link_student_to_department(&mut student, &mut department)
                            .changed();
                }
            }
            for lecture_id in &input.lecture_ids {
                if let Some(mut lecture) = store.get_lecture(*lecture_id)? {
                    changed |= relations::link_student_to_lecture(&mut student, &mut lecture)
                        .changed();
                }
            }
            if changed {
                store.save_student(&student)?;
            }

            info!(
                "event=student_create module=service status=ok student_id={} department_id={} lectures={}",
                student.id,
                student
                    .department_id
                    .map_or_else(|| "none".to_string(), |id| id.to_string()),
                student.lectures.len()
            );
            reload_student(store, student.id)
        })
    }

    pub fn list_students(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.store.list_students()?)
    }

    pub fn get_student(&self, id: StudentId) -> ServiceResult<Option<Student>> {
        Ok(self.store.get_student(id)?)
    }

    pub fn find_student_by_name(&self, name: &str) -> ServiceResult<Option<Student>> {
        match normalize_label(EntityKind::Student, name) {
            Ok(normalized) => Ok(self.store.find_student_by_name(&normalized)?),
            Err(_) => Ok(None),
        }
    }

    /// Moves the student to another department and drops all lectures.
    pub fn change_student_department(
        &self,
        student_id: StudentId,
        new_department_id: DepartmentId,
    ) -> ServiceResult<Student> {
        self.store.in_transaction(|store| -> ServiceResult<Student> {
            let mut student = require_student(store, student_id)?;
            let mut department = require_department(store, new_department_id)?;
            let previous_department_id = student.department_id;

            let dropped =
                relations::change_student_department(&mut student, &mut department, None);
            store.save_student(&student)?;

            info!(
                "event=student_change_department module=service status=ok student_id={} from_department_id={} to_department_id={} dropped_lectures={}",
                student_id,
                previous_department_id.map_or_else(|| "none".to_string(), |id| id.to_string()),
                new_department_id,
                dropped.len()
            );
            reload_student(store, student_id)
        })
    }

    pub fn add_lecture_to_student(
        &self,
        student_id: StudentId,
        lecture_id: LectureId,
    ) -> ServiceResult<Student> {
        self.store.in_transaction(|store| -> ServiceResult<Student> {
            let mut student = require_student(store, student_id)?;
            let mut lecture = require_lecture(store, lecture_id)?;

            let outcome = relations::link_student_to_lecture(&mut student, &mut lecture);
            if outcome.changed() {
                store.save_student(&student)?;
            }
            info!(
                "event=student_add_lecture module=service status=ok student_id={} lecture_id={} outcome={}",
                student_id,
                lecture_id,
                outcome.as_str()
            );
            reload_student(store, student_id)
        })
    }

    /// Drops an enrollment; unknown lectures and absent links are a no-op.
    pub fn remove_lecture_from_student(
        &self,
        student_id: StudentId,
        lecture_id: LectureId,
    ) -> ServiceResult<Student> {
        self.store.in_transaction(|store| -> ServiceResult<Student> {
            let mut student = require_student(store, student_id)?;
            let Some(mut lecture) = store.get_lecture(lecture_id)? else {
                return Ok(student);
            };

            let outcome = relations::unlink_student_from_lecture(&mut student, &mut lecture);
            if outcome.changed() {
                store.save_student(&student)?;
            }
            info!(
                "event=student_remove_lecture module=service status=ok student_id={} lecture_id={} outcome={}",
                student_id,
                lecture_id,
                outcome.as_str()
            );
            reload_student(store, student_id)
        })
    }

    pub fn rename_student(&self, student_id: StudentId, name: &str) -> ServiceResult<Student> {
        let name = normalize_label(EntityKind::Student, name)?;
        self.store.in_transaction(|store| -> ServiceResult<Student> {
            let mut student = require_student(store, student_id)?;
            student.name = name;
            store.save_student(&student)?;
            info!(
                "event=student_rename module=service status=ok student_id={}",
                student_id
            );
            reload_student(store, student_id)
        })
    }

    /// Deletes a student after removing it from every lecture.
    ///
    /// Returns the student as it was immediately before removal.
    pub fn delete_student(&self, student_id: StudentId) -> ServiceResult<Student> {
        self.store.in_transaction(|store| -> ServiceResult<Student> {
            let student = require_student(store, student_id)?;
            let mut lectures = student
                .lectures
                .iter()
                .map(|lecture| require_lecture(store, lecture.id))
                .collect::<ServiceResult<Vec<_>>>()?;

            // The department side is the student row's own foreign key.
            let detached = relations::on_delete_student(&student, &mut lectures, None);
            for lecture in &lectures {
                store.save_lecture(lecture)?;
            }
            store.delete_student(student_id)?;

            info!(
                "event=student_delete module=service status=ok student_id={} lectures={}",
                student_id, detached.lectures
            );
            Ok(student)
        })
    }
}
