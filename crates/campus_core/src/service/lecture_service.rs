//! Lecture use-case service.

use super::{
    reload_lecture, require_department, require_lecture, require_student, ServiceResult,
};
use crate::model::department::DepartmentId;
use crate::model::lecture::{Lecture, LectureId};
use crate::model::student::StudentId;
use crate::model::{normalize_label, EntityKind};
use crate::relations;
use crate::repo::UniversityStore;
use log::info;
use serde::Deserialize;

/// Input for lecture creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLectureInput {
    #[serde(default)]
    pub title: String,
    /// Students to enroll; unknown ids are skipped.
    #[serde(default)]
    pub student_ids: Vec<StudentId>,
    /// Offering departments; unknown ids are skipped.
    #[serde(default)]
    pub department_ids: Vec<DepartmentId>,
}

/// Lecture service facade over a store implementation.
pub struct LectureService<S: UniversityStore> {
    store: S,
}

impl<S: UniversityStore> LectureService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a lecture and best-effort attaches students and departments.
    pub fn create_lecture(&self, input: CreateLectureInput) -> ServiceResult<Lecture> {
        let lecture = Lecture::new(&input.title)?;
        self.store.in_transaction(|store| -> ServiceResult<Lecture> {
            let mut lecture = lecture;
            store.insert_lecture(&lecture)?;

            let mut changed = false;
            for student_id in &input.student_ids {
                if let Some(mut student) = store.get_student(*student_id)? {
                    changed |=
                        relations::link_student_to_lecture(&mut student, &mut lecture).changed();
                }
            }
            for department_id in &input.department_ids {
                if let Some(mut department) = store.get_department(*department_id)? {
                    changed |= relations::link_lecture_to_department(&mut lecture, &mut department)
                        .changed();
                }
            }
            if changed {
                store.save_lecture(&lecture)?;
            }

            info!(
                "event=lecture_create module=service status=ok lecture_id={} students={} departments={}",
                lecture.id,
                lecture.students.len(),
                lecture.departments.len()
            );
            reload_lecture(store, lecture.id)
        })
    }

    pub fn list_lectures(&self) -> ServiceResult<Vec<Lecture>> {
        Ok(self.store.list_lectures()?)
    }

    /// Lists lectures in non-decreasing order of enrolled-student count.
    ///
    /// Ties keep the title order of [`Self::list_lectures`].
    pub fn list_lectures_sorted_by_student_count(&self) -> ServiceResult<Vec<Lecture>> {
        let mut lectures = self.store.list_lectures()?;
        lectures.sort_by_key(Lecture::student_count);
        Ok(lectures)
    }

    pub fn get_lecture(&self, id: LectureId) -> ServiceResult<Option<Lecture>> {
        Ok(self.store.get_lecture(id)?)
    }

    pub fn find_lecture_by_title(&self, title: &str) -> ServiceResult<Option<Lecture>> {
        match normalize_label(EntityKind::Lecture, title) {
            Ok(normalized) => Ok(self.store.find_lecture_by_title(&normalized)?),
            Err(_) => Ok(None),
        }
    }

    pub fn add_student_to_lecture(
        &self,
        lecture_id: LectureId,
        student_id: StudentId,
    ) -> ServiceResult<Lecture> {
        self.store.in_transaction(|store| -> ServiceResult<Lecture> {
            let mut lecture = require_lecture(store, lecture_id)?;
            let mut student = require_student(store, student_id)?;

            let outcome = relations::link_student_to_lecture(&mut student, &mut lecture);
            if outcome.changed() {
                store.save_lecture(&lecture)?;
            }
            info!(
                "event=lecture_add_student module=service status=ok lecture_id={} student_id={} outcome={}",
                lecture_id,
                student_id,
                outcome.as_str()
            );
            reload_lecture(store, lecture_id)
        })
    }

    /// Drops an enrollment; unknown students and absent links are a no-op.
    pub fn remove_student_from_lecture(
        &self,
        lecture_id: LectureId,
        student_id: StudentId,
    ) -> ServiceResult<Lecture> {
        self.store.in_transaction(|store| -> ServiceResult<Lecture> {
            let mut lecture = require_lecture(store, lecture_id)?;
            let Some(mut student) = store.get_student(student_id)? else {
                return Ok(lecture);
            };

            let outcome = relations::unlink_student_from_lecture(&mut student, &mut lecture);
            if outcome.changed() {
                store.save_lecture(&lecture)?;
            }
            info!(
                "event=lecture_remove_student module=service status=ok lecture_id={} student_id={} outcome={}",
                lecture_id,
                student_id,
                outcome.as_str()
            );
            reload_lecture(store, lecture_id)
        })
    }

    pub fn rename_lecture(&self, lecture_id: LectureId, title: &str) -> ServiceResult<Lecture> {
        let title = normalize_label(EntityKind::Lecture, title)?;
        self.store.in_transaction(|store| -> ServiceResult<Lecture> {
            let mut lecture = require_lecture(store, lecture_id)?;
            lecture.title = title;
            store.save_lecture(&lecture)?;
            info!(
                "event=lecture_rename module=service status=ok lecture_id={}",
                lecture_id
            );
            reload_lecture(store, lecture_id)
        })
    }

    /// Deletes a lecture after removing it from every student and department.
    ///
    /// Returns the lecture as it was immediately before removal.
    pub fn delete_lecture(&self, lecture_id: LectureId) -> ServiceResult<Lecture> {
        self.store.in_transaction(|store| -> ServiceResult<Lecture> {
            let lecture = require_lecture(store, lecture_id)?;
            let mut students = lecture
                .students
                .iter()
                .map(|student| require_student(store, student.id))
                .collect::<ServiceResult<Vec<_>>>()?;
            let mut departments = lecture
                .departments
                .iter()
                .map(|department| require_department(store, department.id))
                .collect::<ServiceResult<Vec<_>>>()?;

            let detached = relations::on_delete_lecture(&lecture, &mut students, &mut departments);
            for student in &students {
                store.save_student(student)?;
            }
            for department in &departments {
                store.save_department(department)?;
            }
            store.delete_lecture(lecture_id)?;

            info!(
                "event=lecture_delete module=service status=ok lecture_id={} students={} departments={}",
                lecture_id, detached.students, detached.departments
            );
            Ok(lecture)
        })
    }
}
