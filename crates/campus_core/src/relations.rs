//! Relationship manager for bidirectional associations.
//!
//! # Responsibility
//! - Create and destroy Student↔Department, Student↔Lecture and
//!   Lecture↔Department associations on loaded entities.
//! - Sever every association pointing at an entity before it is removed.
//!
//! # Invariants
//! - Both sides of an association are updated together; a student's
//!   `department_id` and the department's student set never diverge.
//! - Adds are set-inserts keyed by id, removes are set-deletes that are no-ops
//!   when the association is absent. Every operation is safe to repeat.
//! - Functions here never touch the store; callers persist the entities whose
//!   outcome reports a change.

use crate::model::department::{Department, DepartmentId};
use crate::model::lecture::{Lecture, LectureRef};
use crate::model::student::Student;
use crate::model::{insert_unique, remove_by_id};

/// Result of an association add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// At least one side changed.
    Linked,
    /// Association already existed on both sides.
    AlreadyLinked,
    /// Student belongs to another department; first assignment wins.
    AssignedElsewhere(DepartmentId),
}

impl LinkOutcome {
    pub fn changed(self) -> bool {
        matches!(self, Self::Linked)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linked => "linked",
            Self::AlreadyLinked => "already_linked",
            Self::AssignedElsewhere(_) => "assigned_elsewhere",
        }
    }
}

/// Result of an association removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkOutcome {
    Unlinked,
    NotLinked,
}

impl UnlinkOutcome {
    pub fn changed(self) -> bool {
        matches!(self, Self::Unlinked)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unlinked => "unlinked",
            Self::NotLinked => "not_linked",
        }
    }
}

/// Number of sibling entities touched by an `on_delete_*` cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detached {
    pub students: usize,
    pub lectures: usize,
    pub departments: usize,
}

/// Assigns `student` to `department` unless it already has a department.
///
/// Reassignment goes through [`change_student_department`]; here a student
/// owned by another department is left untouched.
pub fn link_student_to_department(
    student: &mut Student,
    department: &mut Department,
) -> LinkOutcome {
    match student.department_id {
        Some(current) if current != department.id => LinkOutcome::AssignedElsewhere(current),
        Some(_) => {
            student.assign_department(department.to_ref());
            insert_unique(&mut department.students, student.to_ref());
            LinkOutcome::AlreadyLinked
        }
        None => {
            student.assign_department(department.to_ref());
            insert_unique(&mut department.students, student.to_ref());
            LinkOutcome::Linked
        }
    }
}

/// Moves `student` into `department` unconditionally.
///
/// Lecture enrollment is department-scoped, so the student's lectures are
/// cleared; the dropped references are returned. `previous` is the
/// department the student is leaving, when the caller has it loaded.
pub fn change_student_department(
    student: &mut Student,
    department: &mut Department,
    previous: Option<&mut Department>,
) -> Vec<LectureRef> {
    if let Some(previous) = previous {
        if previous.id != department.id {
            remove_by_id(&mut previous.students, student.id);
        }
    }

    student.assign_department(department.to_ref());
    // Replace rather than insert: the cached ref may carry the old department id.
    remove_by_id(&mut department.students, student.id);
    department.students.push(student.to_ref());

    std::mem::take(&mut student.lectures)
}

/// Enrolls `student` in `lecture` on both sides.
pub fn link_student_to_lecture(student: &mut Student, lecture: &mut Lecture) -> LinkOutcome {
    let on_student = insert_unique(&mut student.lectures, lecture.to_ref());
    let on_lecture = insert_unique(&mut lecture.students, student.to_ref());
    if on_student || on_lecture {
        LinkOutcome::Linked
    } else {
        LinkOutcome::AlreadyLinked
    }
}

/// Drops the enrollment of `student` in `lecture` on both sides.
pub fn unlink_student_from_lecture(student: &mut Student, lecture: &mut Lecture) -> UnlinkOutcome {
    let on_student = remove_by_id(&mut student.lectures, lecture.id);
    let on_lecture = remove_by_id(&mut lecture.students, student.id);
    if on_student || on_lecture {
        UnlinkOutcome::Unlinked
    } else {
        UnlinkOutcome::NotLinked
    }
}

/// Offers `lecture` in `department` on both sides.
pub fn link_lecture_to_department(
    lecture: &mut Lecture,
    department: &mut Department,
) -> LinkOutcome {
    let on_lecture = insert_unique(&mut lecture.departments, department.to_ref());
    let on_department = insert_unique(&mut department.lectures, lecture.to_ref());
    if on_lecture || on_department {
        LinkOutcome::Linked
    } else {
        LinkOutcome::AlreadyLinked
    }
}

pub fn unlink_lecture_from_department(
    lecture: &mut Lecture,
    department: &mut Department,
) -> UnlinkOutcome {
    let on_lecture = remove_by_id(&mut lecture.departments, department.id);
    let on_department = remove_by_id(&mut department.lectures, lecture.id);
    if on_lecture || on_department {
        UnlinkOutcome::Unlinked
    } else {
        UnlinkOutcome::NotLinked
    }
}

/// Releases every student of `department` and detaches it from its lectures.
///
/// `department` itself is left as loaded so callers can echo it back.
pub fn on_delete_department(
    department: &Department,
    students: &mut [Student],
    lectures: &mut [Lecture],
) -> Detached {
    let mut detached = Detached::default();
    for student in students.iter_mut() {
        if student.department_id == Some(department.id) {
            student.clear_department();
            detached.students += 1;
        }
    }
    for lecture in lectures.iter_mut() {
        if remove_by_id(&mut lecture.departments, department.id) {
            detached.lectures += 1;
        }
    }
    detached
}

/// Removes `lecture` from every enrolled student and offering department.
pub fn on_delete_lecture(
    lecture: &Lecture,
    students: &mut [Student],
    departments: &mut [Department],
) -> Detached {
    let mut detached = Detached::default();
    for student in students.iter_mut() {
        if remove_by_id(&mut student.lectures, lecture.id) {
            detached.students += 1;
        }
    }
    for department in departments.iter_mut() {
        if remove_by_id(&mut department.lectures, lecture.id) {
            detached.departments += 1;
        }
    }
    detached
}

/// Removes `student` from every lecture it attends and, when loaded, from its
/// department's student set.
pub fn on_delete_student(
    student: &Student,
    lectures: &mut [Lecture],
    department: Option<&mut Department>,
) -> Detached {
    let mut detached = Detached::default();
    for lecture in lectures.iter_mut() {
        if remove_by_id(&mut lecture.students, student.id) {
            detached.lectures += 1;
        }
    }
    if let Some(department) = department {
        if remove_by_id(&mut department.students, student.id) {
            detached.departments += 1;
        }
    }
    detached
}

#[cfg(test)]
mod tests {
    use super::*;

    fn department(name: &str) -> Department {
        Department::new(name).unwrap()
    }

    fn student(name: &str) -> Student {
        Student::new(name).unwrap()
    }

    fn lecture(title: &str) -> Lecture {
        Lecture::new(title).unwrap()
    }

    #[test]
    fn link_student_to_department_sets_both_sides_once() {
        let mut cs = department("CS");
        let mut alice = student("Alice");

        assert_eq!(
            link_student_to_department(&mut alice, &mut cs),
            LinkOutcome::Linked
        );
        assert_eq!(
            link_student_to_department(&mut alice, &mut cs),
            LinkOutcome::AlreadyLinked
        );

        assert_eq!(alice.department_id, Some(cs.id));
        assert_eq!(alice.department.as_ref().map(|d| d.id), Some(cs.id));
        assert_eq!(cs.students.len(), 1);
        assert_eq!(cs.students[0].id, alice.id);
        assert_eq!(cs.students[0].department_id, Some(cs.id));
        alice.validate().unwrap();
    }

    #[test]
    fn link_student_to_department_keeps_first_assignment() {
        let mut cs = department("CS");
        let mut math = department("Math");
        let mut alice = student("Alice");
        link_student_to_department(&mut alice, &mut cs);

        let outcome = link_student_to_department(&mut alice, &mut math);

        assert_eq!(outcome, LinkOutcome::AssignedElsewhere(cs.id));
        assert!(!outcome.changed());
        assert_eq!(alice.department_id, Some(cs.id));
        assert!(math.students.is_empty());
    }

    #[test]
    fn change_student_department_moves_student_and_clears_lectures() {
        let mut cs = department("CS");
        let mut math = department("Math");
        let mut alice = student("Alice");
        let mut algorithms = lecture("Algorithms");
        let mut compilers = lecture("Compilers");
        link_student_to_department(&mut alice, &mut cs);
        link_student_to_lecture(&mut alice, &mut algorithms);
        link_student_to_lecture(&mut alice, &mut compilers);

        let dropped = change_student_department(&mut alice, &mut math, Some(&mut cs));

        assert_eq!(dropped.len(), 2);
        assert!(alice.lectures.is_empty());
        assert_eq!(alice.department_id, Some(math.id));
        assert!(cs.students.is_empty());
        assert_eq!(math.students.len(), 1);
        assert_eq!(math.students[0].department_id, Some(math.id));
        alice.validate().unwrap();
    }

    #[test]
    fn change_student_department_to_same_department_does_not_duplicate() {
        let mut cs = department("CS");
        let mut alice = student("Alice");
        link_student_to_department(&mut alice, &mut cs);

        change_student_department(&mut alice, &mut cs, None);

        assert_eq!(cs.students.len(), 1);
    }

    #[test]
    fn student_lecture_link_then_unlink_restores_both_collections() {
        let mut bob = student("Bob");
        let mut algorithms = lecture("Algorithms");
        let bob_before = bob.clone();
        let lecture_before = algorithms.clone();

        assert!(link_student_to_lecture(&mut bob, &mut algorithms).changed());
        assert_eq!(
            link_student_to_lecture(&mut bob, &mut algorithms),
            LinkOutcome::AlreadyLinked
        );
        assert_eq!(bob.lectures.len(), 1);
        assert_eq!(algorithms.students.len(), 1);

        assert_eq!(
            unlink_student_from_lecture(&mut bob, &mut algorithms),
            UnlinkOutcome::Unlinked
        );
        assert_eq!(
            unlink_student_from_lecture(&mut bob, &mut algorithms),
            UnlinkOutcome::NotLinked
        );
        assert_eq!(bob, bob_before);
        assert_eq!(algorithms, lecture_before);
    }

    #[test]
    fn link_student_to_lecture_repairs_one_sided_view() {
        let mut bob = student("Bob");
        let mut algorithms = lecture("Algorithms");
        algorithms.students.push(bob.to_ref());

        assert_eq!(
            link_student_to_lecture(&mut bob, &mut algorithms),
            LinkOutcome::Linked
        );
        assert_eq!(bob.lectures.len(), 1);
        assert_eq!(algorithms.students.len(), 1);
    }

    #[test]
    fn lecture_department_link_is_idempotent_and_reversible() {
        let mut algorithms = lecture("Algorithms");
        let mut cs = department("CS");

        assert!(link_lecture_to_department(&mut algorithms, &mut cs).changed());
        assert!(!link_lecture_to_department(&mut algorithms, &mut cs).changed());
        assert!(algorithms.has_department(cs.id));
        assert!(cs.has_lecture(algorithms.id));
        assert_eq!(cs.lectures.len(), 1);

        assert!(unlink_lecture_from_department(&mut algorithms, &mut cs).changed());
        assert!(!unlink_lecture_from_department(&mut algorithms, &mut cs).changed());
        assert!(algorithms.departments.is_empty());
        assert!(cs.lectures.is_empty());
    }

    #[test]
    fn on_delete_department_releases_students_and_lectures() {
        let mut cs = department("CS");
        let mut students: Vec<Student> = (0..3).map(|i| student(&format!("s{i}"))).collect();
        let mut outsider = student("outsider");
        let mut other = department("Other");
        link_student_to_department(&mut outsider, &mut other);
        for s in students.iter_mut() {
            link_student_to_department(s, &mut cs);
        }
        let mut algorithms = lecture("Algorithms");
        link_lecture_to_department(&mut algorithms, &mut cs);
        students.push(outsider);
        let mut lectures = vec![algorithms];

        let detached = on_delete_department(&cs, &mut students, &mut lectures);

        assert_eq!(detached.students, 3);
        assert_eq!(detached.lectures, 1);
        for s in &students[..3] {
            assert_eq!(s.department_id, None);
            assert!(s.department.is_none());
        }
        assert_eq!(students[3].department_id, Some(other.id));
        assert!(lectures[0].departments.is_empty());
        assert_eq!(cs.students.len(), 3);
    }

    #[test]
    fn on_delete_lecture_removes_it_everywhere() {
        let mut algorithms = lecture("Algorithms");
        let mut bob = student("Bob");
        let mut cs = department("CS");
        link_student_to_lecture(&mut bob, &mut algorithms);
        link_lecture_to_department(&mut algorithms, &mut cs);
        let mut students = vec![bob];
        let mut departments = vec![cs];

        let detached = on_delete_lecture(&algorithms, &mut students, &mut departments);

        assert_eq!(detached.students, 1);
        assert_eq!(detached.departments, 1);
        assert!(students[0].lectures.is_empty());
        assert!(departments[0].lectures.is_empty());
    }

    #[test]
    fn on_delete_student_removes_it_from_lectures_and_department() {
        let mut bob = student("Bob");
        let mut cs = department("CS");
        let mut algorithms = lecture("Algorithms");
        link_student_to_department(&mut bob, &mut cs);
        link_student_to_lecture(&mut bob, &mut algorithms);
        let mut lectures = vec![algorithms];

        let detached = on_delete_student(&bob, &mut lectures, Some(&mut cs));

        assert_eq!(detached.lectures, 1);
        assert_eq!(detached.departments, 1);
        assert!(lectures[0].students.is_empty());
        assert!(cs.students.is_empty());
    }
}
