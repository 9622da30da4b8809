mod common;

use campus_core::db::open_db_in_memory;
use campus_core::{CreateStudentInput, EntityKind, ServiceError};
use common::{department_input, lecture_input, services, student_input};
use uuid::Uuid;

#[test]
fn create_student_with_department_and_lectures() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let math = svc
        .departments
        .create_department(department_input("Math"))
        .unwrap();
    let algebra = svc.lectures.create_lecture(lecture_input("Algebra")).unwrap();
    let topology = svc
        .lectures
        .create_lecture(lecture_input("Topology"))
        .unwrap();

    let alice = svc
        .students
        .create_student(CreateStudentInput {
            name: "Alice".to_string(),
            department_id: Some(math.id),
            lecture_ids: vec![topology.id, Uuid::new_v4(), algebra.id],
        })
        .unwrap();

    assert_eq!(alice.department_id, Some(math.id));
    assert_eq!(alice.department.as_ref().unwrap().name, "Math");
    assert_eq!(alice.lectures, vec![algebra.to_ref(), topology.to_ref()]);

    let algebra = svc.lectures.get_lecture(algebra.id).unwrap().unwrap();
    assert_eq!(algebra.students, vec![alice.to_ref()]);
}

#[test]
fn create_student_skips_unknown_department() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);

    let bob = svc
        .students
        .create_student(CreateStudentInput {
            name: "Bob".to_string(),
            department_id: Some(Uuid::new_v4()),
            lecture_ids: Vec::new(),
        })
        .unwrap();

    assert_eq!(bob.department_id, None);
    assert!(bob.department.is_none());
}

#[test]
fn create_student_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);

    let err = svc.students.create_student(student_input("")).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(svc.students.list_students().unwrap().is_empty());
}

#[test]
fn find_student_by_name_uses_normalized_exact_match() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let alice = svc
        .students
        .create_student(student_input("Alice  Smith"))
        .unwrap();

    let found = svc
        .students
        .find_student_by_name(" Alice Smith ")
        .unwrap()
        .unwrap();
    assert_eq!(found.id, alice.id);
    assert!(svc.students.find_student_by_name("Alice").unwrap().is_none());
}

#[test]
fn change_department_moves_student_and_clears_lectures() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let cs = svc.departments.create_department(department_input("CS")).unwrap();
    let math = svc
        .departments
        .create_department(department_input("Math"))
        .unwrap();
    let compilers = svc
        .lectures
        .create_lecture(lecture_input("Compilers"))
        .unwrap();
    let networks = svc
        .lectures
        .create_lecture(lecture_input("Networks"))
        .unwrap();
    let alice = svc
        .students
        .create_student(CreateStudentInput {
            name: "Alice".to_string(),
            department_id: Some(cs.id),
            lecture_ids: vec![compilers.id, networks.id],
        })
        .unwrap();
    assert_eq!(alice.lectures.len(), 2);

    let alice = svc
        .students
        .change_student_department(alice.id, math.id)
        .unwrap();

    assert_eq!(alice.department_id, Some(math.id));
    assert!(alice.lectures.is_empty());

    let cs = svc.departments.get_department(cs.id).unwrap().unwrap();
    assert!(cs.students.is_empty());
    let math = svc.departments.get_department(math.id).unwrap().unwrap();
    assert_eq!(math.students, vec![alice.to_ref()]);
    for lecture_id in [compilers.id, networks.id] {
        let lecture = svc.lectures.get_lecture(lecture_id).unwrap().unwrap();
        assert!(lecture.students.is_empty());
    }
}

#[test]
fn change_department_to_unknown_department_fails_without_side_effects() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let compilers = svc
        .lectures
        .create_lecture(lecture_input("Compilers"))
        .unwrap();
    let alice = svc
        .students
        .create_student(CreateStudentInput {
            name: "Alice".to_string(),
            department_id: None,
            lecture_ids: vec![compilers.id],
        })
        .unwrap();

    let err = svc
        .students
        .change_student_department(alice.id, Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Department,
            ..
        }
    ));

    let alice = svc.students.get_student(alice.id).unwrap().unwrap();
    assert_eq!(alice.lectures.len(), 1);
}

#[test]
fn add_and_remove_lecture_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let bob = svc.students.create_student(student_input("Bob")).unwrap();
    let logic = svc.lectures.create_lecture(lecture_input("Logic")).unwrap();

    let enrolled = svc.students.add_lecture_to_student(bob.id, logic.id).unwrap();
    assert_eq!(enrolled.lectures, vec![logic.to_ref()]);
    let enrolled_again = svc.students.add_lecture_to_student(bob.id, logic.id).unwrap();
    assert_eq!(enrolled_again.lectures.len(), 1);

    let released = svc
        .students
        .remove_lecture_from_student(bob.id, logic.id)
        .unwrap();
    assert_eq!(released, bob);

    let logic_after = svc.lectures.get_lecture(logic.id).unwrap().unwrap();
    assert_eq!(logic_after, logic);
}

#[test]
fn remove_unknown_lecture_returns_current_student() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let bob = svc.students.create_student(student_input("Bob")).unwrap();

    let same = svc
        .students
        .remove_lecture_from_student(bob.id, Uuid::new_v4())
        .unwrap();
    assert_eq!(same, bob);

    let err = svc
        .students
        .remove_lecture_from_student(Uuid::new_v4(), Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Student,
            ..
        }
    ));
}

#[test]
fn add_unknown_lecture_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let bob = svc.students.create_student(student_input("Bob")).unwrap();

    let err = svc
        .students
        .add_lecture_to_student(bob.id, Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Lecture,
            ..
        }
    ));
}

#[test]
fn rename_student_updates_reference_views() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let logic = svc.lectures.create_lecture(lecture_input("Logic")).unwrap();
    let bob = svc
        .students
        .create_student(CreateStudentInput {
            name: "Bob".to_string(),
            department_id: None,
            lecture_ids: vec![logic.id],
        })
        .unwrap();

    let renamed = svc.students.rename_student(bob.id, "Robert").unwrap();
    assert_eq!(renamed.name, "Robert");
    assert_eq!(renamed.lectures, vec![logic.to_ref()]);

    let logic = svc.lectures.get_lecture(logic.id).unwrap().unwrap();
    assert_eq!(logic.students[0].name, "Robert");
}

#[test]
fn delete_student_leaves_no_enrollment_behind() {
    let conn = open_db_in_memory().unwrap();
    let svc = services(&conn);
    let cs = svc.departments.create_department(department_input("CS")).unwrap();
    let logic = svc.lectures.create_lecture(lecture_input("Logic")).unwrap();
    let bob = svc
        .students
        .create_student(CreateStudentInput {
            name: "Bob".to_string(),
            department_id: Some(cs.id),
            lecture_ids: vec![logic.id],
        })
        .unwrap();

    let deleted = svc.students.delete_student(bob.id).unwrap();
    assert_eq!(deleted, bob);

    assert!(svc.students.get_student(bob.id).unwrap().is_none());
    let logic = svc.lectures.get_lecture(logic.id).unwrap().unwrap();
    assert!(logic.students.is_empty());
    let cs = svc.departments.get_department(cs.id).unwrap().unwrap();
    assert!(cs.students.is_empty());
}
