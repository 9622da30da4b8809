use campus_core::relations::{link_student_to_department, link_student_to_lecture};
use campus_core::{CreateStudentInput, Department, Lecture, Student};
use serde_json::json;
use uuid::Uuid;

#[test]
fn student_view_serializes_relations_one_level_deep() {
    let mut cs = Department::new("CS").unwrap();
    let mut alice = Student::new("Alice").unwrap();
    let mut logic = Lecture::new("Logic").unwrap();
    link_student_to_department(&mut alice, &mut cs);
    link_student_to_lecture(&mut alice, &mut logic);

    let value = serde_json::to_value(&alice).unwrap();
    assert_eq!(
        value,
        json!({
            "id": alice.id,
            "name": "Alice",
            "departmentId": cs.id,
            "department": { "id": cs.id, "name": "CS" },
            "lectures": [{ "id": logic.id, "title": "Logic" }],
        })
    );

    let value = serde_json::to_value(&logic).unwrap();
    assert_eq!(
        value["students"],
        json!([{ "id": alice.id, "name": "Alice", "departmentId": cs.id }])
    );
    assert!(cs.has_student(alice.id));
    assert!(logic.has_student(alice.id));
}

#[test]
fn create_input_reads_camel_case_and_defaults_missing_fields() {
    let department_id = Uuid::new_v4();
    let input: CreateStudentInput =
        serde_json::from_value(json!({ "name": "Bob", "departmentId": department_id })).unwrap();
    assert_eq!(input.name, "Bob");
    assert_eq!(input.department_id, Some(department_id));
    assert!(input.lecture_ids.is_empty());

    let input: CreateStudentInput = serde_json::from_value(json!({})).unwrap();
    assert_eq!(input, CreateStudentInput::default());
}
