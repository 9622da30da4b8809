#![allow(dead_code)]

use campus_core::{
    CreateDepartmentInput, CreateLectureInput, CreateStudentInput, DepartmentService,
    LectureService, SqliteStore, StudentService,
};
use rusqlite::Connection;

pub struct Services<'conn> {
    pub departments: DepartmentService<SqliteStore<'conn>>,
    pub students: StudentService<SqliteStore<'conn>>,
    pub lectures: LectureService<SqliteStore<'conn>>,
}

pub fn services(conn: &Connection) -> Services<'_> {
    let store = SqliteStore::try_new(conn).unwrap();
    Services {
        departments: DepartmentService::new(store),
        students: StudentService::new(store),
        lectures: LectureService::new(store),
    }
}

pub fn department_input(name: &str) -> CreateDepartmentInput {
    CreateDepartmentInput {
        name: name.to_string(),
        ..CreateDepartmentInput::default()
    }
}

pub fn student_input(name: &str) -> CreateStudentInput {
    CreateStudentInput {
        name: name.to_string(),
        ..CreateStudentInput::default()
    }
}

pub fn lecture_input(title: &str) -> CreateLectureInput {
    CreateLectureInput {
        title: title.to_string(),
        ..CreateLectureInput::default()
    }
}
