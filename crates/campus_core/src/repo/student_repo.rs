//! Student repository contract and SQLite implementation.
//!
//! # Invariants
//! - `students.department_id` is the only persisted Student–Department link.
//! - Saving a student replaces all of its `student_lectures` rows.

use super::store::{parse_optional_uuid, parse_uuid, query_lecture_refs, SqliteStore};
use super::{RepoError, RepoResult};
use crate::model::department::DepartmentRef;
use crate::model::student::{Student, StudentId};
use crate::model::EntityKind;
use rusqlite::{params, Connection, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    s.id,
    s.name,
    s.department_id,
    d.name AS department_name
FROM students s
LEFT JOIN departments d ON d.id = s.department_id";

const STUDENT_LECTURES_SQL: &str = "SELECT l.id, l.title
    FROM student_lectures sl
    INNER JOIN lectures l ON l.id = sl.lecture_id
    WHERE sl.student_id = ?1
    ORDER BY l.title COLLATE NOCASE ASC, l.id ASC;";

/// Repository interface for students.
pub trait StudentRepository {
    /// Inserts the student row and its lecture enrollments.
    fn insert_student(&self, student: &Student) -> RepoResult<()>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn find_student_by_name(&self, name: &str) -> RepoResult<Option<Student>>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// Writes name and department, and replaces lecture enrollments.
    fn save_student(&self, student: &Student) -> RepoResult<()>;
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
}

impl StudentRepository for SqliteStore<'_> {
    fn insert_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;
        self.conn.execute(
            "INSERT INTO students (id, name, department_id) VALUES (?1, ?2, ?3);",
            params![
                student.id.to_string(),
                student.name.as_str(),
                student.department_id.map(|id| id.to_string()),
            ],
        )?;
        write_lecture_links(self.conn, student)?;
        Ok(())
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE s.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn find_student_by_name(&self, name: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL}
             WHERE s.name = ?1
             ORDER BY s.created_at ASC, s.rowid ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL} ORDER BY s.name COLLATE NOCASE ASC, s.id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(self.conn, row)?);
        }
        Ok(students)
    }

    fn save_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;
        let changed = self.conn.execute(
            "UPDATE students
             SET name = ?2,
                 department_id = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                student.id.to_string(),
                student.name.as_str(),
                student.department_id.map(|id| id.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Student,
                id: student.id,
            });
        }

        self.conn.execute(
            "DELETE FROM student_lectures WHERE student_id = ?1;",
            [student.id.to_string()],
        )?;
        write_lecture_links(self.conn, student)?;
        Ok(())
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Student,
                id,
            });
        }
        Ok(())
    }
}

fn parse_student_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Student> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "students.id")?;
    let department_id = parse_optional_uuid(row.get("department_id")?, "students.department_id")?;
    let department = match (department_id, row.get::<_, Option<String>>("department_name")?) {
        (Some(department_id), Some(name)) => Some(DepartmentRef {
            id: department_id,
            name,
        }),
        (Some(department_id), None) => {
            return Err(RepoError::InvalidData(format!(
                "student {id} references missing department {department_id}"
            )));
        }
        (None, _) => None,
    };

    let student = Student {
        id,
        name: row.get("name")?,
        department_id,
        department,
        lectures: query_lecture_refs(conn, STUDENT_LECTURES_SQL, id)?,
    };
    student.validate()?;
    Ok(student)
}

fn write_lecture_links(conn: &Connection, student: &Student) -> RepoResult<()> {
    for lecture in &student.lectures {
        conn.execute(
            "INSERT OR IGNORE INTO student_lectures (student_id, lecture_id) VALUES (?1, ?2);",
            params![student.id.to_string(), lecture.id.to_string()],
        )?;
    }
    Ok(())
}
