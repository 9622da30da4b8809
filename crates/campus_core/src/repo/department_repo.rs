//! Department repository contract and SQLite implementation.
//!
//! # Invariants
//! - `students` is derived from `students.department_id`; saving a department
//!   never rewrites student rows.
//! - `lectures` is persisted through `lecture_departments` and fully replaced
//!   on save.

use super::store::{parse_uuid, query_lecture_refs, query_student_refs, SqliteStore};
use super::{RepoError, RepoResult};
use crate::model::department::{Department, DepartmentId};
use crate::model::EntityKind;
use rusqlite::{params, Connection, OptionalExtension};

const DEPARTMENT_STUDENTS_SQL: &str = "SELECT id, name, department_id
    FROM students
    WHERE department_id = ?1
    ORDER BY name COLLATE NOCASE ASC, id ASC;";

const DEPARTMENT_LECTURES_SQL: &str = "SELECT l.id, l.title
    FROM lecture_departments ld
    INNER JOIN lectures l ON l.id = ld.lecture_id
    WHERE ld.department_id = ?1
    ORDER BY l.title COLLATE NOCASE ASC, l.id ASC;";

/// Repository interface for departments.
pub trait DepartmentRepository {
    /// Inserts the department row and its lecture links.
    fn insert_department(&self, department: &Department) -> RepoResult<()>;
    /// Loads one department with students and lectures.
    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    /// Loads the earliest-created department with exactly this name.
    fn find_department_by_name(&self, name: &str) -> RepoResult<Option<Department>>;
    /// Lists every department ordered by name.
    fn list_departments(&self) -> RepoResult<Vec<Department>>;
    /// Writes name and replaces lecture links.
    fn save_department(&self, department: &Department) -> RepoResult<()>;
    /// Removes the department row. Associations must already be severed.
    fn delete_department(&self, id: DepartmentId) -> RepoResult<()>;
}

impl DepartmentRepository for SqliteStore<'_> {
    fn insert_department(&self, department: &Department) -> RepoResult<()> {
        department.validate()?;
        self.conn.execute(
            "INSERT INTO departments (id, name) VALUES (?1, ?2);",
            params![department.id.to_string(), department.name.as_str()],
        )?;
        write_lecture_links(self.conn, department)?;
        Ok(())
    }

    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM departments WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match name {
            Some(name) => Ok(Some(load_relations(self.conn, id, name)?)),
            None => Ok(None),
        }
    }

    fn find_department_by_name(&self, name: &str) -> RepoResult<Option<Department>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT id, name
                 FROM departments
                 WHERE name = ?1
                 ORDER BY created_at ASC, rowid ASC
                 LIMIT 1;",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((id_text, name)) => {
                let id = parse_uuid(&id_text, "departments.id")?;
                Ok(Some(load_relations(self.conn, id, name)?))
            }
            None => Ok(None),
        }
    }

    fn list_departments(&self) -> RepoResult<Vec<Department>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name
             FROM departments
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut departments = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            let id = parse_uuid(&id_text, "departments.id")?;
            departments.push(load_relations(self.conn, id, row.get(1)?)?);
        }
        Ok(departments)
    }

    fn save_department(&self, department: &Department) -> RepoResult<()> {
        department.validate()?;
        let changed = self.conn.execute(
            "UPDATE departments
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![department.id.to_string(), department.name.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Department,
                id: department.id,
            });
        }

        self.conn.execute(
            "DELETE FROM lecture_departments WHERE department_id = ?1;",
            [department.id.to_string()],
        )?;
        write_lecture_links(self.conn, department)?;
        Ok(())
    }

    fn delete_department(&self, id: DepartmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM departments WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Department,
                id,
            });
        }
        Ok(())
    }
}

fn load_relations(conn: &Connection, id: DepartmentId, name: String) -> RepoResult<Department> {
    let department = Department {
        id,
        name,
        students: query_student_refs(conn, DEPARTMENT_STUDENTS_SQL, id)?,
        lectures: query_lecture_refs(conn, DEPARTMENT_LECTURES_SQL, id)?,
    };
    department.validate()?;
    Ok(department)
}

fn write_lecture_links(conn: &Connection, department: &Department) -> RepoResult<()> {
    for lecture in &department.lectures {
        conn.execute(
            "INSERT OR IGNORE INTO lecture_departments (lecture_id, department_id)
             VALUES (?1, ?2);",
            params![lecture.id.to_string(), department.id.to_string()],
        )?;
    }
    Ok(())
}
