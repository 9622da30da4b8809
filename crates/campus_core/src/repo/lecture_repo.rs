//! Lecture repository contract and SQLite implementation.
//!
//! # Invariants
//! - Saving a lecture replaces both its `student_lectures` and
//!   `lecture_departments` rows.

use super::store::{parse_uuid, query_department_refs, query_student_refs, SqliteStore};
use super::{RepoError, RepoResult};
use crate::model::lecture::{Lecture, LectureId};
use crate::model::EntityKind;
use rusqlite::{params, Connection, OptionalExtension};

const LECTURE_STUDENTS_SQL: &str = "SELECT s.id, s.name, s.department_id
    FROM student_lectures sl
    INNER JOIN students s ON s.id = sl.student_id
    WHERE sl.lecture_id = ?1
    ORDER BY s.name COLLATE NOCASE ASC, s.id ASC;";

const LECTURE_DEPARTMENTS_SQL: &str = "SELECT d.id, d.name
    FROM lecture_departments ld
    INNER JOIN departments d ON d.id = ld.department_id
    WHERE ld.lecture_id = ?1
    ORDER BY d.name COLLATE NOCASE ASC, d.id ASC;";

/// Repository interface for lectures.
pub trait LectureRepository {
    /// Inserts the lecture row, its enrollments and its department links.
    fn insert_lecture(&self, lecture: &Lecture) -> RepoResult<()>;
    fn get_lecture(&self, id: LectureId) -> RepoResult<Option<Lecture>>;
    fn find_lecture_by_title(&self, title: &str) -> RepoResult<Option<Lecture>>;
    /// Lists every lecture ordered by title.
    fn list_lectures(&self) -> RepoResult<Vec<Lecture>>;
    fn save_lecture(&self, lecture: &Lecture) -> RepoResult<()>;
    fn delete_lecture(&self, id: LectureId) -> RepoResult<()>;
}

impl LectureRepository for SqliteStore<'_> {
    fn insert_lecture(&self, lecture: &Lecture) -> RepoResult<()> {
        lecture.validate()?;
        self.conn.execute(
            "INSERT INTO lectures (id, title) VALUES (?1, ?2);",
            params![lecture.id.to_string(), lecture.title.as_str()],
        )?;
        write_links(self.conn, lecture)?;
        Ok(())
    }

    fn get_lecture(&self, id: LectureId) -> RepoResult<Option<Lecture>> {
        let title: Option<String> = self
            .conn
            .query_row(
                "SELECT title FROM lectures WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match title {
            Some(title) => Ok(Some(load_relations(self.conn, id, title)?)),
            None => Ok(None),
        }
    }

    fn find_lecture_by_title(&self, title: &str) -> RepoResult<Option<Lecture>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT id, title
                 FROM lectures
                 WHERE title = ?1
                 ORDER BY created_at ASC, rowid ASC
                 LIMIT 1;",
                [title],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((id_text, title)) => {
                let id = parse_uuid(&id_text, "lectures.id")?;
                Ok(Some(load_relations(self.conn, id, title)?))
            }
            None => Ok(None),
        }
    }

    fn list_lectures(&self) -> RepoResult<Vec<Lecture>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title
             FROM lectures
             ORDER BY title COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut lectures = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            let id = parse_uuid(&id_text, "lectures.id")?;
            lectures.push(load_relations(self.conn, id, row.get(1)?)?);
        }
        Ok(lectures)
    }

    fn save_lecture(&self, lecture: &Lecture) -> RepoResult<()> {
        lecture.validate()?;
        let changed = self.conn.execute(
            "UPDATE lectures
             SET title = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![lecture.id.to_string(), lecture.title.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Lecture,
                id: lecture.id,
            });
        }

        let id_text = lecture.id.to_string();
        self.conn.execute(
            "DELETE FROM student_lectures WHERE lecture_id = ?1;",
            [id_text.as_str()],
        )?;
        self.conn.execute(
            "DELETE FROM lecture_departments WHERE lecture_id = ?1;",
            [id_text.as_str()],
        )?;
        write_links(self.conn, lecture)?;
        Ok(())
    }

    fn delete_lecture(&self, id: LectureId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM lectures WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: EntityKind::Lecture,
                id,
            });
        }
        Ok(())
    }
}

fn load_relations(conn: &Connection, id: LectureId, title: String) -> RepoResult<Lecture> {
    let lecture = Lecture {
        id,
        title,
        students: query_student_refs(conn, LECTURE_STUDENTS_SQL, id)?,
        departments: query_department_refs(conn, LECTURE_DEPARTMENTS_SQL, id)?,
    };
    lecture.validate()?;
    Ok(lecture)
}

fn write_links(conn: &Connection, lecture: &Lecture) -> RepoResult<()> {
    let id_text = lecture.id.to_string();
    for student in &lecture.students {
        conn.execute(
            "INSERT OR IGNORE INTO student_lectures (student_id, lecture_id) VALUES (?1, ?2);",
            params![student.id.to_string(), id_text.as_str()],
        )?;
    }
    for department in &lecture.departments {
        conn.execute(
            "INSERT OR IGNORE INTO lecture_departments (lecture_id, department_id)
             VALUES (?1, ?2);",
            params![id_text.as_str(), department.id.to_string()],
        )?;
    }
    Ok(())
}
