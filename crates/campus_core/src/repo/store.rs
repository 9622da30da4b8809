//! SQLite-backed store shared by all entity repositories.

use super::{RepoError, RepoResult, UniversityStore};
use crate::db::migrations::{current_user_version, latest_version};
use crate::model::department::DepartmentRef;
use crate::model::lecture::LectureRef;
use crate::model::student::StudentRef;
use log::warn;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const REQUIRED_TABLES: [&str; 5] = [
    "departments",
    "students",
    "lectures",
    "student_lectures",
    "lecture_departments",
];

/// Store over a borrowed, migrated connection.
///
/// Cheap to copy; every service may hold its own copy of the same store.
#[derive(Debug, Clone, Copy)]
pub struct SqliteStore<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not the latest.
    /// - `MissingRequiredTable` when a store table is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UniversityStore for SqliteStore<'_> {
    fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        match f(self) {
            Ok(value) => {
                tx.commit().map_err(RepoError::from)?;
                Ok(value)
            }
            Err(err) => {
                warn!("event=tx_rollback module=repo status=rolled_back");
                drop(tx);
                Err(err)
            }
        }
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(super) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(super) fn parse_optional_uuid(value: Option<String>, column: &str) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

fn parse_student_ref(row: &Row<'_>) -> RepoResult<StudentRef> {
    let id_text: String = row.get(0)?;
    Ok(StudentRef {
        id: parse_uuid(&id_text, "students.id")?,
        name: row.get(1)?,
        department_id: parse_optional_uuid(row.get(2)?, "students.department_id")?,
    })
}

fn parse_lecture_ref(row: &Row<'_>) -> RepoResult<LectureRef> {
    let id_text: String = row.get(0)?;
    Ok(LectureRef {
        id: parse_uuid(&id_text, "lectures.id")?,
        title: row.get(1)?,
    })
}

fn parse_department_ref(row: &Row<'_>) -> RepoResult<DepartmentRef> {
    let id_text: String = row.get(0)?;
    Ok(DepartmentRef {
        id: parse_uuid(&id_text, "departments.id")?,
        name: row.get(1)?,
    })
}

/// Runs `sql` with a single owner-id parameter and parses student refs.
///
/// `sql` must select `id, name, department_id` in that order.
pub(super) fn query_student_refs(
    conn: &Connection,
    sql: &str,
    owner_id: Uuid,
) -> RepoResult<Vec<StudentRef>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([owner_id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_student_ref(row)?);
    }
    Ok(items)
}

/// `sql` must select `id, title`.
pub(super) fn query_lecture_refs(
    conn: &Connection,
    sql: &str,
    owner_id: Uuid,
) -> RepoResult<Vec<LectureRef>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([owner_id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_lecture_ref(row)?);
    }
    Ok(items)
}

/// `sql` must select `id, name`.
pub(super) fn query_department_refs(
    conn: &Connection,
    sql: &str,
    owner_id: Uuid,
) -> RepoResult<Vec<DepartmentRef>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([owner_id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_department_ref(row)?);
    }
    Ok(items)
}
