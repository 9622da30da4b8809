//! Route tables and handlers, one module per resource.

pub(crate) mod departments;
pub(crate) mod lectures;
pub(crate) mod students;

use serde::Deserialize;

/// `PUT` body for renaming a department or student.
#[derive(Debug, Deserialize)]
pub(crate) struct RenameBody {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NameQuery {
    pub name: String,
}
