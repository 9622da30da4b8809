//! University domain model: departments, students and lectures.
//!
//! # Responsibility
//! - Define the canonical entity shapes loaded from and saved to the store.
//! - Define flat reference types used for one-level relation views.
//! - Own name normalization and field validation.
//!
//! # Invariants
//! - Every entity is identified by a stable v4 UUID assigned at creation.
//! - Relation collections hold flat references only, never nested entities,
//!   so serialized views stop after one level.
//! - Relation collections behave as sets keyed by id.

pub mod department;
pub mod lecture;
pub mod student;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Entity family, used in error messages and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Department,
    Student,
    Lecture,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Student => "student",
            Self::Lecture => "lecture",
        }
    }

    /// Name of the required display field for this kind.
    pub fn label_field(self) -> &'static str {
        match self {
            Self::Department | Self::Student => "name",
            Self::Lecture => "title",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation failures for domain entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required name/title is empty after trimming.
    BlankLabel(EntityKind),
    /// Student carries a department reference that disagrees with its
    /// `department_id` foreign key.
    DepartmentMismatch {
        department_id: Option<Uuid>,
        reference_id: Option<Uuid>,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankLabel(kind) => {
                write!(f, "{kind} {} must not be blank", kind.label_field())
            }
            Self::DepartmentMismatch {
                department_id,
                reference_id,
            } => write!(
                f,
                "student department id {} does not match department reference {}",
                display_opt(department_id),
                display_opt(reference_id)
            ),
        }
    }
}

impl Error for ValidationError {}

/// Anything that participates in id-keyed set semantics.
pub trait Identified {
    fn id(&self) -> Uuid;
}

/// Trims and collapses inner whitespace of a display label.
///
/// # Errors
/// - Returns `ValidationError::BlankLabel` when nothing remains after trim.
pub fn normalize_label(kind: EntityKind, raw: &str) -> Result<String, ValidationError> {
    let collapsed = WHITESPACE_RE.replace_all(raw.trim(), " ");
    if collapsed.is_empty() {
        return Err(ValidationError::BlankLabel(kind));
    }
    Ok(collapsed.into_owned())
}

/// Inserts `item` unless an element with the same id exists.
///
/// Returns `true` when the collection changed.
pub(crate) fn insert_unique<T: Identified>(items: &mut Vec<T>, item: T) -> bool {
    let id = item.id();
    if items.iter().any(|existing| existing.id() == id) {
        return false;
    }
    items.push(item);
    true
}

/// Removes every element with the given id.
///
/// Returns `true` when the collection changed.
pub(crate) fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: Uuid) -> bool {
    let before = items.len();
    items.retain(|existing| existing.id() != id);
    items.len() != before
}

fn display_opt(value: &Option<Uuid>) -> String {
    value.map_or_else(|| "null".to_string(), |id| id.to_string())
}
