use super::{NameQuery, RenameBody};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use campus_core::{
    CreateDepartmentInput, Department, DepartmentId, DepartmentService, EntityKind, LectureId,
    LectureRef, StudentId, StudentRef,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentToAddQuery {
    student_to_add_id: StudentId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LectureToAddQuery {
    lecture_to_add_id: LectureId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LectureQuery {
    lecture_id: LectureId,
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/departments", post(create).get(list))
        .route("/departments/lookup", get(lookup))
        .route("/departments/:id", get(fetch).put(rename).delete(remove))
        .route(
            "/departments/:id/students",
            get(list_students).post(add_student),
        )
        .route(
            "/departments/:id/lectures",
            get(list_lectures).post(add_lecture).delete(remove_lecture),
        )
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDepartmentInput>,
) -> ApiResult<(StatusCode, Json<Department>)> {
    let department = state
        .with_store(move |store| DepartmentService::new(store).create_department(input))
        .await?;
    Ok((StatusCode::CREATED, Json(department)))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Department>>> {
    let departments = state
        .with_store(|store| DepartmentService::new(store).list_departments())
        .await?;
    Ok(Json(departments))
}

async fn lookup(
    State(state): State<AppState>,
    Query(NameQuery { name }): Query<NameQuery>,
) -> ApiResult<Json<Department>> {
    let label = name.clone();
    state
        .with_store(move |store| DepartmentService::new(store).find_department_by_name(&name))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found_by_label(EntityKind::Department, &label))
}

async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
) -> ApiResult<Json<Department>> {
    state
        .with_store(move |store| DepartmentService::new(store).get_department(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(EntityKind::Department, id))
}

async fn rename(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
    Json(body): Json<RenameBody>,
) -> ApiResult<Json<Department>> {
    let department = state
        .with_store(move |store| DepartmentService::new(store).rename_department(id, &body.name))
        .await?;
    Ok(Json(department))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
) -> ApiResult<Json<Department>> {
    let department = state
        .with_store(move |store| DepartmentService::new(store).delete_department(id))
        .await?;
    Ok(Json(department))
}

async fn list_students(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
) -> ApiResult<Json<Vec<StudentRef>>> {
    state
        .with_store(move |store| DepartmentService::new(store).list_students_in_department(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(EntityKind::Department, id))
}

async fn list_lectures(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
) -> ApiResult<Json<Vec<LectureRef>>> {
    state
        .with_store(move |store| DepartmentService::new(store).list_lectures_in_department(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(EntityKind::Department, id))
}

async fn add_student(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
    Query(query): Query<StudentToAddQuery>,
) -> ApiResult<Json<Department>> {
    let department = state
        .with_store(move |store| {
            DepartmentService::new(store).add_student_to_department(id, query.student_to_add_id)
        })
        .await?;
    Ok(Json(department))
}

async fn add_lecture(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
    Query(query): Query<LectureToAddQuery>,
) -> ApiResult<Json<Department>> {
    let department = state
        .with_store(move |store| {
            DepartmentService::new(store).add_lecture_to_department(id, query.lecture_to_add_id)
        })
        .await?;
    Ok(Json(department))
}

async fn remove_lecture(
    State(state): State<AppState>,
    Path(id): Path<DepartmentId>,
    Query(query): Query<LectureQuery>,
) -> ApiResult<Json<Department>> {
    let department = state
        .with_store(move |store| {
            DepartmentService::new(store).remove_lecture_from_department(id, query.lecture_id)
        })
        .await?;
    Ok(Json(department))
}
