use super::{NameQuery, RenameBody};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use campus_core::{
    CreateStudentInput, DepartmentId, EntityKind, LectureId, Student, StudentId, StudentService,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewDepartmentQuery {
    new_department_id: DepartmentId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LectureQuery {
    lecture_id: LectureId,
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", post(create).get(list))
        .route("/students/lookup", get(lookup))
        .route("/students/:id", get(fetch).put(rename).delete(remove))
        .route("/students/:id/department", put(change_department))
        .route(
            "/students/:id/lectures",
            post(add_lecture).delete(remove_lecture),
        )
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateStudentInput>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let student = state
        .with_store(move |store| StudentService::new(store).create_student(input))
        .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Student>>> {
    let students = state
        .with_store(|store| StudentService::new(store).list_students())
        .await?;
    Ok(Json(students))
}

async fn lookup(
    State(state): State<AppState>,
    Query(NameQuery { name }): Query<NameQuery>,
) -> ApiResult<Json<Student>> {
    let label = name.clone();
    state
        .with_store(move |store| StudentService::new(store).find_student_by_name(&name))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found_by_label(EntityKind::Student, &label))
}

async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> ApiResult<Json<Student>> {
    state
        .with_store(move |store| StudentService::new(store).get_student(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(EntityKind::Student, id))
}

async fn rename(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    Json(body): Json<RenameBody>,
) -> ApiResult<Json<Student>> {
    let student = state
        .with_store(move |store| StudentService::new(store).rename_student(id, &body.name))
        .await?;
    Ok(Json(student))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> ApiResult<Json<Student>> {
    let student = state
        .with_store(move |store| StudentService::new(store).delete_student(id))
        .await?;
    Ok(Json(student))
}

async fn change_department(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    Query(query): Query<NewDepartmentQuery>,
) -> ApiResult<Json<Student>> {
    let student = state
        .with_store(move |store| {
            StudentService::new(store).change_student_department(id, query.new_department_id)
        })
        .await?;
    Ok(Json(student))
}

async fn add_lecture(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    Query(query): Query<LectureQuery>,
) -> ApiResult<Json<Student>> {
    let student = state
        .with_store(move |store| {
            StudentService::new(store).add_lecture_to_student(id, query.lecture_id)
        })
        .await?;
    Ok(Json(student))
}

async fn remove_lecture(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    Query(query): Query<LectureQuery>,
) -> ApiResult<Json<Student>> {
    let student = state
        .with_store(move |store| {
            StudentService::new(store).remove_lecture_from_student(id, query.lecture_id)
        })
        .await?;
    Ok(Json(student))
}
